use effects::color::srgb_to_linear;
use effects::{ShaderError, ShaderResult, Uniform};

use crate::compile::{ScalarKind, UniformSlot};
use crate::types::ColorSpaceMode;

/// Uniform buffers are bound in 16-byte blocks.
const BLOCK: usize = 16;

/// Packs `uniforms` into one buffer per reflected slot, in slot order.
///
/// Slots the caller does not supply stay zeroed. A uniform with no matching
/// slot, or whose shape disagrees with the declaration, is reported as a
/// compilation error against `source`.
pub(crate) fn marshal_uniforms(
    slots: &[UniformSlot],
    uniforms: &[Uniform],
    color_space: ColorSpaceMode,
    source: &str,
) -> ShaderResult<Vec<Vec<u8>>> {
    let mut buffers: Vec<Vec<u8>> = slots
        .iter()
        .map(|slot| vec![0u8; padded_len(slot.components)])
        .collect();

    for uniform in uniforms {
        let Some(index) = slots.iter().position(|slot| slot.name == uniform.name()) else {
            return Err(ShaderError::compilation(
                format!("program does not declare uniform '{}'", uniform.name()),
                Some(source),
            ));
        };
        let slot = &slots[index];
        let bytes = encode(slot, uniform, color_space)
            .map_err(|message| ShaderError::compilation(message, Some(source)))?;
        buffers[index][..bytes.len()].copy_from_slice(&bytes);
    }

    Ok(buffers)
}

fn encode(slot: &UniformSlot, uniform: &Uniform, color_space: ColorSpaceMode) -> Result<Vec<u8>, String> {
    let expected = usize::from(slot.components);
    let mismatch = |found: &str| {
        format!(
            "uniform '{}' is declared as {}x{:?} but was given {found}",
            slot.name, slot.components, slot.kind
        )
    };

    match uniform {
        Uniform::Float { values, .. } => {
            if slot.kind != ScalarKind::Float || values.len() != expected {
                return Err(mismatch(&format!("{} float(s)", values.len())));
            }
            Ok(bytemuck::cast_slice(values).to_vec())
        }
        Uniform::Int { values, .. } => {
            if values.len() != expected {
                return Err(mismatch(&format!("{} int(s)", values.len())));
            }
            match slot.kind {
                ScalarKind::Sint => Ok(bytemuck::cast_slice(values).to_vec()),
                ScalarKind::Uint => {
                    let unsigned = values
                        .iter()
                        .map(|&value| u32::try_from(value))
                        .collect::<Result<Vec<_>, _>>()
                        .map_err(|_| format!("uniform '{}' is unsigned but was given a negative value", slot.name))?;
                    Ok(bytemuck::cast_slice(&unsigned).to_vec())
                }
                ScalarKind::Float => Err(mismatch("int(s)")),
            }
        }
        Uniform::Color { rgba, .. } => {
            if slot.kind != ScalarKind::Float || expected != 4 {
                return Err(mismatch("a color"));
            }
            let rgba = match color_space {
                ColorSpaceMode::Gamma => *rgba,
                ColorSpaceMode::Linear => [
                    srgb_to_linear(rgba[0]),
                    srgb_to_linear(rgba[1]),
                    srgb_to_linear(rgba[2]),
                    rgba[3],
                ],
            };
            Ok(bytemuck::cast_slice(&rgba).to_vec())
        }
    }
}

fn padded_len(components: u8) -> usize {
    let raw = usize::from(components) * 4;
    raw.div_ceil(BLOCK).max(1) * BLOCK
}
