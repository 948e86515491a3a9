use std::io::Cursor;

use effects::{Effect, ShaderError, ShaderResult};
use image::ImageFormat;

use crate::backend::OfflineBackend;
use crate::factory::{EffectFactory, ShaderFactory};

/// Applies effects to encoded images without a display.
pub trait ImageProcessor {
    /// Decodes `image_bytes`, applies `effect`, and returns PNG bytes.
    ///
    /// `width`/`height` override the size the effect is built for; values
    /// `<= 0` use the image's own size. If the effect cannot be turned into a
    /// render target the original bytes are returned unchanged.
    fn process(
        &mut self,
        image_bytes: &[u8],
        effect: &Effect,
        width: f32,
        height: f32,
    ) -> ShaderResult<Vec<u8>>;
}

/// Batch counterpart of the live factory: the same routing and program
/// cache, drawn into an image instead of a display.
pub struct OfflineProcessor<B: OfflineBackend> {
    factory: EffectFactory<B>,
}

impl<B: OfflineBackend> OfflineProcessor<B> {
    pub fn new(factory: EffectFactory<B>) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> &EffectFactory<B> {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut EffectFactory<B> {
        &mut self.factory
    }
}

impl<B: OfflineBackend> ImageProcessor for OfflineProcessor<B> {
    fn process(
        &mut self,
        image_bytes: &[u8],
        effect: &Effect,
        width: f32,
        height: f32,
    ) -> ShaderResult<Vec<u8>> {
        let image = image::load_from_memory(image_bytes)
            .map_err(|err| ShaderError::processing("failed to decode image", err))?
            .to_rgba8();

        let effect_width = if width > 0.0 { width } else { image.width() as f32 };
        let effect_height = if height > 0.0 { height } else { image.height() as f32 };

        let target = match self
            .factory
            .create_render_effect(effect, effect_width, effect_height)
        {
            Ok(target) => target,
            Err(err) => {
                tracing::warn!(
                    effect = %effect.id(),
                    error = %err,
                    "could not build effect; returning the original image"
                );
                return Ok(image_bytes.to_vec());
            }
        };

        let rendered = self.factory.backend().render_image(&target, &image)?;

        let mut encoded = Vec::new();
        rendered
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
            .map_err(|err| ShaderError::processing("failed to encode PNG", err))?;
        tracing::debug!(
            effect = %effect.id(),
            width = rendered.width(),
            height = rendered.height(),
            bytes = encoded.len(),
            "processed image"
        );
        Ok(encoded)
    }
}
