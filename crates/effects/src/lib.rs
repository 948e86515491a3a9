//! Declarative effect model.
//!
//! An [`Effect`] is a small immutable value describing what to draw. Nothing
//! in this crate touches a GPU: the `renderer` crate turns effects into
//! compiled programs and render targets.
//!
//! ```text
//!   ParameterSpec ──▶ ProgramEffect ──▶ Effect ──▶ ShaderFactory (renderer)
//!        │                 │              ▲
//!        ▼                 ▼              │
//!   ParameterValue     Vec<Uniform>   combine()/then()
//! ```

pub mod builtin;
pub mod color;
mod composite;
mod effect;
pub mod format;
mod native;
mod parameter;
mod program;
mod result;
mod uniform;

pub use composite::{combine, prefix_parameter_id, split_parameter_id, CompositeEffect};
pub use effect::Effect;
pub use native::{NativeEffect, BLUR_RADIUS, MIN_BLUR_RADIUS};
pub use parameter::{ParameterKind, ParameterSpec, ParameterValue};
pub use program::{AnimatedEffect, ProgramBuilder, ProgramEffect, UniformBinding, UniformSource};
pub use result::{run_catching, ShaderError, ShaderResult};
pub use uniform::Uniform;

/// Name of the input texture every program samples through `content_eval`.
pub const CONTENT_UNIFORM_NAME: &str = "content";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EffectError {
    #[error("a composite effect needs at least one child")]
    EmptyComposite,
    #[error("duplicate parameter id '{0}'")]
    DuplicateParameter(String),
    #[error("duplicate uniform name '{0}'")]
    DuplicateUniform(String),
    #[error("uniform '{uniform}' references unknown parameter '{parameter}'")]
    UnknownParameter { uniform: String, parameter: String },
    #[error("parameter '{0}' is not a declared toggle")]
    NotAToggle(String),
}
