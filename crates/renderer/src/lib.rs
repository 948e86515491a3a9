//! Turns effect descriptions into drawable render targets.
//!
//! ```text
//!   Effect ──▶ EffectFactory::create_render_effect
//!                 │ native?    ──▶ Backend::create_native
//!                 │ program?   ──▶ ProgramCache ──▶ Backend::compile ──▶ Backend::bind
//!                 │ composite? ──▶ each child, folded with Backend::chain
//!                 ▼
//!              Target ──▶ OfflineBackend::render_image (OfflineProcessor)
//! ```
//!
//! [`select_backend`] picks the wgpu backend when an adapter is available
//! and otherwise an unsupported stand-in that fails every request with
//! [`effects::ShaderError::PlatformNotSupported`].

mod backend;
mod cache;
mod compile;
mod factory;
mod gpu;
mod processor;
mod select;
#[cfg(test)]
mod testing;
mod types;

pub use backend::{Backend, OfflineBackend};
pub use cache::{CacheStats, ProgramCache};
pub use compile::{check_effect_source, ScalarKind, UniformSlot};
pub use factory::{EffectFactory, ShaderFactory};
pub use gpu::{GpuBackend, GpuProgram, RenderTarget};
pub use processor::{ImageProcessor, OfflineProcessor};
pub use select::{
    create_factory, create_image_processor, select_backend, PlatformBackend, PlatformFactory,
    PlatformProcessor,
};
pub use types::{
    AdapterProfile, BackendPreference, ColorSpaceMode, FactoryConfig, GpuPowerPreference,
    DEFAULT_CACHE_SIZE,
};
