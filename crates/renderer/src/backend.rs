use effects::{NativeEffect, ShaderError, ShaderResult, Uniform};
use image::RgbaImage;

/// A rendering backend the factory routes effects onto.
///
/// `Program` is the compiled, cacheable handle for one program source and
/// must be cheap to clone. `Target` is what the host draws with.
pub trait Backend {
    type Program: Clone;
    type Target;

    fn name(&self) -> &'static str;

    fn is_supported(&self) -> bool;

    /// Why [`Backend::is_supported`] is false, for error messages.
    fn unsupported_reason(&self) -> String {
        format!("the {} backend is not available on this platform", self.name())
    }

    /// Compiles program source. Errors are the backend compiler's message.
    fn compile(&self, source: &str) -> Result<Self::Program, String>;

    /// Binds a fresh set of uniforms to a compiled program.
    fn bind(
        &self,
        program: &Self::Program,
        uniforms: &[Uniform],
        width: f32,
        height: f32,
    ) -> ShaderResult<Self::Target>;

    /// Realises a native effect with a backend primitive.
    fn create_native(
        &self,
        effect: &NativeEffect,
        _width: f32,
        _height: f32,
    ) -> ShaderResult<Self::Target> {
        Err(ShaderError::unsupported_effect(
            format!("the {} backend has no native implementation", self.name()),
            effect.id(),
        ))
    }

    /// Applies `second` to the output of `first`.
    fn chain(&self, first: Self::Target, second: Self::Target) -> Self::Target;
}

/// A backend that can also draw a target into an image without a display.
pub trait OfflineBackend: Backend {
    fn render_image(&self, target: &Self::Target, image: &RgbaImage) -> ShaderResult<RgbaImage>;
}
