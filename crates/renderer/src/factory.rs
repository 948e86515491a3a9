use effects::{CompositeEffect, Effect, ShaderError, ShaderResult, Uniform};

use crate::backend::Backend;
use crate::cache::{CacheStats, ProgramCache};
use crate::types::FactoryConfig;

/// Turns effect descriptions into drawable targets for one backend.
///
/// Mutating calls take `&mut self`: a factory owns its program cache and is
/// driven from one thread at a time. Effects themselves are `Send + Sync` and
/// can be built anywhere.
pub trait ShaderFactory {
    type Target;

    /// Whether the backend can run programs at all. When this is false every
    /// `create_render_effect` call fails with `PlatformNotSupported`.
    fn is_supported(&self) -> bool;

    /// Builds a drawable target for `effect` at `width` x `height`.
    ///
    /// Programs are compiled once per distinct source and cached; uniforms
    /// are rebuilt and bound on every call, so this is cheap enough to call
    /// every frame with a fresh effect value.
    fn create_render_effect(
        &mut self,
        effect: &Effect,
        width: f32,
        height: f32,
    ) -> ShaderResult<Self::Target>;

    fn clear_cache(&mut self);

    fn cache_size(&self) -> usize;
}

/// Routes each effect variant onto a [`Backend`].
///
/// ```text
///   Native     ──▶ backend primitive
///   Program    ──▶ cache[source] (compile on miss) ──▶ bind uniforms
///   Animated   ──▶ same as Program, with time bound
///   Composite  ──▶ each child in order ──▶ Backend::chain
/// ```
///
/// A composite child that fails is skipped and the chain continues from the
/// previous stage; the first error is only returned if no child succeeds.
pub struct EffectFactory<B: Backend> {
    backend: B,
    cache: ProgramCache<B::Program>,
}

impl<B: Backend> EffectFactory<B> {
    pub fn new(backend: B, max_cache_size: usize) -> Self {
        tracing::debug!(
            backend = backend.name(),
            supported = backend.is_supported(),
            max_cache_size,
            "created shader factory"
        );
        Self {
            backend,
            cache: ProgramCache::new(max_cache_size),
        }
    }

    /// Builds a factory around the backend chosen by `selector`.
    pub fn with_selector(config: &FactoryConfig, selector: impl FnOnce(&FactoryConfig) -> B) -> Self {
        Self::new(selector(config), config.max_cache_size)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn route(&mut self, effect: &Effect, width: f32, height: f32) -> ShaderResult<B::Target> {
        match effect {
            Effect::Native(native) => self.backend.create_native(native, width, height),
            Effect::Program(program) => {
                let uniforms = program.build_uniforms(width, height);
                self.program_target(program.id(), program.source(), &uniforms, width, height)
            }
            Effect::Animated(animated) => {
                let program = animated.program();
                let uniforms = animated.build_uniforms(width, height);
                self.program_target(program.id(), program.source(), &uniforms, width, height)
            }
            Effect::Composite(composite) => self.composite_target(composite, width, height),
        }
    }

    fn program_target(
        &mut self,
        id: &str,
        source: &str,
        uniforms: &[Uniform],
        width: f32,
        height: f32,
    ) -> ShaderResult<B::Target> {
        let backend = &self.backend;
        let program = self
            .cache
            .get_or_try_insert_with(source, || backend.compile(source))
            .map_err(|message| {
                tracing::warn!(effect = id, %message, "program compilation failed");
                ShaderError::compilation(message, Some(source))
            })?;
        self.backend.bind(&program, uniforms, width, height)
    }

    fn composite_target(
        &mut self,
        composite: &CompositeEffect,
        width: f32,
        height: f32,
    ) -> ShaderResult<B::Target> {
        let mut chained: Option<B::Target> = None;
        let mut first_error = None;

        for (index, child) in composite.effects().iter().enumerate() {
            match self.route(child, width, height) {
                Ok(target) => {
                    chained = Some(match chained.take() {
                        Some(previous) => self.backend.chain(previous, target),
                        None => target,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        index,
                        effect = %child.id(),
                        error = %err,
                        "skipping composite stage"
                    );
                    first_error.get_or_insert(err);
                }
            }
        }

        match (chained, first_error) {
            (Some(target), _) => Ok(target),
            (None, Some(err)) => Err(err),
            (None, None) => Err(ShaderError::unknown("composite effect has no stages")),
        }
    }
}

impl<B: Backend> ShaderFactory for EffectFactory<B> {
    type Target = B::Target;

    fn is_supported(&self) -> bool {
        self.backend.is_supported()
    }

    fn create_render_effect(
        &mut self,
        effect: &Effect,
        width: f32,
        height: f32,
    ) -> ShaderResult<Self::Target> {
        if !self.backend.is_supported() {
            return Err(ShaderError::platform_not_supported(
                self.backend.unsupported_reason(),
            ));
        }
        self.route(effect, width, height)
    }

    fn clear_cache(&mut self) {
        tracing::debug!(entries = self.cache.len(), "clearing program cache");
        self.cache.clear();
    }

    fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
