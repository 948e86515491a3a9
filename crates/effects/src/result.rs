use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Outcome of every fallible effect operation.
///
/// Callers branch with the usual `Result` combinators: `.ok()` discards the
/// error, `.unwrap_or_else(..)` supplies a fallback, `?` propagates it and
/// `.inspect(..)` / `.inspect_err(..)` observe either side.
pub type ShaderResult<T> = Result<T, ShaderError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShaderError {
    /// The backend rejected program source, or its uniforms do not match.
    #[error("shader compilation failed: {message}")]
    Compilation {
        message: String,
        shader_source: Option<String>,
    },
    #[error("effect '{effect_id}' is not supported: {message}")]
    UnsupportedEffect { message: String, effect_id: String },
    /// Decoding, drawing or encoding an image failed.
    #[error("image processing failed: {message}")]
    Processing {
        message: String,
        cause: Option<String>,
    },
    /// Capability gate failed before any work was attempted.
    #[error("platform not supported: {message}")]
    PlatformNotSupported { message: String },
    #[error("{message}")]
    Unknown {
        message: String,
        cause: Option<String>,
    },
}

impl ShaderError {
    pub fn compilation(message: impl Into<String>, shader_source: Option<&str>) -> Self {
        ShaderError::Compilation {
            message: message.into(),
            shader_source: shader_source.map(str::to_owned),
        }
    }

    pub fn unsupported_effect(message: impl Into<String>, effect_id: impl Into<String>) -> Self {
        ShaderError::UnsupportedEffect {
            message: message.into(),
            effect_id: effect_id.into(),
        }
    }

    pub fn processing(message: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        ShaderError::Processing {
            message: message.into(),
            cause: Some(cause.to_string()),
        }
    }

    pub fn platform_not_supported(message: impl Into<String>) -> Self {
        ShaderError::PlatformNotSupported {
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        ShaderError::Unknown {
            message: message.into(),
            cause: None,
        }
    }

    /// The human-readable message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            ShaderError::Compilation { message, .. }
            | ShaderError::UnsupportedEffect { message, .. }
            | ShaderError::Processing { message, .. }
            | ShaderError::PlatformNotSupported { message }
            | ShaderError::Unknown { message, .. } => message,
        }
    }
}

/// Runs `f`, turning a panic into [`ShaderError::Unknown`].
///
/// Backends call into driver and compiler code that may panic on malformed
/// input; nothing is allowed to unwind across the effect API.
pub fn run_catching<T>(f: impl FnOnce() -> T) -> ShaderResult<T> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| ShaderError::Unknown {
        message: "unexpected panic".to_string(),
        cause: Some(panic_message(payload.as_ref())),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_catching_wraps_panics() {
        let result: ShaderResult<u32> = run_catching(|| panic!("driver exploded"));
        match result {
            Err(ShaderError::Unknown { cause, .. }) => {
                assert_eq!(cause.as_deref(), Some("driver exploded"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn run_catching_passes_values_through() {
        assert_eq!(run_catching(|| 7), Ok(7));
    }

    #[test]
    fn combinators_cover_both_sides() {
        let ok: ShaderResult<u32> = Ok(2);
        let err: ShaderResult<u32> = Err(ShaderError::platform_not_supported("no gpu"));

        assert_eq!(ok.clone().map(|v| v * 3), Ok(6));
        assert_eq!(err.clone().map(|v| v * 3), err);
        assert_eq!(ok.clone().ok(), Some(2));
        assert_eq!(err.clone().ok(), None);
        assert_eq!(err.clone().unwrap_or_else(|e| e.message().len() as u32), 6);

        let mut seen = Vec::new();
        let _ = ok.inspect(|v| seen.push(format!("ok {v}")));
        let _ = err.inspect_err(|e| seen.push(format!("err {}", e.message())));
        assert_eq!(seen, ["ok 2", "err no gpu"]);
    }

    #[test]
    fn display_includes_context() {
        let error = ShaderError::unsupported_effect("no native blur", "blur");
        assert_eq!(
            error.to_string(),
            "effect 'blur' is not supported: no native blur"
        );
        assert_eq!(error.message(), "no native blur");
    }
}
