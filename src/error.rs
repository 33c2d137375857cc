use std::borrow::Cow;

/// Recoverable failures surfaced by the engine.
///
/// Decorative paths (missing drawing surface, unmeasured track, rejected
/// clipboard write) never produce one of these; they degrade and log instead.
#[derive(Debug, thiserror::Error)]
pub enum MotionError {
    /// Site content or engine configuration could not be decoded.
    #[error("failed to decode {what}: {source}")]
    Decode { what: &'static str, source: serde_json::Error },

    /// A scroll trigger expression such as `"top 20%"` was malformed.
    #[error("invalid trigger expression `{input}`: {reason}")]
    Trigger { input: String, reason: Cow<'static, str> },

    /// A configuration value is outside its declared domain.
    #[error("invalid configuration: {0}")]
    Config(Cow<'static, str>),

    /// The global tracing subscriber could not be installed.
    #[error("logger initialisation failed: {0}")]
    Logger(String),

    /// A required DOM node or rendering context is absent.
    #[error("missing {0}")]
    Missing(Cow<'static, str>),
}

impl MotionError {
    pub(crate) fn trigger(input: &str, reason: impl Into<Cow<'static, str>>) -> Self {
        Self::Trigger { input: input.to_owned(), reason: reason.into() }
    }

    pub(crate) fn config(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::Config(reason.into())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<MotionError> for wasm_bindgen::JsValue {
    fn from(err: MotionError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

pub type Result<T, E = MotionError> = std::result::Result<T, E>;
