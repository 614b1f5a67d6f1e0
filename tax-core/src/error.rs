use thiserror::Error;

/// Errors surfaced by the tax engine.
///
/// `Configuration` and `Input` are caller-facing and carry the path of the
/// offending entry. `ArithmeticInvariant` means the engine itself produced
/// an inconsistent figure; the calculation is aborted instead of clamped.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxEngineError {
    #[error("configuration error at '{path}': {message}")]
    Configuration { path: String, message: String },

    #[error("invalid input at '{field}': {message}")]
    Input { field: String, message: String },

    #[error("arithmetic invariant violated: {0}")]
    ArithmeticInvariant(String),
}

impl TaxEngineError {
    pub fn configuration(
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Configuration {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn input(
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Input {
            field: field.into(),
            message: message.into(),
        }
    }
}
