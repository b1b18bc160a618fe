/// Invalid user input, reported with the offending field path
/// (for example `text.lines[1].depth`).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: String, value: f64 },

    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field}: {reason}")]
    Contradictory { field: String, reason: String },

    #[error("{field}: font '{font}' has no glyph for {ch:?}")]
    MissingGlyph {
        field: String,
        font: String,
        ch: char,
    },

    #[error("{field}: unsupported value '{value}'")]
    Unsupported { field: String, value: String },
}

impl ConfigurationError {
    pub fn not_positive(field: impl Into<String>, value: f64) -> Self {
        ConfigurationError::NotPositive {
            field: field.into(),
            value,
        }
    }

    pub fn contradictory(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigurationError::Contradictory {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The dotted path of the field that failed validation.
    pub fn field(&self) -> &str {
        match self {
            ConfigurationError::NotPositive { field, .. }
            | ConfigurationError::OutOfRange { field, .. }
            | ConfigurationError::Contradictory { field, .. }
            | ConfigurationError::MissingGlyph { field, .. }
            | ConfigurationError::Unsupported { field, .. } => field,
        }
    }
}
