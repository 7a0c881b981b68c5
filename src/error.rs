//! Error types for form generation

use thiserror::Error;

/// Errors raised while compiling schemas or binding forms to a store.
///
/// Field validation failures are not errors: validators return
/// `Option<String>` messages that surface through the store per field.
#[derive(Debug, Error)]
pub enum FormError {
    /// A field descriptor names a type the component kit does not provide
    #[error("Unknown field type '{field_type}' for field '{field}'")]
    UnknownFieldType { field: String, field_type: String },

    /// Another live form already claimed this identity
    #[error("Form identity already claimed: {0}")]
    DuplicateForm(String),

    /// A wizard schema without pages
    #[error("Wizard form '{0}' has no pages")]
    EmptyWizard(String),

    /// A schema document references a validator the registry does not know
    #[error("Unknown validator: {0}")]
    UnknownValidator(String),

    /// A `pattern` validator rule with an invalid regular expression
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Schema document could not be parsed
    #[error("Schema parse error: {0}")]
    Parse(String),

    /// Form options could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl From<serde_json::Error> for FormError {
    fn from(err: serde_json::Error) -> Self {
        FormError::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for FormError {
    fn from(err: serde_yaml::Error) -> Self {
        FormError::Parse(err.to_string())
    }
}

/// Result type alias for form operations
pub type FormResult<T> = Result<T, FormError>;
