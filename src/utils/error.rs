use thiserror::Error;

#[derive(Error, Debug)]
pub enum CastError {
    #[error("Unknown cast method '{method}' in rule for field '{field}'")]
    UnknownCastMethod { field: String, method: String },

    #[error("Malformed cast rule for field '{field}': {reason}")]
    MalformedCastRule { field: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    System,
}

impl CastError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CastError::UnknownCastMethod { .. }
            | CastError::MalformedCastRule { .. }
            | CastError::TomlError(_)
            | CastError::ConfigError { .. }
            | CastError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            CastError::InvalidRequest { .. } | CastError::SerializationError(_) => {
                ErrorCategory::Input
            }
            CastError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CastError::UnknownCastMethod { .. } => {
                "Use one of the registered methods or register the function before building the pipeline"
            }
            CastError::MalformedCastRule { .. } => {
                "Join rules look like \"<glue>|a,b\" and new-field rules like \"<source>|method1, method2\""
            }
            CastError::TomlError(_) | CastError::ConfigError { .. } => {
                "Check the cast configuration file syntax"
            }
            CastError::InvalidConfigValueError { .. } => "Fix the highlighted configuration value",
            CastError::InvalidRequest { .. } | CastError::SerializationError(_) => {
                "The request body must be a JSON object"
            }
            CastError::IoError(_) => "Check that the file exists and is readable",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Cast configuration is invalid: {}", self),
            ErrorCategory::Input => format!("Request input could not be read: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, CastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_errors_are_configuration_errors() {
        let err = CastError::UnknownCastMethod {
            field: "shout".to_string(),
            method: "explode".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.to_string().contains("explode"));
        assert!(err.user_friendly_message().starts_with("Cast configuration"));

        let err = CastError::InvalidRequest {
            message: "expected object".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Input);
    }
}
