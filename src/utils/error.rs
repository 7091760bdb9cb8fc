use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    ApiStatus { status: u16, body: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid session parameters: {message}")]
    InvalidSession { message: String },

    #[error("Unknown unit type '{value}'")]
    UnknownUnitType { value: String },

    #[error("Activity '{id}' not found")]
    ActivityNotFound { id: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl PlannerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PlannerError::ApiError(_) | PlannerError::ApiStatus { .. } => ErrorCategory::Network,
            PlannerError::CsvError(_)
            | PlannerError::SerializationError(_)
            | PlannerError::UnknownUnitType { .. }
            | PlannerError::ActivityNotFound { .. }
            | PlannerError::ProcessingError { .. } => ErrorCategory::Data,
            PlannerError::ConfigError { .. }
            | PlannerError::ConfigValidationError { .. }
            | PlannerError::InvalidConfigValueError { .. }
            | PlannerError::MissingConfigError { .. }
            | PlannerError::InvalidSession { .. } => ErrorCategory::Configuration,
            PlannerError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路錯誤通常重試即可
            PlannerError::ApiError(_) => ErrorSeverity::Medium,
            PlannerError::ApiStatus { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            PlannerError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PlannerError::ApiError(_) => {
                "Could not reach the activity database.".to_string()
            }
            PlannerError::ApiStatus { status, .. } => {
                format!("The activity database rejected the request (HTTP {}).", status)
            }
            PlannerError::CsvError(_) => "Failed to write the equipment list as CSV.".to_string(),
            PlannerError::IoError(e) => format!("File system error: {}", e),
            PlannerError::SerializationError(_) => {
                "The activity data could not be read.".to_string()
            }
            PlannerError::InvalidSession { message } => {
                format!("Invalid session settings: {}", message)
            }
            PlannerError::UnknownUnitType { value } => {
                format!("Equipment line uses an unknown unit type: '{}'", value)
            }
            PlannerError::ActivityNotFound { id } => {
                format!("No activity with id '{}' matches the current filter.", id)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self.category() {
            ErrorCategory::Network => {
                "Check --api-url and --api-key, then try again.".to_string()
            }
            ErrorCategory::Configuration => match self {
                PlannerError::InvalidSession { .. } => {
                    "Use at least 1 pupil and a group size of at least 1.".to_string()
                }
                _ => "Review the command line flags or the TOML config file.".to_string(),
            },
            ErrorCategory::Data => match self {
                PlannerError::ActivityNotFound { .. } => {
                    "Run without --activity to list the available activities.".to_string()
                }
                PlannerError::UnknownUnitType { .. } => {
                    "Fix the unit_type value in the database or run without --strict.".to_string()
                }
                _ => "Check the activity data for malformed rows.".to_string(),
            },
            ErrorCategory::System => {
                "Check that the output directory exists and is writable.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_errors_are_retryable() {
        let err = PlannerError::ApiStatus {
            status: 503,
            body: String::new(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);

        let err = PlannerError::ApiStatus {
            status: 401,
            body: String::new(),
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_activity_not_found_suggests_listing() {
        let err = PlannerError::ActivityNotFound { id: "42".into() };
        assert_eq!(err.category(), ErrorCategory::Data);
        assert!(err.user_friendly_message().contains("42"));
        assert!(err.recovery_suggestion().contains("--activity"));
    }
}
