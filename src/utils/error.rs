use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrendError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Image encoding error: {0}")]
    ImageError(#[from] image::ImageError),

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

    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Chart rendering error: {message}")]
    RenderError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Processing,
    Output,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TrendError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TrendError::ConfigError { .. }
            | TrendError::ConfigValidationError { .. }
            | TrendError::InvalidConfigValueError { .. }
            | TrendError::MissingConfigError { .. } => ErrorCategory::Configuration,
            TrendError::CsvError(_) | TrendError::ParseError { .. } => ErrorCategory::Input,
            TrendError::ProcessingError { .. } => ErrorCategory::Processing,
            TrendError::RenderError { .. }
            | TrendError::ImageError(_)
            | TrendError::SerializationError(_) => ErrorCategory::Output,
            TrendError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Processing => ErrorSeverity::Medium,
            ErrorCategory::Output | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            TrendError::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
                "Check that the input CSV path exists and is readable".to_string()
            }
            TrendError::IoError(_) => {
                "Check file permissions and free disk space in the output directory".to_string()
            }
            TrendError::CsvError(_) | TrendError::ParseError { .. } => {
                "Make sure the CSV has a header row with date and views columns, dates in YYYY-MM-DD format and non-negative integer views".to_string()
            }
            TrendError::MissingConfigError { field } => {
                format!("Provide a value for '{}'", field)
            }
            TrendError::ConfigError { .. }
            | TrendError::ConfigValidationError { .. }
            | TrendError::InvalidConfigValueError { .. } => {
                "Review the command line flags or the TOML configuration file".to_string()
            }
            TrendError::ProcessingError { .. } => {
                "The data may be too sparse; try another split date or cutoff".to_string()
            }
            TrendError::RenderError { .. } | TrendError::ImageError(_) => {
                "Try the svg output format or check that system fonts are installed".to_string()
            }
            TrendError::SerializationError(_) => "Report a bug with the input data attached".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Input => format!("Could not read the page-view data: {}", self),
            ErrorCategory::Processing => format!("Could not compute the trends: {}", self),
            ErrorCategory::Output => format!("Could not write the charts: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    /// 依嚴重程度決定程式結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, TrendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = TrendError::MissingConfigError {
            field: "input".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.exit_code(), 1);
        assert!(err.recovery_suggestion().contains("input"));
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err = TrendError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing.csv",
        ));
        assert_eq!(err.category(), ErrorCategory::System);
        assert_eq!(err.exit_code(), 3);
        assert!(err.user_friendly_message().starts_with("System error"));
    }

    #[test]
    fn test_processing_errors_are_retryable() {
        let err = TrendError::ProcessingError {
            message: "not enough months".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.exit_code(), 2);
    }
}
