use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalcError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// 使用者輸入錯誤，訊息會直接顯示在結果卡片上
    #[error("{message}")]
    InvalidInput { message: String },

    #[error("Missing field: {field}")]
    MissingField { field: String },

    #[error("Unknown calculator: {key}")]
    UnknownCalculator { key: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Remote source error: {message}")]
    RemoteError { message: String },

    #[error("Processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Config,
    Network,
    Io,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CalcError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 是否為應該顯示在卡片上的輸入錯誤
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Self::InvalidInput { .. } | Self::MissingField { .. })
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } | Self::MissingField { .. } | Self::UnknownCalculator { .. } => {
                ErrorCategory::Input
            }
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Config,
            Self::ApiError(_) | Self::RemoteError { .. } => ErrorCategory::Network,
            Self::IoError(_) | Self::ZipError(_) => ErrorCategory::Io,
            Self::CsvError(_) | Self::SerializationError(_) | Self::ProcessingError { .. } => {
                ErrorCategory::Internal
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        if let Self::UnknownCalculator { .. } = self {
            return ErrorSeverity::High;
        }
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Config | ErrorCategory::Io => ErrorSeverity::High,
            ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::InvalidInput { .. } => "Check the highlighted values and try again".to_string(),
            Self::MissingField { field } => format!("Provide a value with -f {}=<value>", field),
            Self::UnknownCalculator { .. } => {
                "Run `calcdeck list` to see the available calculators".to_string()
            }
            Self::ApiError(_) | Self::RemoteError { .. } => {
                "Check your network connection or pass --offline".to_string()
            }
            Self::IoError(_) | Self::ZipError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::ConfigValidationError { .. } => {
                "Review calcdeck.toml or the command line flags".to_string()
            }
            _ => "Re-run with --verbose for details".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::InvalidInput { message } => message.clone(),
            Self::MissingField { field } => format!("Please enter a value for '{}'.", field),
            Self::UnknownCalculator { key } => format!("There is no calculator named '{}'.", key),
            Self::ApiError(_) => "Could not reach the remote service.".to_string(),
            Self::IoError(e) => format!("File operation failed: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_user_facing() {
        let err = CalcError::invalid("Please enter a loan amount above zero.");
        assert!(err.is_user_facing());
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.to_string(), "Please enter a loan amount above zero.");
    }

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = CalcError::MissingConfigError {
            field: "currency.endpoint".to_string(),
        };
        assert!(!err.is_user_facing());
        assert_eq!(err.category(), ErrorCategory::Config);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }
}
