use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

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

    #[error("Cost query failed: {message}")]
    QueryError { message: String },

    #[error("Failed to write report '{path}': {message}")]
    OutputError { path: String, message: String },

    #[error("Alert dispatch failed: {message}")]
    AlertError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

pub type Result<T> = std::result::Result<T, MonitorError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Query,
    Output,
    Alert,
    Validation,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MonitorError {
    pub fn query(message: impl Into<String>) -> Self {
        Self::QueryError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::QueryError { .. } => ErrorCategory::Query,
            Self::OutputError { .. } | Self::CsvError(_) | Self::SerializationError(_) => {
                ErrorCategory::Output
            }
            Self::AlertError { .. } => ErrorCategory::Alert,
            Self::ValidationError { .. } => ErrorCategory::Validation,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 設定錯誤會回退到預設值，告警失敗不影響報表
            ErrorCategory::Configuration | ErrorCategory::Alert => ErrorSeverity::Low,
            ErrorCategory::Output => ErrorSeverity::Medium,
            ErrorCategory::Query | ErrorCategory::Validation => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check config/settings.json; invalid fields fall back to their defaults"
            }
            ErrorCategory::Query => {
                "Check your AWS credentials and Cost Explorer permissions (ce:GetCostAndUsage)"
            }
            ErrorCategory::Output => "Check that the report directory exists and is writable",
            ErrorCategory::Alert => {
                "Check sns_topic_arn in the settings and the sns:Publish permission"
            }
            ErrorCategory::Validation => "Check the command line arguments (see --help)",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::QueryError { message } => {
                format!("Could not retrieve cost data from AWS: {}", message)
            }
            Self::OutputError { path, .. } => format!("Could not write report {}", path),
            Self::AlertError { .. } => "Could not send the cost alert".to_string(),
            other => other.to_string(),
        }
    }
}
