use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("No email addresses found in input")]
    EmptyInput,

    #[error("Unsupported input file '{path}': {reason}")]
    UnsupportedFile { path: String, reason: String },

    #[error("Remote check failed for '{address}': {message}")]
    RemoteTransport { address: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation run cancelled after {processed} of {total} addresses")]
    Cancelled { processed: usize, total: usize },

    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// 錯誤分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Network,
    System,
    Interrupted,
}

/// 錯誤嚴重程度，CLI 以此決定退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ValidatorError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyInput | Self::UnsupportedFile { .. } => ErrorCategory::Input,
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::RemoteTransport { .. } | Self::ApiError(_) => ErrorCategory::Network,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
            Self::Cancelled { .. } => ErrorCategory::Interrupted,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Cancelled { .. } => ErrorSeverity::Low,
            Self::RemoteTransport { .. } | Self::ApiError(_) => ErrorSeverity::Medium,
            Self::EmptyInput
            | Self::UnsupportedFile { .. }
            | Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorSeverity::High,
            Self::IoError(_) | Self::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    /// CLI 退出碼。中止的執行沿用 SIGINT 慣例 130，不可視為成功
    pub fn exit_code(&self) -> i32 {
        if let Self::Cancelled { .. } = self {
            return 130;
        }
        match self.severity() {
            ErrorSeverity::Low => 0,      // 警告，但成功
            ErrorSeverity::Medium => 2,   // 重試錯誤
            ErrorSeverity::High => 1,     // 處理錯誤
            ErrorSeverity::Critical => 3, // 系統錯誤
        }
    }

    /// 給終端使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::EmptyInput => "The input file does not contain any email addresses".to_string(),
            Self::UnsupportedFile { path, .. } => {
                format!("'{}' is not a plain-text (.txt) file", path)
            }
            Self::RemoteTransport { address, .. } => {
                format!("Could not reach the validation service for {}", address)
            }
            Self::ConfigError { message } => format!("Invalid configuration: {}", message),
            Self::MissingConfigError { field } => format!("Missing setting: {}", field),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid value for {}: {}", field, reason)
            }
            Self::Cancelled { .. } => "Validation was cancelled, no results were saved".to_string(),
            Self::ApiError(_) => "The validation service request failed".to_string(),
            Self::IoError(e) => format!("File system error: {}", e),
            Self::SerializationError(_) => "Failed to encode or decode data".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Upload a .txt file with one email address per line",
            ErrorCategory::Configuration => {
                "Check the command line flags or config file (the remote strategy needs EMAIL_VALIDATION_API_KEY)"
            }
            ErrorCategory::Network => "Check network connectivity and the api endpoint, then retry",
            ErrorCategory::System => "Check file permissions and available disk space",
            ErrorCategory::Interrupted => "Run the validation again",
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidatorError>;
