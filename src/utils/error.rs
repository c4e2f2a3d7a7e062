use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Config file error: {message}")]
    ConfigFileError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required config field: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

pub type Result<T> = std::result::Result<T, CheckError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Processing,
    System,
}

impl CheckError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CheckError::HttpError(_) => ErrorCategory::Network,
            CheckError::IoError(_) => ErrorCategory::System,
            CheckError::SerializationError(_) => ErrorCategory::Processing,
            CheckError::ConfigFileError { .. }
            | CheckError::InvalidConfigValueError { .. }
            | CheckError::MissingConfigError { .. } => ErrorCategory::Configuration,
            CheckError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // HttpError only propagates from the fatal paths (registry fetch,
            // client construction); per-card failures never surface here.
            CheckError::HttpError(_) => ErrorSeverity::Critical,
            CheckError::IoError(_) => ErrorSeverity::Critical,
            CheckError::SerializationError(_) => ErrorSeverity::High,
            CheckError::ConfigFileError { .. }
            | CheckError::InvalidConfigValueError { .. }
            | CheckError::MissingConfigError { .. } => ErrorSeverity::Medium,
            CheckError::ProcessingError { .. } => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            CheckError::HttpError(_) => {
                "Check the registry URL and network connectivity, then re-run".to_string()
            }
            CheckError::IoError(_) => {
                "Check that the output path exists and is writable".to_string()
            }
            CheckError::SerializationError(_) => {
                "The registry returned data in an unexpected shape; verify the URL points at the JSON list".to_string()
            }
            CheckError::ConfigFileError { .. } => {
                "Fix the TOML config file and re-run".to_string()
            }
            CheckError::InvalidConfigValueError { field, .. } => {
                format!("Correct the value passed for {}", field)
            }
            CheckError::MissingConfigError { field } => {
                format!("Provide a value for {}", field)
            }
            CheckError::ProcessingError { .. } => {
                "Re-run; if the error persists the portal markup may have changed".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not reach the registry: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Processing => format!("Could not process the data: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}
