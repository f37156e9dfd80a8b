use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV output error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid regular expression: {0}")]
    RegexError(#[from] regex::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Process inspection failed: {message}")]
    ProcessError { message: String },

    #[error("No PACKAGE_VERSION line for major {major} in {url}")]
    VersionNotFound { major: String, url: String },

    #[error("Invalid version '{value}': {reason}")]
    InvalidVersion { value: String, reason: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported on this platform: {message}")]
    Unsupported { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Parse,
    Config,
    System,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ScoutError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ScoutError::HttpError(_) => ErrorCategory::Network,
            ScoutError::RegexError(_)
            | ScoutError::VersionNotFound { .. }
            | ScoutError::InvalidVersion { .. } => ErrorCategory::Parse,
            ScoutError::TomlError(_) | ScoutError::InvalidConfigValueError { .. } => {
                ErrorCategory::Config
            }
            ScoutError::ProcessError { .. } | ScoutError::Unsupported { .. } => {
                ErrorCategory::System
            }
            ScoutError::CsvError(_) | ScoutError::IoError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Parse | ErrorCategory::Config => ErrorSeverity::High,
            ErrorCategory::System | ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Config | ErrorCategory::Parse => 1,
            ErrorCategory::Network => 2,
            ErrorCategory::System => 3,
            ErrorCategory::Output => 4,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ScoutError::HttpError(e) => match e.url() {
                Some(url) => format!("Could not fetch {}", url),
                None => "Could not reach the upstream server".to_string(),
            },
            ScoutError::VersionNotFound { major, .. } => {
                format!("Could not determine the latest minor release of PostgreSQL {}", major)
            }
            ScoutError::RegexError(_) => "The search pattern is not a valid regex".to_string(),
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ScoutError::HttpError(_) => {
                "Check network connectivity and that the requested version has published release notes"
            }
            ScoutError::VersionNotFound { .. } => {
                "Pass --minor explicitly; development branches carry no released minor version"
            }
            ScoutError::InvalidVersion { .. } => "Use a major version such as 14 or 9.6",
            ScoutError::RegexError(_) => "Escape special characters in --regex",
            ScoutError::TomlError(_) | ScoutError::InvalidConfigValueError { .. } => {
                "Review the configuration file and flags"
            }
            ScoutError::ProcessError { .. } => {
                "Run with enough privilege to inspect the target user's processes"
            }
            ScoutError::Unsupported { .. } => "Socket inspection requires a Linux host",
            ScoutError::CsvError(_) | ScoutError::IoError(_) => {
                "Check that standard output is writable"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;
