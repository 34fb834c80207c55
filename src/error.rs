use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbaasError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Network failure (`status` is `None`) or a non-200 answer.
    #[error("Failed to get environment variables for app '{app}': {detail}")]
    FetchError {
        app: String,
        status: Option<u16>,
        detail: String,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Malformed endpoint for instance '{instance}': {reason}")]
    MalformedEndpoint { instance: String, reason: String },

    #[error("Invalid selection '{0}': expected a number")]
    InvalidSelection(String),

    #[error("Selection {index} is out of range (0..{len})")]
    SelectionOutOfRange { index: usize, len: usize },

    #[error("No database found for app '{0}'")]
    NoDatabases(String),

    #[error("Failed to launch '{program}': {source}")]
    LaunchError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Input error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

impl DbaasError {
    pub fn malformed(instance: &str, reason: impl Into<String>) -> Self {
        DbaasError::MalformedEndpoint {
            instance: instance.to_string(),
            reason: reason.into(),
        }
    }
}

pub type DbaasResult<T> = Result<T, DbaasError>;
