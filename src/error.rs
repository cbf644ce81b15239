use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Login failed: {0}")]
    SessionRejected(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Browser error: {0}")]
    Browser(String),
}

impl AppError {
    /// The only two conditions that end the process with a non-zero exit.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::SessionRejected(_) | AppError::MissingCredential(_))
    }

    /// Process exit status for an error that ended the run.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::SessionRejected(_) | AppError::MissingCredential(_) | AppError::Config(_) => 1,
            _ => 0,
        }
    }
}

/// Why a course's announcement could not be retrieved this cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("Can't access course. Reason: {0}")]
    Network(String),

    #[error("Can't access course info. Reason: {0}")]
    Parse(String),
}
