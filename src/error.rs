use thiserror::Error;

/// Application-wide error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Raw persistence failure. The message is for logs only and never
    /// reaches an HTTP client.
    #[error("Database error: {0}")]
    Database(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Failure with a message that is safe to show to the caller.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// `true` for errors caused by the caller's input rather than by the server.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::BadRequest(_) | AppError::Conflict(_) | AppError::NotFound(_)
        )
    }
}

/// Helper conversion from anyhow::Error
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(format!("Unique constraint violated: {}", db_err.message()))
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}
