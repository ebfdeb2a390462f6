use std::fmt;

#[derive(Debug)]
pub enum AppError {
    ConfigError(String),
    DatabaseError(String),
    Conflict(String),
    Unauthorized(String),
    NotFound(String),
    InvalidRequest(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = AppError::ConfigError("MONGO_INITDB_DATABASE is not set".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: MONGO_INITDB_DATABASE is not set"
        );

        let err = AppError::Conflict("index username_unique_idx".to_string());
        assert!(err.to_string().starts_with("Conflict:"));
    }
}
