use std::env;

use crate::utils::error::AppError;

/// Runtime configuration, read once from the environment at startup and
/// passed by value afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: String,
    pub mongodb_uri: String,
    pub db_name: String,
    pub root_username: String,
    pub root_password: String,
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_days: i64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `MONGO_INITDB_DATABASE`, `MONGO_INITDB_ROOT_USERNAME`,
    /// `MONGO_INITDB_ROOT_PASSWORD` and `SECRET_KEY` are required and must be
    /// non-empty; everything else has a default.
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT").unwrap_or_else(|_| "3002".to_string()),
            mongodb_uri: env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            db_name: required_var("MONGO_INITDB_DATABASE")?,
            root_username: required_var("MONGO_INITDB_ROOT_USERNAME")?,
            root_password: required_var("MONGO_INITDB_ROOT_PASSWORD")?,
            secret_key: required_var("SECRET_KEY")?,
            access_token_expire_minutes: numeric_var("ACCESS_TOKEN_EXPIRE_MINUTES", 10_080)?,
            refresh_token_expire_days: numeric_var("REFRESH_TOKEN_EXPIRE_DAYS", 30)?,
        })
    }
}

fn required_var(name: &str) -> Result<String, AppError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => Err(AppError::ConfigError(format!("{} is empty", name))),
        Err(_) => Err(AppError::ConfigError(format!("{} is not set", name))),
    }
}

fn numeric_var(name: &str, default: i64) -> Result<i64, AppError> {
    match env::var(name) {
        Ok(value) => value
            .parse::<i64>()
            .map_err(|_| AppError::ConfigError(format!("{} is not a valid number: {}", name, value))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test mutating the process environment: the test harness runs
    // tests on multiple threads and env vars are process-global.
    #[test]
    fn test_from_env() {
        env::set_var("MONGO_INITDB_DATABASE", "app");
        env::set_var("MONGO_INITDB_ROOT_USERNAME", "admin");
        env::set_var("MONGO_INITDB_ROOT_PASSWORD", "secret");
        env::set_var("SECRET_KEY", "test-secret");
        env::remove_var("ACCESS_TOKEN_EXPIRE_MINUTES");
        env::remove_var("REFRESH_TOKEN_EXPIRE_DAYS");

        let config = Config::from_env().unwrap();
        assert_eq!(config.db_name, "app");
        assert_eq!(config.root_username, "admin");
        assert_eq!(config.root_password, "secret");
        assert_eq!(config.access_token_expire_minutes, 10_080);
        assert_eq!(config.refresh_token_expire_days, 30);

        env::set_var("ACCESS_TOKEN_EXPIRE_MINUTES", "60");
        let config = Config::from_env().unwrap();
        assert_eq!(config.access_token_expire_minutes, 60);

        env::set_var("ACCESS_TOKEN_EXPIRE_MINUTES", "not-a-number");
        assert!(Config::from_env().is_err());
        env::remove_var("ACCESS_TOKEN_EXPIRE_MINUTES");

        // Empty required values are configuration errors, not defaults
        env::set_var("MONGO_INITDB_DATABASE", "   ");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("MONGO_INITDB_DATABASE"));

        env::remove_var("MONGO_INITDB_DATABASE");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("is not set"));
    }
}
