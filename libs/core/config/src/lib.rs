pub mod tracing;

use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },
}

/// Deployment environment, selects the log format
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Reads `APP_ENV`; anything other than "production" is development.
    pub fn from_env() -> Self {
        let app_env = env_or_default("APP_ENV", "development");

        if app_env.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Trait for configuration that can be loaded from environment variables
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

/// Load an environment variable, falling back to `default` when unset
pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Load an environment variable or fail with [`ConfigError::MissingEnvVar`]
pub fn env_required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Load and parse an environment variable, falling back to `default` when unset.
///
/// A value that is set but does not parse is an error, not a silent default.
pub fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::ParseError {
            key: key.to_string(),
            details: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Load an optional boolean flag ("true"/"1" enable it)
pub fn env_flag(key: &str) -> bool {
    env::var(key)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_defaults_to_development() {
        temp_env::with_var_unset("APP_ENV", || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Development);
            assert!(env.is_development());
            assert!(!env.is_production());
        });
    }

    #[test]
    fn test_environment_production_case_insensitive() {
        temp_env::with_var("APP_ENV", Some("PRODUCTION"), || {
            assert_eq!(Environment::from_env(), Environment::Production);
        });
    }

    #[test]
    fn test_environment_unknown_defaults_to_development() {
        temp_env::with_var("APP_ENV", Some("staging"), || {
            assert_eq!(Environment::from_env(), Environment::Development);
        });
    }

    #[test]
    fn test_env_or_default() {
        temp_env::with_var("NOTIFIER_TEST_VAR", Some("set"), || {
            assert_eq!(env_or_default("NOTIFIER_TEST_VAR", "fallback"), "set");
        });
        temp_env::with_var_unset("NOTIFIER_TEST_VAR", || {
            assert_eq!(env_or_default("NOTIFIER_TEST_VAR", "fallback"), "fallback");
        });
    }

    #[test]
    fn test_env_required_missing() {
        temp_env::with_var_unset("NOTIFIER_MISSING_REQUIRED", || {
            let err = env_required("NOTIFIER_MISSING_REQUIRED").unwrap_err();
            assert!(err.to_string().contains("NOTIFIER_MISSING_REQUIRED"));
            assert!(err.to_string().contains("required"));
        });
    }

    #[test]
    fn test_env_parse_uses_default_when_unset() {
        temp_env::with_var_unset("NOTIFIER_TEST_PORT", || {
            assert_eq!(env_parse("NOTIFIER_TEST_PORT", 80u16).unwrap(), 80);
        });
    }

    #[test]
    fn test_env_parse_rejects_garbage() {
        temp_env::with_var("NOTIFIER_TEST_PORT", Some("eighty"), || {
            let err = env_parse("NOTIFIER_TEST_PORT", 80u16).unwrap_err();
            assert!(matches!(err, ConfigError::ParseError { ref key, .. } if key == "NOTIFIER_TEST_PORT"));
        });
    }

    #[test]
    fn test_env_parse_out_of_range() {
        temp_env::with_var("NOTIFIER_TEST_PORT", Some("99999"), || {
            assert!(env_parse("NOTIFIER_TEST_PORT", 80u16).is_err());
        });
    }

    #[test]
    fn test_env_flag() {
        temp_env::with_var("NOTIFIER_TEST_FLAG", Some("1"), || {
            assert!(env_flag("NOTIFIER_TEST_FLAG"));
        });
        temp_env::with_var("NOTIFIER_TEST_FLAG", Some("TRUE"), || {
            assert!(env_flag("NOTIFIER_TEST_FLAG"));
        });
        temp_env::with_var_unset("NOTIFIER_TEST_FLAG", || {
            assert!(!env_flag("NOTIFIER_TEST_FLAG"));
        });
    }
}
