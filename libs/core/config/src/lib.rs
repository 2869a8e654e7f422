pub mod tracing;

use std::env;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },
}

/// Application environment (dev = local runs, prod = deployed services)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

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

/// Helper to load and parse environment variable or return error
pub fn env_required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Helper to load an optional environment variable, treating empty values as unset
pub fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

/// Helper to load a boolean flag
///
/// Accepts `true`/`false`, `1`/`0`, `yes`/`no` (case-insensitive).
/// An unset or empty variable yields `default`.
pub fn env_flag(key: &str, default: bool) -> Result<bool, ConfigError> {
    let Some(raw) = env_optional(key) else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::ParseError {
            key: key.to_string(),
            details: format!("expected a boolean, got '{}'", other),
        }),
    }
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
    fn test_environment_production() {
        temp_env::with_var("APP_ENV", Some("production"), || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Production);
            assert!(env.is_production());
            assert!(!env.is_development());
        });
    }

    #[test]
    fn test_environment_production_case_insensitive() {
        temp_env::with_var("APP_ENV", Some("PRODUCTION"), || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Production);
        });
    }

    #[test]
    fn test_environment_unknown_defaults_to_development() {
        temp_env::with_var("APP_ENV", Some("staging"), || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Development);
        });
    }

    #[test]
    fn test_env_required_success() {
        temp_env::with_var("REQUIRED_VAR", Some("required_value"), || {
            let result = env_required("REQUIRED_VAR");
            assert!(result.is_ok());
            assert_eq!(result.unwrap(), "required_value");
        });
    }

    #[test]
    fn test_env_required_missing() {
        temp_env::with_var_unset("MISSING_REQUIRED", || {
            let result = env_required("MISSING_REQUIRED");
            assert!(result.is_err());
            let err = result.unwrap_err();
            assert!(err.to_string().contains("MISSING_REQUIRED"));
            assert!(err.to_string().contains("required"));
        });
    }

    #[test]
    fn test_env_optional_treats_empty_as_unset() {
        temp_env::with_var("OPTIONAL_VAR", Some(""), || {
            assert_eq!(env_optional("OPTIONAL_VAR"), None);
        });
        temp_env::with_var("OPTIONAL_VAR", Some("value"), || {
            assert_eq!(env_optional("OPTIONAL_VAR"), Some("value".to_string()));
        });
    }

    #[test]
    fn test_env_flag_values() {
        temp_env::with_var_unset("FLAG_VAR", || {
            assert!(!env_flag("FLAG_VAR", false).unwrap());
            assert!(env_flag("FLAG_VAR", true).unwrap());
        });

        for truthy in ["true", "TRUE", "1", "yes"] {
            temp_env::with_var("FLAG_VAR", Some(truthy), || {
                assert!(env_flag("FLAG_VAR", false).unwrap());
            });
        }

        for falsy in ["false", "0", "No"] {
            temp_env::with_var("FLAG_VAR", Some(falsy), || {
                assert!(!env_flag("FLAG_VAR", true).unwrap());
            });
        }
    }

    #[test]
    fn test_env_flag_invalid() {
        temp_env::with_var("FLAG_VAR", Some("maybe"), || {
            let err = env_flag("FLAG_VAR", false).unwrap_err();
            assert!(matches!(err, ConfigError::ParseError { .. }));
            assert!(err.to_string().contains("FLAG_VAR"));
        });
    }
}
