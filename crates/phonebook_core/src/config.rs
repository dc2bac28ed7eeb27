//! Runtime configuration resolved from environment variables.
//!
//! # Responsibility
//! - Resolve database path, logging and paging settings with defaults.
//! - Report malformed values instead of panicking.
//!
//! # Invariants
//! - Unset or blank variables fall back to defaults.
//! - `default_page_size <= max_page_size` and both are at least 1.

use crate::logging::default_log_level;
use crate::query::person_query::{PageLimits, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "PHONEBOOK_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "PHONEBOOK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "PHONEBOOK_LOG_DIR";
pub const ENV_DEFAULT_PAGE_SIZE: &str = "PHONEBOOK_DEFAULT_PAGE_SIZE";
pub const ENV_MAX_PAGE_SIZE: &str = "PHONEBOOK_MAX_PAGE_SIZE";

const DEFAULT_DB_FILE_NAME: &str = "phonebook.sqlite3";

/// Configuration value that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidNumber { key: &'static str, value: String },
    InvalidPageLimits { default_page_size: u32, max_page_size: u32 },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidNumber { key, value } => {
                write!(f, "`{key}` must be a positive integer, got `{value}`")
            }
            Self::InvalidPageLimits {
                default_page_size,
                max_page_size,
            } => write!(
                f,
                "default page size {default_page_size} exceeds max page size {max_page_size}"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Resolved core configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Logging stays disabled when unset.
    pub log_dir: Option<PathBuf>,
    pub page_limits: PageLimits,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            page_limits: PageLimits::default(),
        }
    }
}

impl CoreConfig {
    /// Resolves configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value_of = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };
        let defaults = Self::default();

        let default_page_size = match value_of(ENV_DEFAULT_PAGE_SIZE) {
            Some(raw) => parse_positive(ENV_DEFAULT_PAGE_SIZE, &raw)?,
            None => DEFAULT_PAGE_SIZE,
        };
        let max_page_size = match value_of(ENV_MAX_PAGE_SIZE) {
            Some(raw) => parse_positive(ENV_MAX_PAGE_SIZE, &raw)?,
            None => MAX_PAGE_SIZE,
        };
        if default_page_size > max_page_size {
            return Err(ConfigError::InvalidPageLimits {
                default_page_size,
                max_page_size,
            });
        }

        Ok(Self {
            db_path: value_of(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            log_level: value_of(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: value_of(ENV_LOG_DIR).map(PathBuf::from),
            page_limits: PageLimits {
                default_page_size,
                max_page_size,
            },
        })
    }
}

fn parse_positive(key: &'static str, raw: &str) -> Result<u32, ConfigError> {
    match raw.parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidNumber {
            key,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, ENV_DB_PATH, ENV_DEFAULT_PAGE_SIZE, ENV_MAX_PAGE_SIZE};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = CoreConfig::from_lookup(lookup_from(&[])).expect("defaults");
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.page_limits.default_page_size, 10);
        assert_eq!(config.page_limits.max_page_size, 1000);
    }

    #[test]
    fn reads_overrides_and_ignores_blank_values() {
        let config = CoreConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, "/var/lib/phonebook.db"),
            (ENV_DEFAULT_PAGE_SIZE, " 25 "),
            (ENV_MAX_PAGE_SIZE, ""),
        ]))
        .expect("valid overrides");
        assert_eq!(config.db_path, PathBuf::from("/var/lib/phonebook.db"));
        assert_eq!(config.page_limits.default_page_size, 25);
        assert_eq!(config.page_limits.max_page_size, 1000);
    }

    #[test]
    fn rejects_zero_and_non_numeric_page_sizes() {
        let err = CoreConfig::from_lookup(lookup_from(&[(ENV_MAX_PAGE_SIZE, "0")]))
            .expect_err("zero must fail");
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));

        let err = CoreConfig::from_lookup(lookup_from(&[(ENV_DEFAULT_PAGE_SIZE, "ten")]))
            .expect_err("text must fail");
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));
    }

    #[test]
    fn rejects_default_above_max() {
        let err = CoreConfig::from_lookup(lookup_from(&[
            (ENV_DEFAULT_PAGE_SIZE, "50"),
            (ENV_MAX_PAGE_SIZE, "20"),
        ]))
        .expect_err("default above max must fail");
        assert_eq!(
            err,
            ConfigError::InvalidPageLimits {
                default_page_size: 50,
                max_page_size: 20
            }
        );
    }
}
