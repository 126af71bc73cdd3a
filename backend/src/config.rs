//! Application settings parsed from environment variables.
//!
//! Every variable has a default except `DATABASE_URL`, whose absence selects
//! the in-memory store. Values that are present but malformed fail startup
//! instead of falling back silently.

use std::net::SocketAddr;

use chrono::Duration;
use mockable::Env;
use tracing::warn;

use crate::inbound::http::projects::TitleKey;

pub const BIND_ADDR_ENV: &str = "BIND_ADDR";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const DB_POOL_MAX_SIZE_ENV: &str = "DB_POOL_MAX_SIZE";
pub const PROJECT_TITLE_KEY_ENV: &str = "PROJECT_TITLE_KEY";
pub const ACCESS_TOKEN_TTL_ENV: &str = "ACCESS_TOKEN_TTL_SECS";
pub const RATE_LIMIT_ENV: &str = "RATE_LIMIT_PER_MINUTE";
pub const ENABLE_METRICS_ENV: &str = "ENABLE_METRICS";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_RATE_LIMIT: u32 = 60;

const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const TITLE_KEY_EXPECTED: &str = "name|title|both";

/// Errors raised while validating configuration.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Settings consumed by `main` and the server builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSettings {
    pub bind_addr: SocketAddr,
    /// PostgreSQL connection string. `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub db_pool_max_size: u32,
    /// Key under which project titles are rendered.
    pub title_key: TitleKey,
    /// Token lifetime. `None` means tokens never expire.
    pub access_token_ttl: Option<Duration>,
    /// Per-client budget for public reads. Zero disables limiting.
    pub rate_limit_per_minute: u32,
    pub enable_metrics: bool,
}

impl AppSettings {
    /// Build settings from environment variables.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use mockable::MockEnv;
    /// use portfolio_backend::config::AppSettings;
    ///
    /// let mut env = MockEnv::new();
    /// env.expect_string().returning(|name| match name {
    ///     "BIND_ADDR" => Some("127.0.0.1:9000".to_owned()),
    ///     _ => None,
    /// });
    ///
    /// let settings = AppSettings::from_env(&env).expect("valid settings");
    /// assert_eq!(settings.bind_addr.port(), 9000);
    /// assert!(settings.database_url.is_none());
    /// ```
    pub fn from_env<E: Env>(env: &E) -> Result<Self, ConfigError> {
        let bind_addr = parse_or(
            env,
            BIND_ADDR_ENV,
            "host:port",
            SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
        )?;

        let database_url = env
            .string(DATABASE_URL_ENV)
            .filter(|value| !value.trim().is_empty());
        if database_url.is_none() {
            warn!("DATABASE_URL not set; using the in-memory store");
        }

        let db_pool_max_size = pool_size_from_env(env)?;
        let title_key = title_key_from_env(env)?;
        let access_token_ttl = token_ttl_from_env(env)?;
        let rate_limit_per_minute =
            parse_or(env, RATE_LIMIT_ENV, "a non-negative integer", DEFAULT_RATE_LIMIT)?;
        let enable_metrics = bool_from_env(env, ENABLE_METRICS_ENV, false)?;

        Ok(Self {
            bind_addr,
            database_url,
            db_pool_max_size,
            title_key,
            access_token_ttl,
            rate_limit_per_minute,
            enable_metrics,
        })
    }
}

/// Parse `name` with `FromStr`, or fall back to `default` when unset.
fn parse_or<E, T>(
    env: &E,
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    E: Env,
    T: std::str::FromStr,
{
    match env.string(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidEnv {
                name,
                value,
                expected,
            }),
        None => Ok(default),
    }
}

fn pool_size_from_env<E: Env>(env: &E) -> Result<u32, ConfigError> {
    const EXPECTED: &str = "a positive integer";
    let size = parse_or(env, DB_POOL_MAX_SIZE_ENV, EXPECTED, DEFAULT_POOL_MAX_SIZE)?;
    if size == 0 {
        return Err(ConfigError::InvalidEnv {
            name: DB_POOL_MAX_SIZE_ENV,
            value: size.to_string(),
            expected: EXPECTED,
        });
    }
    Ok(size)
}

fn title_key_from_env<E: Env>(env: &E) -> Result<TitleKey, ConfigError> {
    match env.string(PROJECT_TITLE_KEY_ENV) {
        Some(value) => value
            .parse::<TitleKey>()
            .map_err(|_| ConfigError::InvalidEnv {
                name: PROJECT_TITLE_KEY_ENV,
                value,
                expected: TITLE_KEY_EXPECTED,
            }),
        None => Ok(TitleKey::default()),
    }
}

fn token_ttl_from_env<E: Env>(env: &E) -> Result<Option<Duration>, ConfigError> {
    const EXPECTED: &str = "a positive number of seconds";
    let Some(value) = env.string(ACCESS_TOKEN_TTL_ENV) else {
        return Ok(None);
    };
    match value.trim().parse::<i64>() {
        Ok(seconds) if seconds > 0 => Ok(Some(Duration::seconds(seconds))),
        _ => Err(ConfigError::InvalidEnv {
            name: ACCESS_TOKEN_TTL_ENV,
            value,
            expected: EXPECTED,
        }),
    }
}

fn bool_from_env<E: Env>(
    env: &E,
    name: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match env.string(name) {
        Some(value) => parse_bool(&value).ok_or(ConfigError::InvalidEnv {
            name,
            value,
            expected: BOOL_EXPECTED,
        }),
        None => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockable::MockEnv;
    use rstest::rstest;
    use std::collections::HashMap;

    fn mock_env(vars: &[(&str, &str)]) -> MockEnv {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        let mut env = MockEnv::new();
        env.expect_string()
            .times(0..)
            .returning(move |key| vars.get(key).cloned());
        env
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let settings = AppSettings::from_env(&mock_env(&[])).expect("defaults are valid");
        assert_eq!(settings.bind_addr, SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert_eq!(settings.database_url, None);
        assert_eq!(settings.db_pool_max_size, 10);
        assert_eq!(settings.title_key, TitleKey::Name);
        assert_eq!(settings.access_token_ttl, None);
        assert_eq!(settings.rate_limit_per_minute, 60);
        assert!(!settings.enable_metrics);
    }

    #[rstest]
    fn explicit_values_are_honoured() {
        let env = mock_env(&[
            (BIND_ADDR_ENV, "127.0.0.1:3000"),
            (DATABASE_URL_ENV, "postgres://localhost/portfolio"),
            (DB_POOL_MAX_SIZE_ENV, "4"),
            (PROJECT_TITLE_KEY_ENV, "both"),
            (ACCESS_TOKEN_TTL_ENV, "3600"),
            (RATE_LIMIT_ENV, "0"),
            (ENABLE_METRICS_ENV, "yes"),
        ]);
        let settings = AppSettings::from_env(&env).expect("valid settings");
        assert_eq!(settings.bind_addr.port(), 3000);
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://localhost/portfolio")
        );
        assert_eq!(settings.db_pool_max_size, 4);
        assert_eq!(settings.title_key, TitleKey::Both);
        assert_eq!(settings.access_token_ttl, Some(Duration::hours(1)));
        assert_eq!(settings.rate_limit_per_minute, 0);
        assert!(settings.enable_metrics);
    }

    #[rstest]
    fn blank_database_url_selects_memory_store() {
        let settings =
            AppSettings::from_env(&mock_env(&[(DATABASE_URL_ENV, "  ")])).expect("valid");
        assert_eq!(settings.database_url, None);
    }

    #[rstest]
    #[case(BIND_ADDR_ENV, "localhost")]
    #[case(DB_POOL_MAX_SIZE_ENV, "0")]
    #[case(DB_POOL_MAX_SIZE_ENV, "many")]
    #[case(PROJECT_TITLE_KEY_ENV, "label")]
    #[case(ACCESS_TOKEN_TTL_ENV, "-5")]
    #[case(RATE_LIMIT_ENV, "-1")]
    #[case(ENABLE_METRICS_ENV, "maybe")]
    fn malformed_values_are_rejected(#[case] name: &'static str, #[case] value: &str) {
        let err = AppSettings::from_env(&mock_env(&[(name, value)]))
            .expect_err("malformed value must fail");
        let ConfigError::InvalidEnv {
            name: reported,
            value: reported_value,
            ..
        } = err;
        assert_eq!(reported, name);
        assert_eq!(reported_value, value);
    }

    #[rstest]
    #[case("1", Some(true))]
    #[case("No", Some(false))]
    #[case("on", None)]
    fn bool_parsing(#[case] raw: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse_bool(raw), expected);
    }
}
