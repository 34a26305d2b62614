//! Process configuration, read once at startup and immutable afterwards.

use std::fmt;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
/// One week, the lifetime the service has always issued tokens with
const DEFAULT_TOKEN_TTL_HOURS: i64 = 168;
/// Ten years
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set to a non-empty value")]
    MissingSecret,

    #[error("{var} has invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Token signing configuration
#[derive(Clone)]
pub struct JwtConfig {
    secret: String,
    pub access_token_ttl_hours: i64,
    pub refresh_token_ttl_hours: i64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        Ok(Self {
            secret,
            access_token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
            refresh_token_ttl_hours: DEFAULT_TOKEN_TTL_HOURS,
        })
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("access_token_ttl_hours", &self.access_token_ttl_hours)
            .field("refresh_token_ttl_hours", &self.refresh_token_ttl_hours)
            .finish()
    }
}

/// Server configuration.
///
/// | Env Var                   | Default   |
/// |---------------------------|-----------|
/// | `HOST`                    | `0.0.0.0` |
/// | `PORT`                    | `8080`    |
/// | `DATABASE_URL`            | unset: in-memory store |
/// | `JWT_SECRET`              | required  |
/// | `ACCESS_TOKEN_TTL_HOURS`  | `168`     |
/// | `REFRESH_TOKEN_TTL_HOURS` | `168`     |
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or("PORT", lookup("PORT"), DEFAULT_PORT)?;
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let mut jwt = JwtConfig::new(lookup("JWT_SECRET").unwrap_or_default())?;
        jwt.access_token_ttl_hours = positive_hours(
            "ACCESS_TOKEN_TTL_HOURS",
            lookup("ACCESS_TOKEN_TTL_HOURS"),
        )?;
        jwt.refresh_token_ttl_hours = positive_hours(
            "REFRESH_TOKEN_TTL_HOURS",
            lookup("REFRESH_TOKEN_TTL_HOURS"),
        )?;

        Ok(Self {
            host,
            port,
            database_url,
            jwt,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    var: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

fn positive_hours(var: &'static str, raw: Option<String>) -> Result<i64, ConfigError> {
    let hours = parse_or(var, raw.clone(), DEFAULT_TOKEN_TTL_HOURS)?;
    if !(1..=MAX_TOKEN_TTL_HOURS).contains(&hours) {
        return Err(ConfigError::Invalid {
            var,
            value: raw.unwrap_or_default(),
        });
    }
    Ok(hours)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_secret_aborts() {
        let result = Config::from_lookup(lookup_from(&[("PORT", "9000")]));
        assert_eq!(result.unwrap_err(), ConfigError::MissingSecret);

        let result = Config::from_lookup(lookup_from(&[("JWT_SECRET", "")]));
        assert_eq!(result.unwrap_err(), ConfigError::MissingSecret);
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.database_url, None);
        assert_eq!(config.jwt.access_token_ttl_hours, 168);
        assert_eq!(config.jwt.refresh_token_ttl_hours, 168);
        assert_eq!(config.jwt.secret(), "s3cret");
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("DATABASE_URL", "postgres://localhost/storefront"),
            ("ACCESS_TOKEN_TTL_HOURS", "1"),
            ("REFRESH_TOKEN_TTL_HOURS", "720"),
        ]))
        .unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/storefront")
        );
        assert_eq!(config.jwt.access_token_ttl_hours, 1);
        assert_eq!(config.jwt.refresh_token_ttl_hours, 720);
    }

    #[test]
    fn invalid_values_are_errors() {
        let result = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("PORT", "eighty"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid { var: "PORT", .. })));

        let result = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("ACCESS_TOKEN_TTL_HOURS", "0"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { var: "ACCESS_TOKEN_TTL_HOURS", .. })
        ));
    }

    #[test]
    fn oversized_ttl_is_rejected() {
        let result = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("ACCESS_TOKEN_TTL_HOURS", "3000000000000000"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { var: "ACCESS_TOKEN_TTL_HOURS", .. })
        ));

        let result = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("REFRESH_TOKEN_TTL_HOURS", "87601"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { var: "REFRESH_TOKEN_TTL_HOURS", .. })
        ));

        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "s3cret"),
            ("REFRESH_TOKEN_TTL_HOURS", "87600"),
        ]))
        .unwrap();
        assert_eq!(config.jwt.refresh_token_ttl_hours, 87600);
    }

    #[test]
    fn debug_output_redacts_secret() {
        let jwt = JwtConfig::new("super-secret-value").unwrap();
        assert!(!format!("{:?}", jwt).contains("super-secret-value"));
    }
}
