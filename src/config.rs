use std::{env, net::SocketAddr, str::FromStr};

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 5000);
pub const DEFAULT_ACCESS_TOKEN_TTL_MINUTES: i64 = 15;
pub const DEFAULT_REFRESH_TOKEN_TTL_DAYS: i64 = 30;
pub const DEFAULT_PROMO_CODES: &[&str] = &["SAVE10", "SAVE20", "FIRST ORDER"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Clone)]
pub struct JwtSettings {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("access_ttl_minutes", &self.access_ttl_minutes)
            .field("refresh_ttl_days", &self.refresh_ttl_days)
            .finish_non_exhaustive()
    }
}

/// Argon2 cost parameters. `None` keeps the library default for that knob.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PasswordHashSettings {
    pub memory_kib: Option<u32>,
    pub iterations: Option<u32>,
    pub parallelism: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    pub per_second: u64,
    pub burst: u32,
}

/// Outbound mail relay. Absent when `SMTP_HOST` is unset.
#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub frontend_origin: String,
    pub api_url: String,
    pub store_name: String,
    pub jwt: JwtSettings,
    pub auth_cookie_secure: bool,
    pub promo_codes: Vec<String>,
    pub password_hash: PasswordHashSettings,
    pub rate_limit: RateLimitSettings,
    pub smtp: Option<SmtpSettings>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok(); // Load .env file

        let database_url = optional("DATABASE_URL");
        let bind_addr = parse_or("BIND_ADDR", SocketAddr::from(DEFAULT_BIND_ADDR))?;
        let frontend_origin =
            optional("FRONTEND_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());
        let api_url = optional("API_URL").unwrap_or_else(|| "http://localhost:5000".to_string());
        let store_name = optional("STORE_NAME").unwrap_or_else(|| "Storefront".to_string());

        let jwt = JwtSettings {
            access_secret: required("JWT_ACCESS_SECRET")?,
            refresh_secret: required("JWT_REFRESH_SECRET")?,
            access_ttl_minutes: parse_or("ACCESS_TOKEN_TTL_MINUTES", DEFAULT_ACCESS_TOKEN_TTL_MINUTES)?,
            refresh_ttl_days: parse_or("REFRESH_TOKEN_TTL_DAYS", DEFAULT_REFRESH_TOKEN_TTL_DAYS)?,
        };
        if jwt.access_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                name: "ACCESS_TOKEN_TTL_MINUTES",
                reason: "must be positive".into(),
            });
        }
        if jwt.refresh_ttl_days <= 0 {
            return Err(ConfigError::Invalid {
                name: "REFRESH_TOKEN_TTL_DAYS",
                reason: "must be positive".into(),
            });
        }

        let auth_cookie_secure = parse_or("AUTH_COOKIE_SECURE", true)?;
        let promo_codes = optional("PROMO_CODES")
            .map(|raw| parse_promo_codes(&raw))
            .unwrap_or_else(|| DEFAULT_PROMO_CODES.iter().map(|c| c.to_string()).collect());

        let password_hash = PasswordHashSettings {
            memory_kib: parse_optional("PASSWORD_HASH_MEMORY_KIB")?,
            iterations: parse_optional("PASSWORD_HASH_ITERATIONS")?,
            parallelism: parse_optional("PASSWORD_HASH_PARALLELISM")?,
        };

        let rate_limit = RateLimitSettings {
            per_second: parse_or("RATE_LIMITER_PER_SECOND", 2)?,
            burst: parse_or("RATE_LIMITER_BURST", 20)?,
        };

        let smtp = match optional("SMTP_HOST") {
            Some(host) => Some(SmtpSettings {
                host,
                port: parse_or("SMTP_PORT", 587)?,
                username: optional("SMTP_USERNAME"),
                password: optional("SMTP_PASSWORD"),
                from: required("SMTP_FROM")?,
            }),
            None => None,
        };

        Ok(Config {
            database_url,
            bind_addr,
            frontend_origin,
            api_url,
            store_name,
            jwt,
            auth_cookie_secure,
            promo_codes,
            password_hash,
            rate_limit,
            smtp,
        })
    }

    pub fn is_promo_allowed(&self, code: &str) -> bool {
        self.promo_codes.iter().any(|allowed| allowed == code)
    }
}

/// Splits a comma separated allow-list. Codes may contain spaces ("FIRST ORDER").
pub fn parse_promo_codes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}

fn optional(name: &'static str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}

fn parse_optional<T>(name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional(name)
        .map(|raw| {
            raw.parse::<T>().map_err(|err| ConfigError::Invalid {
                name,
                reason: err.to_string(),
            })
        })
        .transpose()
}

fn parse_or<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse_optional(name)?.unwrap_or(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promo_codes_keep_inner_spaces() {
        let codes = parse_promo_codes(" SAVE10 , FIRST ORDER,,SAVE20 ");
        assert_eq!(codes, vec!["SAVE10", "FIRST ORDER", "SAVE20"]);
    }

    #[test]
    fn promo_allow_list_is_exact_match() {
        let config = crate::state::test_support::test_config();
        assert!(config.is_promo_allowed("SAVE10"));
        assert!(config.is_promo_allowed("FIRST ORDER"));
        assert!(!config.is_promo_allowed("save10"));
        assert!(!config.is_promo_allowed("SAVE30"));
    }

    #[test]
    fn jwt_settings_debug_hides_secrets() {
        let settings = JwtSettings {
            access_secret: "super-secret-access".into(),
            refresh_secret: "super-secret-refresh".into(),
            access_ttl_minutes: 15,
            refresh_ttl_days: 30,
        };
        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("access_ttl_minutes"));
    }
}
