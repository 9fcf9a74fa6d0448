use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::str::FromStr;

use thiserror::Error;

use crate::use_cases::verify_init_data::DEFAULT_MAX_AGE_SECONDS;

// Runtime/server configuration, read once at startup.

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 24 * 60 * 60;
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bot_token: String,
    pub jwt_secret: String,
    pub init_data_max_age_seconds: u64,
    pub init_data_max_future_skew_seconds: Option<u64>,
    pub session_ttl_seconds: u64,
    pub host: IpAddr,
    pub port: u16,
    pub dev_user_id: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    // Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: get("DATABASE_MAX_CONNECTIONS")
                .map(|value| parse::<NonZeroU32>("DATABASE_MAX_CONNECTIONS", value))
                .transpose()?
                .map_or(DEFAULT_DATABASE_MAX_CONNECTIONS, NonZeroU32::get),
            bot_token: required("TELEGRAM_BOT_TOKEN")?,
            jwt_secret: required("JWT_SECRET")?,
            init_data_max_age_seconds: parse_or(
                "INIT_DATA_MAX_AGE_SECONDS",
                get("INIT_DATA_MAX_AGE_SECONDS"),
                DEFAULT_MAX_AGE_SECONDS,
            )?,
            init_data_max_future_skew_seconds: get("INIT_DATA_MAX_FUTURE_SKEW_SECONDS")
                .map(|value| parse("INIT_DATA_MAX_FUTURE_SKEW_SECONDS", value))
                .transpose()?,
            session_ttl_seconds: parse_or(
                "SESSION_TTL_SECONDS",
                get("SESSION_TTL_SECONDS"),
                DEFAULT_SESSION_TTL_SECONDS,
            )?,
            host: parse_or("HOST", get("HOST"), IpAddr::V4(Ipv4Addr::UNSPECIFIED))?,
            port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?,
            dev_user_id: get("TEMP_USER_ID"),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse<T: FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|_| ConfigError::Invalid { name, value })
}

fn parse_or<T: FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    value.map_or(Ok(default), |value| parse(name, value))
}
