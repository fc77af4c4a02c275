use std::{env, fmt::Display, str::FromStr};

use tracing::info;

const DEFAULT_AUTH_API_URL: &str =
    "https://demobackend.emergentagent.com/auth/v1/env/oauth/session-data";

pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub auth_api_url: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            database_url: try_load("DATABASE_URL", "sqlite://irecommend.db?mode=rwc"),
            port: try_load("PORT", "8080"),
            auth_api_url: try_load("AUTH_API_URL", DEFAULT_AUTH_API_URL),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            tracing::warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
