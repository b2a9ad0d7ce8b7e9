use std::env;

use chrono::Duration;
use log::*;
use pendu_common::{parse_boolean_flag, Secret};
use rand::{thread_rng, RngCore};

const DEFAULT_PENDU_HOST: &str = "127.0.0.1";
const DEFAULT_PENDU_PORT: u16 = 8360;
const DEFAULT_TOKEN_VALIDITY: Duration = Duration::hours(2);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub migrate_on_start: bool,
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_PENDU_HOST.to_string(),
            port: DEFAULT_PENDU_PORT,
            database_url: String::default(),
            migrate_on_start: true,
            auth: AuthConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("PENDU_HOST").ok().unwrap_or_else(|| DEFAULT_PENDU_HOST.into());
        let port = env::var("PENDU_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "{s} is not a valid port for PENDU_PORT. {e} Using the default, {DEFAULT_PENDU_PORT}, \
                         instead."
                    );
                    DEFAULT_PENDU_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_PENDU_PORT);
        let database_url = env::var("PENDU_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("PENDU_DATABASE_URL is not set. Please set it to the URL for the Pendu database.");
            String::default()
        });
        let migrate_on_start = parse_boolean_flag(env::var("PENDU_MIGRATE_ON_START").ok(), true);
        let auth = AuthConfig::try_from_env().unwrap_or_else(|| {
            warn!(
                "PENDU_JWT_SECRET is not set. A random secret will be used; every access token becomes invalid \
                 when the server restarts."
            );
            AuthConfig::default()
        });
        Self { host, port, database_url, migrate_on_start, auth }
    }
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: Secret<String>,
    pub token_validity: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        let mut bytes = [0u8; 32];
        thread_rng().fill_bytes(&mut bytes);
        Self { jwt_secret: Secret::new(hex::encode(bytes)), token_validity: DEFAULT_TOKEN_VALIDITY }
    }
}

impl AuthConfig {
    pub fn try_from_env() -> Option<Self> {
        let jwt_secret = env::var("PENDU_JWT_SECRET").ok().filter(|s| !s.is_empty())?;
        let token_validity = env::var("PENDU_TOKEN_VALIDITY_HOURS")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .map(Duration::hours)
            .unwrap_or(DEFAULT_TOKEN_VALIDITY);
        Some(Self { jwt_secret: Secret::new(jwt_secret), token_validity })
    }
}
