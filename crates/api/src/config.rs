//! Process configuration, read once at startup.

use chrono::Duration;

/// API runtime configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind: String,
    pub jwt_secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl ApiConfig {
    /// Read configuration from the environment, falling back to dev defaults.
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("AUTHGATE_JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("AUTHGATE_JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        Self {
            bind: std::env::var("AUTHGATE_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            jwt_secret,
            access_ttl: Duration::seconds(env_seconds("AUTHGATE_ACCESS_TTL_SECS", 900)),
            refresh_ttl: Duration::seconds(env_seconds("AUTHGATE_REFRESH_TTL_SECS", 1_209_600)),
        }
    }
}

fn env_seconds(key: &str, default: i64) -> i64 {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "not a number of seconds; using default");
            default
        }),
        Err(_) => default,
    }
}
