use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::fmt;
use std::time::Duration;

pub struct Config {
    pub port: u16,
    pub log_level: String,
    /// Shared secret of the hosted auth provider that signs access tokens.
    pub jwt_secret: String,
    pub balance_cache_ttl: Duration,
    pub currency: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("jwt_secret", &"<redacted>")
            .field("balance_cache_ttl", &self.balance_cache_ttl)
            .field("currency", &self.currency)
            .finish()
    }
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();

        Self {
            port: env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(3000),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string()),
            balance_cache_ttl: Duration::from_secs(
                env::var("BALANCE_CACHE_TTL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(300),
            ),
            currency: env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "INR".to_string()),
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
