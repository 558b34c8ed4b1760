use std::{env, path::PathBuf, time::Duration};

#[derive(Clone, Debug)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub notification_ttl_secs: u64,
    /// Countdown tick period; 0 disables the background countdown so the
    /// host drives `tick` itself.
    pub countdown_period_ms: u64,
    pub storage_path: PathBuf,
    pub token_storage_key: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5000/api".to_string()),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(10),
            notification_ttl_secs: env::var("NOTIFICATION_TTL_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(5),
            countdown_period_ms: env::var("COUNTDOWN_PERIOD_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1000),
            storage_path: env::var("STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".quiz-client/storage.json")),
            token_storage_key: env::var("TOKEN_STORAGE_KEY")
                .unwrap_or_else(|_| "token".to_string()),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_ttl_secs)
    }

    pub fn countdown_period(&self) -> Option<Duration> {
        if self.countdown_period_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.countdown_period_ms))
        }
    }

    /// Joins an API path onto the configured base url.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:5000/api".to_string(),
            request_timeout_secs: 2,
            notification_ttl_secs: 5,
            countdown_period_ms: 0,
            storage_path: PathBuf::from("target/test-storage.json"),
            token_storage_key: "token".to_string(),
        }
    }
}
