//! Configuration model loaded from external sources.

use std::time::Duration;

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub domain: String,
    pub address: String,
    pub port: u16,
    pub templates_dir: String,
    pub secret: String,
    /// Base URL of the REST backend, e.g. `https://api.example.com/v1/`.
    pub api_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Lifetime of a signed-in session.
    #[serde(default = "default_session_hours")]
    pub session_hours: u64,
    /// Shown when the backend's company settings cannot be loaded.
    pub site_name: String,
}

fn default_request_timeout() -> u64 {
    30
}

fn default_session_hours() -> u64 {
    12
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn timeouts_have_defaults() {
        let config: ServerConfig = serde_json::from_value(json!({
            "domain": "localhost",
            "address": "127.0.0.1",
            "port": 8080,
            "templates_dir": "templates/**/*",
            "secret": "s",
            "api_url": "http://localhost:8000/",
            "site_name": "eventdesk"
        }))
        .unwrap();

        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.session_hours, 12);
    }
}
