//! Client configuration.

/// Environment variable holding the API base URL.
pub const API_URL_ENV: &str = "GOODPLANS_API_URL";

/// Configuration for `MarketClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every path is appended to (default: `http://localhost:3000/api`).
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Read the base URL from `GOODPLANS_API_URL`, falling back to the default.
    pub fn from_env() -> Self {
        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000/api")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_stripped() {
        assert_eq!(ClientConfig::new("http://api.test/").base_url, "http://api.test");
    }

    #[test]
    fn default_points_at_local_backend() {
        assert_eq!(ClientConfig::default().base_url, "http://localhost:3000/api");
    }
}
