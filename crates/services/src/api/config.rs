use std::env;

/// Backend used when `STUDYMATE_API_BASE_URL` is unset.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env::var("STUDYMATE_API_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.into());
        Self::new(base_url)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_dropped() {
        assert_eq!(ApiConfig::new("http://h/api/").base_url, "http://h/api");
        assert_eq!(ApiConfig::default().base_url, DEFAULT_API_BASE_URL);
    }
}
