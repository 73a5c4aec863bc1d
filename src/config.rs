use serde::Deserialize;

/// Which key-value store backs sessions, lists and the response cache
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Redis,
    Memory,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Language sent with every TMDB request
    #[serde(default = "default_tmdb_language")]
    pub tmdb_language: String,

    /// Gemini API key
    pub gemini_api_key: String,

    /// Gemini API base URL
    #[serde(default = "default_gemini_api_url")]
    pub gemini_api_url: String,

    /// Gemini model used for recommendations
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    #[serde(default = "default_store_backend")]
    pub store_backend: StoreBackend,

    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// How long a notification stays visible
    #[serde(default = "default_notification_ttl_ms")]
    pub notification_ttl_ms: u64,

    /// Delay before a closed modal forgets its movie
    #[serde(default = "default_modal_clear_delay_ms")]
    pub modal_clear_delay_ms: u64,

    /// Quiet period before a search suggestion query hits TMDB
    #[serde(default = "default_suggestion_debounce_ms")]
    pub suggestion_debounce_ms: u64,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_language() -> String {
    "en-US".to_string()
}

fn default_gemini_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_store_backend() -> StoreBackend {
    StoreBackend::Redis
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_notification_ttl_ms() -> u64 {
    3000
}

fn default_modal_clear_delay_ms() -> u64 {
    300
}

fn default_suggestion_debounce_ms() -> u64 {
    300
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_optional_fields() {
        let vars = vec![
            ("TMDB_API_KEY".to_string(), "tmdb".to_string()),
            ("GEMINI_API_KEY".to_string(), "gemini".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.tmdb_api_url, "https://api.themoviedb.org/3");
        assert_eq!(config.tmdb_language, "en-US");
        assert_eq!(config.gemini_model, "gemini-2.5-flash");
        assert_eq!(config.store_backend, StoreBackend::Redis);
        assert_eq!(config.notification_ttl_ms, 3000);
        assert_eq!(config.modal_clear_delay_ms, 300);
        assert_eq!(config.suggestion_debounce_ms, 300);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_memory_backend_from_env() {
        let vars = vec![
            ("TMDB_API_KEY".to_string(), "tmdb".to_string()),
            ("GEMINI_API_KEY".to_string(), "gemini".to_string()),
            ("STORE_BACKEND".to_string(), "memory".to_string()),
            ("PORT".to_string(), "8080".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_missing_api_key_fails() {
        let vars = vec![("TMDB_API_KEY".to_string(), "tmdb".to_string())];
        assert!(envy::from_iter::<_, Config>(vars).is_err());
    }
}
