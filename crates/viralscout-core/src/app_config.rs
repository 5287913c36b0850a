use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Value expected in the `x-api-key` request header.
    pub api_key_secret: Option<String>,
    pub apify_token: Option<String>,
    pub rapidapi_key: Option<String>,
    pub google_credentials_path: Option<PathBuf>,
    /// Pre-issued OAuth token; only consulted when no credentials file is set.
    pub google_access_token: Option<String>,
    pub search_timeout_secs: u64,
    pub provider_timeout_secs: u64,
    pub download_timeout_secs: u64,
    pub analysis_max_creators: usize,
    pub analysis_videos_per_creator: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field(
                "api_key_secret",
                &self.api_key_secret.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "apify_token",
                &self.apify_token.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "rapidapi_key",
                &self.rapidapi_key.as_ref().map(|_| "[redacted]"),
            )
            .field("google_credentials_path", &self.google_credentials_path)
            .field(
                "google_access_token",
                &self.google_access_token.as_ref().map(|_| "[redacted]"),
            )
            .field("search_timeout_secs", &self.search_timeout_secs)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("analysis_max_creators", &self.analysis_max_creators)
            .field(
                "analysis_videos_per_creator",
                &self.analysis_videos_per_creator,
            )
            .finish()
    }
}
