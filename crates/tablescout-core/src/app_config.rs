use std::path::PathBuf;

/// Per-namespace cache TTLs, in seconds.
#[derive(Debug, Clone, Copy)]
pub struct CacheTtls {
    /// Restaurant search results.
    pub search_secs: u64,
    /// Restaurant / venue identity details.
    pub details_secs: u64,
    /// Time-slot availability.
    pub availability_secs: u64,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            search_secs: 3600,
            details_secs: 86_400,
            availability_secs: 300,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub log_level: String,
    pub google_api_key: Option<String>,
    pub resy_api_key: Option<String>,
    pub resy_auth_token: Option<String>,
    pub request_timeout_secs: u64,
    pub google_rate_limit_calls: usize,
    pub google_rate_limit_period_secs: u64,
    pub resy_rate_limit_calls: usize,
    pub resy_rate_limit_period_secs: u64,
    pub cache_ttls: CacheTtls,
    pub default_lat: f64,
    pub default_lng: f64,
    pub default_radius_m: u32,
    pub default_party_size: u32,
    pub places_base_url: String,
    pub resy_base_url: String,
    pub max_output_chars: usize,
}

impl AppConfig {
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir.join("cache")
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("bookings.db")
    }

    #[must_use]
    pub fn database_url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.db_path().display())
    }

    #[must_use]
    pub fn has_google_key(&self) -> bool {
        self.google_api_key.is_some()
    }

    #[must_use]
    pub fn has_resy_credentials(&self) -> bool {
        self.resy_api_key.is_some() && self.resy_auth_token.is_some()
    }

    /// Returns `(api_key, auth_token)` when both are configured.
    #[must_use]
    pub fn resy_credentials(&self) -> Option<(String, String)> {
        match (&self.resy_api_key, &self.resy_auth_token) {
            (Some(key), Some(token)) => Some((key.clone(), token.clone())),
            _ => None,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("data_dir", &self.data_dir)
            .field("log_level", &self.log_level)
            .field(
                "google_api_key",
                &self.google_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "resy_api_key",
                &self.resy_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "resy_auth_token",
                &self.resy_auth_token.as_ref().map(|_| "[redacted]"),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("google_rate_limit_calls", &self.google_rate_limit_calls)
            .field(
                "google_rate_limit_period_secs",
                &self.google_rate_limit_period_secs,
            )
            .field("resy_rate_limit_calls", &self.resy_rate_limit_calls)
            .field(
                "resy_rate_limit_period_secs",
                &self.resy_rate_limit_period_secs,
            )
            .field("cache_ttls", &self.cache_ttls)
            .field("default_lat", &self.default_lat)
            .field("default_lng", &self.default_lng)
            .field("default_radius_m", &self.default_radius_m)
            .field("default_party_size", &self.default_party_size)
            .field("places_base_url", &self.places_base_url)
            .field("resy_base_url", &self.resy_base_url)
            .field("max_output_chars", &self.max_output_chars)
            .finish()
    }
}
