use thiserror::Error;

/// Errors returned by the Resy client.
#[derive(Debug, Error)]
pub enum ResyError {
    /// Both an API key and an auth token are required; one or both are
    /// missing from the configuration.
    #[error("Resy credentials not configured (set TABLESCOUT_RESY_API_KEY and TABLESCOUT_RESY_AUTH_TOKEN)")]
    MissingCredentials,

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A non-2xx HTTP status with no cached value to fall back on.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
