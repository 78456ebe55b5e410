//! Application-wide constants.

/// Application name, used for platform directories.
pub const APP_NAME: &str = "simple-analytics";

/// Crate version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default API origin.
pub const DEFAULT_BASE_URL: &str = "https://simpleanalytics.com";

/// Stats/Export API version sent as the `version` query parameter.
pub const API_VERSION: u32 = 5;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of characters of a response body kept on an error.
pub const BODY_EXCERPT_CHARS: usize = 500;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "Api-Key";

/// Header carrying the user id.
pub const USER_ID_HEADER: &str = "User-Id";

/// Conventional API key prefix.
pub const API_KEY_PREFIX: &str = "sa_api_key_";

/// Conventional user id prefix.
pub const USER_ID_PREFIX: &str = "sa_user_id_";

/// Environment variables read by collaborators (never by the client itself).
pub mod env {
    pub const API_KEY: &str = "SA_API_KEY";
    pub const USER_ID: &str = "SA_USER_ID";
    pub const HOSTNAME: &str = "SA_HOSTNAME";
}

/// Default `User-Agent` header value.
pub fn default_user_agent() -> String {
    format!("sa-rust-api/{APP_VERSION}")
}
