use std::time::Duration;

use url::Url;

/// Environment variable holding the API token
pub const TOKEN_ENV: &str = "TODOIST_AUTH_TOKEN";
pub const DEFAULT_REST_BASE: &str = "https://api.todoist.com/rest/v2/";
pub const DEFAULT_SYNC_URL: &str = "https://api.todoist.com/sync/v9/sync";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Which API surface completes a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CompleteVia {
    /// `POST tasks/{id}/close`
    #[default]
    Rest,
    /// Sync `item_update` moving the due date to "every day starting tomorrow"
    Sync,
}

/// Everything needed to talk to the service, resolved from flags and environment
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub token: String,
    pub rest_base: Url,
    pub sync_url: Url,
    /// Upper bound on a single request, connect to last byte
    pub timeout: Duration,
    pub complete_via: CompleteVia,
    /// Sort every freshly opened task list by priority
    pub sort_on_open: bool,
}

impl ClientConfig {
    /// Config with the public endpoints and default timeout
    pub fn with_token(token: impl Into<String>) -> Result<Self, url::ParseError> {
        Ok(ClientConfig {
            token: token.into(),
            rest_base: Url::parse(DEFAULT_REST_BASE)?,
            sync_url: Url::parse(DEFAULT_SYNC_URL)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            complete_via: CompleteVia::default(),
            sort_on_open: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_token_defaults() {
        let config = ClientConfig::with_token("abc").unwrap();
        assert_eq!(config.token, "abc");
        assert_eq!(config.rest_base.as_str(), DEFAULT_REST_BASE);
        assert_eq!(config.sync_url.host_str(), Some("api.todoist.com"));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.complete_via, CompleteVia::Rest);
        assert!(!config.sort_on_open);
    }
}
