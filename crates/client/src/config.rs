use std::time::Duration;

use crate::reconnect::DEFAULT_DELAY;

/// Default backend address for a locally running converter.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Path of the status WebSocket on the backend.
pub const STATUS_WS_PATH: &str = "/ws/status";

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base HTTP URL of the backend, without a trailing slash.
    pub api_url: String,
    /// Full status-channel URL.
    pub ws_url: String,
    /// Fixed delay between a channel closure and the next attempt.
    pub reconnect_delay: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                              |
    /// |--------------------------------|--------------------------------------|
    /// | `SEQCONV_API_URL`              | `http://127.0.0.1:8000`              |
    /// | `SEQCONV_WS_URL`               | API URL with a `ws` scheme + `/ws/status` |
    /// | `SEQCONV_RECONNECT_DELAY_SECS` | `3`                                  |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = lookup("SEQCONV_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into())
            .trim()
            .trim_end_matches('/')
            .to_string();

        let ws_url = lookup("SEQCONV_WS_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| derive_ws_url(&api_url));

        let reconnect_delay = match lookup("SEQCONV_RECONNECT_DELAY_SECS") {
            Some(raw) => raw.trim().parse().map(Duration::from_secs).unwrap_or_else(|_| {
                tracing::warn!(
                    value = %raw,
                    "SEQCONV_RECONNECT_DELAY_SECS is not a whole number of seconds, using default",
                );
                DEFAULT_DELAY
            }),
            None => DEFAULT_DELAY,
        };

        Self {
            api_url,
            ws_url,
            reconnect_delay,
        }
    }
}

/// Status-channel URL for an HTTP base URL: `http` becomes `ws`,
/// `https` becomes `wss`.
pub fn derive_ws_url(api_url: &str) -> String {
    let base = api_url.trim_end_matches('/');
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_string()
    };
    format!("{ws_base}{STATUS_WS_PATH}")
}
