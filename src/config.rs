use std::path::PathBuf;
use std::time::Duration;

/// Default interval between status requests.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Default per-request timeout for status requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default path segment under the base URL that serves job status documents.
pub const DEFAULT_STATUS_PATH: &str = "export-jobs";

/// Configuration for the export job poller
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub interval: Duration,
    /// Capacity of the event broadcast; slow subscribers lag past this.
    pub event_capacity: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            event_capacity: 64,
        }
    }
}

impl PollerConfig {
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }
}

/// Configuration for the HTTP job status client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub status_path: String,
    pub bearer_token: Option<String>,
    pub extra_headers: Vec<(String, String)>,
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            status_path: DEFAULT_STATUS_PATH.to_string(),
            bearer_token: None,
            extra_headers: Vec::new(),
            request_timeout: Some(DEFAULT_REQUEST_TIMEOUT),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// Where finished exports are written and where the listing lives.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub download_dir: PathBuf,
    pub listing_path: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("./downloads"),
            listing_path: "/exports".to_string(),
        }
    }
}
