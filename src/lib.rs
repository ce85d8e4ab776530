//! # Export Job Poller
//!
//! Client-side tracking of asynchronous server-side export jobs.
//!
//! ## Features
//!
//! - Timer-driven status polling of one job at a time (every 2 seconds by default)
//! - Out-of-order and post-stop responses are discarded
//! - Terminal outcomes published as typed events
//! - Pure status presentation for progress display
//! - Completion dialog and result file download

pub mod client;
pub mod config;
pub mod download;
pub mod error;
pub mod notifier;
pub mod poller;
pub mod presenter;

pub use client::types::{JobState, JobStatus};
pub use client::{JobStatusClient, JobStatusTransport};
pub use config::{ClientConfig, DownloadConfig, PollerConfig, DEFAULT_POLL_INTERVAL};
pub use download::{DownloadTrigger, FileDownloader};
pub use error::ExportJobError;
pub use notifier::{CompletionNotifier, DialogDisposition, Navigator, Toast, ToastLevel};
pub use poller::{wait_for_outcome, ExportJobPoller, PollEvent, PollOutcome, PollerState};
pub use presenter::{present, StatusIcon, StatusView};
