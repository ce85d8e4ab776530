use crate::client::types::{JobState, JobStatus};
use crate::error::ExportJobError;

const BAR_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    Spinner,
    Success,
    Error,
    Neutral,
}

/// Display model for one job status. Pure data, no side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub icon: StatusIcon,
    pub caption: String,
    /// Determinate progress, only while processing.
    pub progress: Option<u8>,
    /// Error text shown verbatim under the caption.
    pub detail: Option<String>,
    pub download_url: Option<String>,
}

impl StatusView {
    /// Invoke `on_download` with the result URL if the view offers a download.
    pub fn click_download(&self, on_download: &dyn Fn(&str)) -> bool {
        match self.download_url {
            Some(ref url) => {
                on_download(url);
                true
            }
            None => false,
        }
    }

    /// Single terminal line, e.g. `[####----] 40% Writing rows`.
    pub fn render_line(&self) -> String {
        let marker = match self.icon {
            StatusIcon::Spinner => "…",
            StatusIcon::Success => "✔",
            StatusIcon::Error => "✘",
            StatusIcon::Neutral => "•",
        };

        let mut line = match self.progress {
            Some(percent) => {
                let filled = percent as usize * BAR_WIDTH / 100;
                format!(
                    "{} [{}{}] {:>3}% {}",
                    marker,
                    "#".repeat(filled),
                    "-".repeat(BAR_WIDTH - filled),
                    percent,
                    self.caption
                )
            }
            None => format!("{} {}", marker, self.caption),
        };

        if let Some(ref detail) = self.detail {
            line.push_str(": ");
            line.push_str(detail);
        }
        if let Some(ref url) = self.download_url {
            line.push_str(" (");
            line.push_str(url);
            line.push(')');
        }
        line
    }
}

/// Map a job status (or its absence) to what the user sees.
///
/// An unrecognized state is an error rather than a blank view.
pub fn present(status: Option<&JobStatus>) -> Result<StatusView, ExportJobError> {
    let status = match status {
        Some(status) => status,
        None => {
            return Ok(StatusView {
                icon: StatusIcon::Spinner,
                caption: "Preparing export...".to_string(),
                progress: None,
                detail: None,
                download_url: None,
            })
        }
    };

    let view = match status.status {
        JobState::Pending => StatusView {
            icon: StatusIcon::Spinner,
            caption: "Waiting to start...".to_string(),
            progress: None,
            detail: None,
            download_url: None,
        },
        JobState::Processing => StatusView {
            icon: StatusIcon::Spinner,
            caption: status
                .progress_message
                .clone()
                .unwrap_or_else(|| "Processing...".to_string()),
            progress: Some(status.percent()),
            detail: None,
            download_url: None,
        },
        JobState::Completed => StatusView {
            icon: StatusIcon::Success,
            caption: "Export completed".to_string(),
            progress: None,
            detail: None,
            download_url: status.result_url.clone(),
        },
        JobState::Failed => StatusView {
            icon: StatusIcon::Error,
            caption: "Export failed".to_string(),
            progress: None,
            detail: status.error.clone(),
            download_url: None,
        },
        JobState::Cancelled => StatusView {
            icon: StatusIcon::Neutral,
            caption: "Export cancelled".to_string(),
            progress: None,
            detail: None,
            download_url: None,
        },
        JobState::Other(ref raw) => return Err(ExportJobError::UnrecognizedStatus(raw.clone())),
    };

    Ok(view)
}
