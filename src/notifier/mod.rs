//! Completion dialog and one-shot toast notifications.

use crate::download::DownloadTrigger;
use crate::error::ExportJobError;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Error,
}

/// Transient user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: ToastLevel::Info, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: ToastLevel::Error, message: message.into() }
    }
}

/// Client-side route transitions.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// What the caller should do with the dialog after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogDisposition {
    StayOpen,
    Close,
}

/// Render model of the completion dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionDialogView {
    pub title: String,
    pub body: String,
    pub download_label: String,
    pub listing_label: String,
}

/// Dialog offered once an export finishes.
///
/// Open/closed state belongs to the caller; this only renders and performs
/// the two actions.
#[derive(Debug, Clone)]
pub struct CompletionNotifier {
    result_url: String,
    filename: Option<String>,
    listing_path: String,
}

impl CompletionNotifier {
    pub fn new(result_url: impl Into<String>, filename: Option<String>, listing_path: impl Into<String>) -> Self {
        Self {
            result_url: result_url.into(),
            filename,
            listing_path: listing_path.into(),
        }
    }

    pub fn view(&self, open: bool) -> Option<CompletionDialogView> {
        if !open {
            return None;
        }
        let body = match self.filename {
            Some(ref name) => format!("{} is ready. Download it now or find it later in the export list.", name),
            None => "Your export is ready. Download it now or find it later in the export list.".to_string(),
        };
        Some(CompletionDialogView {
            title: "Export completed".to_string(),
            body,
            download_label: "Download now".to_string(),
            listing_label: "Go to export list".to_string(),
        })
    }

    /// Download the result. The dialog stays open so the user can still navigate.
    pub async fn download_now(
        &self,
        trigger: &dyn DownloadTrigger,
    ) -> Result<(PathBuf, DialogDisposition), ExportJobError> {
        let path = trigger.download(&self.result_url, self.filename.as_deref()).await?;
        Ok((path, DialogDisposition::StayOpen))
    }

    pub fn go_to_listing(&self, navigator: &dyn Navigator) -> DialogDisposition {
        tracing::debug!(path = %self.listing_path, "navigating to export listing");
        navigator.navigate(&self.listing_path);
        DialogDisposition::Close
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNavigator {
        visited: Mutex<Vec<String>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, path: &str) {
            self.visited.lock().unwrap().push(path.to_string());
        }
    }

    #[derive(Default)]
    struct RecordingTrigger {
        calls: Mutex<Vec<(String, Option<String>)>>,
    }

    #[async_trait]
    impl DownloadTrigger for RecordingTrigger {
        async fn download(&self, url: &str, filename: Option<&str>) -> Result<PathBuf, ExportJobError> {
            self.calls.lock().unwrap().push((url.to_string(), filename.map(String::from)));
            Ok(PathBuf::from("/tmp").join(filename.unwrap_or("export")))
        }
    }

    fn notifier() -> CompletionNotifier {
        CompletionNotifier::new("https://x/y.file", Some("report.xlsx".to_string()), "/exports")
    }

    #[test]
    fn test_closed_dialog_renders_nothing() {
        assert!(notifier().view(false).is_none());
    }

    #[test]
    fn test_open_dialog_mentions_filename() {
        let view = notifier().view(true).expect("dialog should render");
        assert_eq!(view.title, "Export completed");
        assert!(view.body.contains("report.xlsx"));
    }

    #[tokio::test]
    async fn test_download_now_keeps_dialog_open() {
        let trigger = RecordingTrigger::default();
        let (path, disposition) = notifier().download_now(&trigger).await.unwrap();

        assert_eq!(disposition, DialogDisposition::StayOpen);
        assert_eq!(path, PathBuf::from("/tmp/report.xlsx"));
        let calls = trigger.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], ("https://x/y.file".to_string(), Some("report.xlsx".to_string())));
    }

    #[test]
    fn test_go_to_listing_closes_dialog() {
        let navigator = RecordingNavigator::default();
        let disposition = notifier().go_to_listing(&navigator);

        assert_eq!(disposition, DialogDisposition::Close);
        assert_eq!(*navigator.visited.lock().unwrap(), vec!["/exports".to_string()]);
    }

    #[test]
    fn test_toast_constructors() {
        assert_eq!(Toast::error("disk full").level, ToastLevel::Error);
        assert_eq!(Toast::info("x").message, "x");
    }
}
