use anyhow::{bail, Context};
use export_job_poller::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Prints where the export can be found again instead of routing a UI.
struct TerminalNavigator {
    base_url: String,
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, path: &str) {
        println!("Exports are listed at {}{}", self.base_url.trim_end_matches('/'), path);
    }
}

struct Settings {
    client: ClientConfig,
    poller: PollerConfig,
    download: DownloadConfig,
}

fn load_settings() -> anyhow::Result<Settings> {
    let mut client = ClientConfig::default();
    if let Ok(base_url) = std::env::var("EXPORT_API_BASE_URL") {
        client.base_url = base_url;
    }
    client.bearer_token = std::env::var("EXPORT_API_TOKEN").ok();

    let mut poller = PollerConfig::default();
    if let Ok(ms) = std::env::var("EXPORT_POLL_INTERVAL_MS") {
        let ms: u64 = ms.parse().context("EXPORT_POLL_INTERVAL_MS must be a number")?;
        poller.interval = Duration::from_millis(ms);
    }

    let mut download = DownloadConfig::default();
    if let Ok(dir) = std::env::var("EXPORT_DOWNLOAD_DIR") {
        download.download_dir = PathBuf::from(dir);
    }
    if let Ok(path) = std::env::var("EXPORT_LISTING_PATH") {
        download.listing_path = path;
    }

    Ok(Settings { client, poller, download })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "export_job_poller=info,export_watch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args = std::env::args().skip(1);
    let job_id = match args.next() {
        Some(id) => id,
        None => bail!("usage: export-watch <JOB_ID> [FILENAME]"),
    };
    let filename = args.next();

    let settings = load_settings()?;
    let navigator = TerminalNavigator { base_url: settings.client.base_url.clone() };
    let transport = Arc::new(JobStatusClient::new(settings.client)?);
    let downloader = FileDownloader::new(settings.download.download_dir.clone());

    let poller = ExportJobPoller::new(transport, settings.poller, Some(job_id));
    let mut events = poller.subscribe();
    poller.start_polling(None)?;

    loop {
        let event = tokio::select! {
            event = events.recv() => event,
            _ = tokio::signal::ctrl_c() => {
                poller.stop_polling();
                bail!("interrupted");
            }
        };

        match event {
            Ok(PollEvent::Status(status)) => match present(Some(&status)) {
                Ok(view) => println!("{}", view.render_line()),
                Err(e) => tracing::warn!(error = %e, "cannot display export status"),
            },
            Ok(PollEvent::Toast(toast)) => match toast.level {
                ToastLevel::Error => eprintln!("error: {}", toast.message),
                ToastLevel::Info => println!("{}", toast.message),
            },
            Ok(PollEvent::Finished(PollOutcome::Completed { result_url, .. })) => {
                let dialog = CompletionNotifier::new(result_url, filename, settings.download.listing_path.clone());
                if let Some(view) = dialog.view(true) {
                    println!("{}: {}", view.title, view.body);
                }
                let (path, _) = dialog.download_now(&downloader).await?;
                println!("Saved {}", path.display());
                dialog.go_to_listing(&navigator);
                return Ok(());
            }
            Ok(PollEvent::Finished(PollOutcome::Failed { message, .. })) => bail!("export failed: {}", message),
            Ok(PollEvent::Finished(PollOutcome::Cancelled { job_id })) => bail!("export {} was cancelled", job_id),
            Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "missed export status updates"),
            Err(RecvError::Closed) => bail!("poller stopped unexpectedly"),
        }
    }
}
