use crate::error::ExportJobError;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

const FALLBACK_FILENAME: &str = "export";

/// Saves a finished export somewhere the user can open it.
#[async_trait]
pub trait DownloadTrigger: Send + Sync {
    /// Download `url`, saved under `filename` when given. Returns where it landed.
    async fn download(&self, url: &str, filename: Option<&str>) -> Result<PathBuf, ExportJobError>;
}

/// Downloads result files into a local directory.
///
/// The result URL is assumed to be directly fetchable: no auth headers are
/// attached.
pub struct FileDownloader {
    download_dir: PathBuf,
    http_client: reqwest::Client,
}

impl FileDownloader {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl DownloadTrigger for FileDownloader {
    async fn download(&self, url: &str, filename: Option<&str>) -> Result<PathBuf, ExportJobError> {
        let name = resolve_filename(url, filename)?;

        tokio::fs::create_dir_all(&self.download_dir).await?;
        let target = self.download_dir.join(&name);
        let partial = self.download_dir.join(format!("{}.part", name));

        tracing::info!(%url, target = %target.display(), "downloading export result");

        let mut response = self.http_client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ExportJobError::HttpStatus(response.status().as_u16()));
        }

        let mut file = tokio::fs::File::create(&partial).await?;
        let mut written: u64 = 0;
        let copied = async {
            while let Some(chunk) = response.chunk().await? {
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            file.flush().await?;
            Ok::<(), ExportJobError>(())
        }
        .await;

        if let Err(e) = copied {
            drop(file);
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
        drop(file);

        tokio::fs::rename(&partial, &target).await?;
        tracing::debug!(bytes = written, target = %target.display(), "export result saved");
        Ok(target)
    }
}

/// Pick the on-disk name: the explicit one, else the last URL path segment.
pub fn resolve_filename(url: &str, filename: Option<&str>) -> Result<String, ExportJobError> {
    let name = match filename {
        Some(name) => name.to_string(),
        None => filename_from_url(url)?,
    };

    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
    {
        return Err(ExportJobError::InvalidFilename(name));
    }
    Ok(name)
}

fn filename_from_url(url: &str) -> Result<String, ExportJobError> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| ExportJobError::InvalidUrl(format!("{}: {}", url, e)))?;

    let segment = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .map(|s| s.to_string());

    Ok(segment.unwrap_or_else(|| FALLBACK_FILENAME.to_string()))
}
