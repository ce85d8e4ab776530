pub mod types;

use crate::config::ClientConfig;
use crate::error::ExportJobError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use types::JobStatus;

/// Source of job status documents.
///
/// The poller only ever talks to this trait, so tests can script responses
/// without an HTTP server.
#[async_trait]
pub trait JobStatusTransport: Send + Sync {
    async fn fetch_job_status(&self, job_id: &str) -> Result<JobStatus, ExportJobError>;
}

/// HTTP client for the job status endpoint
pub struct JobStatusClient {
    base_url: String,
    status_path: String,
    headers: HeaderMap,
    http_client: reqwest::Client,
}

impl JobStatusClient {
    pub fn new(config: ClientConfig) -> Result<Self, ExportJobError> {
        let mut headers = HeaderMap::new();
        if let Some(ref token) = config.bearer_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ExportJobError::InvalidHeader(format!("Invalid bearer token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }
        for (name, value) in &config.extra_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ExportJobError::InvalidHeader(format!("Invalid header name {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ExportJobError::InvalidHeader(format!("Invalid header value: {}", e)))?;
            headers.insert(name, value);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            status_path: config.status_path.trim_matches('/').to_string(),
            headers,
            http_client: builder.build()?,
        })
    }

    /// URL of the status document for `job_id`
    pub fn status_url(&self, job_id: &str) -> Result<String, ExportJobError> {
        if job_id.is_empty() || job_id.contains('/') {
            return Err(ExportJobError::InvalidUrl(format!("Invalid job id: {:?}", job_id)));
        }
        Ok(format!("{}/{}/{}", self.base_url, self.status_path, job_id))
    }
}

#[async_trait]
impl JobStatusTransport for JobStatusClient {
    async fn fetch_job_status(&self, job_id: &str) -> Result<JobStatus, ExportJobError> {
        let url = self.status_url(job_id)?;
        tracing::debug!(%url, "fetching export job status");

        let response = self.http_client
            .get(&url)
            .headers(self.headers.clone())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ExportJobError::HttpStatus(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
