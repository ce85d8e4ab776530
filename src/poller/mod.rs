
use crate::client::types::{JobState, JobStatus};
use crate::client::JobStatusTransport;
use crate::config::PollerConfig;
use crate::error::ExportJobError;
use crate::notifier::Toast;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;

/// Message reported when the status endpoint cannot be reached or decoded.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Failed to check export status";

/// Message reported for a failed job that carries no error text.
pub const JOB_FAILURE_MESSAGE: &str = "Export failed";

/// Message reported when a job completes but names no result to fetch.
pub const MISSING_RESULT_MESSAGE: &str = "Export completed without a result";

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// How a polling session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Completed { job_id: String, result_url: String },
    Failed { job_id: String, message: String },
    Cancelled { job_id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    Status(JobStatus),
    Toast(Toast),
    /// Sent at most once per session.
    Finished(PollOutcome),
}

/// Snapshot of the poller's own state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollerState {
    pub active_job_id: Option<String>,
    pub last_known_status: Option<JobStatus>,
    pub is_polling: bool,
}

struct Shared {
    state: PollerState,
    session: u64,
    last_applied_seq: u64,
    token: Option<CancellationToken>,
}

#[derive(Clone)]
struct SessionContext {
    transport: Arc<dyn JobStatusTransport>,
    shared: Arc<Mutex<Shared>>,
    events: broadcast::Sender<PollEvent>,
    token: CancellationToken,
    job_id: String,
    session: u64,
    period: Duration,
}

/// Polls one export job at a time until it reaches a terminal state.
pub struct ExportJobPoller {
    transport: Arc<dyn JobStatusTransport>,
    default_job_id: Option<String>,
    period: Duration,
    shared: Arc<Mutex<Shared>>,
    events: broadcast::Sender<PollEvent>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ExportJobPoller {
    pub fn new(
        transport: Arc<dyn JobStatusTransport>,
        config: PollerConfig,
        default_job_id: Option<String>,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            transport,
            default_job_id,
            period: config.interval.max(MIN_INTERVAL),
            shared: Arc::new(Mutex::new(Shared {
                state: PollerState::default(),
                session: 0,
                last_applied_seq: 0,
                token: None,
            })),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PollEvent> {
        self.events.subscribe()
    }

    /// Begin polling `job_id`, or the id given at construction.
    ///
    /// Any session already running is replaced. The status is seeded with a
    /// synthetic `PENDING` document before this returns.
    pub fn start_polling(&self, job_id: Option<&str>) -> Result<(), ExportJobError> {
        let job_id = job_id
            .map(str::to_string)
            .or_else(|| self.default_job_id.clone())
            .ok_or(ExportJobError::MissingJobId)?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ExportJobError::NoRuntime)?;

        let token = CancellationToken::new();
        let seed = JobStatus::pending_seed(job_id.clone());

        let session = {
            let mut shared = lock(&self.shared);
            if let Some(previous) = shared.token.take() {
                previous.cancel();
            }
            shared.session += 1;
            shared.last_applied_seq = 0;
            shared.token = Some(token.clone());
            shared.state = PollerState {
                active_job_id: Some(job_id.clone()),
                last_known_status: Some(seed.clone()),
                is_polling: true,
            };
            let _ = self.events.send(PollEvent::Status(seed));
            shared.session
        };

        tracing::info!(%job_id, session, interval_ms = self.period.as_millis() as u64, "started polling export job");

        let context = SessionContext {
            transport: self.transport.clone(),
            shared: self.shared.clone(),
            events: self.events.clone(),
            token,
            job_id,
            session,
            period: self.period,
        };
        runtime.spawn(run_session(context));
        Ok(())
    }

    /// Stop the current session. Responses still in flight are discarded.
    pub fn stop_polling(&self) {
        let mut shared = lock(&self.shared);
        if let Some(token) = shared.token.take() {
            token.cancel();
        }
        if shared.state.is_polling {
            shared.state.is_polling = false;
            tracing::debug!(job_id = ?shared.state.active_job_id, "stopped polling export job");
        }
    }

    pub fn is_polling(&self) -> bool {
        lock(&self.shared).state.is_polling
    }

    pub fn status(&self) -> Option<JobStatus> {
        lock(&self.shared).state.last_known_status.clone()
    }

    pub fn active_job_id(&self) -> Option<String> {
        lock(&self.shared).state.active_job_id.clone()
    }

    pub fn state(&self) -> PollerState {
        lock(&self.shared).state.clone()
    }

    pub fn interval(&self) -> Duration {
        self.period
    }
}

impl Drop for ExportJobPoller {
    fn drop(&mut self) {
        if let Some(token) = lock(&self.shared).token.take() {
            token.cancel();
        }
    }
}

/// Wait for the next `Finished` event. `None` once the poller is gone.
pub async fn wait_for_outcome(events: &mut broadcast::Receiver<PollEvent>) -> Option<PollOutcome> {
    loop {
        match events.recv().await {
            Ok(PollEvent::Finished(outcome)) => return Some(outcome),
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "poll event subscriber lagged");
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

/// Timer loop for one session. Ticks are not serialized behind responses;
/// ordering is restored by sequence numbers in `apply_response`.
async fn run_session(context: SessionContext) {
    let mut ticker = interval(context.period);
    let mut seq: u64 = 0;

    loop {
        tokio::select! {
            _ = context.token.cancelled() => {
                break;
            }
            _ = ticker.tick() => {
                seq += 1;
                // in-flight requests are bounded by the transport's own timeout
                tokio::spawn(poll_once(context.clone(), seq));
            }
        }
    }

    tracing::debug!(job_id = %context.job_id, session = context.session, ticks = seq, "polling session ended");
}

async fn poll_once(context: SessionContext, seq: u64) {
    let result = tokio::select! {
        _ = context.token.cancelled() => {
            tracing::debug!(job_id = %context.job_id, seq, "abandoned in-flight status request");
            return;
        }
        result = context.transport.fetch_job_status(&context.job_id) => result,
    };

    apply_response(&context, seq, result);
}

fn apply_response(context: &SessionContext, seq: u64, result: Result<JobStatus, ExportJobError>) {
    let mut shared = lock(&context.shared);

    if shared.session != context.session || !shared.state.is_polling {
        tracing::debug!(job_id = %context.job_id, seq, "discarding response for stopped session");
        return;
    }
    if seq <= shared.last_applied_seq {
        tracing::debug!(job_id = %context.job_id, seq, last = shared.last_applied_seq, "discarding stale response");
        return;
    }
    shared.last_applied_seq = seq;

    let status = match result {
        Ok(status) => status,
        Err(e) => {
            tracing::warn!(job_id = %context.job_id, error = %e, "export status request failed");
            finish(&mut shared, context);
            let _ = context.events.send(PollEvent::Finished(PollOutcome::Failed {
                job_id: context.job_id.clone(),
                message: TRANSPORT_FAILURE_MESSAGE.to_string(),
            }));
            return;
        }
    };

    if status.status.is_terminal() {
        finish(&mut shared, context);
    }
    shared.state.last_known_status = Some(status.clone());
    let _ = context.events.send(PollEvent::Status(status.clone()));

    let job_id = context.job_id.clone();
    match status.status {
        JobState::Completed => match status.result_url {
            Some(result_url) => {
                tracing::info!(%job_id, %result_url, "export job completed");
                let _ = context.events.send(PollEvent::Finished(PollOutcome::Completed { job_id, result_url }));
            }
            None => {
                tracing::warn!(%job_id, "export job completed without a result url");
                let message = MISSING_RESULT_MESSAGE.to_string();
                let _ = context.events.send(PollEvent::Toast(Toast::error(message.clone())));
                let _ = context.events.send(PollEvent::Finished(PollOutcome::Failed { job_id, message }));
            }
        },
        JobState::Failed => {
            let message = status.error.unwrap_or_else(|| JOB_FAILURE_MESSAGE.to_string());
            tracing::warn!(%job_id, %message, "export job failed");
            let _ = context.events.send(PollEvent::Toast(Toast::error(message.clone())));
            let _ = context.events.send(PollEvent::Finished(PollOutcome::Failed { job_id, message }));
        }
        JobState::Cancelled => {
            tracing::info!(%job_id, "export job cancelled");
            let _ = context.events.send(PollEvent::Toast(Toast::info("Export was cancelled")));
            let _ = context.events.send(PollEvent::Finished(PollOutcome::Cancelled { job_id }));
        }
        JobState::Other(ref raw) => {
            tracing::warn!(%job_id, status = %raw, "unrecognized export job status");
        }
        JobState::Pending | JobState::Processing => {}
    }
}

fn finish(shared: &mut Shared, context: &SessionContext) {
    shared.state.is_polling = false;
    if let Some(token) = shared.token.take() {
        token.cancel();
    }
    context.token.cancel();
}
