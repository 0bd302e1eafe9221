//! Single background worker that performs network fetches one at a time.
//!
//! Jobs queue behind the in-flight one. Every job gets exactly one reply.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::{
    api::WeatherApi,
    error::FetchError,
    model::{Coordinates, ForecastRange},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FetchRequest {
    Current(Coordinates),
    Forecast(Coordinates, ForecastRange),
}

#[derive(Debug)]
struct Job {
    request: FetchRequest,
    cancel: CancellationToken,
    reply: oneshot::Sender<Result<String, FetchError>>,
}

/// Cheap, cloneable handle to the worker. The worker exits once every handle is dropped.
#[derive(Debug, Clone)]
pub struct FetchHandle {
    jobs: mpsc::UnboundedSender<Job>,
}

impl FetchHandle {
    /// Spawn the worker on the current tokio runtime.
    pub fn spawn(api: Arc<dyn WeatherApi>) -> Self {
        let (jobs, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(api, rx));
        Self { jobs }
    }

    /// Queue `request` and wait for its result. A cancelled `cancel` token
    /// skips the job if still queued and abandons it if in flight.
    pub async fn fetch(
        &self,
        request: FetchRequest,
        cancel: &CancellationToken,
    ) -> Result<String, FetchError> {
        let (reply, rx) = oneshot::channel();
        let job = Job {
            request,
            cancel: cancel.clone(),
            reply,
        };

        self.jobs.send(job).map_err(|_| FetchError::WorkerGone)?;
        rx.await.map_err(|_| FetchError::WorkerGone)?
    }
}

async fn run(api: Arc<dyn WeatherApi>, mut rx: mpsc::UnboundedReceiver<Job>) {
    while let Some(job) = rx.recv().await {
        if job.cancel.is_cancelled() {
            tracing::debug!(?job.request, "skipping cancelled fetch");
            let _ = job.reply.send(Err(FetchError::Cancelled));
            continue;
        }

        let result = tokio::select! {
            biased;
            _ = job.cancel.cancelled() => Err(FetchError::Cancelled),
            r = perform(api.as_ref(), job.request) => r,
        };

        // Receiver gone means the caller stopped waiting; nothing to deliver to.
        let _ = job.reply.send(result);
    }

    tracing::debug!("fetch worker stopped");
}

async fn perform(api: &dyn WeatherApi, request: FetchRequest) -> Result<String, FetchError> {
    match request {
        FetchRequest::Current(at) => api.fetch_current(at).await,
        FetchRequest::Forecast(at, range) => api.fetch_forecast(at, range).await,
    }
}
