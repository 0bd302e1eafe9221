//! Per-screen refresh state.
//!
//! A screen runs at most one refresh at a time; a second request while one is
//! in flight is ignored. Closing or dropping the screen cancels whatever is in
//! flight, and a cancelled refresh never touches the published state.

use std::{
    marker::PhantomData,
    sync::atomic::{AtomicBool, Ordering},
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::{
    error::PipelineError,
    pipeline::{CurrentFeed, Feed, ForecastFeed, RefreshError, Source, WeatherPipeline},
};

#[derive(Debug, Clone, PartialEq)]
pub enum ScreenState<T> {
    Loading,
    Ready { data: T, source: Source },
    Error(PipelineError),
}

impl<T> ScreenState<T> {
    /// Whether the last refresh took the offline path.
    pub fn is_offline(&self) -> bool {
        matches!(
            self,
            ScreenState::Ready {
                source: Source::Cache,
                ..
            } | ScreenState::Error(PipelineError::NoCachedData)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Completed,
    /// Another refresh was already running.
    Ignored,
    Cancelled,
}

pub type CurrentWeatherScreen = Screen<CurrentFeed>;
pub type ForecastScreen = Screen<ForecastFeed>;

#[derive(Debug)]
pub struct Screen<F: Feed> {
    pipeline: WeatherPipeline,
    state: watch::Sender<ScreenState<F::Model>>,
    in_flight: AtomicBool,
    cancel: CancellationToken,
    _feed: PhantomData<F>,
}

impl<F: Feed> Screen<F> {
    pub fn new(pipeline: WeatherPipeline) -> Self {
        let (state, _) = watch::channel(ScreenState::Loading);
        Self {
            pipeline,
            state,
            in_flight: AtomicBool::new(false),
            cancel: CancellationToken::new(),
            _feed: PhantomData,
        }
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<ScreenState<F::Model>> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ScreenState<F::Model> {
        self.state.borrow().clone()
    }

    pub async fn refresh(&self) -> RefreshOutcome {
        if self.cancel.is_cancelled() {
            return RefreshOutcome::Cancelled;
        }

        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            tracing::debug!("refresh already in flight, ignoring");
            return RefreshOutcome::Ignored;
        };

        self.state.send_replace(ScreenState::Loading);

        let next = match self.pipeline.refresh::<F>(&self.cancel).await {
            Ok(loaded) => ScreenState::Ready {
                data: loaded.data,
                source: loaded.source,
            },
            Err(RefreshError::Failed(e)) => ScreenState::Error(e),
            Err(RefreshError::Cancelled) => return RefreshOutcome::Cancelled,
        };

        if self.cancel.is_cancelled() {
            return RefreshOutcome::Cancelled;
        }

        self.state.send_replace(next);
        RefreshOutcome::Completed
    }

    /// Tear the screen down. Pending and future refreshes are cancelled.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl<F: Feed> Drop for Screen<F> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
