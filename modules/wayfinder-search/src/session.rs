//! Per-user search lifecycle: `Idle → Loading → {Success, Failure} → Loading → …`.
//!
//! Overlapping searches are resolved with a generation counter. Every
//! `start_search` bumps the generation under the state channel's write lock,
//! and a finished pipeline publishes only if its generation is still current.
//! A superseded request runs to completion but its result is dropped, so it
//! can never overwrite a newer search.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info_span, warn, Instrument};
use wayfinder_core::ContentEntry;

use crate::error::SearchError;
use crate::pipeline::SearchPipeline;

#[derive(Debug, Clone, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Success(Vec<ContentEntry>),
    Failure(SearchError),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Current results; empty unless the last search succeeded.
    pub fn results(&self) -> &[ContentEntry] {
        match self {
            Self::Success(results) => results,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&SearchError> {
        match self {
            Self::Failure(err) => Some(err),
            _ => None,
        }
    }
}

/// Caller-facing snapshot of the session.
#[derive(Debug, Clone, Default)]
pub struct SearchView {
    pub results: Vec<ContentEntry>,
    pub loading: bool,
    pub error: Option<SearchError>,
}

impl From<&RequestState> for SearchView {
    fn from(state: &RequestState) -> Self {
        Self {
            results: state.results().to_vec(),
            loading: state.is_loading(),
            error: state.error().cloned(),
        }
    }
}

struct Shared {
    state: watch::Sender<RequestState>,
    generation: AtomicU64,
}

#[derive(Clone)]
pub struct SearchSession {
    pipeline: Arc<SearchPipeline>,
    shared: Arc<Shared>,
}

impl SearchSession {
    pub fn new(pipeline: Arc<SearchPipeline>) -> Self {
        let (state, _) = watch::channel(RequestState::Idle);
        Self {
            pipeline,
            shared: Arc::new(Shared {
                state,
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Switch to `Loading` and run the pipeline in the background.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_search(&self, term: impl Into<String>) -> JoinHandle<()> {
        let term = term.into();

        let mut generation = 0;
        self.shared.state.send_modify(|state| {
            generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = RequestState::Loading;
        });

        let pipeline = self.pipeline.clone();
        let shared = self.shared.clone();
        let span = info_span!("search", generation);

        tokio::spawn(
            async move {
                let next = match pipeline.run(&term).await {
                    Ok(results) => RequestState::Success(results),
                    Err(err) => {
                        warn!(error = %err, "Search failed");
                        RequestState::Failure(err)
                    }
                };
                shared.publish(generation, next);
            }
            .instrument(span),
        )
    }

    /// Fire-and-forget; observe the outcome through [`view`](Self::view) or
    /// [`subscribe`](Self::subscribe).
    pub fn process_search(&self, term: impl Into<String>) {
        drop(self.start_search(term));
    }

    /// Start a search and wait for it to settle.
    ///
    /// If another search starts meanwhile, the returned view is that newer
    /// search's state.
    pub async fn search(&self, term: impl Into<String>) -> SearchView {
        if let Err(err) = self.start_search(term).await {
            warn!(error = %err, "Search task did not complete");
        }
        self.view()
    }

    pub fn state(&self) -> RequestState {
        self.shared.state.borrow().clone()
    }

    pub fn view(&self) -> SearchView {
        SearchView::from(&*self.shared.state.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.shared.state.subscribe()
    }

    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::SeqCst)
    }
}

impl Shared {
    fn publish(&self, generation: u64, next: RequestState) {
        self.state.send_if_modified(|state| {
            let current = self.generation.load(Ordering::SeqCst);
            if current != generation {
                debug!(generation, current, "Dropping result of superseded search");
                return false;
            }
            *state = next;
            true
        });
    }
}
