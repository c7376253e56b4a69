use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    thread::{self, JoinHandle},
};

use _model::{ResultSet, SearchParams};
use tracing::{info, warn};

use crate::{
    error::SearchError,
    progress::Progress,
    search::{FeatureSource, Geocoder, SearchPipeline},
    session::Session,
};

/// Snapshot of a background search, as handed to a polling front end.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JobStatus {
    pub is_running: bool,
    pub progress: f64,
    pub message: String,
    pub error: Option<String>,
    pub total_found: usize,
}

#[derive(Clone)]
struct SharedStatus(Arc<Mutex<JobStatus>>);

impl SharedStatus {
    fn lock(&self) -> MutexGuard<'_, JobStatus> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Progress for SharedStatus {
    fn report(&mut self, percent: f64, message: &str) {
        let mut status = self.lock();
        status.progress = percent;
        status.message = message.to_string();
    }
}

/// Runs the search pipeline on a worker thread, one job at a time.
///
/// The worker fills a private buffer; the session only sees the results when
/// [`SearchJobs::poll`] finds the job finished and commits them in one step.
pub struct SearchJobs<G, F> {
    pipeline: Arc<SearchPipeline<G, F>>,
    status: SharedStatus,
    running: Option<JoinHandle<Result<ResultSet, SearchError>>>,
}

impl<G, F> SearchJobs<G, F>
where
    G: Geocoder + Send + Sync + 'static,
    F: FeatureSource + Send + Sync + 'static,
{
    pub fn new(pipeline: SearchPipeline<G, F>) -> Self {
        SearchJobs {
            pipeline: Arc::new(pipeline),
            status: SharedStatus(Arc::new(Mutex::new(JobStatus::default()))),
            running: None,
        }
    }

    pub fn start(&mut self, params: SearchParams) -> Result<(), SearchError> {
        if self.running.is_some() {
            return Err(SearchError::SearchInProgress);
        }

        *self.status.lock() = JobStatus {
            is_running: true,
            message: "Starting search...".to_string(),
            ..JobStatus::default()
        };
        info!(establishment_type = %params.establishment_type, location = %params.location, "starting background search");

        let pipeline = Arc::clone(&self.pipeline);
        let mut progress = self.status.clone();
        self.running = Some(thread::spawn(move || {
            let results = pipeline.search(&params, &mut progress)?;
            Ok(ResultSet { params, results })
        }));

        Ok(())
    }

    /// Current status. If the worker has finished, its outcome is folded in
    /// first and, on success, committed to `session`.
    pub fn poll(&mut self, session: &mut Session) -> JobStatus {
        if let Some(handle) = self.running.take_if(|x| x.is_finished()) {
            let outcome = handle.join();
            let mut status = self.status.lock();
            status.is_running = false;

            match outcome {
                Ok(Ok(set)) => {
                    status.progress = 100.0;
                    status.total_found = set.results.len();
                    status.message = format!("Search finished: {} results", set.results.len());
                    session.replace(set);
                }
                Ok(Err(err)) => {
                    warn!(%err, "background search failed");
                    status.progress = 0.0;
                    status.message = format!("Search failed: {err}");
                    status.error = Some(err.to_string());
                }
                Err(_) => {
                    warn!("background search panicked");
                    status.progress = 0.0;
                    status.message = "Search failed".to_string();
                    status.error = Some("search worker panicked".to_string());
                }
            }
        }

        self.status()
    }

    pub fn status(&self) -> JobStatus {
        self.status.lock().clone()
    }
}
