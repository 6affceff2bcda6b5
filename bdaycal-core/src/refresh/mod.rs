//! The refresh pipeline: fetch, parse, compute, project, publish.
//!
//! [`RefreshOrchestrator`] owns the one shared [`CachedResult`]. A pass either
//! swaps in a completely new result or leaves the previous one alone, so
//! readers only ever see whole results.

mod cache;
mod state;

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use parking_lot::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::contact::parse_contacts;
use crate::credentials::Credentials;
use crate::error::{BdayCalError, BdayCalResult};
use crate::source::AddressBook;

pub use cache::{CachedResult, RefreshOptions};
pub use state::{Diagnostics, FailureInfo, RefreshState};

/// A refresh that arrived while another pass was running.
struct RefreshRequest {
    credentials: Credentials,
    reference_date: NaiveDate,
    options: RefreshOptions,
}

#[derive(Default)]
struct Slot {
    in_flight: bool,
    /// Depth one: a newer request replaces an older one
    pending: Option<RefreshRequest>,
}

/// Clears the in-flight flag if a pass is dropped mid-way.
struct InFlightGuard<'a> {
    slot: &'a Mutex<Slot>,
    armed: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut slot = self.slot.lock();
            slot.in_flight = false;
            slot.pending = None;
        }
    }
}

pub struct RefreshOrchestrator<B> {
    source: B,
    credentials: Credentials,
    options: RefreshOptions,
    cache: RwLock<Option<Arc<CachedResult>>>,
    state: Mutex<RefreshState>,
    diagnostics: Mutex<Diagnostics>,
    slot: Mutex<Slot>,
    shutdown: CancellationToken,
}

impl<B: AddressBook> RefreshOrchestrator<B> {
    pub fn new(source: B, credentials: Credentials, options: RefreshOptions) -> Self {
        RefreshOrchestrator {
            source,
            credentials,
            options,
            cache: RwLock::new(None),
            state: Mutex::new(RefreshState::Idle),
            diagnostics: Mutex::new(Diagnostics::default()),
            slot: Mutex::new(Slot::default()),
            shutdown: CancellationToken::new(),
        }
    }

    /// One scheduled attempt with the configured credentials and options.
    pub async fn tick(&self, reference_date: NaiveDate) -> BdayCalResult<Arc<CachedResult>> {
        self.refresh(self.credentials.clone(), reference_date, self.options.clone())
            .await
    }

    /// Run one pass. While another pass is in flight the request is parked
    /// and `RefreshInProgress` is returned; the running pass picks it up
    /// before it finishes and returns the outcome of the last pass it ran.
    #[instrument(skip_all, fields(reference_date = %reference_date))]
    pub async fn refresh(
        &self,
        credentials: Credentials,
        reference_date: NaiveDate,
        options: RefreshOptions,
    ) -> BdayCalResult<Arc<CachedResult>> {
        if self.shutdown.is_cancelled() {
            return Err(BdayCalError::Cancelled);
        }

        let mut request = RefreshRequest {
            credentials,
            reference_date,
            options,
        };

        {
            let mut slot = self.slot.lock();
            if slot.in_flight {
                debug!("Refresh already running, parking request");
                slot.pending = Some(request);
                return Err(BdayCalError::RefreshInProgress);
            }
            slot.in_flight = true;
        }

        let mut guard = InFlightGuard {
            slot: &self.slot,
            armed: true,
        };

        loop {
            let result = self.run_pass(&request).await;

            if matches!(result, Err(BdayCalError::Cancelled)) {
                return result;
            }

            let next = {
                let mut slot = self.slot.lock();
                let next = slot.pending.take();
                if next.is_none() {
                    slot.in_flight = false;
                }
                next
            };

            match next {
                Some(next) => {
                    debug!(reference_date = %next.reference_date, "Running parked refresh");
                    request = next;
                }
                None => {
                    guard.armed = false;
                    return result;
                }
            }
        }
    }

    async fn run_pass(&self, request: &RefreshRequest) -> BdayCalResult<Arc<CachedResult>> {
        self.set_state(RefreshState::Fetching);
        self.diagnostics.lock().record_attempt(Utc::now());

        let fetched = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Err(BdayCalError::Cancelled),
            result = self.source.fetch(request.credentials.clone(), request.options.timeout) => result,
        };

        let contacts = match fetched {
            Ok(contacts) => contacts,
            Err(err) => {
                self.fail(&err);
                return Err(err);
            }
        };

        self.set_state(RefreshState::Parsing);
        let report = parse_contacts(&contacts);
        drop(contacts);

        self.set_state(RefreshState::Computing);
        let now = Utc::now();
        let result = Arc::new(CachedResult::build(
            &report.entries,
            request.reference_date,
            &request.options,
            now,
        ));

        *self.cache.write() = Some(Arc::clone(&result));
        self.diagnostics.lock().record_success(now);
        self.set_state(RefreshState::Ready);

        info!(
            contacts = report.contacts_with_dates,
            skipped = report.skipped.len(),
            tracked = result.tracked_count,
            upcoming = result.total_count,
            "Refresh complete"
        );

        Ok(result)
    }

    fn fail(&self, err: &BdayCalError) {
        if matches!(err, BdayCalError::Cancelled) {
            info!("Refresh cancelled, keeping previous result");
            self.set_state(RefreshState::Idle);
            return;
        }

        self.set_state(RefreshState::Failed);
        let failures = {
            let mut diagnostics = self.diagnostics.lock();
            diagnostics.record_failure(err, Utc::now());
            diagnostics.consecutive_failures
        };

        if err.is_configuration_problem() {
            error!(error = %err, failures, "Refresh failed, check account settings");
        } else {
            warn!(error = %err, failures, "Refresh failed, serving previous result");
        }

        self.set_state(RefreshState::Idle);
    }

    fn set_state(&self, state: RefreshState) {
        *self.state.lock() = state;
    }

    /// The last successful result, if any.
    pub fn snapshot(&self) -> Option<Arc<CachedResult>> {
        self.cache.read().clone()
    }

    pub fn state(&self) -> RefreshState {
        *self.state.lock()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics.lock().clone()
    }

    /// Cancel any in-flight fetch and refuse later refreshes.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}
