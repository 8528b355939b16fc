//! The weather lookup state machine.
//!
//! [`WeatherLookup`] owns the single [`LookupState`] value and the injected
//! [`DataSource`]. Every change goes through [`LookupState::transition`], and
//! observers follow along through a `tokio::sync::watch` channel.
//!
//! At most one lookup is outstanding: admission and the move to `Loading`
//! happen in one step on the watch value, so a second `submit` while loading
//! is refused with [`SubmitError::InFlight`] no matter who calls it.

use std::sync::Arc;

use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    error::{ErrorKind, SubmitError},
    model::WeatherReport,
    source::{DataSource, SourceKind},
    state::{Event, Failure, LookupState},
};

#[derive(Debug)]
struct Shared {
    source: Arc<dyn DataSource>,
    state: watch::Sender<LookupState>,
}

/// Cheap-to-clone handle onto one lookup state machine.
#[derive(Debug, Clone)]
pub struct WeatherLookup {
    shared: Arc<Shared>,
}

/// Result of admitting a submission.
enum Admission {
    /// Settled without touching the data source (blank query).
    Settled(LookupState),
    Pending(PendingLookup),
}

/// An admitted lookup that still has to call the data source.
///
/// Dropping it before it finishes cancels the attempt and returns the
/// machine to `Idle`.
struct PendingLookup {
    shared: Arc<Shared>,
    city: String,
    finished: bool,
}

impl PendingLookup {
    async fn run(mut self) -> LookupState {
        let result = self.shared.source.lookup(&self.city).await;

        let event = match result {
            Ok(report) => {
                info!(city = %self.city, name = %report.name, "lookup succeeded");
                Event::Resolved(report)
            }
            Err(err) => {
                // Unknown cities and blank queries are not warnings.
                if err.kind() == ErrorKind::Transport {
                    warn!(city = %self.city, error = %err, "lookup failed");
                } else {
                    info!(city = %self.city, error = %err, "lookup failed");
                }
                Event::Rejected(Failure::from(&err))
            }
        };

        self.finished = true;
        let mut settled = LookupState::Idle;
        self.shared.state.send_modify(|state| {
            *state = std::mem::take(state).transition(event);
            settled = state.clone();
        });
        settled
    }
}

impl Drop for PendingLookup {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        debug!(city = %self.city, "lookup cancelled");
        self.shared.state.send_if_modified(|state| {
            if !state.is_loading() {
                return false;
            }
            *state = std::mem::take(state).transition(Event::Cancelled);
            true
        });
    }
}

impl WeatherLookup {
    /// Machine in `Idle`; nothing is fetched until the first `submit`.
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        let (state, _) = watch::channel(LookupState::Idle);
        Self { shared: Arc::new(Shared { source, state }) }
    }

    /// Machine that immediately starts looking up `default_city`.
    ///
    /// Returns already in `Loading`; the fetch itself runs on a spawned task,
    /// so this must be called from within a tokio runtime.
    pub fn mount(source: Arc<dyn DataSource>, default_city: &str) -> Self {
        Self::mount_with_handle(source, default_city).0
    }

    /// [`mount`](Self::mount), also returning the task that runs the default
    /// lookup. Aborting the task cancels the lookup back to `Idle`.
    pub fn mount_with_handle(
        source: Arc<dyn DataSource>,
        default_city: &str,
    ) -> (Self, JoinHandle<LookupState>) {
        let lookup = Self::new(source);
        let handle = match lookup.admit(default_city) {
            Ok(Admission::Pending(pending)) => tokio::spawn(pending.run()),
            Ok(Admission::Settled(state)) => tokio::spawn(async move { state }),
            Err(_) => {
                let state = lookup.state();
                tokio::spawn(async move { state })
            }
        };
        (lookup, handle)
    }

    /// Look up `query` and wait for the attempt to settle.
    ///
    /// A blank query fails validation right away without reaching the data
    /// source. The returned state is the one this attempt produced.
    pub async fn submit(&self, query: &str) -> Result<LookupState, SubmitError> {
        match self.admit(query)? {
            Admission::Settled(state) => Ok(state),
            Admission::Pending(pending) => Ok(pending.run().await),
        }
    }

    /// Like [`submit`](Self::submit) but runs the fetch on a spawned task.
    /// Admission happens before this returns.
    pub fn spawn_submit(
        &self,
        query: &str,
    ) -> Result<JoinHandle<LookupState>, SubmitError> {
        let handle = match self.admit(query)? {
            Admission::Settled(state) => tokio::spawn(async move { state }),
            Admission::Pending(pending) => tokio::spawn(pending.run()),
        };
        Ok(handle)
    }

    fn admit(&self, query: &str) -> Result<Admission, SubmitError> {
        let city = query.trim();

        let mut admitted = None;
        self.shared.state.send_if_modified(|state| {
            if state.is_loading() {
                return false;
            }
            *state = std::mem::take(state).transition(Event::Submitted(city));
            admitted = Some(state.clone());
            true
        });

        let Some(next) = admitted else {
            debug!(query, "submission refused, lookup in flight");
            return Err(SubmitError::InFlight);
        };

        if next.is_settled() {
            debug!("submission rejected: empty query");
            return Ok(Admission::Settled(next));
        }

        info!(city, source = %self.shared.source.kind(), "lookup started");
        Ok(Admission::Pending(PendingLookup {
            shared: Arc::clone(&self.shared),
            city: city.to_string(),
            finished: false,
        }))
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> LookupState {
        self.shared.state.borrow().clone()
    }

    /// Observe every transition from now on.
    pub fn subscribe(&self) -> watch::Receiver<LookupState> {
        self.shared.state.subscribe()
    }

    /// The report the card may show: only while the state is `Success`.
    pub fn visible_report(&self) -> Option<WeatherReport> {
        self.shared.state.borrow().report().cloned()
    }

    /// True while a lookup is in flight; the input should be disabled.
    pub fn is_busy(&self) -> bool {
        self.shared.state.borrow().is_loading()
    }

    pub fn source_kind(&self) -> SourceKind {
        self.shared.source.kind()
    }
}
