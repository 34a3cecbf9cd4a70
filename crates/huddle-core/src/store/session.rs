//! Ephemeral session state: the current generation results, the active
//! planning context, and the single-request guard.
//!
//! At most one generation request is in flight. Every request is stamped
//! with the view counter at the time it started; navigating away
//! ([`Session::reset_view`]) advances the counter so a response that arrives
//! afterwards is recognised as stale and dropped.

use huddle_db::models::PlanningItem;
use tracing::{debug, warn};

/// Errors from the request guard.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("a generation request is already in progress")]
    Busy,
}

/// Proof that a request was started, carrying the view it belongs to.
#[derive(Debug, PartialEq, Eq)]
pub struct RequestTicket {
    view: u64,
}

impl RequestTicket {
    pub fn view(&self) -> u64 {
        self.view
    }
}

/// How a finished request affected the session.
#[derive(Debug)]
pub enum Completion<E> {
    /// The results were adopted; carries how many arrived.
    Applied(usize),
    /// The view changed while the request was in flight; results dropped.
    Stale,
    /// The request failed; no partial results are kept.
    Failed(E),
}

#[derive(Debug, Default, Clone)]
pub struct Session {
    results: Vec<PlanningItem>,
    context: Option<String>,
    busy: bool,
    view: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session with results carried over from a previous run.
    pub fn with_results(results: Vec<PlanningItem>) -> Self {
        Self {
            results,
            ..Self::default()
        }
    }

    pub fn results(&self) -> &[PlanningItem] {
        &self.results
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn view(&self) -> u64 {
        self.view
    }

    /// Title of the plan the user is currently working from, if any.
    pub fn active_context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn set_active_context(&mut self, title: impl Into<String>) {
        let title = title.into();
        self.context = if title.trim().is_empty() {
            None
        } else {
            Some(title)
        };
    }

    /// Fail with [`SessionError::Busy`] if a request is in flight.
    pub fn ensure_idle(&self) -> Result<(), SessionError> {
        if self.busy {
            return Err(SessionError::Busy);
        }
        Ok(())
    }

    /// Mark a request in flight and clear the previous results.
    pub fn begin_request(&mut self) -> Result<RequestTicket, SessionError> {
        self.ensure_idle()?;
        self.busy = true;
        self.results.clear();
        debug!(view = self.view, "generation request started");
        Ok(RequestTicket { view: self.view })
    }

    /// Whether results for `ticket` would still be applied.
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        ticket.view == self.view
    }

    /// Finish the request behind `ticket`.
    ///
    /// The busy flag is cleared in every case.
    pub fn complete_request<E>(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<Vec<PlanningItem>, E>,
    ) -> Completion<E> {
        self.busy = false;
        match outcome {
            Err(e) => {
                self.results.clear();
                Completion::Failed(e)
            }
            Ok(_) if !self.is_current(&ticket) => {
                warn!(
                    ticket_view = ticket.view,
                    current_view = self.view,
                    "discarding stale generation response"
                );
                Completion::Stale
            }
            Ok(items) => {
                let n = items.len();
                self.results = items;
                Completion::Applied(n)
            }
        }
    }

    /// Leave the current view: drop results and context.
    pub fn reset_view(&mut self) {
        self.results.clear();
        self.context = None;
        self.view += 1;
    }

    pub(crate) fn replace_results(&mut self, results: Vec<PlanningItem>) {
        self.results = results;
    }
}
