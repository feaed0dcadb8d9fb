use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::engine::run_projection;
use super::types::{InputError, Projection, ProjectionInputs, validate_start_year};

pub const DEFAULT_QUIET_WINDOW: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy)]
struct PendingEdit {
    inputs: ProjectionInputs,
    submitted_at: Instant,
}

/// Debounced owner of the currently displayed projection.
///
/// Edits are collapsed until the quiet window has passed since the most
/// recent one. Invalid edits never replace the displayed projection.
#[derive(Debug)]
pub struct Recalculator {
    quiet_window: Duration,
    start_year: i32,
    pending: Option<PendingEdit>,
    current: Option<Projection>,
    last_error: Option<InputError>,
}

impl Recalculator {
    pub fn new(start_year: i32) -> Self {
        Self::with_quiet_window(start_year, DEFAULT_QUIET_WINDOW)
    }

    pub fn with_quiet_window(start_year: i32, quiet_window: Duration) -> Self {
        Self {
            quiet_window,
            start_year,
            pending: None,
            current: None,
            last_error: None,
        }
    }

    /// Computes immediately, bypassing the debounce. Used for the first render.
    pub fn prime(&mut self, inputs: ProjectionInputs) -> Result<&Projection, InputError> {
        self.pending = None;
        self.apply(inputs)
    }

    pub fn submit(&mut self, inputs: ProjectionInputs, now: Instant) {
        if self.pending.is_some() {
            debug!("superseding pending edit");
        }
        self.pending = Some(PendingEdit {
            inputs,
            submitted_at: now,
        });
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending edit becomes eligible to fire, if there is one.
    pub fn pending_deadline(&self) -> Option<Instant> {
        self.pending.map(|edit| edit.submitted_at + self.quiet_window)
    }

    /// Fires the pending edit once it has been quiet long enough.
    /// Returns true when the displayed projection was replaced.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(edit) = self.pending else {
            return false;
        };
        if now.saturating_duration_since(edit.submitted_at) < self.quiet_window {
            return false;
        }
        self.pending = None;
        self.apply(edit.inputs).is_ok()
    }

    pub fn current(&self) -> Option<&Projection> {
        self.current.as_ref()
    }

    pub fn last_error(&self) -> Option<&InputError> {
        self.last_error.as_ref()
    }

    fn apply(&mut self, inputs: ProjectionInputs) -> Result<&Projection, InputError> {
        if let Err(err) = inputs
            .validate()
            .and_then(|()| validate_start_year(self.start_year))
        {
            warn!(%err, "keeping previous projection");
            self.last_error = Some(err.clone());
            return Err(err);
        }
        let projection = run_projection(&inputs, self.start_year);
        debug!(
            years = inputs.years,
            snapshots = projection.snapshots.len(),
            "replacing projection"
        );
        self.last_error = None;
        Ok(self.current.insert(projection))
    }
}
