//! Setup steps for exercising `setup_safely` and friends.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::resource::{FixtureError, TrackedResource};

/// A step that records `name` on the resource and succeeds.
pub fn configure(
    name: &'static str,
) -> impl FnOnce(&mut TrackedResource) -> Result<(), FixtureError> {
    move |resource| {
        resource.record_setup(name);
        Ok(())
    }
}

/// A step that fails with an injected error carrying `message`, leaving the
/// resource untouched.
pub fn fail_with(
    message: &'static str,
) -> impl FnOnce(&mut TrackedResource) -> Result<(), FixtureError> {
    move |_| Err(FixtureError::injected(message))
}

/// Counts calls to the steps it hands out.
#[derive(Debug, Default)]
pub struct StepCounter {
    calls: AtomicUsize,
}

impl StepCounter {
    /// A counter with no calls recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// A step that counts its call, then returns `outcome`.
    pub fn step(
        &self,
        outcome: Result<(), FixtureError>,
    ) -> impl FnOnce(&mut TrackedResource) -> Result<(), FixtureError> + '_ {
        move |_| {
            let _previous = self.calls.fetch_add(1, Ordering::SeqCst);
            outcome
        }
    }

    /// Number of steps that have been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}
