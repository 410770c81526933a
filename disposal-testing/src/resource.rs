//! An instrumented disposable resource.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use disposal::{CleanupKind, Disposable, DisposalGuard, InvalidArgument, Release};
use thiserror::Error;
use tracing::debug;

use crate::gate::Gate;

/// Errors raised by fixtures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixtureError {
    /// A failure a test asked for, carrying its message verbatim.
    #[error("{0}")]
    Injected(String),

    /// A required input was absent.
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),
}

impl FixtureError {
    /// An injected failure with the given message.
    pub fn injected(message: impl Into<String>) -> Self {
        Self::Injected(message.into())
    }
}

/// Shared record of the cleanups a [`TrackedResource`] has run.
///
/// Kept behind an `Arc` so a test can still read it after the resource has
/// been moved into, or dropped by, the code under test.
#[derive(Debug, Default)]
pub struct CleanupProbe {
    kinds: Mutex<Vec<CleanupKind>>,
    started: Gate,
}

impl CleanupProbe {
    /// Creates an empty probe.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cleanups that have run to completion.
    pub fn cleanups(&self) -> usize {
        self.lock_kinds().len()
    }

    /// Kinds of the completed cleanups, in completion order.
    pub fn kinds(&self) -> Vec<CleanupKind> {
        self.lock_kinds().clone()
    }

    /// Whether any cleanup has started, finished or not.
    pub fn cleanup_started(&self) -> bool {
        self.started.is_open()
    }

    /// Blocks until a cleanup starts or `timeout` elapses. Returns whether one
    /// started.
    pub fn wait_for_cleanup_start(&self, timeout: Duration) -> bool {
        self.started.wait_timeout(timeout)
    }

    fn record_start(&self) {
        self.started.open();
    }

    fn record(&self, kind: CleanupKind) {
        self.lock_kinds().push(kind);
    }

    fn lock_kinds(&self) -> std::sync::MutexGuard<'_, Vec<CleanupKind>> {
        self.kinds.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// How a [`TrackedResource`]'s cleanup behaves.
#[derive(Debug, Clone, Default)]
pub enum CleanupBehavior {
    /// Cleanup succeeds immediately.
    #[default]
    Succeed,

    /// Cleanup runs, then fails with this error.
    Fail(FixtureError),

    /// Cleanup blocks until the gate opens, then succeeds.
    BlockUntil(Arc<Gate>),
}

/// A disposable resource that records its cleanups in a [`CleanupProbe`].
#[derive(Debug)]
pub struct TrackedResource {
    guard: DisposalGuard,
    probe: Arc<CleanupProbe>,
    behavior: CleanupBehavior,
    abandon_on_drop: bool,
    setup_steps: Vec<String>,
}

impl TrackedResource {
    /// A resource with its own probe and a cleanup that succeeds.
    pub fn new() -> Self {
        Self::with_probe(Arc::new(CleanupProbe::new()))
    }

    /// A resource reporting to an existing probe.
    pub fn with_probe(probe: Arc<CleanupProbe>) -> Self {
        Self {
            guard: DisposalGuard::new(),
            probe,
            behavior: CleanupBehavior::Succeed,
            abandon_on_drop: false,
            setup_steps: Vec::new(),
        }
    }

    /// Makes cleanup fail with an injected error carrying `message`.
    #[must_use]
    pub fn failing_cleanup(mut self, message: impl Into<String>) -> Self {
        self.behavior = CleanupBehavior::Fail(FixtureError::injected(message));
        self
    }

    /// Makes cleanup block until `gate` opens.
    #[must_use]
    pub fn blocking_cleanup(mut self, gate: Arc<Gate>) -> Self {
        self.behavior = CleanupBehavior::BlockUntil(gate);
        self
    }

    /// Runs abandonment cleanup when dropped without an explicit release.
    #[must_use]
    pub fn abandon_on_drop(mut self) -> Self {
        self.abandon_on_drop = true;
        self
    }

    /// The probe this resource reports to.
    pub fn probe(&self) -> Arc<CleanupProbe> {
        Arc::clone(&self.probe)
    }

    /// Records that a setup step ran against this resource.
    pub fn record_setup(&mut self, step: impl Into<String>) {
        self.setup_steps.push(step.into());
    }

    /// Setup steps recorded so far, in order.
    pub fn setup_steps(&self) -> &[String] {
        &self.setup_steps
    }
}

impl Default for TrackedResource {
    fn default() -> Self {
        Self::new()
    }
}

impl Disposable for TrackedResource {
    type Error = FixtureError;

    fn disposal_guard(&self) -> &DisposalGuard {
        &self.guard
    }

    fn perform_cleanup(&self, kind: CleanupKind) -> Result<(), FixtureError> {
        self.probe.record_start();
        if let CleanupBehavior::BlockUntil(gate) = &self.behavior {
            gate.wait();
        }
        self.probe.record(kind);
        debug!(%kind, "tracked resource cleaned up");

        match &self.behavior {
            CleanupBehavior::Fail(error) => Err(error.clone()),
            CleanupBehavior::Succeed | CleanupBehavior::BlockUntil(_) => Ok(()),
        }
    }
}

impl Drop for TrackedResource {
    fn drop(&mut self) {
        if self.abandon_on_drop {
            self.release_abandoned();
        }
    }
}
