//! Exactly-once release for disposable resources.
//!
//! A disposable resource embeds a [`DisposalGuard`] and implements
//! [`Disposable`], supplying the cleanup hook. Every such resource then gets
//! [`Release`] for free: a release entry point that runs the hook at most once
//! no matter how many callers ask, or from how many threads.
//!
//! The guard is a single atomic flag. The first caller to flip it runs the
//! cleanup synchronously; every other caller returns at once, without waiting
//! for the winner to finish.
//!
//! # Example
//!
//! ```
//! use std::convert::Infallible;
//! use std::sync::Mutex;
//!
//! use disposal::{CleanupKind, Disposable, DisposalGuard, Release};
//!
//! struct Connection {
//!     guard: DisposalGuard,
//!     socket: Mutex<Option<Vec<u8>>>,
//! }
//!
//! impl Disposable for Connection {
//!     type Error = Infallible;
//!
//!     fn disposal_guard(&self) -> &DisposalGuard {
//!         &self.guard
//!     }
//!
//!     fn perform_cleanup(&self, _kind: CleanupKind) -> Result<(), Infallible> {
//!         if let Ok(mut socket) = self.socket.lock() {
//!             socket.take();
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let connection = Connection {
//!     guard: DisposalGuard::new(),
//!     socket: Mutex::new(Some(Vec::new())),
//! };
//!
//! assert!(!connection.is_disposed());
//! connection.release().unwrap();
//! connection.release().unwrap(); // no second cleanup
//! assert!(connection.is_disposed());
//! ```

use std::any::type_name;
use std::error::Error as StdError;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, error, trace, warn};

/// One-shot disposal state embedded in a disposable resource.
///
/// Starts out not disposed and transitions exactly once. The transition never
/// reverts. Deliberately not `Clone`: a copy would fork the one-shot state.
pub struct DisposalGuard {
    disposing: AtomicBool,
}

impl DisposalGuard {
    /// Creates a guard in the not-yet-disposing state.
    pub const fn new() -> Self {
        Self {
            disposing: AtomicBool::new(false),
        }
    }

    /// Whether a release has been requested.
    ///
    /// True as soon as a release is in progress, not only once it completes.
    pub fn is_disposed(&self) -> bool {
        self.disposing.load(Ordering::Acquire)
    }

    /// Attempts the one-shot transition.
    ///
    /// Returns `true` for exactly one caller over the guard's lifetime: the
    /// one that flipped the flag. That caller owns the cleanup.
    pub fn try_begin(&self) -> bool {
        self.disposing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

impl Default for DisposalGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DisposalGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisposalGuard")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Why a resource's cleanup hook is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CleanupKind {
    /// An owner asked for release. Release everything the resource holds.
    Explicit,

    /// The resource was dropped without being released. Release only
    /// external state; owned values may already be on their way out and
    /// must not be touched.
    Abandoned,
}

impl CleanupKind {
    /// Whether owned, in-process resources should be released too.
    pub const fn releases_managed(self) -> bool {
        matches!(self, Self::Explicit)
    }
}

impl fmt::Display for CleanupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => f.write_str("explicit"),
            Self::Abandoned => f.write_str("abandoned"),
        }
    }
}

/// A resource whose cleanup must run at most once.
///
/// Implementors embed a [`DisposalGuard`] and supply the cleanup hook. They do
/// not call the hook themselves; [`Release`] does.
pub trait Disposable {
    /// Failure raised by the cleanup hook.
    ///
    /// Need not be `Send` or `Sync`; a resource confined to one thread can
    /// report errors that are too.
    type Error: StdError + 'static;

    /// The guard embedded in this resource.
    fn disposal_guard(&self) -> &DisposalGuard;

    /// Releases what the resource holds.
    ///
    /// Called at most once per resource. `kind` tells an explicit release
    /// apart from cleanup of an abandoned resource.
    fn perform_cleanup(&self, kind: CleanupKind) -> Result<(), Self::Error>;
}

impl<T: Disposable + ?Sized> Disposable for &T {
    type Error = T::Error;

    fn disposal_guard(&self) -> &DisposalGuard {
        (**self).disposal_guard()
    }

    fn perform_cleanup(&self, kind: CleanupKind) -> Result<(), Self::Error> {
        (**self).perform_cleanup(kind)
    }
}

impl<T: Disposable + ?Sized> Disposable for Box<T> {
    type Error = T::Error;

    fn disposal_guard(&self) -> &DisposalGuard {
        (**self).disposal_guard()
    }

    fn perform_cleanup(&self, kind: CleanupKind) -> Result<(), Self::Error> {
        (**self).perform_cleanup(kind)
    }
}

impl<T: Disposable + ?Sized> Disposable for Arc<T> {
    type Error = T::Error;

    fn disposal_guard(&self) -> &DisposalGuard {
        (**self).disposal_guard()
    }

    fn perform_cleanup(&self, kind: CleanupKind) -> Result<(), Self::Error> {
        (**self).perform_cleanup(kind)
    }
}

/// Release entry points for every [`Disposable`] resource.
///
/// Implemented for all disposable types and sealed, so no resource can
/// replace the exactly-once logic with its own.
pub trait Release: Disposable + private::Sealed {
    /// Whether a release has been requested.
    fn is_disposed(&self) -> bool;

    /// Runs the cleanup hook if no release has been requested before.
    ///
    /// Callable any number of times from any thread. The one caller that wins
    /// the transition runs `perform_cleanup(CleanupKind::Explicit)` before
    /// returning and receives its error, if any. Every other caller returns
    /// `Ok(())` immediately without waiting for that cleanup to finish. The
    /// cleanup is never retried, even when it fails.
    fn release(&self) -> Result<(), Self::Error>;

    /// Cleans up a resource that is being dropped without an explicit release.
    ///
    /// Meant to be called from the resource's own `Drop` impl. Does nothing if
    /// a release was already requested; otherwise runs
    /// `perform_cleanup(CleanupKind::Abandoned)`. `Drop` has no way to return
    /// an error, so a failure here is logged instead.
    fn release_abandoned(&self);
}

impl<T> Release for T
where
    T: Disposable + ?Sized,
{
    fn is_disposed(&self) -> bool {
        self.disposal_guard().is_disposed()
    }

    fn release(&self) -> Result<(), Self::Error> {
        if !self.disposal_guard().try_begin() {
            trace!(
                resource = type_name::<T>(),
                "release already requested, skipping cleanup"
            );
            return Ok(());
        }

        debug!(
            resource = type_name::<T>(),
            kind = %CleanupKind::Explicit,
            "running cleanup"
        );
        self.perform_cleanup(CleanupKind::Explicit)
            .map_err(|cleanup_error| {
                warn!(
                    resource = type_name::<T>(),
                    error = %cleanup_error,
                    "cleanup failed; it will not be retried"
                );
                cleanup_error
            })
    }

    fn release_abandoned(&self) {
        if !self.disposal_guard().try_begin() {
            return;
        }

        debug!(
            resource = type_name::<T>(),
            kind = %CleanupKind::Abandoned,
            "running cleanup"
        );
        if let Err(cleanup_error) = self.perform_cleanup(CleanupKind::Abandoned) {
            error!(
                resource = type_name::<T>(),
                error = %cleanup_error,
                "cleanup of abandoned resource failed"
            );
        }
    }
}

// Sealed trait pattern to prevent external implementations
mod private {
    pub trait Sealed {}

    impl<T: super::Disposable + ?Sized> Sealed for T {}
}
