//! Scoped release.
//!
//! A [`ReleaseScope`] owns a releasable resource and guarantees it is released
//! on every exit path from the scope holding it: an explicit
//! [`release`](ReleaseScope::release), an early return, `?`, or a panic
//! unwinding through it.

use std::any::type_name;
use std::fmt;
use std::ops::Deref;

use tracing::error;

use crate::guard::Release;

/// Releases the wrapped resource when the scope ends.
///
/// Scope exit is a deterministic, owner-driven release, so dropping the scope
/// performs a full [`Release::release`], not abandonment cleanup. Prefer
/// calling [`release`](Self::release) explicitly when the cleanup error
/// matters: a failure during drop can only be logged.
///
/// ```
/// use std::convert::Infallible;
///
/// use disposal::{CleanupKind, Disposable, DisposalGuard, Release, ReleaseScope};
///
/// #[derive(Default)]
/// struct Lease {
///     guard: DisposalGuard,
/// }
///
/// impl Disposable for Lease {
///     type Error = Infallible;
///
///     fn disposal_guard(&self) -> &DisposalGuard {
///         &self.guard
///     }
///
///     fn perform_cleanup(&self, _kind: CleanupKind) -> Result<(), Infallible> {
///         Ok(())
///     }
/// }
///
/// let lease = std::sync::Arc::new(Lease::default());
/// {
///     let scope = ReleaseScope::new(std::sync::Arc::clone(&lease));
///     assert!(!scope.is_released());
/// }
/// assert!(lease.is_disposed());
/// ```
pub struct ReleaseScope<R: Release> {
    resource: Option<R>,
}

impl<R: Release> ReleaseScope<R> {
    /// Takes ownership of `resource` for the rest of the scope.
    pub const fn new(resource: R) -> Self {
        Self {
            resource: Some(resource),
        }
    }

    /// The scoped resource.
    pub fn get(&self) -> &R {
        self.resource
            .as_ref()
            .expect("scope owns its resource until consumed")
    }

    /// Mutable access to the scoped resource.
    pub fn get_mut(&mut self) -> &mut R {
        self.resource
            .as_mut()
            .expect("scope owns its resource until consumed")
    }

    /// Whether the scoped resource has been released.
    pub fn is_released(&self) -> bool {
        self.get().is_disposed()
    }

    /// Releases the resource now and ends the scope, returning any cleanup
    /// error.
    pub fn release(mut self) -> Result<(), R::Error> {
        self.resource.take().map_or(Ok(()), |resource| resource.release())
    }

    /// Ends the scope without releasing, handing the resource back.
    pub fn into_inner(mut self) -> R {
        self.resource
            .take()
            .expect("scope owns its resource until consumed")
    }
}

impl<R: Release> Deref for ReleaseScope<R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.get()
    }
}

impl<R: Release> fmt::Debug for ReleaseScope<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseScope")
            .field("resource", &type_name::<R>())
            .field(
                "released",
                &self.resource.as_ref().map_or(true, Release::is_disposed),
            )
            .finish()
    }
}

impl<R: Release> Drop for ReleaseScope<R> {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            if let Err(cleanup_error) = resource.release() {
                error!(
                    resource = type_name::<R>(),
                    error = %cleanup_error,
                    "releasing scoped resource failed"
                );
            }
        }
    }
}

/// Extension trait for wrapping releasable resources in a [`ReleaseScope`].
pub trait ScopeExt: Release + Sized {
    /// Wraps `self` so it is released when the returned scope ends.
    fn scoped(self) -> ReleaseScope<Self>;
}

impl<R: Release> ScopeExt for R {
    fn scoped(self) -> ReleaseScope<Self> {
        ReleaseScope::new(self)
    }
}
