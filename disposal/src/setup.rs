//! Leak-free post-construction setup.
//!
//! A resource can be constructed successfully and still fail the setup that
//! follows, before its owner ever holds it. The functions here run that setup
//! and, when it fails, release the resource before handing the failure back.
//! The setup error comes back unchanged; releasing is interposed, never
//! substituted.
//!
//! - [`setup_safely`] takes optional inputs, rejects absent ones with
//!   [`InvalidArgument`], and returns the setup step's own error type.
//! - [`try_setup`] and [`SetupExt::set_up_with`] take the inputs directly and
//!   report a failed release alongside the setup error in a [`SetupFailure`].
//! - [`setup_safely_with`] is [`setup_safely`] inside a labelled span.

use std::any::type_name;
use std::mem;

use tracing::{debug, error, info_span};

use crate::config::SetupOptions;
use crate::errors::{InvalidArgument, SetupFailure};
use crate::guard::Release;
use crate::validation::ensure_present;

/// Runs `setup` on a freshly constructed resource, releasing it if setup fails.
///
/// Both inputs are required. An absent resource or step fails with
/// [`InvalidArgument`] (converted into `E`) before anything else happens: the
/// step is not called and the resource is not released. The resource is
/// checked first.
///
/// On success the resource comes back still owned by the caller and not
/// released. On failure the resource has already been released and the
/// step's error is returned as is. If that release fails too, the setup error
/// still wins: the cleanup error is logged and the setup error returned. Use
/// [`try_setup`] to receive both.
///
/// ```
/// use std::convert::Infallible;
///
/// use disposal::{setup_safely, CleanupKind, Disposable, DisposalError, DisposalGuard, Release};
///
/// #[derive(Debug, Default)]
/// struct Timer {
///     guard: DisposalGuard,
///     interval_ms: u64,
/// }
///
/// impl Disposable for Timer {
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
/// let timer = setup_safely(
///     Some(Timer::default()),
///     Some(|timer: &mut Timer| -> Result<(), DisposalError> {
///         timer.interval_ms = 250;
///         Ok(())
///     }),
/// )?;
/// assert_eq!(timer.interval_ms, 250);
/// assert!(!timer.is_disposed());
///
/// let failed = setup_safely(
///     Some(Timer::default()),
///     Some(|_: &mut Timer| Err(DisposalError::setup("clock unavailable"))),
/// );
/// assert_eq!(failed.unwrap_err().to_string(), "clock unavailable");
/// # Ok::<(), DisposalError>(())
/// ```
pub fn setup_safely<R, F, E>(resource: Option<R>, setup: Option<F>) -> Result<R, E>
where
    R: Release,
    F: FnOnce(&mut R) -> Result<(), E>,
    E: From<InvalidArgument>,
{
    let resource = ensure_present(resource, "resource")?;
    let setup = ensure_present(setup, "setup")?;

    try_setup(resource, setup).map_err(|failure| {
        let (setup_error, cleanup_error) = failure.into_parts();
        if let Some(cleanup_error) = cleanup_error {
            error!(
                resource = type_name::<R>(),
                error = %cleanup_error,
                "releasing resource after failed setup also failed; returning the setup error"
            );
        }
        setup_error
    })
}

/// [`setup_safely`] inside a `setup_safely` span labelled from `options`.
///
/// The span's `resource` field is the configured label, or the resource's
/// type name when no label is set.
pub fn setup_safely_with<R, F, E>(
    options: &SetupOptions,
    resource: Option<R>,
    setup: Option<F>,
) -> Result<R, E>
where
    R: Release,
    F: FnOnce(&mut R) -> Result<(), E>,
    E: From<InvalidArgument>,
{
    let label: &str = match options.label() {
        Some(label) => label.as_str(),
        None => type_name::<R>(),
    };
    let span = info_span!("setup_safely", resource = label);
    let _entered = span.enter();

    setup_safely(resource, setup)
}

/// Runs `setup` on a freshly constructed resource, releasing it if setup fails.
///
/// On failure the returned [`SetupFailure`] holds the step's error and, if
/// releasing the resource failed as well, the cleanup error. The resource is
/// released exactly once on the failure path and not at all on success.
///
/// A step that panics counts as a failure too: the resource is released while
/// the panic unwinds, and the panic then continues on to the caller.
pub fn try_setup<R, F, E>(mut resource: R, setup: F) -> Result<R, SetupFailure<R::Error, E>>
where
    R: Release,
    F: FnOnce(&mut R) -> Result<(), E>,
{
    let outcome = {
        let mut armed = ReleaseOnUnwind {
            resource: &mut resource,
        };
        let outcome = setup(&mut *armed.resource);
        armed.disarm();
        outcome
    };

    match outcome {
        Ok(()) => Ok(resource),
        Err(setup_error) => {
            debug!(
                resource = type_name::<R>(),
                "setup failed, releasing resource"
            );
            let cleanup_error = resource.release().err();
            Err(SetupFailure::new(setup_error, cleanup_error))
        }
    }
}

/// Releases the borrowed resource when dropped, unless disarmed first.
///
/// Armed around the setup step so that only an unwinding step reaches `Drop`.
struct ReleaseOnUnwind<'a, R: Release> {
    resource: &'a mut R,
}

impl<R: Release> ReleaseOnUnwind<'_, R> {
    fn disarm(self) {
        mem::forget(self);
    }
}

impl<R: Release> Drop for ReleaseOnUnwind<'_, R> {
    fn drop(&mut self) {
        debug!(
            resource = type_name::<R>(),
            "setup panicked, releasing resource"
        );
        if let Err(cleanup_error) = self.resource.release() {
            error!(
                resource = type_name::<R>(),
                error = %cleanup_error,
                "releasing resource after setup panicked failed"
            );
        }
    }
}

/// Extension trait for running setup steps on releasable resources.
pub trait SetupExt: Release + Sized {
    /// Runs `setup` on `self`, releasing it if setup fails.
    ///
    /// Equivalent to [`try_setup`].
    fn set_up_with<F, E>(self, setup: F) -> Result<Self, SetupFailure<Self::Error, E>>
    where
        F: FnOnce(&mut Self) -> Result<(), E>;
}

impl<R: Release> SetupExt for R {
    fn set_up_with<F, E>(self, setup: F) -> Result<Self, SetupFailure<Self::Error, E>>
    where
        F: FnOnce(&mut Self) -> Result<(), E>,
    {
        try_setup(self, setup)
    }
}
