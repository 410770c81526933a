//! Error types for disposal.
//!
//! The crate raises exactly one error of its own, [`InvalidArgument`], when a
//! required input is absent. Every other failure belongs to someone else: a
//! setup step's error or a resource's cleanup error. Those are passed through
//! unchanged, never replaced.
//!
//! # Error Categories
//!
//! - **InvalidArgument**: a required input was absent; nothing else happened
//! - **Setup failure**: the caller's initialization step failed; the resource
//!   was released before the error was returned
//! - **Cleanup failure**: a resource's cleanup hook failed; returned to the one
//!   caller whose release ran the hook
//!
//! [`SetupFailure`] carries a setup failure together with the cleanup failure
//! that may have followed it. [`DisposalError`] is a ready-made error type for
//! callers that do not have one of their own.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Boxed error used by [`DisposalError`] to carry foreign failures.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// A required input was absent.
///
/// Raised before any other effect takes place, so the caller can fix the call
/// and try again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid argument: `{parameter}` must be present")]
pub struct InvalidArgument {
    parameter: &'static str,
}

impl InvalidArgument {
    /// Creates an error naming the absent parameter.
    pub const fn new(parameter: &'static str) -> Self {
        Self { parameter }
    }

    /// Name of the parameter that was absent.
    pub const fn parameter(&self) -> &'static str {
        self.parameter
    }
}

/// A setup step failed and the resource it was initializing was released.
///
/// `error` is the step's own failure, untouched. `cleanup` holds the
/// resource's cleanup failure when the release that followed also failed.
/// The setup failure always takes precedence: `Display` and `source()` report
/// it first.
#[derive(Debug)]
pub struct SetupFailure<C, E> {
    error: E,
    cleanup: Option<C>,
}

impl<C, E> SetupFailure<C, E> {
    /// Pairs a setup failure with the outcome of the release that followed it.
    pub const fn new(error: E, cleanup: Option<C>) -> Self {
        Self { error, cleanup }
    }

    /// The setup step's failure.
    pub const fn error(&self) -> &E {
        &self.error
    }

    /// The cleanup failure, if releasing the resource also failed.
    pub const fn cleanup_error(&self) -> Option<&C> {
        self.cleanup.as_ref()
    }

    /// Whether the release that followed the setup failure also failed.
    pub const fn cleanup_failed(&self) -> bool {
        self.cleanup.is_some()
    }

    /// Discards the cleanup outcome and returns the setup step's failure.
    pub fn into_error(self) -> E {
        self.error
    }

    /// Splits the failure into the setup error and the cleanup error.
    pub fn into_parts(self) -> (E, Option<C>) {
        (self.error, self.cleanup)
    }
}

impl<C, E> fmt::Display for SetupFailure<C, E>
where
    C: fmt::Display,
    E: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(cleanup) = &self.cleanup {
            write!(f, " (releasing the resource also failed: {cleanup})")?;
        }
        Ok(())
    }
}

impl<C, E> StdError for SetupFailure<C, E>
where
    C: fmt::Debug + fmt::Display,
    E: StdError + 'static,
{
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&self.error)
    }
}

/// General-purpose error for code that sets up and releases resources without
/// an error type of its own.
///
/// Setup and cleanup failures are transparent: their `Display` and `source()`
/// are those of the wrapped error.
#[derive(Debug, Error)]
pub enum DisposalError {
    /// A required input was absent.
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),

    /// An initialization step failed.
    #[error(transparent)]
    Setup(BoxError),

    /// A resource's cleanup failed.
    #[error(transparent)]
    Cleanup(BoxError),
}

impl DisposalError {
    /// Wraps an initialization failure.
    pub fn setup(error: impl Into<BoxError>) -> Self {
        Self::Setup(error.into())
    }

    /// Wraps a cleanup failure.
    pub fn cleanup(error: impl Into<BoxError>) -> Self {
        Self::Cleanup(error.into())
    }

    /// Whether this error was raised before any effect took place.
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

/// Type alias for results using [`DisposalError`].
pub type DisposalResult<T> = Result<T, DisposalError>;
