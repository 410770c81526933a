//! `disposal` - exactly-once resource release and leak-free setup
//!
//! Two mechanisms for the two classic hazards of a two-phase resource
//! lifecycle:
//!
//! - **Double release.** A resource embeds a [`DisposalGuard`] and implements
//!   [`Disposable`]. [`Release::release`] then runs its cleanup at most once,
//!   however many times and from however many threads it is called.
//! - **Leak on partial setup.** [`setup_safely`] runs a post-construction
//!   setup step and releases the resource if that step fails, before the
//!   failure reaches a caller who never got a handle to release.
//!
//! [`ReleaseScope`] adds scope-exit release on top of the guard.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod errors;
pub mod guard;
pub mod scope;
pub mod setup;
pub mod validation;

pub use config::{ResourceLabel, SetupOptions};
pub use errors::{BoxError, DisposalError, DisposalResult, InvalidArgument, SetupFailure};
pub use guard::{CleanupKind, Disposable, DisposalGuard, Release};
pub use scope::{ReleaseScope, ScopeExt};
pub use setup::{setup_safely, setup_safely_with, try_setup, SetupExt};
pub use validation::ensure_present;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        setup_safely, try_setup, CleanupKind, Disposable, DisposalGuard, Release, ReleaseScope,
        ScopeExt, SetupExt,
    };
}
