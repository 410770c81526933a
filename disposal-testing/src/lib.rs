//! Test fixtures for code built on `disposal`.
//!
//! [`TrackedResource`] is a disposable resource that records every cleanup
//! it runs in a shared [`CleanupProbe`], and can be told to fail its cleanup
//! or to hold it open on a [`Gate`] while a test races other callers against
//! it. The [`steps`] module supplies setup steps for `setup_safely`.

#![deny(warnings)]
#![forbid(
    dead_code,
    invalid_value,
    overflowing_literals,
    unconditional_recursion,
    unreachable_pub,
    unused_allocation,
    unsafe_code
)]
#![deny(
    bad_style,
    clippy::allow_attributes,
    deprecated,
    meta_variable_misuse,
    non_ascii_idents,
    non_camel_case_types,
    non_snake_case,
    non_upper_case_globals,
    rust_2018_idioms,
    rust_2021_compatibility,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_code,
    unused_assignments,
    unused_attributes,
    unused_extern_crates,
    unused_imports,
    unused_must_use,
    unused_mut,
    unused_parens,
    unused_qualifications,
    unused_results,
    unused_variables
)]

pub mod gate;
pub mod resource;
pub mod steps;

pub use gate::*;
pub use resource::*;
pub use steps::*;
