//! Presence checks for required inputs.

use crate::errors::InvalidArgument;

/// Unwraps a required input, or fails with [`InvalidArgument`] naming it.
///
/// ```
/// use disposal::validation::ensure_present;
///
/// assert_eq!(ensure_present(Some(7), "count"), Ok(7));
///
/// let error = ensure_present::<u32>(None, "count").unwrap_err();
/// assert_eq!(error.parameter(), "count");
/// ```
pub fn ensure_present<T>(value: Option<T>, parameter: &'static str) -> Result<T, InvalidArgument> {
    value.ok_or(InvalidArgument::new(parameter))
}
