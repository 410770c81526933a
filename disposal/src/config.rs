//! Configuration for labelled setup.
//!
//! Options are plain serde types so they can sit inside an application's own
//! configuration file. The label is validated when it is constructed or
//! deserialized, never later.

use nutype::nutype;
use serde::{Deserialize, Serialize};

/// Human-readable name for a resource, recorded on setup spans.
///
/// Trimmed, non-empty and at most 128 characters.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 128),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        AsRef,
        Deref,
        Display,
        Serialize,
        Deserialize
    )
)]
pub struct ResourceLabel(String);

/// Options for [`setup_safely_with`](crate::setup::setup_safely_with).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SetupOptions {
    label: Option<ResourceLabel>,
}

impl SetupOptions {
    /// Options with no label; spans fall back to the resource's type name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the label recorded on the setup span.
    #[must_use]
    pub fn with_label(mut self, label: ResourceLabel) -> Self {
        self.label = Some(label);
        self
    }

    /// The configured label, if any.
    pub const fn label(&self) -> Option<&ResourceLabel> {
        self.label.as_ref()
    }
}
