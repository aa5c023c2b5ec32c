//! Issue detection.
//!
//! One scan module per concern, a taxonomy in [`issue`], and the
//! [`IssueDetector`] facade that runs everything in a single pass.

pub mod detector;
pub mod issue;

pub(crate) mod manifest;
pub(crate) mod markup;
pub(crate) mod modules;
pub(crate) mod runtime;
pub(crate) mod structural;
pub(crate) mod style;

pub use detector::IssueDetector;
pub use issue::{Issue, IssueCategory, Severity};
