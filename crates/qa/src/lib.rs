//! Quality checks over a final chunk list.
//!
//! Each check is a pure function from chunks and the compiled profile to a
//! list of issues; [`run_validation_suite`] runs them all in a fixed order and
//! folds the issues into a [`ValidationReport`].

pub mod checks;
pub mod report;

pub use checks::{run_validation_suite, CheckFn, CHECKS};
pub use report::{Severity, ValidationIssue, ValidationReport};
