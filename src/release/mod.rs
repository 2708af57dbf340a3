//! The release run loop.
//!
//! [`Propagator`] walks the release plan one package at a time and returns a
//! [`ReleaseReport`] describing every bump, pin rewrite and release outcome.

mod propagator;
mod report;

pub use propagator::{Propagator, PropagatorOptions};
pub use report::{PackageReport, PushStatus, ReleaseReport};
