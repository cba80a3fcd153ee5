//! Shared primitives for pushbind.
//!
//! This crate defines the small, dependency-light types every other crate
//! in the workspace agrees on:
//! - The host [`Platform`] a build targets
//! - Cooperative cancellation ([`CancelToken`], [`Cancelled`])
//! - Absolute deadlines shared across nested waits ([`Deadline`])
//! - Normalization of externally supplied identifiers

mod cancel;
mod deadline;
mod ids;
mod platform;

pub use cancel::{CancelToken, Cancelled};
pub use deadline::Deadline;
pub use ids::{normalize_id, normalize_id_ref};
pub use platform::Platform;
