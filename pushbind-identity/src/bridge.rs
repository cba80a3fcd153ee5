//! Message channel between the native host and the application core.
//!
//! The host pushes identities with [`CrossRuntimeBridge::report_identity`]
//! whenever its own SDK observer fires. The core reads them back with
//! [`CrossRuntimeBridge::query_identity`], which only reads the cached cell
//! and never calls into the host. Ordering between the two is established
//! solely by the cells' internal synchronization.

use crate::identity::{IdentityCells, IdentityKind};
use pushbind_types::normalize_id_ref;
use std::sync::Arc;
use tracing::debug;

/// Bridge over a shared set of [`IdentityCells`].
#[derive(Debug, Clone, Default)]
pub struct CrossRuntimeBridge {
    cells: Arc<IdentityCells>,
}

impl CrossRuntimeBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host → core. Safe to call repeatedly and from any thread.
    ///
    /// Absent or blank values are ignored so a cell never rolls back to
    /// empty.
    pub fn report_identity(&self, kind: IdentityKind, value: Option<&str>) {
        match normalize_id_ref(value) {
            Some(value) => {
                debug!(%kind, %value, "host reported identity");
                self.cells.cell(kind).set(value);
            }
            None => debug!(%kind, "host reported empty identity, ignoring"),
        }
    }

    /// Core → host. Non-blocking read of the last reported value.
    pub fn query_identity(&self, kind: IdentityKind) -> Option<String> {
        self.cells.cell(kind).get()
    }

    /// The cells behind this bridge, for providers that wait on them.
    pub fn cells(&self) -> Arc<IdentityCells> {
        self.cells.clone()
    }
}
