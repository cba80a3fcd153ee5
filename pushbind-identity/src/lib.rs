//! Asynchronous external-identity layer for pushbind.
//!
//! The push-notification SDK assigns identifiers on its own schedule, in a
//! runtime the application core does not control. This crate turns those
//! "maybe later, maybe never" values into something the core can reason
//! about:
//!
//! - [`IdentityCell`]: a thread-safe eventual value with non-blocking reads
//!   and bounded waits that wake as soon as a value is written
//! - [`CrossRuntimeBridge`]: the only channel through which the native host
//!   pushes identities into the core and the core reads them back
//! - [`NotificationIdentityProvider`]: the per-platform capability surface,
//!   with [`EmbeddedProvider`] (SDK in-process) and [`HostedProvider`] (SDK
//!   in the native host)
//! - [`PushSdk`]: thin pass-through to the third-party SDK
//!
//! # Example
//!
//! ```
//! use pushbind_identity::{CrossRuntimeBridge, IdentityKind};
//!
//! let bridge = CrossRuntimeBridge::new();
//! assert_eq!(bridge.query_identity(IdentityKind::PushSubscriptionId), None);
//!
//! bridge.report_identity(IdentityKind::PushSubscriptionId, Some("ps-123"));
//! assert_eq!(
//!     bridge.query_identity(IdentityKind::PushSubscriptionId).as_deref(),
//!     Some("ps-123")
//! );
//! ```

mod bridge;
mod cell;
mod error;
mod identity;
pub mod provider;
pub mod sdk;

pub use bridge::CrossRuntimeBridge;
pub use cell::{CellWatcher, IdentityCell};
pub use error::{SdkError, SdkResult};
pub use identity::{IdentityCells, IdentityKind, NotificationIdentity};
pub use provider::{
    EmbeddedProvider, HostedProvider, IdentityListener, NotificationIdentityProvider,
    ProviderConfig, ProviderState,
};
pub use sdk::{PushSdk, SdkObserver};
