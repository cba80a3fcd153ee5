//! Best-effort correlation of the app's user id with the push service.
//!
//! One [`SyncOrchestrator`] run per app start: initialize the provider,
//! wait out the SDK warm-up, resolve the session's user id, wait (bounded)
//! for a push identity, then log in, tag and register with the backend.
//! Nothing here raises to the caller except cancellation; failures only
//! move the published [`SyncState`].

mod config;
mod error;
mod orchestrator;
mod registration;
mod services;
mod session;
mod state;
pub mod tags;

pub use config::SyncConfig;
pub use error::{RegistrationError, RegistrationResult, SessionError, SessionResult};
pub use orchestrator::{OrchestratorHandle, SyncOrchestrator};
pub use registration::{
    InMemoryRegistrationStore, PushRegistrar, RegistrationOutcome, RegistrationStore,
};
pub use services::{Collaborators, Services};
pub use session::{InMemorySessionStore, SessionSnapshot, SessionStore};
pub use state::SyncState;
