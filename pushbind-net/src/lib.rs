//! Typed network-result classification for pushbind.
//!
//! Every network-backed operation goes through a [`CallExecutor`], which
//! turns one remote call into a [`ResultEnvelope`]:
//!
//! - `Success(T)` for a 2xx status whose body decodes into `T`
//! - `ApplicationError { code, message }` for any other status
//! - `TransportFailure { kind, detail }` for faults during the attempt and
//!   for bodies that do not decode
//!
//! Cancellation is never part of the envelope. It is returned as
//! `Err(Cancelled)` so callers propagate it with `?`.
//!
//! # Example
//!
//! ```no_run
//! use pushbind_net::{ApiClient, ClientConfig, ResultEnvelope};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(&ClientConfig {
//!     base_url: "https://api.example.com".to_string(),
//!     ..Default::default()
//! })?;
//!
//! match client.get_token(None).await? {
//!     ResultEnvelope::Success(body) => println!("token: {:?}", body.data),
//!     ResultEnvelope::ApplicationError { code, .. } => println!("rejected: {code}"),
//!     ResultEnvelope::TransportFailure { kind, .. } => println!("failed: {kind:?}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
mod config;
mod descriptor;
mod envelope;
mod error;
mod executor;
mod response;
pub mod transport;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use descriptor::{json_decoder, CallDescriptor, Decoder, Method};
pub use envelope::{FailureKind, ResultEnvelope};
pub use error::{DecodeError, NetError, NetResult, TransportFault};
pub use executor::{classify_fault, CallExecutor};
pub use response::{BaseResponse, PushRegistration, TokenResponse};
pub use transport::{HttpTransport, RawRequest, RawResponse, ReqwestTransport};

pub use pushbind_types::{CancelToken, Cancelled};
