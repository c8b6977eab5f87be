//! Domain models.
//!
//! - [`event`] - the inbound webhook envelope and its validated form
//! - [`user`] - the stored user record and the candidate built from an event

pub mod event;
pub mod user;

pub use event::{EventError, InboundEvent, WebhookEnvelope};
pub use user::{NewUser, UserRecord};
