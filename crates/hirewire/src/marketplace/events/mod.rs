//! Real-time distribution: channels, sessions and the publish/subscribe registry.

mod auth;
mod bus;
mod types;

pub use auth::{AuthError, IdentityVerifier, StaticTokenVerifier};
pub use bus::{
    ConnectError, EventBus, EventBusConfig, JoinOutcome, PublishReport, Session, SessionId,
    SessionState,
};
pub use types::{
    Channel, Delivery, JobMatched, JobPublished, OutboundEvent, SubmissionStatusUpdated,
};
