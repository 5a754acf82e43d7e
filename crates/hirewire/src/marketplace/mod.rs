//! Recruitment marketplace core: agency matching, candidate ranking, commission
//! pricing and real-time distribution of marketplace events.

pub mod commission;
pub mod dispatcher;
pub mod domain;
pub mod events;
pub mod matching;
pub mod ranking;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use commission::{CommissionCalculator, CommissionQuote};
pub use dispatcher::NotificationDispatcher;
pub use domain::{
    Agency, CandidateProfile, ChatMessage, Identity, Job, JobDraft, JobId, JobStatus, KycStatus,
    MessageDraft, MessageId, PaymentId, PaymentRecord, PaymentStatus, PerformanceMetrics, Role,
    SalaryRange, Submission, SubmissionDraft, SubmissionId, SubmissionStatus, Urgency, UserId,
    UserProfile,
};
pub use events::{
    AuthError, Channel, ConnectError, Delivery, EventBus, EventBusConfig, IdentityVerifier,
    JoinOutcome, OutboundEvent, PublishReport, Session, SessionState, StaticTokenVerifier,
};
pub use matching::{AgencyMatch, MatchResult, MatchSelector, ScoringEngine};
pub use ranking::CandidateRankingEngine;
pub use repository::{InMemoryMarketplaceRepository, MarketplaceRepository, RepositoryError};
pub use router::marketplace_router;
pub use service::{MarketplaceService, MarketplaceServiceError, SubmissionReceipt};
