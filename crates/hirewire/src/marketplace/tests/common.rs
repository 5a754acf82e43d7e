use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::marketplace::domain::{
    Agency, CandidateProfile, ChatMessage, Identity, Job, JobDraft, JobId, JobStatus, KycStatus,
    PaymentRecord, PerformanceMetrics, Role, SalaryRange, Submission, SubmissionId, Urgency,
    UserId, UserProfile,
};
use crate::marketplace::events::{EventBus, EventBusConfig, StaticTokenVerifier};
use crate::marketplace::repository::{
    InMemoryMarketplaceRepository, MarketplaceRepository, RepositoryError,
};
use crate::marketplace::MarketplaceService;

pub(super) const CLIENT_TOKEN: &str = "client-token";
pub(super) const AGENCY_TOKEN: &str = "agency-token";
pub(super) const RIVAL_TOKEN: &str = "rival-token";
pub(super) const ADMIN_TOKEN: &str = "admin-token";

pub(super) fn client() -> Identity {
    Identity::new(UserId::new("client-acme"), Role::Client)
}

pub(super) fn agency_identity() -> Identity {
    Identity::new(UserId::new("agency-north"), Role::Recruiter)
}

pub(super) fn rival_identity() -> Identity {
    Identity::new(UserId::new("agency-south"), Role::Recruiter)
}

pub(super) fn admin() -> Identity {
    Identity::new(UserId::new("admin-root"), Role::Admin)
}

pub(super) fn verifier() -> StaticTokenVerifier {
    StaticTokenVerifier::new()
        .with_token(CLIENT_TOKEN, client())
        .with_token(AGENCY_TOKEN, agency_identity())
        .with_token(RIVAL_TOKEN, rival_identity())
        .with_token(ADMIN_TOKEN, admin())
}

pub(super) fn bus() -> EventBus {
    bus_with_buffer(EventBusConfig::DEFAULT_SESSION_BUFFER)
}

pub(super) fn bus_with_buffer(session_buffer: usize) -> EventBus {
    EventBus::new(Arc::new(verifier()), EventBusConfig { session_buffer })
}

pub(super) fn draft(skills: &[&str], location: &str, urgency: Urgency) -> JobDraft {
    JobDraft {
        title: "Senior Platform Engineer".to_string(),
        description: "Own the deployment platform".to_string(),
        skills: skills.iter().map(|skill| skill.to_string()).collect(),
        salary_range: SalaryRange {
            min: 90_000,
            max: 120_000,
        },
        location: location.to_string(),
        urgency,
        anonymous: false,
    }
}

pub(super) fn active_job(skills: &[&str], location: &str) -> Job {
    let mut job = Job::from_draft(
        client().user_id,
        "Acme Corp".to_string(),
        draft(skills, location, Urgency::Normal),
    );
    job.status = JobStatus::Active;
    job
}

pub(super) fn agency(
    id: &str,
    specialization: &[&str],
    location: Option<&str>,
    success_rate: f64,
    sourcing_accuracy: f64,
) -> Agency {
    UserProfile {
        id: UserId::new(id),
        name: format!("{id} recruiting"),
        role: Role::Recruiter,
        kyc_status: KycStatus::Approved,
        location: location.map(str::to_string),
        specialization: specialization.iter().map(|tag| tag.to_string()).collect(),
        performance: PerformanceMetrics {
            success_rate,
            sourcing_accuracy,
            avg_time_to_fill: 21.0,
        },
    }
}

pub(super) fn candidate(skills: &[&str], experience: f64) -> CandidateProfile {
    CandidateProfile {
        name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        phone: "+44 20 7946 0000".to_string(),
        skills: skills.iter().map(|skill| skill.to_string()).collect(),
        experience,
        salary_expectation: 110_000,
    }
}

/// Users known to the seeded repository.
pub(super) fn seeded_users() -> Vec<UserProfile> {
    let mut pending = agency("agency-unverified", &["react", "node"], Some("Berlin"), 99.0, 99.0);
    pending.kyc_status = KycStatus::Pending;

    vec![
        UserProfile {
            id: client().user_id,
            name: "Acme Corp".to_string(),
            role: Role::Client,
            kyc_status: KycStatus::Approved,
            location: Some("Berlin".to_string()),
            specialization: Vec::new(),
            performance: PerformanceMetrics::default(),
        },
        agency("agency-north", &["react", "node", "aws"], Some("Berlin"), 90.0, 80.0),
        agency("agency-south", &["cobol"], Some("Madrid"), 40.0, 30.0),
        pending,
    ]
}

pub(super) fn build_service() -> (
    MarketplaceService<InMemoryMarketplaceRepository>,
    Arc<InMemoryMarketplaceRepository>,
    EventBus,
) {
    let repository = Arc::new(InMemoryMarketplaceRepository::with_users(seeded_users()));
    let bus = bus();
    let service = MarketplaceService::new(repository.clone(), bus.clone());
    (service, repository, bus)
}

pub(super) struct UnavailableRepository;

fn offline<T, E: From<RepositoryError>>() -> Result<T, E> {
    Err(RepositoryError::Unavailable("database offline".to_string()).into())
}

impl MarketplaceRepository for UnavailableRepository {
    fn fetch_user(&self, _id: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        offline()
    }

    fn modify_user<T, E>(
        &self,
        _id: &UserId,
        _apply: impl FnOnce(&mut UserProfile) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<RepositoryError>,
    {
        offline()
    }

    fn users(&self) -> Result<Vec<UserProfile>, RepositoryError> {
        offline()
    }

    fn users_with_kyc(&self, _status: KycStatus) -> Result<Vec<UserProfile>, RepositoryError> {
        offline()
    }

    fn matchable_agencies(&self) -> Result<Vec<Agency>, RepositoryError> {
        offline()
    }

    fn insert_job(&self, _job: Job) -> Result<Job, RepositoryError> {
        offline()
    }

    fn modify_job<T, E>(
        &self,
        _id: &JobId,
        _apply: impl FnOnce(&mut Job) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<RepositoryError>,
    {
        offline()
    }

    fn fetch_job(&self, _id: &JobId) -> Result<Option<Job>, RepositoryError> {
        offline()
    }

    fn jobs_with_status(&self, _status: JobStatus) -> Result<Vec<Job>, RepositoryError> {
        offline()
    }

    fn jobs_for_client(&self, _client: &UserId) -> Result<Vec<Job>, RepositoryError> {
        offline()
    }

    fn insert_submission(&self, _submission: Submission) -> Result<Submission, RepositoryError> {
        offline()
    }

    fn modify_submission<T, E>(
        &self,
        _id: &SubmissionId,
        _apply: impl FnOnce(&mut Submission) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<RepositoryError>,
    {
        offline()
    }

    fn fetch_submission(&self, _id: &SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        offline()
    }

    fn submissions_for_agency(&self, _agency: &UserId) -> Result<Vec<Submission>, RepositoryError> {
        offline()
    }

    fn submissions_for_job(&self, _job: &JobId) -> Result<Vec<Submission>, RepositoryError> {
        offline()
    }

    fn insert_message(&self, _message: ChatMessage) -> Result<ChatMessage, RepositoryError> {
        offline()
    }

    fn messages_involving(&self, _user: &UserId) -> Result<Vec<ChatMessage>, RepositoryError> {
        offline()
    }

    fn insert_payment(&self, _payment: PaymentRecord) -> Result<PaymentRecord, RepositoryError> {
        offline()
    }

    fn payments(&self, _agency: Option<&UserId>) -> Result<Vec<PaymentRecord>, RepositoryError> {
        offline()
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
