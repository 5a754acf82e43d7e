use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::matching::AgencyMatch;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Fresh identifier for records created by this service.
            pub fn generate() -> Self {
                Self(format!(concat!($prefix, "-{}"), Uuid::new_v4().simple()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identity of any marketplace user (client, agency or admin).
    UserId,
    "usr"
);
string_id!(JobId, "job");
string_id!(SubmissionId, "sub");
string_id!(MessageId, "msg");
string_id!(PaymentId, "pay");

/// Role attached to an authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Client,
    Recruiter,
    Admin,
}

/// Identity established by the authentication collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Hiring urgency declared by the client; drives commission pricing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    #[default]
    Normal,
    High,
    Critical,
}

impl Urgency {
    pub const fn label(self) -> &'static str {
        match self {
            Urgency::Normal => "normal",
            Urgency::High => "high",
            Urgency::Critical => "critical",
        }
    }
}

impl std::str::FromStr for Urgency {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Urgency::Normal),
            "high" => Ok(Urgency::High),
            "critical" => Ok(Urgency::Critical),
            other => Err(format!(
                "unknown urgency '{other}' (expected normal, high or critical)"
            )),
        }
    }
}

/// Job lifecycle tracked from client creation through admin review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Draft,
    Pending,
    Active,
    Rejected,
    Closed,
}

impl JobStatus {
    pub const fn label(self) -> &'static str {
        match self {
            JobStatus::Draft => "DRAFT",
            JobStatus::Pending => "PENDING",
            JobStatus::Active => "ACTIVE",
            JobStatus::Rejected => "REJECTED",
            JobStatus::Closed => "CLOSED",
        }
    }

    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Active)
                | (JobStatus::Pending, JobStatus::Rejected)
                | (JobStatus::Pending, JobStatus::Closed)
                | (JobStatus::Active, JobStatus::Closed)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: u32,
    pub max: u32,
}

/// Client input for a new job posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
    pub salary_range: SalaryRange,
    pub location: String,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub anonymous: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub company_id: UserId,
    pub client_name: String,
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
    pub salary_range: SalaryRange,
    pub location: String,
    pub urgency: Urgency,
    pub anonymous: bool,
    pub status: JobStatus,
    pub submissions_count: u32,
    pub matched_agencies: Vec<AgencyMatch>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn from_draft(company_id: UserId, client_name: String, draft: JobDraft) -> Self {
        Self {
            id: JobId::generate(),
            company_id,
            client_name,
            title: draft.title,
            description: draft.description,
            skills: draft.skills,
            salary_range: draft.salary_range,
            location: draft.location,
            urgency: draft.urgency,
            anonymous: draft.anonymous,
            status: JobStatus::Pending,
            submissions_count: 0,
            matched_agencies: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// Agency verification state maintained by admins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    /// Percentage in `[0, 100]`.
    pub success_rate: f64,
    /// Percentage in `[0, 100]`.
    pub sourcing_accuracy: f64,
    /// Days.
    pub avg_time_to_fill: f64,
}

/// Marketplace user profile. Agencies carry specialization and performance data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub role: Role,
    pub kyc_status: KycStatus,
    pub location: Option<String>,
    #[serde(default)]
    pub specialization: Vec<String>,
    #[serde(default)]
    pub performance: PerformanceMetrics,
}

/// Agencies are users with the recruiter role.
pub type Agency = UserProfile;

impl UserProfile {
    /// Only KYC-approved recruiters are eligible for job matching.
    pub fn is_matchable(&self) -> bool {
        self.role == Role::Recruiter && self.kyc_status == KycStatus::Approved
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub skills: Vec<String>,
    /// Years of experience.
    pub experience: f64,
    pub salary_expectation: u32,
}

/// Candidate submission lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    Submitted,
    Shortlisted,
    Interview,
    Hired,
    Rejected,
}

impl SubmissionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SubmissionStatus::Submitted => "SUBMITTED",
            SubmissionStatus::Shortlisted => "SHORTLISTED",
            SubmissionStatus::Interview => "INTERVIEW",
            SubmissionStatus::Hired => "HIRED",
            SubmissionStatus::Rejected => "REJECTED",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, SubmissionStatus::Hired | SubmissionStatus::Rejected)
    }

    pub fn can_transition_to(self, next: SubmissionStatus) -> bool {
        match (self, next) {
            (SubmissionStatus::Submitted, SubmissionStatus::Shortlisted)
            | (SubmissionStatus::Shortlisted, SubmissionStatus::Interview)
            | (SubmissionStatus::Interview, SubmissionStatus::Hired) => true,
            (current, SubmissionStatus::Rejected) => !current.is_terminal(),
            _ => false,
        }
    }
}

/// Agency input for a candidate submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDraft {
    pub job_id: JobId,
    pub candidate: CandidateProfile,
    pub resume_url: String,
    #[serde(default)]
    pub agency_remarks: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: SubmissionId,
    pub job_id: JobId,
    pub agency_id: UserId,
    pub candidate: CandidateProfile,
    pub resume_url: String,
    pub status: SubmissionStatus,
    /// Fixed at submission time; never recomputed.
    pub ranking_score: u8,
    pub agency_remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDraft {
    pub job_id: JobId,
    pub to_id: UserId,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub job_id: JobId,
    pub from_id: UserId,
    pub to_id: UserId,
    pub content: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn involves(&self, user: &UserId) -> bool {
        &self.from_id == user || &self.to_id == user
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

/// Commission owed for a placement. Settlement happens elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: PaymentId,
    pub job_id: JobId,
    pub agency_id: UserId,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}
