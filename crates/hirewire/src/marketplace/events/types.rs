use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::domain::{ChatMessage, JobId, SubmissionId, SubmissionStatus, UserId};

/// Logical routing key for event delivery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum Channel {
    Personal(UserId),
    Job(JobId),
    Global,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Personal(user_id) => write!(f, "user:{user_id}"),
            Channel::Job(job_id) => write!(f, "job-{job_id}"),
            Channel::Global => f.write_str("global"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPublished {
    pub job_id: JobId,
    pub title: String,
    pub client_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatched {
    pub job_id: JobId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionStatusUpdated {
    pub submission_id: SubmissionId,
    pub status: SubmissionStatus,
    pub candidate_name: String,
}

/// Named event handed to the transport, serialized as `{"event", "payload"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum OutboundEvent {
    #[serde(rename = "JOB_PUBLISHED")]
    JobPublished(JobPublished),
    #[serde(rename = "JOB_MATCHED")]
    JobMatched(JobMatched),
    #[serde(rename = "SUBMISSION_STATUS_UPDATED")]
    SubmissionStatusUpdated(SubmissionStatusUpdated),
    #[serde(rename = "new-message")]
    NewMessage(ChatMessage),
}

impl OutboundEvent {
    pub const fn name(&self) -> &'static str {
        match self {
            OutboundEvent::JobPublished(_) => "JOB_PUBLISHED",
            OutboundEvent::JobMatched(_) => "JOB_MATCHED",
            OutboundEvent::SubmissionStatusUpdated(_) => "SUBMISSION_STATUS_UPDATED",
            OutboundEvent::NewMessage(_) => "new-message",
        }
    }
}

/// Event as received by a session, stamped by the bus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delivery {
    pub sequence: u64,
    pub published_at: DateTime<Utc>,
    pub channel: Channel,
    pub event: OutboundEvent,
}
