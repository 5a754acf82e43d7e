use tracing::info;

use super::domain::{ChatMessage, Job, Submission};
use super::events::{
    Channel, EventBus, JobMatched, JobPublished, OutboundEvent, PublishReport,
    SubmissionStatusUpdated,
};
use super::matching::MatchResult;

/// Maps domain transitions onto outbound events and their channels.
///
/// Notifications for one transition are published synchronously, in order.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    bus: EventBus,
}

impl NotificationDispatcher {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn job_published(&self, job: &Job) -> PublishReport {
        let event = OutboundEvent::JobPublished(JobPublished {
            job_id: job.id.clone(),
            title: job.title.clone(),
            client_name: job.client_name.clone(),
        });
        self.bus.publish(&Channel::Global, event)
    }

    /// One targeted notification per matched agency, in rank order.
    pub fn job_matched(&self, job: &Job, matches: &MatchResult) -> Vec<PublishReport> {
        let reports: Vec<PublishReport> = matches
            .agency_ids()
            .map(|agency_id| {
                let event = OutboundEvent::JobMatched(JobMatched {
                    job_id: job.id.clone(),
                    title: job.title.clone(),
                });
                self.bus
                    .publish(&Channel::Personal(agency_id.clone()), event)
            })
            .collect();

        info!(
            job_id = %job.id,
            notified = reports.len(),
            online = reports.iter().filter(|report| report.delivered > 0).count(),
            "matched agencies notified"
        );
        reports
    }

    pub fn submission_status_updated(&self, submission: &Submission) -> PublishReport {
        let event = OutboundEvent::SubmissionStatusUpdated(SubmissionStatusUpdated {
            submission_id: submission.id.clone(),
            status: submission.status,
            candidate_name: submission.candidate.name.clone(),
        });
        self.bus
            .publish(&Channel::Personal(submission.agency_id.clone()), event)
    }

    /// Job-room broadcast first, then the recipient's personal channel.
    pub fn chat_message(&self, message: &ChatMessage) -> [PublishReport; 2] {
        let room = self.bus.publish(
            &Channel::Job(message.job_id.clone()),
            OutboundEvent::NewMessage(message.clone()),
        );
        let recipient = self.bus.publish(
            &Channel::Personal(message.to_id.clone()),
            OutboundEvent::NewMessage(message.clone()),
        );
        [room, recipient]
    }
}
