use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use super::commission::{CommissionCalculator, CommissionQuote};
use super::dispatcher::NotificationDispatcher;
use super::domain::{
    ChatMessage, Identity, Job, JobDraft, JobId, JobStatus, KycStatus, MessageDraft, MessageId,
    PaymentId, PaymentRecord, PaymentStatus, Role, Submission, SubmissionDraft, SubmissionId,
    SubmissionStatus, Urgency, UserId, UserProfile,
};
use super::events::EventBus;
use super::matching::MatchSelector;
use super::ranking::CandidateRankingEngine;
use super::repository::{MarketplaceRepository, RepositoryError};

const FALLBACK_CLIENT_NAME: &str = "Enterprise Client";

/// Submission as stored, plus the one-line fit summary for the agency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionReceipt {
    #[serde(flatten)]
    pub submission: Submission,
    pub insight: String,
}

/// Request-handling facade that triggers matching, ranking, pricing and notifications.
pub struct MarketplaceService<R> {
    repository: Arc<R>,
    selector: MatchSelector,
    ranking: CandidateRankingEngine,
    commission: CommissionCalculator,
    dispatcher: NotificationDispatcher,
}

impl<R> MarketplaceService<R>
where
    R: MarketplaceRepository + 'static,
{
    pub fn new(repository: Arc<R>, bus: EventBus) -> Self {
        Self {
            repository,
            selector: MatchSelector::default(),
            ranking: CandidateRankingEngine::new(),
            commission: CommissionCalculator::new(),
            dispatcher: NotificationDispatcher::new(bus),
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn bus(&self) -> &EventBus {
        self.dispatcher.bus()
    }

    /// Persist a client's job as pending review and announce it globally.
    pub fn create_job(
        &self,
        client: &Identity,
        draft: JobDraft,
    ) -> Result<Job, MarketplaceServiceError> {
        require_role(client, Role::Client)?;

        let client_name = self
            .repository
            .fetch_user(&client.user_id)?
            .map(|profile| profile.name)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_CLIENT_NAME.to_string());

        let job = Job::from_draft(client.user_id.clone(), client_name, draft);
        let job = self.repository.insert_job(job)?;
        info!(job_id = %job.id, client = %client.user_id, "job created");

        self.dispatcher.job_published(&job);
        Ok(job)
    }

    /// Admin review. Activation selects and notifies the best-fit agencies.
    pub fn review_job(
        &self,
        admin: &Identity,
        job_id: &JobId,
        target: JobStatus,
    ) -> Result<Job, MarketplaceServiceError> {
        require_admin(admin)?;

        let pool = if target == JobStatus::Active {
            self.repository.matchable_agencies()?
        } else {
            Vec::new()
        };

        let (job, matches) = self.modify_job(job_id, |job| {
            if !job.status.can_transition_to(target) {
                return Err(MarketplaceServiceError::InvalidJobTransition {
                    from: job.status,
                    to: target,
                });
            }
            job.status = target;

            let matches = (target == JobStatus::Active).then(|| {
                let matches = self.selector.select_matches(job, &pool);
                job.matched_agencies = matches.entries().to_vec();
                matches
            });
            Ok((job.clone(), matches))
        })?;

        let Some(matches) = matches else {
            info!(job_id = %job.id, status = target.label(), "job reviewed");
            return Ok(job);
        };

        info!(
            job_id = %job.id,
            pool = pool.len(),
            matched = matches.len(),
            "job activated"
        );
        self.dispatcher.job_matched(&job, &matches);
        Ok(job)
    }

    pub fn review_kyc(
        &self,
        admin: &Identity,
        user_id: &UserId,
        decision: KycStatus,
    ) -> Result<UserProfile, MarketplaceServiceError> {
        require_admin(admin)?;
        if decision == KycStatus::Pending {
            return Err(MarketplaceServiceError::InvalidKycDecision);
        }

        let user = self
            .repository
            .modify_user(user_id, |user| -> Result<_, MarketplaceServiceError> {
                user.kyc_status = decision;
                Ok(user.clone())
            })
            .map_err(|err| not_found_as(err, MarketplaceServiceError::UserNotFound))?;
        info!(user = %user_id, decision = ?decision, "kyc reviewed");
        Ok(user)
    }

    /// Recruiters and clients still waiting on a KYC decision.
    pub fn pending_kyc(
        &self,
        admin: &Identity,
    ) -> Result<Vec<UserProfile>, MarketplaceServiceError> {
        require_admin(admin)?;
        Ok(self.repository.users_with_kyc(KycStatus::Pending)?)
    }

    pub fn users(&self, admin: &Identity) -> Result<Vec<UserProfile>, MarketplaceServiceError> {
        require_admin(admin)?;
        Ok(self.repository.users()?)
    }

    /// Record a candidate against an active job. The ranking score is fixed here.
    pub fn submit_candidate(
        &self,
        agency: &Identity,
        draft: SubmissionDraft,
    ) -> Result<SubmissionReceipt, MarketplaceServiceError> {
        require_role(agency, Role::Recruiter)?;

        let SubmissionDraft {
            job_id,
            candidate,
            resume_url,
            agency_remarks,
        } = draft;

        let submission = self.modify_job(&job_id, |job| {
            if job.status != JobStatus::Active {
                return Err(MarketplaceServiceError::JobNotOpen(job.id.clone()));
            }
            job.submissions_count += 1;

            Ok(Submission {
                id: SubmissionId::generate(),
                job_id: job.id.clone(),
                agency_id: agency.user_id.clone(),
                ranking_score: self.ranking.rank(&candidate, job),
                candidate,
                resume_url,
                status: SubmissionStatus::Submitted,
                agency_remarks,
                created_at: Utc::now(),
            })
        })?;

        let submission = match self.repository.insert_submission(submission) {
            Ok(submission) => submission,
            Err(err) => {
                self.release_submission_slot(&job_id);
                return Err(err.into());
            }
        };
        let ranking_score = submission.ranking_score;

        info!(
            submission_id = %submission.id,
            job_id = %submission.job_id,
            agency = %agency.user_id,
            ranking_score,
            "candidate submitted"
        );

        Ok(SubmissionReceipt {
            insight: CandidateRankingEngine::insight(ranking_score),
            submission,
        })
    }

    /// Move a submission along its pipeline and notify the submitting agency.
    pub fn update_submission_status(
        &self,
        actor: &Identity,
        submission_id: &SubmissionId,
        status: SubmissionStatus,
    ) -> Result<Submission, MarketplaceServiceError> {
        let current = self
            .repository
            .fetch_submission(submission_id)?
            .ok_or(MarketplaceServiceError::SubmissionNotFound)?;
        let job = self.load_job(&current.job_id)?;
        require_owner_or_admin(actor, &job)?;

        let submission = self
            .repository
            .modify_submission(submission_id, |submission| {
                if !submission.status.can_transition_to(status) {
                    return Err(MarketplaceServiceError::InvalidSubmissionTransition {
                        from: submission.status,
                        to: status,
                    });
                }
                submission.status = status;
                Ok(submission.clone())
            })
            .map_err(|err| not_found_as(err, MarketplaceServiceError::SubmissionNotFound))?;
        info!(
            submission_id = %submission.id,
            status = status.label(),
            "submission status updated"
        );

        self.dispatcher.submission_status_updated(&submission);
        Ok(submission)
    }

    /// The sender is always the authenticated identity.
    pub fn send_message(
        &self,
        sender: &Identity,
        draft: MessageDraft,
    ) -> Result<ChatMessage, MarketplaceServiceError> {
        let message = ChatMessage {
            id: MessageId::generate(),
            job_id: draft.job_id,
            from_id: sender.user_id.clone(),
            to_id: draft.to_id,
            content: draft.content,
            read: false,
            created_at: Utc::now(),
        };
        let message = self.repository.insert_message(message)?;

        self.dispatcher.chat_message(&message);
        Ok(message)
    }

    pub fn quote_commission(
        &self,
        annual_salary: Decimal,
        urgency: Urgency,
        agency_rating: Option<Decimal>,
    ) -> CommissionQuote {
        self.commission.quote(annual_salary, urgency, agency_rating)
    }

    /// Price a placement with the job's urgency and record it as pending.
    pub fn create_payment_intent(
        &self,
        actor: &Identity,
        job_id: &JobId,
        agency_id: &UserId,
        annual_salary: Decimal,
        agency_rating: Option<Decimal>,
    ) -> Result<PaymentRecord, MarketplaceServiceError> {
        let job = self.load_job(job_id)?;
        require_owner_or_admin(actor, &job)?;

        let amount = self
            .commission
            .commission(annual_salary, job.urgency, agency_rating);
        let payment = PaymentRecord {
            id: PaymentId::generate(),
            job_id: job.id,
            agency_id: agency_id.clone(),
            amount,
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
        };
        let payment = self.repository.insert_payment(payment)?;
        info!(payment_id = %payment.id, amount = %payment.amount, "payment intent created");
        Ok(payment)
    }

    pub fn active_jobs(&self) -> Result<Vec<Job>, MarketplaceServiceError> {
        Ok(self.repository.jobs_with_status(JobStatus::Active)?)
    }

    pub fn pending_jobs(&self, admin: &Identity) -> Result<Vec<Job>, MarketplaceServiceError> {
        require_admin(admin)?;
        Ok(self.repository.jobs_with_status(JobStatus::Pending)?)
    }

    pub fn client_jobs(&self, client: &Identity) -> Result<Vec<Job>, MarketplaceServiceError> {
        Ok(self.repository.jobs_for_client(&client.user_id)?)
    }

    pub fn agency_submissions(
        &self,
        agency: &Identity,
    ) -> Result<Vec<Submission>, MarketplaceServiceError> {
        Ok(self.repository.submissions_for_agency(&agency.user_id)?)
    }

    pub fn job_submissions(
        &self,
        actor: &Identity,
        job_id: &JobId,
    ) -> Result<Vec<Submission>, MarketplaceServiceError> {
        let job = self.load_job(job_id)?;
        require_owner_or_admin(actor, &job)?;
        Ok(self.repository.submissions_for_job(job_id)?)
    }

    /// Messages on a job the viewer sent or received, oldest first.
    pub fn job_messages(
        &self,
        viewer: &Identity,
        job_id: &JobId,
    ) -> Result<Vec<ChatMessage>, MarketplaceServiceError> {
        let mut messages: Vec<ChatMessage> = self
            .repository
            .messages_involving(&viewer.user_id)?
            .into_iter()
            .filter(|message| &message.job_id == job_id)
            .collect();
        messages.sort_by_key(|message| message.created_at);
        Ok(messages)
    }

    /// Every message the viewer took part in, newest first.
    pub fn conversations(
        &self,
        viewer: &Identity,
    ) -> Result<Vec<ChatMessage>, MarketplaceServiceError> {
        let mut messages = self.repository.messages_involving(&viewer.user_id)?;
        messages.sort_by(|left, right| right.created_at.cmp(&left.created_at));
        Ok(messages)
    }

    pub fn payment_history(
        &self,
        viewer: &Identity,
    ) -> Result<Vec<PaymentRecord>, MarketplaceServiceError> {
        let scope = (!viewer.is_admin()).then_some(&viewer.user_id);
        Ok(self.repository.payments(scope)?)
    }

    fn load_job(&self, job_id: &JobId) -> Result<Job, MarketplaceServiceError> {
        self.repository
            .fetch_job(job_id)?
            .ok_or(MarketplaceServiceError::JobNotFound)
    }

    fn modify_job<T>(
        &self,
        job_id: &JobId,
        apply: impl FnOnce(&mut Job) -> Result<T, MarketplaceServiceError>,
    ) -> Result<T, MarketplaceServiceError> {
        self.repository
            .modify_job(job_id, apply)
            .map_err(|err| not_found_as(err, MarketplaceServiceError::JobNotFound))
    }

    fn release_submission_slot(&self, job_id: &JobId) {
        let released = self.repository.modify_job(job_id, |job| {
            job.submissions_count = job.submissions_count.saturating_sub(1);
            Ok::<_, RepositoryError>(())
        });
        if let Err(err) = released {
            warn!(
                job_id = %job_id,
                error = %err,
                "submission count left ahead of stored submissions"
            );
        }
    }
}

fn not_found_as(
    err: MarketplaceServiceError,
    missing: MarketplaceServiceError,
) -> MarketplaceServiceError {
    match err {
        MarketplaceServiceError::Repository(RepositoryError::NotFound) => missing,
        other => other,
    }
}

fn require_role(identity: &Identity, role: Role) -> Result<(), MarketplaceServiceError> {
    if identity.role == role {
        Ok(())
    } else {
        warn!(user = %identity.user_id, required = ?role, "role check failed");
        Err(MarketplaceServiceError::Forbidden)
    }
}

fn require_admin(identity: &Identity) -> Result<(), MarketplaceServiceError> {
    require_role(identity, Role::Admin)
}

fn require_owner_or_admin(identity: &Identity, job: &Job) -> Result<(), MarketplaceServiceError> {
    if identity.is_admin() || identity.user_id == job.company_id {
        Ok(())
    } else {
        warn!(user = %identity.user_id, job_id = %job.id, "job ownership check failed");
        Err(MarketplaceServiceError::Forbidden)
    }
}

/// Error raised by the marketplace service.
#[derive(Debug, thiserror::Error)]
pub enum MarketplaceServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("job not found")]
    JobNotFound,
    #[error("submission not found")]
    SubmissionNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("job {0} is not open for submissions")]
    JobNotOpen(JobId),
    #[error("job cannot move from {} to {}", .from.label(), .to.label())]
    InvalidJobTransition { from: JobStatus, to: JobStatus },
    #[error("submission cannot move from {} to {}", .from.label(), .to.label())]
    InvalidSubmissionTransition {
        from: SubmissionStatus,
        to: SubmissionStatus,
    },
    #[error("kyc decision must be APPROVED or REJECTED")]
    InvalidKycDecision,
    #[error("operation not permitted for this identity")]
    Forbidden,
}
