use parking_lot::RwLock;

use super::domain::{
    Agency, ChatMessage, Job, JobId, JobStatus, KycStatus, PaymentRecord, Submission,
    SubmissionId, UserId, UserProfile,
};

/// Storage abstraction for the flat marketplace records.
///
/// Listing methods return records in insertion order; the agency pool order
/// decides tie-breaks during matching.
///
/// The `modify_*` methods apply `apply` to the stored record atomically with
/// respect to every other write. The record is only replaced when `apply`
/// returns `Ok`; a missing record yields `RepositoryError::NotFound`.
pub trait MarketplaceRepository: Send + Sync {
    fn fetch_user(&self, id: &UserId) -> Result<Option<UserProfile>, RepositoryError>;
    fn modify_user<T, E>(
        &self,
        id: &UserId,
        apply: impl FnOnce(&mut UserProfile) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<RepositoryError>,
        Self: Sized;
    fn users(&self) -> Result<Vec<UserProfile>, RepositoryError>;
    fn users_with_kyc(&self, status: KycStatus) -> Result<Vec<UserProfile>, RepositoryError>;
    fn matchable_agencies(&self) -> Result<Vec<Agency>, RepositoryError>;

    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError>;
    fn modify_job<T, E>(
        &self,
        id: &JobId,
        apply: impl FnOnce(&mut Job) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<RepositoryError>,
        Self: Sized;
    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError>;
    fn jobs_with_status(&self, status: JobStatus) -> Result<Vec<Job>, RepositoryError>;
    fn jobs_for_client(&self, client: &UserId) -> Result<Vec<Job>, RepositoryError>;

    fn insert_submission(&self, submission: Submission) -> Result<Submission, RepositoryError>;
    fn modify_submission<T, E>(
        &self,
        id: &SubmissionId,
        apply: impl FnOnce(&mut Submission) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<RepositoryError>,
        Self: Sized;
    fn fetch_submission(&self, id: &SubmissionId) -> Result<Option<Submission>, RepositoryError>;
    fn submissions_for_agency(&self, agency: &UserId) -> Result<Vec<Submission>, RepositoryError>;
    fn submissions_for_job(&self, job: &JobId) -> Result<Vec<Submission>, RepositoryError>;

    fn insert_message(&self, message: ChatMessage) -> Result<ChatMessage, RepositoryError>;
    fn messages_involving(&self, user: &UserId) -> Result<Vec<ChatMessage>, RepositoryError>;

    fn insert_payment(&self, payment: PaymentRecord) -> Result<PaymentRecord, RepositoryError>;
    /// All payments, or only those owed to `agency` when given.
    fn payments(&self, agency: Option<&UserId>) -> Result<Vec<PaymentRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[derive(Default)]
struct Tables {
    users: Vec<UserProfile>,
    jobs: Vec<Job>,
    submissions: Vec<Submission>,
    messages: Vec<ChatMessage>,
    payments: Vec<PaymentRecord>,
}

/// Process-local repository used by the API binary, demos and tests.
#[derive(Default)]
pub struct InMemoryMarketplaceRepository {
    tables: RwLock<Tables>,
}

impl InMemoryMarketplaceRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = UserProfile>) -> Self {
        let repository = Self::default();
        repository.tables.write().users.extend(users);
        repository
    }
}

fn insert_unique<T: Clone>(
    rows: &mut Vec<T>,
    row: T,
    same: impl Fn(&T, &T) -> bool,
) -> Result<T, RepositoryError> {
    if rows.iter().any(|existing| same(existing, &row)) {
        return Err(RepositoryError::Conflict);
    }
    rows.push(row.clone());
    Ok(row)
}

fn modify_row<R: Clone, T, E>(
    rows: &mut [R],
    matches: impl Fn(&R) -> bool,
    apply: impl FnOnce(&mut R) -> Result<T, E>,
) -> Result<T, E>
where
    E: From<RepositoryError>,
{
    let slot = rows
        .iter_mut()
        .find(|row| matches(row))
        .ok_or(RepositoryError::NotFound)?;
    let mut staged = slot.clone();
    let outcome = apply(&mut staged)?;
    *slot = staged;
    Ok(outcome)
}

impl MarketplaceRepository for InMemoryMarketplaceRepository {
    fn fetch_user(&self, id: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        let tables = self.tables.read();
        Ok(tables.users.iter().find(|user| &user.id == id).cloned())
    }

    fn modify_user<T, E>(
        &self,
        id: &UserId,
        apply: impl FnOnce(&mut UserProfile) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<RepositoryError>,
    {
        modify_row(&mut self.tables.write().users, |user| &user.id == id, apply)
    }

    fn users(&self) -> Result<Vec<UserProfile>, RepositoryError> {
        Ok(self.tables.read().users.clone())
    }

    fn users_with_kyc(&self, status: KycStatus) -> Result<Vec<UserProfile>, RepositoryError> {
        let tables = self.tables.read();
        Ok(tables
            .users
            .iter()
            .filter(|user| user.kyc_status == status)
            .cloned()
            .collect())
    }

    fn matchable_agencies(&self) -> Result<Vec<Agency>, RepositoryError> {
        let tables = self.tables.read();
        Ok(tables
            .users
            .iter()
            .filter(|user| user.is_matchable())
            .cloned()
            .collect())
    }

    fn insert_job(&self, job: Job) -> Result<Job, RepositoryError> {
        insert_unique(&mut self.tables.write().jobs, job, |a, b| a.id == b.id)
    }

    fn modify_job<T, E>(
        &self,
        id: &JobId,
        apply: impl FnOnce(&mut Job) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<RepositoryError>,
    {
        modify_row(&mut self.tables.write().jobs, |job| &job.id == id, apply)
    }

    fn fetch_job(&self, id: &JobId) -> Result<Option<Job>, RepositoryError> {
        let tables = self.tables.read();
        Ok(tables.jobs.iter().find(|job| &job.id == id).cloned())
    }

    fn jobs_with_status(&self, status: JobStatus) -> Result<Vec<Job>, RepositoryError> {
        let tables = self.tables.read();
        Ok(tables
            .jobs
            .iter()
            .filter(|job| job.status == status)
            .cloned()
            .collect())
    }

    fn jobs_for_client(&self, client: &UserId) -> Result<Vec<Job>, RepositoryError> {
        let tables = self.tables.read();
        Ok(tables
            .jobs
            .iter()
            .filter(|job| &job.company_id == client)
            .cloned()
            .collect())
    }

    fn insert_submission(&self, submission: Submission) -> Result<Submission, RepositoryError> {
        insert_unique(&mut self.tables.write().submissions, submission, |a, b| {
            a.id == b.id
        })
    }

    fn modify_submission<T, E>(
        &self,
        id: &SubmissionId,
        apply: impl FnOnce(&mut Submission) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<RepositoryError>,
    {
        modify_row(
            &mut self.tables.write().submissions,
            |submission| &submission.id == id,
            apply,
        )
    }

    fn fetch_submission(&self, id: &SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        let tables = self.tables.read();
        Ok(tables
            .submissions
            .iter()
            .find(|submission| &submission.id == id)
            .cloned())
    }

    fn submissions_for_agency(&self, agency: &UserId) -> Result<Vec<Submission>, RepositoryError> {
        let tables = self.tables.read();
        Ok(tables
            .submissions
            .iter()
            .filter(|submission| &submission.agency_id == agency)
            .cloned()
            .collect())
    }

    fn submissions_for_job(&self, job: &JobId) -> Result<Vec<Submission>, RepositoryError> {
        let tables = self.tables.read();
        Ok(tables
            .submissions
            .iter()
            .filter(|submission| &submission.job_id == job)
            .cloned()
            .collect())
    }

    fn insert_message(&self, message: ChatMessage) -> Result<ChatMessage, RepositoryError> {
        insert_unique(&mut self.tables.write().messages, message, |a, b| {
            a.id == b.id
        })
    }

    fn messages_involving(&self, user: &UserId) -> Result<Vec<ChatMessage>, RepositoryError> {
        let tables = self.tables.read();
        Ok(tables
            .messages
            .iter()
            .filter(|message| message.involves(user))
            .cloned()
            .collect())
    }

    fn insert_payment(&self, payment: PaymentRecord) -> Result<PaymentRecord, RepositoryError> {
        insert_unique(&mut self.tables.write().payments, payment, |a, b| {
            a.id == b.id
        })
    }

    fn payments(&self, agency: Option<&UserId>) -> Result<Vec<PaymentRecord>, RepositoryError> {
        let tables = self.tables.read();
        Ok(tables
            .payments
            .iter()
            .filter(|payment| agency.map_or(true, |id| &payment.agency_id == id))
            .cloned()
            .collect())
    }
}
