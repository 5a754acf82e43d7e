use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    Identity, JobDraft, JobId, JobStatus, KycStatus, MessageDraft, SubmissionDraft, SubmissionId,
    SubmissionStatus, Urgency, UserId,
};
use super::events::{AuthError, IdentityVerifier};
use super::repository::{MarketplaceRepository, RepositoryError};
use super::service::{MarketplaceService, MarketplaceServiceError};

/// Shared handler state: the service facade plus the credential verifier.
pub struct MarketplaceState<R> {
    pub service: Arc<MarketplaceService<R>>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

impl<R> Clone for MarketplaceState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            verifier: Arc::clone(&self.verifier),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobReviewRequest {
    pub(crate) status: JobStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct KycReviewRequest {
    pub(crate) status: KycStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmissionStatusRequest {
    pub(crate) status: SubmissionStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaymentIntentRequest {
    pub(crate) job_id: JobId,
    pub(crate) agency_id: UserId,
    pub(crate) annual_salary: Decimal,
    #[serde(default)]
    pub(crate) agency_rating: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommissionQuoteRequest {
    pub(crate) annual_salary: Decimal,
    #[serde(default)]
    pub(crate) urgency: Urgency,
    #[serde(default)]
    pub(crate) agency_rating: Option<Decimal>,
}

/// Router builder exposing the marketplace HTTP endpoints.
pub fn marketplace_router<R>(
    service: Arc<MarketplaceService<R>>,
    verifier: Arc<dyn IdentityVerifier>,
) -> Router
where
    R: MarketplaceRepository + 'static,
{
    let state = MarketplaceState { service, verifier };

    Router::new()
        .route(
            "/api/v1/jobs",
            post(create_job_handler::<R>).get(active_jobs_handler::<R>),
        )
        .route("/api/v1/jobs/mine", get(client_jobs_handler::<R>))
        .route(
            "/api/v1/jobs/:job_id/submissions",
            get(job_submissions_handler::<R>),
        )
        .route(
            "/api/v1/jobs/:job_id/messages",
            get(job_messages_handler::<R>),
        )
        .route("/api/v1/admin/jobs/pending", get(pending_jobs_handler::<R>))
        .route(
            "/api/v1/admin/jobs/:job_id/review",
            post(review_job_handler::<R>),
        )
        .route("/api/v1/admin/kyc/pending", get(pending_kyc_handler::<R>))
        .route("/api/v1/admin/kyc/:user_id", post(review_kyc_handler::<R>))
        .route("/api/v1/admin/users", get(users_handler::<R>))
        .route("/api/v1/submissions", post(submit_candidate_handler::<R>))
        .route(
            "/api/v1/submissions/mine",
            get(agency_submissions_handler::<R>),
        )
        .route(
            "/api/v1/submissions/:submission_id/status",
            post(submission_status_handler::<R>),
        )
        .route(
            "/api/v1/messages",
            post(send_message_handler::<R>).get(conversations_handler::<R>),
        )
        .route(
            "/api/v1/payments/intent",
            post(payment_intent_handler::<R>),
        )
        .route("/api/v1/payments", get(payment_history_handler::<R>))
        .route(
            "/api/v1/commission/quote",
            post(commission_quote_handler::<R>),
        )
        .with_state(state)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

pub(crate) fn authenticate(
    headers: &HeaderMap,
    verifier: &dyn IdentityVerifier,
) -> Result<Identity, Response> {
    let token = bearer_token(headers).ok_or(AuthError::Missing);
    token
        .and_then(|token| verifier.verify(token))
        .map_err(|err| {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
        })
}

/// HTTP status for each service failure.
pub fn status_for(error: &MarketplaceServiceError) -> StatusCode {
    match error {
        MarketplaceServiceError::JobNotFound
        | MarketplaceServiceError::SubmissionNotFound
        | MarketplaceServiceError::UserNotFound
        | MarketplaceServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        MarketplaceServiceError::Forbidden => StatusCode::FORBIDDEN,
        MarketplaceServiceError::JobNotOpen(_)
        | MarketplaceServiceError::InvalidKycDecision => StatusCode::BAD_REQUEST,
        MarketplaceServiceError::InvalidJobTransition { .. }
        | MarketplaceServiceError::InvalidSubmissionTransition { .. }
        | MarketplaceServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        MarketplaceServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub(crate) fn error_response(error: MarketplaceServiceError) -> Response {
    let payload = json!({ "error": error.to_string() });
    (status_for(&error), Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(
    status: StatusCode,
    result: Result<T, MarketplaceServiceError>,
) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

macro_rules! identity_or_reject {
    ($state:expr, $headers:expr) => {
        match authenticate(&$headers, $state.verifier.as_ref()) {
            Ok(identity) => identity,
            Err(response) => return response,
        }
    };
}

pub(crate) async fn create_job_handler<R>(
    State(state): State<MarketplaceState<R>>,
    headers: HeaderMap,
    Json(draft): Json<JobDraft>,
) -> Response
where
    R: MarketplaceRepository + 'static,
{
    let identity = identity_or_reject!(state, headers);
    respond(StatusCode::CREATED, state.service.create_job(&identity, draft))
}

pub(crate) async fn active_jobs_handler<R>(
    State(state): State<MarketplaceState<R>>,
    headers: HeaderMap,
) -> Response
where
    R: MarketplaceRepository + 'static,
{
    identity_or_reject!(state, headers);
    respond(StatusCode::OK, state.service.active_jobs())
}

pub(crate) async fn client_jobs_handler<R>(
    State(state): State<MarketplaceState<R>>,
    headers: HeaderMap,
) -> Response
where
    R: MarketplaceRepository + 'static,
{
    let identity = identity_or_reject!(state, headers);
    respond(StatusCode::OK, state.service.client_jobs(&identity))
}

pub(crate) async fn pending_jobs_handler<R>(
    State(state): State<MarketplaceState<R>>,
    headers: HeaderMap,
) -> Response
where
    R: MarketplaceRepository + 'static,
{
    let identity = identity_or_reject!(state, headers);
    respond(StatusCode::OK, state.service.pending_jobs(&identity))
}

pub(crate) async fn pending_kyc_handler<R>(
    State(state): State<MarketplaceState<R>>,
    headers: HeaderMap,
) -> Response
where
    R: MarketplaceRepository + 'static,
{
    let identity = identity_or_reject!(state, headers);
    respond(StatusCode::OK, state.service.pending_kyc(&identity))
}

pub(crate) async fn users_handler<R>(
    State(state): State<MarketplaceState<R>>,
    headers: HeaderMap,
) -> Response
where
    R: MarketplaceRepository + 'static,
{
    let identity = identity_or_reject!(state, headers);
    respond(StatusCode::OK, state.service.users(&identity))
}

pub(crate) async fn review_job_handler<R>(
    State(state): State<MarketplaceState<R>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
    Json(request): Json<JobReviewRequest>,
) -> Response
where
    R: MarketplaceRepository + 'static,
{
    let identity = identity_or_reject!(state, headers);
    respond(
        StatusCode::OK,
        state
            .service
            .review_job(&identity, &JobId(job_id), request.status),
    )
}

pub(crate) async fn review_kyc_handler<R>(
    State(state): State<MarketplaceState<R>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(request): Json<KycReviewRequest>,
) -> Response
where
    R: MarketplaceRepository + 'static,
{
    let identity = identity_or_reject!(state, headers);
    respond(
        StatusCode::OK,
        state
            .service
            .review_kyc(&identity, &UserId(user_id), request.status),
    )
}

pub(crate) async fn submit_candidate_handler<R>(
    State(state): State<MarketplaceState<R>>,
    headers: HeaderMap,
    Json(draft): Json<SubmissionDraft>,
) -> Response
where
    R: MarketplaceRepository + 'static,
{
    let identity = identity_or_reject!(state, headers);
    respond(
        StatusCode::CREATED,
        state.service.submit_candidate(&identity, draft),
    )
}

pub(crate) async fn agency_submissions_handler<R>(
    State(state): State<MarketplaceState<R>>,
    headers: HeaderMap,
) -> Response
where
    R: MarketplaceRepository + 'static,
{
    let identity = identity_or_reject!(state, headers);
    respond(StatusCode::OK, state.service.agency_submissions(&identity))
}

pub(crate) async fn job_submissions_handler<R>(
    State(state): State<MarketplaceState<R>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Response
where
    R: MarketplaceRepository + 'static,
{
    let identity = identity_or_reject!(state, headers);
    respond(
        StatusCode::OK,
        state.service.job_submissions(&identity, &JobId(job_id)),
    )
}

pub(crate) async fn submission_status_handler<R>(
    State(state): State<MarketplaceState<R>>,
    headers: HeaderMap,
    Path(submission_id): Path<String>,
    Json(request): Json<SubmissionStatusRequest>,
) -> Response
where
    R: MarketplaceRepository + 'static,
{
    let identity = identity_or_reject!(state, headers);
    respond(
        StatusCode::OK,
        state.service.update_submission_status(
            &identity,
            &SubmissionId(submission_id),
            request.status,
        ),
    )
}

pub(crate) async fn send_message_handler<R>(
    State(state): State<MarketplaceState<R>>,
    headers: HeaderMap,
    Json(draft): Json<MessageDraft>,
) -> Response
where
    R: MarketplaceRepository + 'static,
{
    let identity = identity_or_reject!(state, headers);
    respond(
        StatusCode::CREATED,
        state.service.send_message(&identity, draft),
    )
}

pub(crate) async fn job_messages_handler<R>(
    State(state): State<MarketplaceState<R>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Response
where
    R: MarketplaceRepository + 'static,
{
    let identity = identity_or_reject!(state, headers);
    respond(
        StatusCode::OK,
        state.service.job_messages(&identity, &JobId(job_id)),
    )
}

pub(crate) async fn conversations_handler<R>(
    State(state): State<MarketplaceState<R>>,
    headers: HeaderMap,
) -> Response
where
    R: MarketplaceRepository + 'static,
{
    let identity = identity_or_reject!(state, headers);
    respond(StatusCode::OK, state.service.conversations(&identity))
}

pub(crate) async fn payment_intent_handler<R>(
    State(state): State<MarketplaceState<R>>,
    headers: HeaderMap,
    Json(request): Json<PaymentIntentRequest>,
) -> Response
where
    R: MarketplaceRepository + 'static,
{
    let identity = identity_or_reject!(state, headers);
    let result = state.service.create_payment_intent(
        &identity,
        &request.job_id,
        &request.agency_id,
        request.annual_salary,
        request.agency_rating,
    );
    match result {
        Ok(payment) => {
            let payload = json!({
                "payment": payment,
                "message": "payment intent created; settlement is handled externally",
            });
            (StatusCode::CREATED, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn payment_history_handler<R>(
    State(state): State<MarketplaceState<R>>,
    headers: HeaderMap,
) -> Response
where
    R: MarketplaceRepository + 'static,
{
    let identity = identity_or_reject!(state, headers);
    respond(StatusCode::OK, state.service.payment_history(&identity))
}

pub(crate) async fn commission_quote_handler<R>(
    State(state): State<MarketplaceState<R>>,
    headers: HeaderMap,
    Json(request): Json<CommissionQuoteRequest>,
) -> Response
where
    R: MarketplaceRepository + 'static,
{
    identity_or_reject!(state, headers);
    let quote = state.service.quote_commission(
        request.annual_salary,
        request.urgency,
        request.agency_rating,
    );
    (StatusCode::OK, Json(quote)).into_response()
}
