use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::marketplace::repository::InMemoryMarketplaceRepository;
use crate::marketplace::{marketplace_router, JobStatus, MarketplaceService, Urgency};

fn router_with_service(
    service: MarketplaceService<InMemoryMarketplaceRepository>,
) -> axum::Router {
    marketplace_router(Arc::new(service), Arc::new(verifier()))
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn job_payload() -> Value {
    json!({
        "title": "Backend Engineer",
        "description": "Payments platform",
        "skills": ["React", "Node"],
        "salaryRange": { "min": 80000, "max": 100000 },
        "location": "Berlin",
        "urgency": "critical"
    })
}

#[tokio::test]
async fn requests_without_bearer_token_are_unauthorized() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let missing = router
        .clone()
        .oneshot(request("GET", "/api/v1/jobs", None, None))
        .await
        .expect("route executes");
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let forged = router
        .oneshot(request("GET", "/api/v1/jobs", Some("forged"), None))
        .await
        .expect("route executes");
    assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);
    let payload = read_json_body(forged).await;
    assert_eq!(payload["error"], "credential rejected");
}

#[tokio::test]
async fn client_creates_job_and_admin_activates_it() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let created = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/jobs",
            Some(CLIENT_TOKEN),
            Some(job_payload()),
        ))
        .await
        .expect("route executes");
    assert_eq!(created.status(), StatusCode::CREATED);
    let job = read_json_body(created).await;
    assert_eq!(job["status"], "PENDING");
    assert_eq!(job["urgency"], "critical");
    assert_eq!(job["clientName"], "Acme Corp");
    assert_eq!(job["salaryRange"]["max"], 100000);
    assert_eq!(job["submissionsCount"], 0);
    let job_id = job["id"].as_str().expect("job id").to_string();

    let pending = router
        .clone()
        .oneshot(request(
            "GET",
            "/api/v1/admin/jobs/pending",
            Some(ADMIN_TOKEN),
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(pending.status(), StatusCode::OK);
    assert_eq!(read_json_body(pending).await.as_array().map(Vec::len), Some(1));

    let reviewed = router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/admin/jobs/{job_id}/review"),
            Some(ADMIN_TOKEN),
            Some(json!({ "status": "ACTIVE" })),
        ))
        .await
        .expect("route executes");
    assert_eq!(reviewed.status(), StatusCode::OK);
    let reviewed = read_json_body(reviewed).await;
    assert_eq!(reviewed["status"], "ACTIVE");
    assert_eq!(reviewed["matchedAgencies"][0]["agencyId"], "agency-north");
    assert_eq!(reviewed["matchedAgencies"][0]["score"], 94);

    let active = router
        .oneshot(request("GET", "/api/v1/jobs", Some(AGENCY_TOKEN), None))
        .await
        .expect("route executes");
    assert_eq!(read_json_body(active).await.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn service_errors_map_to_status_codes() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let forbidden = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/jobs",
            Some(AGENCY_TOKEN),
            Some(job_payload()),
        ))
        .await
        .expect("route executes");
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let missing = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/admin/jobs/job-unknown/review",
            Some(ADMIN_TOKEN),
            Some(json!({ "status": "ACTIVE" })),
        ))
        .await
        .expect("route executes");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let bad_decision = router
        .oneshot(request(
            "POST",
            "/api/v1/admin/kyc/agency-unverified",
            Some(ADMIN_TOKEN),
            Some(json!({ "status": "PENDING" })),
        ))
        .await
        .expect("route executes");
    assert_eq!(bad_decision.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn illegal_submission_transition_is_a_conflict() {
    let (service, _, _) = build_service();
    let job = service
        .create_job(&client(), draft(&["Python"], "Berlin", Urgency::Normal))
        .expect("job created");
    service
        .review_job(&admin(), &job.id, JobStatus::Active)
        .expect("job activated");
    let router = router_with_service(service);

    let submitted = router
        .clone()
        .oneshot(request(
            "POST",
            "/api/v1/submissions",
            Some(AGENCY_TOKEN),
            Some(json!({
                "jobId": job.id,
                "candidate": {
                    "name": "Grace Hopper",
                    "email": "grace@example.com",
                    "phone": "+1 555 0100",
                    "skills": ["python"],
                    "experience": 6,
                    "salaryExpectation": 95000
                },
                "resumeUrl": "https://files.example.com/grace.pdf"
            })),
        ))
        .await
        .expect("route executes");
    assert_eq!(submitted.status(), StatusCode::CREATED);
    let receipt = read_json_body(submitted).await;
    assert_eq!(receipt["rankingScore"], 100);
    assert_eq!(
        receipt["insight"],
        "Candidate matches 100% of the requirement profile."
    );
    let submission_id = receipt["id"].as_str().expect("submission id").to_string();

    let skipped = router
        .oneshot(request(
            "POST",
            &format!("/api/v1/submissions/{submission_id}/status"),
            Some(CLIENT_TOKEN),
            Some(json!({ "status": "HIRED" })),
        ))
        .await
        .expect("route executes");
    assert_eq!(skipped.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn commission_quote_route_prices_placement() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .oneshot(request(
            "POST",
            "/api/v1/commission/quote",
            Some(CLIENT_TOKEN),
            Some(json!({
                "annualSalary": "100000",
                "urgency": "critical",
                "agencyRating": "5"
            })),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let quote = read_json_body(response).await;
    let amount: Decimal = quote["amount"]
        .as_str()
        .expect("decimal string")
        .parse()
        .expect("decimal amount");
    assert_eq!(amount, dec!(12360));
}

#[tokio::test]
async fn repository_outage_is_internal_error() {
    let service = MarketplaceService::new(Arc::new(UnavailableRepository), bus());
    let router = marketplace_router(Arc::new(service), Arc::new(verifier()));

    let response = router
        .oneshot(request("GET", "/api/v1/jobs", Some(CLIENT_TOKEN), None))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "repository unavailable: database offline");
}

#[tokio::test]
async fn admin_lists_pending_kyc_and_users() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let pending = router
        .clone()
        .oneshot(request(
            "GET",
            "/api/v1/admin/kyc/pending",
            Some(ADMIN_TOKEN),
            None,
        ))
        .await
        .expect("route executes");
    assert_eq!(pending.status(), StatusCode::OK);
    let pending = read_json_body(pending).await;
    assert_eq!(pending.as_array().map(Vec::len), Some(1));
    assert_eq!(pending[0]["id"], "agency-unverified");
    assert_eq!(pending[0]["kycStatus"], "PENDING");

    let users = router
        .clone()
        .oneshot(request("GET", "/api/v1/admin/users", Some(ADMIN_TOKEN), None))
        .await
        .expect("route executes");
    assert_eq!(users.status(), StatusCode::OK);
    assert_eq!(read_json_body(users).await.as_array().map(Vec::len), Some(4));

    let forbidden = router
        .oneshot(request("GET", "/api/v1/admin/users", Some(AGENCY_TOKEN), None))
        .await
        .expect("route executes");
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
}
