use hirewire::marketplace::{
    Identity, KycStatus, PerformanceMetrics, Role, StaticTokenVerifier, Urgency, UserId,
    UserProfile,
};
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) const CLIENT_ID: &str = "client-northwind";
pub(crate) const ADMIN_ID: &str = "admin-ops";

/// Bearer tokens accepted by the local server, paired with their identities.
pub(crate) const LOCAL_TOKENS: &[(&str, &str, Role)] = &[
    ("dev-client", CLIENT_ID, Role::Client),
    ("dev-admin", ADMIN_ID, Role::Admin),
    ("dev-agency-talentforge", "agency-talentforge", Role::Recruiter),
    ("dev-agency-cloudhire", "agency-cloudhire", Role::Recruiter),
    ("dev-agency-fintalent", "agency-fintalent", Role::Recruiter),
];

pub(crate) fn local_verifier() -> StaticTokenVerifier {
    LOCAL_TOKENS
        .iter()
        .fold(StaticTokenVerifier::new(), |verifier, (token, user, role)| {
            verifier.with_token(*token, Identity::new(UserId::new(*user), *role))
        })
}

fn agency(
    id: &str,
    name: &str,
    location: &str,
    specialization: &[&str],
    kyc_status: KycStatus,
    (success_rate, sourcing_accuracy, avg_time_to_fill): (f64, f64, f64),
) -> UserProfile {
    UserProfile {
        id: UserId::new(id),
        name: name.to_string(),
        role: Role::Recruiter,
        kyc_status,
        location: Some(location.to_string()),
        specialization: specialization.iter().map(|tag| tag.to_string()).collect(),
        performance: PerformanceMetrics {
            success_rate,
            sourcing_accuracy,
            avg_time_to_fill,
        },
    }
}

/// Users loaded into the in-memory repository at startup.
pub(crate) fn seed_users() -> Vec<UserProfile> {
    vec![
        UserProfile {
            id: UserId::new(CLIENT_ID),
            name: "Northwind Logistics".to_string(),
            role: Role::Client,
            kyc_status: KycStatus::Approved,
            location: Some("Bengaluru".to_string()),
            specialization: Vec::new(),
            performance: PerformanceMetrics::default(),
        },
        UserProfile {
            id: UserId::new(ADMIN_ID),
            name: "Marketplace Operations".to_string(),
            role: Role::Admin,
            kyc_status: KycStatus::Approved,
            location: None,
            specialization: Vec::new(),
            performance: PerformanceMetrics::default(),
        },
        agency(
            "agency-talentforge",
            "TalentForge",
            "Bengaluru",
            &["rust", "kubernetes", "aws"],
            KycStatus::Approved,
            (92.0, 85.0, 18.0),
        ),
        agency(
            "agency-cloudhire",
            "CloudHire Partners",
            "Pune",
            &["kubernetes", "aws", "terraform"],
            KycStatus::Approved,
            (78.0, 70.0, 25.0),
        ),
        agency(
            "agency-fintalent",
            "FinTalent Search",
            "Mumbai",
            &["java", "spring"],
            KycStatus::Approved,
            (88.0, 90.0, 21.0),
        ),
        agency(
            "agency-newcomer",
            "Newcomer Staffing",
            "Bengaluru",
            &["rust", "kubernetes"],
            KycStatus::Pending,
            (0.0, 0.0, 0.0),
        ),
    ]
}

pub(crate) fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|err| format!("failed to parse '{raw}' as a decimal amount ({err})"))
}

pub(crate) fn parse_urgency(raw: &str) -> Result<Urgency, String> {
    raw.parse()
}
