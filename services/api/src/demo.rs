use crate::infra::{local_verifier, parse_decimal, parse_urgency, seed_users, ADMIN_ID, CLIENT_ID};
use chrono::Local;
use clap::Args;
use hirewire::error::AppError;
use hirewire::marketplace::{
    CandidateProfile, CommissionCalculator, CommissionQuote, Delivery, EventBus, EventBusConfig,
    Identity, InMemoryMarketplaceRepository, JobDraft, JobStatus, MarketplaceService,
    MessageDraft, OutboundEvent, Role, SalaryRange, Session, SubmissionDraft, SubmissionStatus,
    Urgency, UserId,
};
use rust_decimal::Decimal;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Comma-separated skills required by the demo job
    #[arg(long, value_delimiter = ',', default_value = "Rust,Kubernetes")]
    pub(crate) skills: Vec<String>,
    /// Job location used for agency location matching
    #[arg(long, default_value = "Bengaluru")]
    pub(crate) location: String,
    /// Hiring urgency (normal, high or critical)
    #[arg(long, default_value = "high", value_parser = parse_urgency)]
    pub(crate) urgency: Urgency,
    /// Annual salary used to price the placement fee
    #[arg(long, default_value = "3200000", value_parser = parse_decimal)]
    pub(crate) salary: Decimal,
}

#[derive(Args, Debug)]
pub(crate) struct CommissionArgs {
    /// Annual salary of the placed candidate
    #[arg(long, value_parser = parse_decimal)]
    pub(crate) salary: Decimal,
    /// Hiring urgency (normal, high or critical)
    #[arg(long, default_value = "normal", value_parser = parse_urgency)]
    pub(crate) urgency: Urgency,
    /// Agency rating on a 0-10 scale; 5 is neutral
    #[arg(long, value_parser = parse_decimal)]
    pub(crate) rating: Option<Decimal>,
}

pub(crate) fn run_commission_quote(args: CommissionArgs) -> Result<(), AppError> {
    let quote = CommissionCalculator::new().quote(args.salary, args.urgency, args.rating);
    render_quote(&quote);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        skills,
        location,
        urgency,
        salary,
    } = args;

    let bus = EventBus::new(Arc::new(local_verifier()), EventBusConfig::default());
    let repository = Arc::new(InMemoryMarketplaceRepository::with_users(seed_users()));
    let service = MarketplaceService::new(repository, bus.clone());

    let client = Identity::new(UserId::new(CLIENT_ID), Role::Client);
    let admin = Identity::new(UserId::new(ADMIN_ID), Role::Admin);

    println!(
        "HireWire marketplace demo ({})",
        Local::now().format("%Y-%m-%d %H:%M")
    );

    let agency_tokens = [
        "dev-agency-talentforge",
        "dev-agency-cloudhire",
        "dev-agency-fintalent",
    ];
    let mut agency_sessions = agency_tokens
        .into_iter()
        .map(|token| connect_personal(&bus, token))
        .collect::<Result<Vec<_>, _>>()?;
    let mut client_session = connect_personal(&bus, "dev-client")?;
    println!("Connected sessions: {}", bus.connected_sessions());

    let job = service.create_job(
        &client,
        JobDraft {
            title: "Platform Engineer".to_string(),
            description: "Build and operate the container platform".to_string(),
            skills,
            salary_range: SalaryRange {
                min: 2_800_000,
                max: 3_600_000,
            },
            location,
            urgency,
            anonymous: false,
        },
    )?;
    println!(
        "\nJob {} created by {} [{}]",
        job.id,
        job.client_name,
        job.status.label()
    );

    let job = service.review_job(&admin, &job.id, JobStatus::Active)?;
    println!("Job activated; {} agencies matched:", job.matched_agencies.len());
    for entry in &job.matched_agencies {
        println!("  - {:<22} score {:>3}", entry.agency_id.as_str(), entry.score);
    }

    println!("\nLive deliveries");
    for session in &mut agency_sessions {
        render_deliveries(session);
    }

    let Some(lead) = job.matched_agencies.first() else {
        println!("\nNo agency cleared the match threshold; demo stops here.");
        return Ok(());
    };
    let lead_index = agency_sessions
        .iter()
        .position(|session| session.identity().user_id == lead.agency_id);
    let lead_identity = Identity::new(lead.agency_id.clone(), Role::Recruiter);

    if let Some(index) = lead_index {
        agency_sessions[index].join_job(&job.id);
    }
    client_session.join_job(&job.id);

    let receipt = service.submit_candidate(
        &lead_identity,
        SubmissionDraft {
            job_id: job.id.clone(),
            candidate: CandidateProfile {
                name: "Priya Raman".to_string(),
                email: "priya.raman@example.com".to_string(),
                phone: "+91 80 5550 1234".to_string(),
                skills: job.skills.iter().take(1).cloned().collect(),
                experience: 4.0,
                salary_expectation: 3_100_000,
            },
            resume_url: "https://files.example.com/resumes/priya-raman.pdf".to_string(),
            agency_remarks: Some("Led a cluster migration last year".to_string()),
        },
    )?;
    println!(
        "\nSubmission {} by {}: {}",
        receipt.submission.id, lead.agency_id, receipt.insight
    );

    for status in [SubmissionStatus::Shortlisted, SubmissionStatus::Interview] {
        service.update_submission_status(&client, &receipt.submission.id, status)?;
    }

    service.send_message(
        &client,
        MessageDraft {
            job_id: job.id.clone(),
            to_id: lead.agency_id.clone(),
            content: "Interview slots are open on Thursday.".to_string(),
        },
    )?;

    println!("\nLive deliveries");
    if let Some(index) = lead_index {
        render_deliveries(&mut agency_sessions[index]);
    }
    render_deliveries(&mut client_session);

    let payment =
        service.create_payment_intent(&client, &job.id, &lead.agency_id, salary, None)?;
    println!("\nPlacement fee");
    render_quote(&service.quote_commission(salary, job.urgency, None));
    println!(
        "Payment intent {} recorded for {} ({:?})",
        payment.id, payment.agency_id, payment.status
    );

    for session in agency_sessions {
        session.disconnect();
    }
    client_session.disconnect();
    println!("\nSessions remaining: {}", bus.connected_sessions());

    Ok(())
}

fn connect_personal(bus: &EventBus, token: &str) -> Result<Session, AppError> {
    let mut session = bus.connect(token)?;
    let user_id = session.identity().user_id.clone();
    session.join_personal(&user_id);
    Ok(session)
}

fn render_deliveries(session: &mut Session) {
    let user_id = session.identity().user_id.clone();
    let deliveries = session.drain();
    if deliveries.is_empty() {
        println!("  {user_id}: (nothing queued)");
        return;
    }
    for delivery in deliveries {
        println!("  {user_id} <- {}", describe(&delivery));
    }
}

fn describe(delivery: &Delivery) -> String {
    let detail = match &delivery.event {
        OutboundEvent::JobPublished(payload) => {
            format!("{} posted by {}", payload.title, payload.client_name)
        }
        OutboundEvent::JobMatched(payload) => format!("matched to {}", payload.title),
        OutboundEvent::SubmissionStatusUpdated(payload) => {
            format!("{} is now {}", payload.candidate_name, payload.status.label())
        }
        OutboundEvent::NewMessage(message) => {
            format!("{} says \"{}\"", message.from_id, message.content)
        }
    };
    format!(
        "#{} {} on {}: {}",
        delivery.sequence,
        delivery.event.name(),
        delivery.channel,
        detail
    )
}

fn render_quote(quote: &CommissionQuote) {
    println!("  Annual salary:          {}", quote.annual_salary);
    println!("  Urgency:                {}", quote.urgency.label());
    println!("  Rate:                   {}", quote.rate);
    println!(
        "  Performance multiplier: {}",
        quote.performance_multiplier
    );
    println!("  Cap (15%):              {}", quote.cap.round_dp(2));
    println!(
        "  Commission:             {}{}",
        quote.amount.round_dp(2),
        if quote.capped() { " (capped)" } else { "" }
    );
}
