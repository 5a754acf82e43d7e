use super::common::*;
use crate::marketplace::ranking::CandidateRankingEngine;

#[test]
fn partial_skill_match_with_mid_experience() {
    let job = active_job(&["Python", "Go", "Rust"], "Berlin");
    let candidate = candidate(&["Python"], 2.5);

    assert_eq!(CandidateRankingEngine::new().rank(&candidate, &job), 40);
}

#[test]
fn skill_comparison_ignores_case() {
    let job = active_job(&["Python", "Go"], "Berlin");
    let candidate = candidate(&["PYTHON", "go"], 0.0);

    assert_eq!(CandidateRankingEngine::new().rank(&candidate, &job), 60);
}

#[test]
fn job_without_skills_awards_flat_skill_score() {
    let job = active_job(&[], "Berlin");
    let candidate = candidate(&["Python"], 5.0);

    assert_eq!(CandidateRankingEngine::new().rank(&candidate, &job), 70);
}

#[test]
fn experience_is_capped_and_floored() {
    let job = active_job(&["Python"], "Berlin");
    let engine = CandidateRankingEngine::new();

    assert_eq!(engine.rank(&candidate(&["Python"], 12.0), &job), 100);
    assert_eq!(engine.rank(&candidate(&[], -3.0), &job), 0);
}

#[test]
fn insight_reports_the_score() {
    assert_eq!(
        CandidateRankingEngine::insight(40),
        "Candidate matches 40% of the requirement profile."
    );
}
