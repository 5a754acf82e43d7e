use std::collections::HashSet;

use super::domain::{CandidateProfile, Job};

const SKILL_WEIGHT: f64 = 60.0;
const NO_REQUIREMENTS_SKILL_SCORE: f64 = 30.0;
const EXPERIENCE_WEIGHT: f64 = 40.0;
const EXPERIENCE_CAP_YEARS: f64 = 5.0;

/// Scores a submitted candidate against the job's skill requirements.
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateRankingEngine;

impl CandidateRankingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Integer fit in `[0, 100]`.
    pub fn rank(&self, candidate: &CandidateProfile, job: &Job) -> u8 {
        let total = skill_score(candidate, job) + experience_score(candidate);
        total.round().clamp(0.0, 100.0) as u8
    }

    /// Summary line returned to the submitting agency.
    pub fn insight(ranking_score: u8) -> String {
        format!("Candidate matches {ranking_score}% of the requirement profile.")
    }
}

fn skill_score(candidate: &CandidateProfile, job: &Job) -> f64 {
    if job.skills.is_empty() {
        return NO_REQUIREMENTS_SKILL_SCORE;
    }

    let required: HashSet<String> = job.skills.iter().map(|s| s.to_lowercase()).collect();
    let matched = candidate
        .skills
        .iter()
        .filter(|skill| required.contains(&skill.to_lowercase()))
        .count();

    (matched as f64 / job.skills.len() as f64) * SKILL_WEIGHT
}

fn experience_score(candidate: &CandidateProfile) -> f64 {
    let years = candidate.experience.max(0.0);
    (years / EXPERIENCE_CAP_YEARS).min(1.0) * EXPERIENCE_WEIGHT
}
