use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::super::domain::{Agency, Job};

pub(crate) const SKILL_WEIGHT: f64 = 40.0;
pub(crate) const SUCCESS_RATE_WEIGHT: f64 = 20.0;
pub(crate) const SOURCING_ACCURACY_WEIGHT: f64 = 20.0;
pub(crate) const LOCATION_BONUS: f64 = 10.0;
pub(crate) const EXPERTISE_BONUS: f64 = 10.0;

/// Per-factor contributions behind an agency score, kept for audits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub skill_overlap: f64,
    pub performance: f64,
    pub location: f64,
    pub expertise: f64,
}

impl ScoreBreakdown {
    pub fn raw_total(&self) -> f64 {
        self.skill_overlap + self.performance + self.location + self.expertise
    }

    /// Rounded total clamped to `[0, 100]`.
    pub fn total(&self) -> u8 {
        let total = self.raw_total();
        if total.is_nan() {
            return 0;
        }
        total.round().clamp(0.0, 100.0) as u8
    }
}

/// Stateless job-to-agency compatibility scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, job: &Job, agency: &Agency) -> u8 {
        self.breakdown(job, agency).total()
    }

    pub fn breakdown(&self, job: &Job, agency: &Agency) -> ScoreBreakdown {
        let specialties: HashSet<String> = agency
            .specialization
            .iter()
            .map(|tag| tag.to_lowercase())
            .collect();

        ScoreBreakdown {
            skill_overlap: skill_overlap(&job.skills, &specialties),
            performance: performance(agency),
            location: location(job, agency),
            expertise: expertise(&job.skills, &specialties),
        }
    }
}

fn skill_overlap(skills: &[String], specialties: &HashSet<String>) -> f64 {
    if skills.is_empty() {
        return 0.0;
    }

    let matched = skills
        .iter()
        .filter(|skill| specialties.contains(&skill.to_lowercase()))
        .count();

    (matched as f64 / skills.len() as f64) * SKILL_WEIGHT
}

fn performance(agency: &Agency) -> f64 {
    let metrics = &agency.performance;
    (metrics.success_rate / 100.0) * SUCCESS_RATE_WEIGHT
        + (metrics.sourcing_accuracy / 100.0) * SOURCING_ACCURACY_WEIGHT
}

// Exact, case-sensitive comparison; blank locations never match.
fn location(job: &Job, agency: &Agency) -> f64 {
    match agency.location.as_deref() {
        Some(location) if !location.is_empty() && location == job.location => LOCATION_BONUS,
        _ => 0.0,
    }
}

fn expertise(skills: &[String], specialties: &HashSet<String>) -> f64 {
    let is_expert = skills.iter().any(|skill| {
        let skill = skill.to_lowercase();
        specialties.iter().any(|tag| tag.contains(&skill))
    });

    if is_expert {
        EXPERTISE_BONUS
    } else {
        0.0
    }
}
