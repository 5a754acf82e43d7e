mod scoring;

pub use scoring::{ScoreBreakdown, ScoringEngine};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{Agency, Job, UserId};

/// Scores must exceed this to be notified about a job.
pub const MATCH_THRESHOLD: u8 = 50;
pub const MAX_MATCHES: usize = 10;

/// Agency selected for a job together with its compatibility score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyMatch {
    pub agency_id: UserId,
    pub score: u8,
}

/// Ranked, deduplicated selection of at most [`MAX_MATCHES`] agencies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    entries: Vec<AgencyMatch>,
}

impl MatchResult {
    pub fn entries(&self) -> &[AgencyMatch] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn agency_ids(&self) -> impl Iterator<Item = &UserId> {
        self.entries.iter().map(|entry| &entry.agency_id)
    }

    pub fn into_entries(self) -> Vec<AgencyMatch> {
        self.entries
    }
}

/// Applies the scoring engine across an agency pool and keeps the best fits.
#[derive(Debug, Clone, Default)]
pub struct MatchSelector {
    engine: ScoringEngine,
}

impl MatchSelector {
    pub fn new(engine: ScoringEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn select_matches(&self, job: &Job, pool: &[Agency]) -> MatchResult {
        let mut seen = HashSet::new();
        let mut entries: Vec<AgencyMatch> = pool
            .iter()
            .filter(|agency| seen.insert(&agency.id))
            .map(|agency| AgencyMatch {
                agency_id: agency.id.clone(),
                score: self.engine.score(job, agency),
            })
            .filter(|entry| entry.score > MATCH_THRESHOLD)
            .collect();

        // stable: equal scores keep pool order
        entries.sort_by(|left, right| right.score.cmp(&left.score));
        entries.truncate(MAX_MATCHES);

        debug!(
            job_id = %job.id,
            pool = pool.len(),
            matched = entries.len(),
            "agency matching complete"
        );

        MatchResult { entries }
    }
}
