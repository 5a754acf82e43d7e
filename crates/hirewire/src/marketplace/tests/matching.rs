use super::common::*;
use crate::marketplace::domain::{Agency, UserId};
use crate::marketplace::matching::{MatchSelector, MATCH_THRESHOLD, MAX_MATCHES};

// Scores 60 + 2 * step for the strong pool, 20 for the weak one.
fn strong(step: u32) -> Agency {
    let rate = f64::from(step) * 5.0;
    agency(
        &format!("strong-{step:02}"),
        &["react", "node"],
        Some("Berlin"),
        rate,
        rate,
    )
}

fn weak(index: u32) -> Agency {
    agency(&format!("weak-{index}"), &[], None, 50.0, 50.0)
}

#[test]
fn keeps_top_ten_of_qualifying_agencies() {
    let job = active_job(&["React", "Node"], "Berlin");
    let mut pool: Vec<Agency> = (0..12).map(strong).collect();
    pool.insert(3, weak(1));
    pool.insert(8, weak(2));
    pool.push(weak(3));
    assert_eq!(pool.len(), 15);

    let result = MatchSelector::default().select_matches(&job, &pool);

    assert_eq!(result.len(), MAX_MATCHES);
    let ids: Vec<&str> = result.agency_ids().map(UserId::as_str).collect();
    let expected: Vec<String> = (2..12).rev().map(|step| format!("strong-{step:02}")).collect();
    assert_eq!(ids, expected);

    let scores: Vec<u8> = result.entries().iter().map(|entry| entry.score).collect();
    assert_eq!(scores, vec![82, 80, 78, 76, 74, 72, 70, 68, 66, 64]);
}

#[test]
fn threshold_is_strictly_greater_than_fifty() {
    let job = active_job(&["React", "Node"], "Berlin");
    // 40 skill + 10 expertise, nothing else
    let borderline = agency("borderline", &["react", "node"], None, 0.0, 0.0);
    let above = agency("above", &["react", "node"], None, 5.0, 0.0);

    let result = MatchSelector::default().select_matches(&job, &[borderline, above]);

    assert_eq!(result.len(), 1);
    assert_eq!(result.entries()[0].agency_id, UserId::new("above"));
    assert!(result.entries()[0].score > MATCH_THRESHOLD);
}

#[test]
fn equal_scores_keep_pool_order() {
    let job = active_job(&["React", "Node"], "Berlin");
    let first = agency("first", &["react", "node"], Some("Berlin"), 70.0, 70.0);
    let second = agency("second", &["react", "node"], Some("Berlin"), 70.0, 70.0);
    let better = agency("better", &["react", "node"], Some("Berlin"), 90.0, 90.0);

    let result = MatchSelector::default().select_matches(&job, &[first, second, better]);

    let ids: Vec<&str> = result.agency_ids().map(UserId::as_str).collect();
    assert_eq!(ids, vec!["better", "first", "second"]);
}

#[test]
fn duplicate_agencies_are_considered_once() {
    let job = active_job(&["React", "Node"], "Berlin");
    let original = strong(4);
    let duplicate = strong(4);

    let result = MatchSelector::default().select_matches(&job, &[original, duplicate, strong(2)]);

    assert_eq!(result.len(), 2);
    let ids: Vec<&str> = result.agency_ids().map(UserId::as_str).collect();
    assert_eq!(ids, vec!["strong-04", "strong-02"]);
}

#[test]
fn empty_pool_yields_empty_result() {
    let job = active_job(&["React"], "Berlin");
    let result = MatchSelector::default().select_matches(&job, &[]);
    assert!(result.is_empty());
}

#[test]
fn entries_never_exceed_cap_and_stay_sorted() {
    let job = active_job(&["React", "Node"], "Berlin");
    let pool: Vec<Agency> = (0..30).map(|step| strong(step % 12)).collect();

    let result = MatchSelector::default().select_matches(&job, &pool);

    assert!(result.len() <= MAX_MATCHES);
    assert!(result
        .entries()
        .windows(2)
        .all(|pair| pair[0].score >= pair[1].score));
}
