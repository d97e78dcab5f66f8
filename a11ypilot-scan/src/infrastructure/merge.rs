//! Violation merge and deduplication
//!
//! Findings from the rule evaluator, the heuristic suite and every crawled
//! page pass through here. The output never holds two violations with the
//! same `(description, wcagReference)` pair, is ordered by impact severity
//! (stable among ties), and carries unique ids.

use std::collections::{HashMap, HashSet};

use a11ypilot_core::domain::audit::{Impact, Violation};

/// Merge two finding sources into one deduplicated, severity-ordered list
pub fn merge_violations(first: Vec<Violation>, second: Vec<Violation>) -> Vec<Violation> {
    let mut combined = first;
    combined.extend(second);
    dedup_and_sort(combined)
}

/// Merge any number of sources, earlier sources winning on duplicates
pub fn merge_all<I>(sources: I) -> Vec<Violation>
where
    I: IntoIterator<Item = Vec<Violation>>,
{
    dedup_and_sort(sources.into_iter().flatten().collect())
}

/// Drop duplicates keeping the first occurrence, then sort by impact
pub fn dedup_and_sort(violations: Vec<Violation>) -> Vec<Violation> {
    let mut seen: HashSet<(String, String)> = HashSet::with_capacity(violations.len());
    let mut retained: Vec<Violation> = violations
        .into_iter()
        .filter(|v| seen.insert((v.description.clone(), v.wcag_reference.clone())))
        .collect();

    // `sort_by_key` is stable, so ties keep input order.
    retained.sort_by_key(|v| v.impact.rank());
    ensure_unique_ids(&mut retained);
    retained
}

/// Suffix colliding ids with `#2`, `#3`, ... in list order
pub fn ensure_unique_ids(violations: &mut [Violation]) {
    let mut taken: HashSet<String> = violations.iter().map(|v| v.id.clone()).collect();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for violation in violations.iter_mut() {
        let count = counts.entry(violation.id.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            continue;
        }

        let mut suffix = *count;
        let mut candidate = format!("{}#{}", violation.id, suffix);
        while taken.contains(&candidate) {
            suffix += 1;
            candidate = format!("{}#{}", violation.id, suffix);
        }
        taken.insert(candidate.clone());
        violation.id = candidate;
    }
}

/// Score 0-100 penalised per violation by impact
pub fn accessibility_score(violations: &[Violation]) -> u32 {
    let penalty: u32 = violations
        .iter()
        .map(|v| match v.impact {
            Impact::Critical => 10,
            Impact::Serious => 5,
            Impact::Moderate => 3,
            Impact::Minor | Impact::Unknown => 1,
        })
        .sum();
    100u32.saturating_sub(penalty)
}
