//! Candidate disambiguation.
//!
//! Every adapter that gets more than one row back from its source routes the
//! decision through here instead of re-implementing matching inline. Pure
//! function, no I/O, no timeouts.

use crate::models::CandidateSummary;

/// How many candidates an ambiguous outcome reports back to the caller.
pub const AMBIGUOUS_PREVIEW: usize = 5;

/// What to do when neither an exact nor a prefix match exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Report ambiguity rather than guess. The default.
    #[default]
    Strict,
    /// Legacy behavior of the older scrapers: take the source's first result
    /// unconditionally. Opt-in only; it can attribute a record to the wrong
    /// entity.
    FirstResult,
}

impl MatchPolicy {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "first-result" | "first_result" | "first" => MatchPolicy::FirstResult,
            _ => MatchPolicy::Strict,
        }
    }
}

/// Outcome of a disambiguation pass.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// Index into the candidate slice, in source order.
    Selected(usize),
    /// No confident choice; up to [`AMBIGUOUS_PREVIEW`] candidates for the report.
    Ambiguous(Vec<CandidateSummary>),
}

/// Select one candidate for `query`, or signal that none can be chosen.
///
/// Precedence, all comparisons case-insensitive and whitespace-trimmed:
/// 1. a single candidate is always selected;
/// 2. the first exact name match in source order;
/// 3. among prefix matches, the shortest name (first in source order on ties);
/// 4. otherwise ambiguous - never a silent guess, unless the caller opted into
///    [`MatchPolicy::FirstResult`].
pub fn select_candidate(
    query: &str,
    candidates: &[CandidateSummary],
    policy: MatchPolicy,
) -> MatchOutcome {
    if candidates.len() == 1 {
        return MatchOutcome::Selected(0);
    }
    if candidates.is_empty() {
        return MatchOutcome::Ambiguous(Vec::new());
    }

    let query = query.trim().to_lowercase();

    if let Some(index) = candidates
        .iter()
        .position(|candidate| candidate.name.trim().to_lowercase() == query)
    {
        return MatchOutcome::Selected(index);
    }

    // Shortest prefix match; strict less-than keeps the earliest on ties.
    let mut best: Option<(usize, usize)> = None;
    for (index, candidate) in candidates.iter().enumerate() {
        let name = candidate.name.trim().to_lowercase();
        if !name.starts_with(&query) {
            continue;
        }
        let length = candidate.name.trim().chars().count();
        match best {
            Some((_, best_length)) if length >= best_length => {}
            _ => best = Some((index, length)),
        }
    }
    if let Some((index, _)) = best {
        return MatchOutcome::Selected(index);
    }

    match policy {
        MatchPolicy::FirstResult => MatchOutcome::Selected(0),
        MatchPolicy::Strict => MatchOutcome::Ambiguous(
            candidates.iter().take(AMBIGUOUS_PREVIEW).cloned().collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(names: &[&str]) -> Vec<CandidateSummary> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| CandidateSummary::new(*name, format!("{i}")))
            .collect()
    }

    #[test]
    fn single_candidate_is_always_selected() {
        let list = candidates(&["Totally Different Name LLC"]);
        assert_eq!(
            select_candidate("Acme", &list, MatchPolicy::Strict),
            MatchOutcome::Selected(0)
        );
    }

    #[test]
    fn exact_match_beats_longer_prefix_match() {
        let list = candidates(&["Apple Inc. Holdings", "Apple Inc."]);
        assert_eq!(
            select_candidate("Apple Inc.", &list, MatchPolicy::Strict),
            MatchOutcome::Selected(1)
        );
    }

    #[test]
    fn exact_match_is_case_insensitive_and_trimmed() {
        let list = candidates(&["APPLE INC.  ", "Apple Inc. Holdings"]);
        assert_eq!(
            select_candidate("apple inc.", &list, MatchPolicy::Strict),
            MatchOutcome::Selected(0)
        );
    }

    #[test]
    fn first_exact_match_in_source_order_wins() {
        let list = candidates(&["Apple Inc.", "apple inc."]);
        assert_eq!(
            select_candidate("Apple Inc.", &list, MatchPolicy::Strict),
            MatchOutcome::Selected(0)
        );
    }

    #[test]
    fn shortest_prefix_match_wins_by_one_character() {
        // Both are prefix matches; lengths differ by exactly one.
        let list = candidates(&["Apple Grove LLCx", "Apple Grove LLC"]);
        assert_eq!(
            select_candidate("Apple", &list, MatchPolicy::Strict),
            MatchOutcome::Selected(1)
        );
    }

    #[test]
    fn equal_length_prefix_matches_tie_break_to_source_order() {
        let list = candidates(&["Apple One LLC", "Apple Two LLC"]);
        assert_eq!(
            select_candidate("Apple", &list, MatchPolicy::Strict),
            MatchOutcome::Selected(0)
        );
    }

    #[test]
    fn no_signal_reports_ambiguous_not_first_pick() {
        let list = candidates(&["Zeta Corp", "Omega Corp"]);
        let outcome = select_candidate("Beta", &list, MatchPolicy::Strict);
        match outcome {
            MatchOutcome::Ambiguous(preview) => {
                assert_eq!(preview.len(), 2);
                assert_eq!(preview[0].name, "Zeta Corp");
                assert_eq!(preview[1].name, "Omega Corp");
            }
            other => panic!("expected ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn ambiguous_preview_is_capped_at_five() {
        let list = candidates(&["A1", "A2", "A3", "A4", "A5", "A6", "A7"]);
        match select_candidate("Beta", &list, MatchPolicy::Strict) {
            MatchOutcome::Ambiguous(preview) => assert_eq!(preview.len(), AMBIGUOUS_PREVIEW),
            other => panic!("expected ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn first_result_policy_restores_legacy_fallback() {
        let list = candidates(&["Zeta Corp", "Omega Corp"]);
        assert_eq!(
            select_candidate("Beta", &list, MatchPolicy::FirstResult),
            MatchOutcome::Selected(0)
        );
    }
}
