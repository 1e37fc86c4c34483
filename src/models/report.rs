//! Per-source outcomes and the keyed report the dispatch engine assembles.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;
use crate::models::record::CanonicalRecord;

/// Lightweight name/id pair reported when disambiguation cannot resolve a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSummary {
    #[serde(rename = "entity_name")]
    pub name: String,
    pub id: String,
}

impl CandidateSummary {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// Outcome of querying one source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceResult {
    Success(CanonicalRecord),
    /// The source positively reported zero results.
    NoMatch { query: String },
    /// Multiple candidates, none of which disambiguation could pick.
    Ambiguous { candidates: Vec<CandidateSummary> },
    Failure { kind: ErrorKind, message: String },
}

impl SourceResult {
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        SourceResult::Failure {
            kind,
            message: message.into(),
        }
    }

    /// The canned result for criteria with neither identifier nor name.
    pub fn invalid_criteria() -> Self {
        SourceResult::failure(
            ErrorKind::InvalidCriteria,
            "Either a business identifier or an entity name is required.",
        )
    }

    pub fn no_match(query: impl Into<String>) -> Self {
        SourceResult::NoMatch {
            query: query.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SourceResult::Success(_))
    }

    /// One-word outcome label for progress logs.
    pub fn label(&self) -> &'static str {
        match self {
            SourceResult::Success(_) => "found",
            SourceResult::NoMatch { .. } => "no match",
            SourceResult::Ambiguous { .. } => "ambiguous",
            SourceResult::Failure { .. } => "failed",
        }
    }
}

// Report shape: a success serializes as the record itself; everything else as
// an error object, with ambiguous results carrying their candidate preview.
impl Serialize for SourceResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SourceResult::Success(record) => record.serialize(serializer),
            SourceResult::NoMatch { query } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", &format!("No results found for '{query}'."))?;
                map.end()
            }
            SourceResult::Ambiguous { candidates } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(
                    "error",
                    "Multiple results found, but no single match could be identified.",
                )?;
                map.serialize_entry("top_results", candidates)?;
                map.end()
            }
            SourceResult::Failure { kind, message } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("error", kind.label())?;
                map.serialize_entry("details", message)?;
                map.end()
            }
        }
    }
}

/// Keyed result of one dispatch run: exactly one entry per requested source.
///
/// Created empty, populated once per source as tasks complete, immutable once
/// handed back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DispatchReport {
    results: BTreeMap<String, SourceResult>,
}

/// Outcome counts for the end-of-run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportTally {
    pub found: usize,
    pub no_match: usize,
    pub ambiguous: usize,
    pub failed: usize,
}

impl DispatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome for one source. Keys are unique; a second write for
    /// the same key is a dispatch bug.
    pub fn record(&mut self, key: impl Into<String>, result: SourceResult) {
        let previous = self.results.insert(key.into(), result);
        debug_assert!(previous.is_none(), "source reported twice");
    }

    pub fn get(&self, key: &str) -> Option<&SourceResult> {
        self.results.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SourceResult)> {
        self.results.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn tally(&self) -> ReportTally {
        let mut tally = ReportTally::default();
        for result in self.results.values() {
            match result {
                SourceResult::Success(_) => tally.found += 1,
                SourceResult::NoMatch { .. } => tally.no_match += 1,
                SourceResult::Ambiguous { .. } => tally.ambiguous += 1,
                SourceResult::Failure { .. } => tally.failed += 1,
            }
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{RawRecord, StatusClassifier};

    #[test]
    fn success_serializes_as_record_fields() {
        let record = RawRecord {
            entity_name: Some("Acme Corp".into()),
            entity_status: Some("Active".into()),
            ..Default::default()
        }
        .normalize(&StatusClassifier::default());

        let json = serde_json::to_value(SourceResult::Success(record)).expect("serializes");
        assert_eq!(json["entity_name"], "Acme Corp");
        assert_eq!(json["statusActive"], true);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn failure_serializes_as_error_object() {
        let result = SourceResult::failure(ErrorKind::Timeout, "no answer after 240s");
        let json = serde_json::to_value(result).expect("serializes");
        assert_eq!(json["error"], "The source timed out");
        assert_eq!(json["details"], "no answer after 240s");
    }

    #[test]
    fn ambiguous_carries_top_results() {
        let result = SourceResult::Ambiguous {
            candidates: vec![
                CandidateSummary::new("Zeta Corp", "1"),
                CandidateSummary::new("Omega Corp", "2"),
            ],
        };
        let json = serde_json::to_value(result).expect("serializes");
        assert_eq!(json["top_results"][0]["entity_name"], "Zeta Corp");
        assert_eq!(json["top_results"][1]["id"], "2");
    }

    #[test]
    fn report_keys_map_to_results() {
        let mut report = DispatchReport::new();
        report.record("ny", SourceResult::no_match("Acme"));
        report.record("mt", SourceResult::failure(ErrorKind::Unexpected, "boom"));

        assert_eq!(report.len(), 2);
        assert_eq!(report.get("ny"), Some(&SourceResult::no_match("Acme")));
        assert_eq!(report.tally().failed, 1);

        let json = serde_json::to_value(&report).expect("serializes");
        assert!(json["ny"]["error"]
            .as_str()
            .expect("error text")
            .contains("No results"));
    }
}
