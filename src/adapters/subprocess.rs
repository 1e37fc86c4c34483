//! Out-of-process adapter variant.
//!
//! A handful of sources are implemented as Node.js scrapers. This adapter
//! invokes the script with the search term and an output path, bounds it with
//! its own internal budget (never exposed to the dispatch engine), and parses
//! the JSON it writes. The output file lives in a per-call temp directory
//! removed on every exit path.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::process::Command;
use tracing::debug;

use crate::adapters::{fault, SourceAdapter};
use crate::error::{AppError, ErrorKind, Result};
use crate::models::{
    CanonicalRecord, LookupMode, RawRecord, SearchCriteria, SourceResult, StatusClassifier,
};

pub struct SubprocessAdapter {
    key: &'static str,
    display_name: &'static str,
    program: String,
    script: PathBuf,
    /// Wall-clock budget for the whole child process.
    budget: Duration,
    status: StatusClassifier,
}

impl SubprocessAdapter {
    pub fn new(
        key: &'static str,
        display_name: &'static str,
        program: impl Into<String>,
        script: impl Into<PathBuf>,
        budget: Duration,
        status: StatusClassifier,
    ) -> Self {
        Self {
            key,
            display_name,
            program: program.into(),
            script: script.into(),
            budget,
            status,
        }
    }

    async fn run(&self, term: &str) -> Result<SourceResult> {
        let scratch = tempfile::tempdir()?;
        let output_file = scratch.path().join("result.json");

        debug!(script = %self.script.display(), "starting scraper process");
        let mut command = Command::new(&self.program);
        command
            .arg(&self.script)
            .arg(term)
            .arg(&output_file)
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.budget, command.output())
            .await
            .map_err(|_| {
                AppError::subprocess(
                    &self.program,
                    format!("timed out after {}s", self.budget.as_secs()),
                )
            })?
            .map_err(|err| {
                if err.kind() == std::io::ErrorKind::NotFound {
                    AppError::DependencyMissing(format!(
                        "'{}' was not found; is Node.js installed?",
                        self.program
                    ))
                } else {
                    AppError::Io(err)
                }
            })?;

        if !output.status.success() {
            return Err(AppError::subprocess(
                &self.program,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        let raw = tokio::fs::read_to_string(&output_file).await.map_err(|_| {
            AppError::subprocess(&self.program, "script did not produce an output file")
        })?;
        let value: JsonValue = serde_json::from_str(&raw)?;
        Ok(self.interpret(term, value))
    }

    /// Scripts emit either a single-record array or an error object.
    fn interpret(&self, term: &str, value: JsonValue) -> SourceResult {
        match value {
            JsonValue::Array(items) => match items.first().and_then(JsonValue::as_object) {
                Some(record) => {
                    SourceResult::Success(record_from_json(record, &self.status))
                }
                None => SourceResult::no_match(term),
            },
            JsonValue::Object(map) => {
                let error = map
                    .get("error")
                    .and_then(JsonValue::as_str)
                    .unwrap_or("unrecognized scraper output");
                if error.to_lowercase().contains("no results") {
                    return SourceResult::no_match(term);
                }
                let details = map.get("details").and_then(JsonValue::as_str);
                SourceResult::failure(
                    ErrorKind::Unexpected,
                    match details {
                        Some(details) => format!("{error} ({details})"),
                        None => error.to_string(),
                    },
                )
            }
            _ => SourceResult::failure(ErrorKind::Unexpected, "unrecognized scraper output"),
        }
    }
}

#[async_trait]
impl SourceAdapter for SubprocessAdapter {
    fn key(&self) -> &'static str {
        self.key
    }

    fn display_name(&self) -> &'static str {
        self.display_name
    }

    async fn query(&self, criteria: &SearchCriteria) -> SourceResult {
        let Some(mode) = criteria.lookup() else {
            return SourceResult::invalid_criteria();
        };
        // The scripts take a single positional search term.
        let term = match mode {
            LookupMode::Identifier(id) => id,
            LookupMode::Name(name) => name,
        };
        match self.run(term).await {
            Ok(result) => result,
            Err(err) => fault(err),
        }
    }
}

/// Map the scraper output object onto a normalized record.
pub(crate) fn record_from_json(
    object: &serde_json::Map<String, JsonValue>,
    status: &StatusClassifier,
) -> CanonicalRecord {
    let field = |key: &str| {
        object
            .get(key)
            .and_then(JsonValue::as_str)
            .map(str::to_string)
    };
    RawRecord {
        entity_name: field("entity_name"),
        registration_date: field("registration_date"),
        entity_type: field("entity_type"),
        business_id: field("business_identification_number"),
        entity_status: field("entity_status"),
        address: field("address"),
    }
    .normalize(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn adapter() -> SubprocessAdapter {
        SubprocessAdapter::new(
            "ks",
            "Kansas",
            "node",
            "scripts/SearchKS.js",
            Duration::from_secs(240),
            StatusClassifier::substring(&["active", "good standing"]),
        )
    }

    #[test]
    fn single_record_array_becomes_success() {
        let value = json!([{
            "entity_name": "Acme Corp",
            "registration_date": "2020-01-05",
            "entity_type": "LLC",
            "business_identification_number": "1234",
            "entity_status": "Active - In Good Standing",
            "address": "1 Main St\nTopeka, KS"
        }]);
        match adapter().interpret("Acme Corp", value) {
            SourceResult::Success(record) => {
                assert_eq!(record.registration_date, "01/05/2020");
                assert_eq!(record.address, "1 Main St, Topeka, KS");
                assert!(record.status_active);
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn empty_array_is_no_match() {
        assert_eq!(
            adapter().interpret("Acme", json!([])),
            SourceResult::no_match("Acme")
        );
    }

    #[test]
    fn no_results_error_object_is_no_match() {
        let value = json!({"error": "No results found for 'Acme'."});
        assert_eq!(
            adapter().interpret("Acme", value),
            SourceResult::no_match("Acme")
        );
    }

    #[test]
    fn other_error_object_is_unexpected_failure() {
        let value = json!({"error": "Node.js script for KS failed.", "details": "stack trace"});
        match adapter().interpret("Acme", value) {
            SourceResult::Failure { kind, message } => {
                assert_eq!(kind, ErrorKind::Unexpected);
                assert!(message.contains("stack trace"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_criteria_short_circuits_before_spawning() {
        // The program is a path that cannot exist; reaching it would error
        // differently than the canned invalid-criteria failure.
        let adapter = SubprocessAdapter::new(
            "ks",
            "Kansas",
            "/nonexistent/binary",
            "scripts/SearchKS.js",
            Duration::from_secs(1),
            StatusClassifier::default(),
        );
        let result = adapter.query(&SearchCriteria::default()).await;
        assert_eq!(result, SourceResult::invalid_criteria());
    }
}
