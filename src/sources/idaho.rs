//! Idaho - SOSBiz business search.
//!
//! Browser integration: the search UI renders results into a table and opens
//! a drawer with the entity details. Multi-row results go through the shared
//! disambiguation engine. Active keyword set: substring `active` /
//! `good standing` (statuses read like `Active-Good Standing`).

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::adapters::subprocess::record_from_json;
use crate::adapters::{fault, SourceAdapter};
use crate::browser::BrowserSession;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::infrastructure::PageDriver;
use crate::models::{CandidateSummary, SearchCriteria, SourceResult, StatusClassifier};
use crate::services::{select_candidate, MatchOutcome, MatchPolicy};

const SEARCH_URL: &str = "https://sosbiz.idaho.gov/search/business";
const SEARCH_INPUT: &str = "input[placeholder*='Search']";
const RESULT_ROWS: &str = "div.table-wrapper table tbody tr";
const EMPTY_PLACEHOLDER: &str = "div.empty-placeholder-wrapper";
const DETAILS_DRAWER: &str = "div.drawer.show table.details-list";

const RESULTS_WAIT: Duration = Duration::from_secs(30);
const STATUS: StatusClassifier = StatusClassifier::substring(&["active", "good standing"]);

pub struct IdahoAdapter {
    policy: MatchPolicy,
}

impl IdahoAdapter {
    pub fn new(config: &Config) -> Self {
        Self {
            policy: config.match_policy,
        }
    }

    async fn run(&self, driver: &PageDriver, term: &str) -> Result<SourceResult> {
        driver.goto(SEARCH_URL).await?;
        driver.wait_for(SEARCH_INPUT, RESULTS_WAIT).await?;
        driver.type_slowly(SEARCH_INPUT, term).await?;
        driver.press_key(SEARCH_INPUT, "Enter").await?;

        let matched = driver
            .wait_for_any(&[RESULT_ROWS, EMPTY_PLACEHOLDER], RESULTS_WAIT)
            .await?;
        if matched == 1 {
            return Ok(SourceResult::no_match(term));
        }

        let candidates: Vec<CandidateSummary> = driver
            .eval_as(format!(
                r#"
                Array.from(document.querySelectorAll("{RESULT_ROWS}")).map(row => {{
                    const cells = row.querySelectorAll('td');
                    return {{
                        entity_name: (cells[0]?.innerText ?? '').trim(),
                        id: (cells[1]?.innerText ?? '').trim()
                    }};
                }})
                "#
            ))
            .await?;
        if candidates.is_empty() {
            return Ok(SourceResult::no_match(term));
        }
        debug!(count = candidates.len(), "result rows parsed");

        let selected = match select_candidate(term, &candidates, self.policy) {
            MatchOutcome::Selected(index) => index,
            MatchOutcome::Ambiguous(candidates) => {
                return Ok(SourceResult::Ambiguous { candidates })
            }
        };

        // Open the selected row's drawer and read the labeled detail cells.
        driver
            .eval(format!(
                r#"
                document.querySelectorAll("{RESULT_ROWS}")[{selected}]
                    ?.querySelector("td div[role='button']")
                    ?.click()
                "#
            ))
            .await?;
        driver.wait_for(DETAILS_DRAWER, RESULTS_WAIT).await?;

        let details = driver
            .eval(format!(
                r#"
                (() => {{
                    const get = (label) => {{
                        for (const row of document.querySelectorAll("{DETAILS_DRAWER} tr")) {{
                            const cells = row.querySelectorAll('td');
                            if (cells.length >= 2 && cells[0].innerText.trim() === label) {{
                                return cells[1].innerHTML
                                    .replace(/<br\s*\/?>/gi, ', ')
                                    .replace(/<[^>]+>/g, ' ')
                                    .trim();
                            }}
                        }}
                        return null;
                    }};
                    return {{
                        entity_name: document.querySelector('div.drawer.show h4')?.innerText.trim() ?? null,
                        registration_date: get('Initial Filing Date') ?? get('Registration Date'),
                        entity_type: get('Entity Type'),
                        business_identification_number: get('File Number') ?? get('Filing Number'),
                        entity_status: get('Status'),
                        address: get('Principal Address') ?? get('Mailing Address')
                    }};
                }})()
                "#
            ))
            .await?;

        let JsonValue::Object(fields) = details else {
            return Err(AppError::Other(
                "details drawer did not yield an object".into(),
            ));
        };
        Ok(SourceResult::Success(record_from_json(&fields, &STATUS)))
    }
}

#[async_trait]
impl SourceAdapter for IdahoAdapter {
    fn key(&self) -> &'static str {
        "id"
    }

    fn display_name(&self) -> &'static str {
        "Idaho"
    }

    async fn query(&self, criteria: &SearchCriteria) -> SourceResult {
        if criteria.lookup().is_none() {
            return SourceResult::invalid_criteria();
        }
        let term = criteria.term().to_string();

        let session = match BrowserSession::launch().await {
            Ok(session) => session,
            Err(err) => return fault(err),
        };
        let outcome = self.run(session.driver(), &term).await;
        session.shutdown().await;

        match outcome {
            Ok(result) => result,
            Err(err) => fault(err),
        }
    }
}
