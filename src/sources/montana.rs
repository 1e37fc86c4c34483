//! Montana - SOS business search, gated by a reCAPTCHA.
//!
//! The search page intermittently raises a challenge before showing results.
//! When it does, the adapter solves the audio variant through the shared
//! challenge solver, retrying with a fresh challenge up to the configured
//! attempt count. Without a compiled-in speech engine a raised challenge is
//! reported as an unsolved-CAPTCHA failure rather than attempted blind.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::adapters::subprocess::record_from_json;
use crate::adapters::{fault, SourceAdapter};
use crate::browser::BrowserSession;
use crate::captcha::{
    default_engine, AudioChallenge, ChallengeSolver, FfmpegPipeline, RecaptchaChallenge,
    SolveOutcome, TranscriptionEngine,
};
use crate::config::Config;
use crate::error::{AppError, ErrorKind, Result};
use crate::infrastructure::PageDriver;
use crate::models::{CandidateSummary, SearchCriteria, SourceResult, StatusClassifier};
use crate::services::{select_candidate, MatchOutcome, MatchPolicy};

const SEARCH_URL: &str = "https://biz.sosmt.gov/search/business";
const SEARCH_INPUT: &str = "input[placeholder*='Search by name']";
const SEARCH_BUTTON: &str = "button[aria-label='Execute search']";
const RESULT_ROWS: &str = "tr.div-table-row";
const ROW_BUTTON: &str = ".interactive-cell-button";
const DETAILS_DRAWER: &str = ".inner-drawer table.details-list";
const NO_RESULTS_TEXT: &str = "No results found matching your criteria";

const RESULTS_WAIT: Duration = Duration::from_secs(45);
const STATUS: StatusClassifier = StatusClassifier::substring(&["active"]);

pub struct MontanaAdapter {
    policy: MatchPolicy,
    engine: Option<Arc<dyn TranscriptionEngine>>,
    captcha_budget: Duration,
    captcha_attempts: usize,
    http: reqwest::Client,
}

impl MontanaAdapter {
    pub fn new(config: &Config) -> Self {
        Self {
            policy: config.match_policy,
            engine: default_engine(&config.vosk_model_dir),
            captcha_budget: config.captcha_budget(),
            captcha_attempts: config.captcha_attempts.max(1),
            http: reqwest::Client::new(),
        }
    }

    /// Solve a raised challenge if one is present. A `None` means the page is
    /// clear to use; `Some` carries the result to report instead of searching.
    async fn clear_challenge(&self, driver: &PageDriver) -> Option<SourceResult> {
        let challenge = RecaptchaChallenge::new(driver, &self.http);

        let Some(engine) = &self.engine else {
            // Only fail if a challenge is actually up.
            return match challenge.is_present().await {
                Ok(false) => None,
                Ok(true) => Some(SourceResult::failure(
                    ErrorKind::CaptchaUnsolved,
                    "no transcription engine compiled in (enable the vosk feature)",
                )),
                Err(err) => Some(fault(err)),
            };
        };

        let pipeline = FfmpegPipeline::new(Arc::clone(engine));
        let solver = ChallengeSolver::new(&pipeline);
        let mut last_err = None;
        for attempt in 1..=self.captcha_attempts {
            match solver.solve(&challenge, self.captcha_budget).await {
                Ok(SolveOutcome::NotApplicable) => return None,
                Ok(SolveOutcome::Solved) => {
                    info!(attempt, "audio challenge solved");
                    return None;
                }
                Err(err) => {
                    debug!(attempt, error = %err, "audio challenge attempt failed");
                    last_err = Some(err);
                }
            }
        }
        let err = last_err?;
        Some(SourceResult::failure(err.kind(), err.to_string()))
    }

    async fn run(&self, driver: &PageDriver, term: &str) -> Result<SourceResult> {
        driver.goto(SEARCH_URL).await?;
        driver.wait_for(SEARCH_INPUT, RESULTS_WAIT).await?;

        if let Some(result) = self.clear_challenge(driver).await {
            return Ok(result);
        }

        driver.type_slowly(SEARCH_INPUT, term).await?;
        driver.click(SEARCH_BUTTON).await?;

        // A challenge may also fire on submit.
        if let Some(result) = self.clear_challenge(driver).await {
            return Ok(result);
        }

        if let Err(err) = driver.wait_for(RESULT_ROWS, RESULTS_WAIT).await {
            let AppError::ElementTimeout { .. } = err else {
                return Err(err);
            };
            let no_results: bool = driver
                .eval_as(format!(
                    "document.body.innerText.includes('{NO_RESULTS_TEXT}')"
                ))
                .await?;
            if no_results {
                return Ok(SourceResult::no_match(term));
            }
            return Err(err);
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

        let selected = match select_candidate(term, &candidates, self.policy) {
            MatchOutcome::Selected(index) => index,
            MatchOutcome::Ambiguous(candidates) => {
                return Ok(SourceResult::Ambiguous { candidates })
            }
        };

        driver
            .eval(format!(
                r#"
                document.querySelectorAll("{RESULT_ROWS}")[{selected}]
                    ?.querySelector("{ROW_BUTTON}")
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
                        entity_name: document.querySelector('.inner-drawer h4')?.innerText.trim() ?? null,
                        registration_date: get('Initial Filing Date') ?? get('Registration Date'),
                        entity_type: get('Business Type') ?? get('Entity Type'),
                        business_identification_number: get('Filing Number') ?? get('Business ID'),
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
impl SourceAdapter for MontanaAdapter {
    fn key(&self) -> &'static str {
        "mt"
    }

    fn display_name(&self) -> &'static str {
        "Montana"
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
