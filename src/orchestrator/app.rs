//! Application front door.
//!
//! Owns the configuration and the source registry, runs one dispatch, prints
//! the summary, and writes the JSON report.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::adapters::SourceRegistry;
use crate::config::Config;
use crate::models::{DispatchReport, ReportTally, SearchCriteria, SourceResult};
use crate::orchestrator::dispatcher::dispatch;
use crate::sources;
use crate::utils::logging::truncate_text;

/// Longest candidate name printed in verbose ambiguity logs.
const CANDIDATE_LOG_WIDTH: usize = 60;

pub struct App {
    config: Config,
    registry: SourceRegistry,
}

impl App {
    /// App over the full set of implemented sources.
    pub fn new(config: Config) -> Self {
        let registry = sources::default_registry(&config);
        Self { config, registry }
    }

    /// App over a caller-supplied registry, for partial runs and tests.
    pub fn with_registry(config: Config, registry: SourceRegistry) -> Self {
        Self { config, registry }
    }

    /// Run one lookup across all sources and write the report file.
    pub async fn run(&self, criteria: &SearchCriteria) -> Result<DispatchReport> {
        log_startup(&self.config, self.registry.len(), criteria);

        let report = dispatch(
            criteria,
            &self.registry,
            self.config.max_concurrency,
            self.config.per_source_timeout(),
        )
        .await;

        for (key, result) in report.iter() {
            log_source_outcome(key, result, self.config.verbose_logging);
        }
        log_summary(&report.tally());

        let json = serde_json::to_string_pretty(&report)?;
        tokio::fs::write(&self.config.report_file, json)
            .await
            .with_context(|| {
                format!("writing report to {}", self.config.report_file.display())
            })?;
        info!("💾 Report written to {}", self.config.report_file.display());

        Ok(report)
    }
}

fn log_startup(config: &Config, source_count: usize, criteria: &SearchCriteria) {
    info!("{}", "=".repeat(60));
    info!("🚀 Business registry lookup");
    info!("🔍 Search term: {}", criteria.term());
    info!(
        "📊 {} sources, up to {} concurrent, {}s per source",
        source_count, config.max_concurrency, config.per_source_timeout_secs
    );
    info!("{}", "=".repeat(60));
}

fn log_source_outcome(key: &str, result: &SourceResult, verbose: bool) {
    let name = sources::state_name(key);
    match result {
        SourceResult::Success(record) => {
            info!("✓ {name}: {} ({})", record.entity_name, record.business_id);
        }
        SourceResult::NoMatch { .. } => info!("∅ {name}: no match"),
        SourceResult::Ambiguous { candidates } => {
            info!("⚠️ {name}: ambiguous, {} candidates", candidates.len());
            if verbose {
                for candidate in candidates {
                    info!(
                        "    - {} ({})",
                        truncate_text(&candidate.name, CANDIDATE_LOG_WIDTH),
                        candidate.id
                    );
                }
            }
        }
        SourceResult::Failure { kind, message } => {
            warn!("✗ {name}: {} - {message}", kind.label());
        }
    }
}

fn log_summary(tally: &ReportTally) {
    info!("{}", "─".repeat(60));
    info!(
        "📊 Done: {} found, {} no match, {} ambiguous, {} failed",
        tally.found, tally.no_match, tally.ambiguous, tally.failed
    );
    info!("{}", "─".repeat(60));
}
