//! Concurrent dispatch across registered sources.
//!
//! One task per source, bounded by a semaphore, each under its own wall-clock
//! timeout. The timeout clock starts only after the task holds a permit, so a
//! source queued behind the concurrency bound does not expire while waiting.
//! A panicking adapter never takes the run down; it becomes a failure entry
//! like any other.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::adapters::SourceRegistry;
use crate::error::ErrorKind;
use crate::models::{DispatchReport, SearchCriteria, SourceResult};

/// Query every registered source and collect exactly one result per key.
pub async fn dispatch(
    criteria: &SearchCriteria,
    registry: &SourceRegistry,
    max_concurrency: usize,
    per_source_timeout: Duration,
) -> DispatchReport {
    let mut report = DispatchReport::new();

    // Reject unusable criteria up front, before any session or process is
    // opened anywhere.
    if criteria.lookup().is_none() {
        warn!("criteria carry neither an identifier nor a name");
        for key in registry.keys() {
            report.record(key, SourceResult::invalid_criteria());
        }
        return report;
    }

    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let mut handles: Vec<(&'static str, JoinHandle<SourceResult>)> = Vec::new();

    for (key, adapter) in registry.iter() {
        let semaphore = Arc::clone(&semaphore);
        let adapter = Arc::clone(adapter);
        let criteria = criteria.clone();

        let handle = tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire().await else {
                // Closed semaphore only happens on teardown.
                return SourceResult::failure(ErrorKind::Unexpected, "dispatch was shut down");
            };
            let started = tokio::time::Instant::now();
            info!(source = adapter.display_name(), "querying");

            let result =
                match tokio::time::timeout(per_source_timeout, adapter.query(&criteria)).await {
                    Ok(result) => result,
                    Err(_) => SourceResult::failure(
                        ErrorKind::Timeout,
                        format!(
                            "source did not answer within {}s",
                            per_source_timeout.as_secs()
                        ),
                    ),
                };

            info!(
                source = adapter.display_name(),
                outcome = result.label(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "source finished"
            );
            result
        });
        handles.push((key, handle));
    }

    for (key, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(err) => {
                warn!(source = key, "source task died: {err}");
                let message = if err.is_panic() {
                    "the source task panicked"
                } else {
                    "the source task was aborted"
                };
                SourceResult::failure(ErrorKind::Unexpected, message)
            }
        };
        report.record(key, result);
    }
    report
}
