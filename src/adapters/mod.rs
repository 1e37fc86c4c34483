//! The source adapter contract - the only interface per-site integration code
//! must satisfy to be pluggable.
//!
//! Whatever an adapter does internally (browser automation, HTTP APIs, an
//! out-of-process scraper), the constraints are the same:
//!
//! - never propagate an unhandled fault past the boundary; convert it to a
//!   typed [`SourceResult::Failure`];
//! - acquire and release any session or process it opens, on every exit path;
//! - route multi-row results through [`crate::services::matching`] instead of
//!   re-implementing matching;
//! - route audio challenges through [`crate::captcha`];
//! - normalize successes through [`crate::models::RawRecord::normalize`].

pub mod registry;
pub mod subprocess;

pub use registry::SourceRegistry;
pub use subprocess::SubprocessAdapter;

use async_trait::async_trait;

use crate::error::{AppError, ErrorKind};
use crate::models::{SearchCriteria, SourceResult};

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable, unique registry key, e.g. `"ny"`.
    fn key(&self) -> &'static str;

    /// Human-readable source name for logs.
    fn display_name(&self) -> &'static str;

    /// Run one lookup against the source.
    async fn query(&self, criteria: &SearchCriteria) -> SourceResult;
}

/// Convert an adapter's internal fault into the result the contract requires.
pub fn fault(err: AppError) -> SourceResult {
    SourceResult::failure(ErrorKind::Unexpected, err.to_string())
}
