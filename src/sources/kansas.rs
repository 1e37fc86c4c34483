//! Kansas - out-of-process Node.js scraper.
//!
//! The Kansas portal is driven by a standalone Node.js script that handles
//! its own browser session, including any audio challenge the site raises,
//! and writes a JSON result file. This module only configures the generic
//! subprocess adapter around it.

use std::time::Duration;

use crate::adapters::SubprocessAdapter;
use crate::config::Config;
use crate::models::StatusClassifier;

const SCRIPT_NAME: &str = "SearchKS.js";

/// Internal budget for the whole child process run.
const SCRIPT_BUDGET: Duration = Duration::from_secs(240);

pub fn kansas_adapter(config: &Config) -> SubprocessAdapter {
    SubprocessAdapter::new(
        "ks",
        "Kansas",
        config.node_program.clone(),
        config.scripts_dir.join(SCRIPT_NAME),
        SCRIPT_BUDGET,
        StatusClassifier::substring(&["active", "good standing"]),
    )
}
