use std::path::PathBuf;
use std::time::Duration;

use crate::services::MatchPolicy;

/// Application configuration, environment-driven with sensible defaults.
#[derive(Clone, Debug)]
pub struct Config {
    /// How many sources may run at the same time.
    pub max_concurrency: usize,
    /// Wall-clock budget per source.
    pub per_source_timeout_secs: u64,
    /// Budget for one audio-challenge solve.
    pub captcha_budget_secs: u64,
    /// How many fresh challenges an adapter may attempt before giving up.
    pub captcha_attempts: usize,
    /// Disambiguation policy; `first-result` restores the legacy fallback.
    pub match_policy: MatchPolicy,
    /// Vosk model directory for offline transcription.
    pub vosk_model_dir: PathBuf,
    /// Node.js binary used by out-of-process scrapers.
    pub node_program: String,
    /// Directory holding the Node.js scraper scripts.
    pub scripts_dir: PathBuf,
    /// Where the final JSON report is written.
    pub report_file: PathBuf,
    /// Log every candidate row, not just outcomes.
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrency: 6,
            per_source_timeout_secs: 240,
            captcha_budget_secs: 90,
            captcha_attempts: 2,
            match_policy: MatchPolicy::Strict,
            vosk_model_dir: PathBuf::from(crate::captcha::VOSK_MODEL_DIR),
            node_program: "node".to_string(),
            scripts_dir: PathBuf::from("scripts"),
            report_file: PathBuf::from("report.json"),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrency: env_parse("MAX_CONCURRENCY", default.max_concurrency),
            per_source_timeout_secs: env_parse(
                "PER_SOURCE_TIMEOUT_SECS",
                default.per_source_timeout_secs,
            ),
            captcha_budget_secs: env_parse("CAPTCHA_BUDGET_SECS", default.captcha_budget_secs),
            captcha_attempts: env_parse("CAPTCHA_ATTEMPTS", default.captcha_attempts),
            match_policy: std::env::var("MATCH_POLICY")
                .map(|value| MatchPolicy::parse(&value))
                .unwrap_or(default.match_policy),
            vosk_model_dir: env_path("VOSK_MODEL_DIR", default.vosk_model_dir),
            node_program: std::env::var("NODE_PROGRAM").unwrap_or(default.node_program),
            scripts_dir: env_path("SCRIPTS_DIR", default.scripts_dir),
            report_file: env_path("REPORT_FILE", default.report_file),
            verbose_logging: env_parse("VERBOSE_LOGGING", default.verbose_logging),
        }
    }

    pub fn per_source_timeout(&self) -> Duration {
        Duration::from_secs(self.per_source_timeout_secs)
    }

    pub fn captcha_budget(&self) -> Duration {
        Duration::from_secs(self.captcha_budget_secs)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn env_path(name: &str, default: PathBuf) -> PathBuf {
    std::env::var(name).map(PathBuf::from).unwrap_or(default)
}
