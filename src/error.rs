use std::fmt;

use thiserror::Error;

/// Error taxonomy surfaced to callers in per-source results.
///
/// These are the only failure labels a dispatch report entry may carry; every
/// internal fault is mapped onto one of them before it crosses an adapter
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Neither a business identifier nor an entity name was supplied.
    InvalidCriteria,
    /// The per-source time budget expired.
    Timeout,
    /// The audio-challenge subsystem could not get past a CAPTCHA.
    CaptchaUnsolved,
    /// Speech-to-text produced no usable transcript.
    TranscriptionFailed,
    /// The CAPTCHA accepted a transcript but never confirmed verification.
    VerificationTimeout,
    /// Any other fault, wrapped with its original message for diagnostics.
    Unexpected,
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::InvalidCriteria => "Invalid search criteria",
            ErrorKind::Timeout => "The source timed out",
            ErrorKind::CaptchaUnsolved => "A CAPTCHA challenge could not be solved",
            ErrorKind::TranscriptionFailed => "Audio transcription failed",
            ErrorKind::VerificationTimeout => "CAPTCHA verification timed out",
            ErrorKind::Unexpected => "An unexpected error occurred",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Internal application error.
///
/// Adapters work with this type through `?` and convert to a typed
/// `SourceResult` at their boundary; it never reaches the dispatch report
/// directly.
#[derive(Debug, Error)]
pub enum AppError {
    /// Browser automation fault (launch, navigation, script evaluation).
    #[error("browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    /// An expected element never appeared on the page.
    #[error("element '{selector}' did not appear within {waited_ms}ms")]
    ElementTimeout { selector: String, waited_ms: u64 },

    /// Network request failed.
    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The remote API answered, but not with what we expected.
    #[error("unexpected response from {endpoint}: {detail}")]
    BadResponse { endpoint: String, detail: String },

    /// An out-of-process scraper failed or produced no usable output.
    #[error("subprocess '{program}' failed: {detail}")]
    Subprocess { program: String, detail: String },

    /// A runtime dependency (ffmpeg, node, a model directory) is missing.
    #[error("dependency missing: {0}")]
    DependencyMissing(String),

    /// Audio could not be decoded to PCM.
    #[error("audio decode failed: {0}")]
    AudioDecode(String),

    /// The speech-to-text engine failed outright.
    #[error("transcription failed: {0}")]
    Transcription(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Wrap a reqwest failure with the endpoint it was talking to.
    pub fn http(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Http {
            endpoint: endpoint.into(),
            source,
        }
    }

    pub fn subprocess(program: impl Into<String>, detail: impl Into<String>) -> Self {
        AppError::Subprocess {
            program: program.into(),
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
