//! Audio-CAPTCHA challenge solving.
//!
//! Several registries gate their search behind a reCAPTCHA. The documented
//! strategy is the audio variant: fetch the spoken challenge, decode it to
//! 16 kHz mono PCM, run it through an offline speech-to-text engine, submit
//! the transcript, and poll for verification.
//!
//! The solver never retries on its own; a calling adapter may re-trigger a
//! fresh challenge and call [`ChallengeSolver::solve`] again up to a small
//! attempt count.

pub mod audio;
pub mod recaptcha;
pub mod transcribe;

pub use audio::{AudioPipeline, FfmpegPipeline};
pub use recaptcha::RecaptchaChallenge;
pub use transcribe::{default_engine, TranscriptionEngine, SAMPLE_RATE, VOSK_MODEL_DIR};

use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::error::{AppError, ErrorKind};

/// How often the solver re-checks for the success indicator.
const VERIFY_POLL: Duration = Duration::from_millis(500);

/// Solver progress, for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveState {
    Idle,
    ChallengePresented,
    AudioFetched,
    Transcribed,
    Submitted,
    Verified,
    Failed,
}

/// A successful call either solved the challenge or found none to solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveOutcome {
    Solved,
    /// No challenge UI present; callers proceed without treating this as failure.
    NotApplicable,
}

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("audio transcription produced no text")]
    TranscriptionFailed,
    #[error("the challenge was not verified within the time budget")]
    VerificationTimeout,
    #[error("challenge interaction failed: {0}")]
    Challenge(String),
}

impl SolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SolveError::TranscriptionFailed => ErrorKind::TranscriptionFailed,
            SolveError::VerificationTimeout => ErrorKind::VerificationTimeout,
            SolveError::Challenge(_) => ErrorKind::CaptchaUnsolved,
        }
    }
}

/// The challenge UI as the solver sees it, supplied by the calling adapter.
///
/// Implementations own the session-specific details (frames, selectors,
/// download timeouts); the solver owns the sequencing.
#[async_trait]
pub trait AudioChallenge: Send + Sync {
    /// Whether a challenge UI is currently present at all.
    async fn is_present(&self) -> crate::error::Result<bool>;
    /// Switch the challenge to its audio variant.
    async fn request_audio_variant(&self) -> crate::error::Result<()>;
    /// Download the spoken challenge asset, with its own network timeout.
    async fn fetch_audio(&self) -> crate::error::Result<Vec<u8>>;
    /// Type the transcript into the answer field and trigger verification.
    async fn submit_transcript(&self, transcript: &str) -> crate::error::Result<()>;
    /// Whether the success indicator is showing.
    async fn is_verified(&self) -> crate::error::Result<bool>;
}

/// Drives one audio challenge end to end within a time budget.
pub struct ChallengeSolver<'a> {
    pipeline: &'a dyn AudioPipeline,
}

impl<'a> ChallengeSolver<'a> {
    pub fn new(pipeline: &'a dyn AudioPipeline) -> Self {
        Self { pipeline }
    }

    /// Run the state machine once. Any step failure is surfaced as a typed
    /// error, never silently retried.
    pub async fn solve(
        &self,
        challenge: &dyn AudioChallenge,
        budget: Duration,
    ) -> Result<SolveOutcome, SolveError> {
        let deadline = Instant::now() + budget;
        let mut state = SolveState::Idle;
        let outcome = self.drive(challenge, deadline, &mut state).await;
        if outcome.is_err() {
            state = SolveState::Failed;
        }
        debug!(state = ?state, "audio challenge finished");
        outcome
    }

    async fn drive(
        &self,
        challenge: &dyn AudioChallenge,
        deadline: Instant,
        state: &mut SolveState,
    ) -> Result<SolveOutcome, SolveError> {
        if !step(deadline, challenge.is_present()).await? {
            return Ok(SolveOutcome::NotApplicable);
        }
        *state = SolveState::ChallengePresented;

        step(deadline, challenge.request_audio_variant()).await?;
        let audio = step(deadline, challenge.fetch_audio()).await?;
        *state = SolveState::AudioFetched;
        debug!(bytes = audio.len(), "challenge audio downloaded");

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(SolveError::Challenge("time budget exhausted".into()));
        }
        let transcript = match tokio::time::timeout(remaining, self.pipeline.transcribe(&audio))
            .await
        {
            Ok(Ok(text)) => text,
            Ok(Err(AppError::Transcription(_))) => return Err(SolveError::TranscriptionFailed),
            Ok(Err(err)) => return Err(SolveError::Challenge(err.to_string())),
            Err(_) => return Err(SolveError::Challenge("time budget exhausted".into())),
        };
        let transcript = transcript.trim().to_string();
        if transcript.is_empty() {
            return Err(SolveError::TranscriptionFailed);
        }
        *state = SolveState::Transcribed;
        debug!(words = transcript.split_whitespace().count(), "transcript ready");

        step(deadline, challenge.submit_transcript(&transcript)).await?;
        *state = SolveState::Submitted;

        // Bounded poll for the success indicator.
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(SolveError::VerificationTimeout);
            }
            match tokio::time::timeout(remaining, challenge.is_verified()).await {
                Ok(Ok(true)) => break,
                Ok(Ok(false)) => {}
                Ok(Err(err)) => return Err(SolveError::Challenge(err.to_string())),
                Err(_) => return Err(SolveError::VerificationTimeout),
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(SolveError::VerificationTimeout);
            }
            tokio::time::sleep(VERIFY_POLL.min(remaining)).await;
        }
        *state = SolveState::Verified;
        Ok(SolveOutcome::Solved)
    }
}

/// Run one challenge step within what is left of the budget.
async fn step<T, F>(deadline: Instant, fut: F) -> Result<T, SolveError>
where
    F: std::future::Future<Output = crate::error::Result<T>>,
{
    let remaining = deadline.saturating_duration_since(Instant::now());
    if remaining.is_zero() {
        return Err(SolveError::Challenge("time budget exhausted".into()));
    }
    match tokio::time::timeout(remaining, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(SolveError::Challenge(err.to_string())),
        Err(_) => Err(SolveError::Challenge("time budget exhausted".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct MockChallenge {
        present: bool,
        /// How many `is_verified` polls return false before success; `None`
        /// means verification never succeeds.
        verify_after: Option<u32>,
        polls: Mutex<u32>,
        submitted: Mutex<Option<String>>,
    }

    impl MockChallenge {
        fn new(present: bool, verify_after: Option<u32>) -> Self {
            Self {
                present,
                verify_after,
                polls: Mutex::new(0),
                submitted: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl AudioChallenge for MockChallenge {
        async fn is_present(&self) -> crate::error::Result<bool> {
            Ok(self.present)
        }

        async fn request_audio_variant(&self) -> crate::error::Result<()> {
            Ok(())
        }

        async fn fetch_audio(&self) -> crate::error::Result<Vec<u8>> {
            Ok(vec![0u8; 64])
        }

        async fn submit_transcript(&self, transcript: &str) -> crate::error::Result<()> {
            *self.submitted.lock().expect("lock") = Some(transcript.to_string());
            Ok(())
        }

        async fn is_verified(&self) -> crate::error::Result<bool> {
            let mut polls = self.polls.lock().expect("lock");
            *polls += 1;
            Ok(match self.verify_after {
                Some(after) => *polls > after,
                None => false,
            })
        }
    }

    struct MockPipeline {
        text: &'static str,
    }

    #[async_trait]
    impl AudioPipeline for MockPipeline {
        async fn transcribe(&self, _audio: &[u8]) -> crate::error::Result<String> {
            Ok(self.text.to_string())
        }
    }

    #[tokio::test]
    async fn absent_challenge_is_not_applicable() {
        let challenge = MockChallenge::new(false, Some(0));
        let pipeline = MockPipeline { text: "seven two" };
        let solver = ChallengeSolver::new(&pipeline);

        let outcome = solver
            .solve(&challenge, Duration::from_secs(5))
            .await
            .expect("solve");
        assert_eq!(outcome, SolveOutcome::NotApplicable);
        assert!(challenge.submitted.lock().expect("lock").is_none());
    }

    #[tokio::test]
    async fn empty_transcript_is_transcription_failure() {
        let challenge = MockChallenge::new(true, Some(0));
        let pipeline = MockPipeline { text: "   " };
        let solver = ChallengeSolver::new(&pipeline);

        let err = solver
            .solve(&challenge, Duration::from_secs(5))
            .await
            .expect_err("must fail");
        assert!(matches!(err, SolveError::TranscriptionFailed));
        assert_eq!(err.kind(), ErrorKind::TranscriptionFailed);
    }

    #[tokio::test]
    async fn valid_transcript_is_submitted_and_verified() {
        let challenge = MockChallenge::new(true, Some(1));
        let pipeline = MockPipeline {
            text: "three five nine",
        };
        let solver = ChallengeSolver::new(&pipeline);

        let outcome = solver
            .solve(&challenge, Duration::from_secs(5))
            .await
            .expect("solve");
        assert_eq!(outcome, SolveOutcome::Solved);
        assert_eq!(
            challenge.submitted.lock().expect("lock").as_deref(),
            Some("three five nine")
        );
    }

    #[tokio::test]
    async fn verification_never_confirming_times_out() {
        let challenge = MockChallenge::new(true, None);
        let pipeline = MockPipeline { text: "four one" };
        let solver = ChallengeSolver::new(&pipeline);

        let err = solver
            .solve(&challenge, Duration::from_millis(80))
            .await
            .expect_err("must time out");
        assert!(matches!(err, SolveError::VerificationTimeout));
        assert_eq!(err.kind(), ErrorKind::VerificationTimeout);
    }
}
