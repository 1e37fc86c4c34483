//! Audio plumbing for the challenge solver: raw downloaded bytes in,
//! transcript out.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;

use crate::captcha::transcribe::{TranscriptionEngine, SAMPLE_RATE};
use crate::error::{AppError, Result};

/// Turns a downloaded audio asset into a transcript.
///
/// Split out as a trait so solver tests can run without ffmpeg or a model.
#[async_trait]
pub trait AudioPipeline: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String>;
}

/// Production pipeline: ffmpeg decode/resample, then the offline engine.
///
/// The downloaded asset is written to a per-call temp directory that is
/// removed on every exit path.
pub struct FfmpegPipeline {
    engine: Arc<dyn TranscriptionEngine>,
}

impl FfmpegPipeline {
    pub fn new(engine: Arc<dyn TranscriptionEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl AudioPipeline for FfmpegPipeline {
    async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        let scratch = tempfile::tempdir()?;
        let asset = scratch.path().join("challenge.mp3");
        tokio::fs::write(&asset, audio).await?;

        let samples = decode_to_pcm(&asset).await?;

        // Vosk decoding is CPU-bound; keep it off the async workers.
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || engine.transcribe(&samples))
            .await
            .map_err(|err| AppError::Transcription(format!("transcription task failed: {err}")))?
    }
}

/// Decode any audio container to mono 16 kHz signed 16-bit PCM via ffmpeg,
/// exactly the conversion the older scrapers shelled out for.
pub async fn decode_to_pcm(path: &Path) -> Result<Vec<i16>> {
    let output = Command::new("ffmpeg")
        .arg("-i")
        .arg(path)
        .args(["-f", "s16le", "-acodec", "pcm_s16le", "-ac", "1"])
        .args(["-ar", &SAMPLE_RATE.to_string()])
        .args(["-loglevel", "error", "pipe:1"])
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                AppError::DependencyMissing(
                    "ffmpeg could not be found in the system PATH".into(),
                )
            } else {
                AppError::Io(err)
            }
        })?;

    if !output.status.success() {
        return Err(AppError::AudioDecode(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    Ok(output
        .stdout
        .chunks_exact(2)
        .map(|bytes| i16::from_le_bytes([bytes[0], bytes[1]]))
        .collect())
}
