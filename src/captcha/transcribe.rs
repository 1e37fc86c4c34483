//! Offline speech-to-text behind a narrow engine trait.
//!
//! The production engine is Vosk with the small English model, the same setup
//! the registry scrapers have always shipped with. It is feature-gated because
//! it links against libvosk; without the feature the solver simply reports
//! that no engine is available.

use std::path::Path;
use std::sync::Arc;

use crate::error::{AppError, Result};

/// Sample rate the speech-to-text engine requires.
pub const SAMPLE_RATE: u32 = 16_000;

/// Directory name of the bundled Vosk model.
pub const VOSK_MODEL_DIR: &str = "vosk-model-small-en-us-0.15";

/// Transcribes mono PCM at [`SAMPLE_RATE`] into text.
pub trait TranscriptionEngine: Send + Sync {
    fn transcribe(&self, samples: &[i16]) -> Result<String>;
}

#[cfg(feature = "vosk")]
pub use vosk_engine::VoskEngine;

#[cfg(feature = "vosk")]
mod vosk_engine {
    use super::*;
    use vosk::{Model, Recognizer};

    /// Offline recognizer backed by a local Vosk model directory.
    pub struct VoskEngine {
        model: Model,
    }

    impl VoskEngine {
        pub fn new(model_dir: &Path) -> Result<Self> {
            if !model_dir.is_dir() {
                return Err(AppError::DependencyMissing(format!(
                    "Vosk model directory '{}' was not found; download the small \
                     English model from the Vosk website",
                    model_dir.display()
                )));
            }
            let model = Model::new(model_dir.to_string_lossy()).ok_or_else(|| {
                AppError::Transcription(format!(
                    "failed to load Vosk model from '{}'",
                    model_dir.display()
                ))
            })?;
            Ok(Self { model })
        }
    }

    impl TranscriptionEngine for VoskEngine {
        fn transcribe(&self, samples: &[i16]) -> Result<String> {
            let mut recognizer = Recognizer::new(&self.model, SAMPLE_RATE as f32)
                .ok_or_else(|| AppError::Transcription("failed to create recognizer".into()))?;
            for chunk in samples.chunks(4000) {
                let _ = recognizer.accept_waveform(chunk);
            }
            let text = recognizer
                .final_result()
                .single()
                .map(|result| result.text.to_string())
                .unwrap_or_default();
            Ok(text)
        }
    }
}

/// Build the default engine, if one is compiled in.
pub fn default_engine(model_dir: &Path) -> Option<Arc<dyn TranscriptionEngine>> {
    #[cfg(feature = "vosk")]
    {
        match VoskEngine::new(model_dir) {
            Ok(engine) => Some(Arc::new(engine)),
            Err(err) => {
                tracing::warn!("speech-to-text unavailable: {err}");
                None
            }
        }
    }
    #[cfg(not(feature = "vosk"))]
    {
        let _ = model_dir;
        None
    }
}
