//! reCAPTCHA audio challenge driven through a live page.
//!
//! Selector set matches the widget as the state registry sites embed it:
//! anchor checkbox, challenge frame, audio button, download link, answer
//! field, verify button.

use std::time::Duration;

use async_trait::async_trait;

use crate::captcha::AudioChallenge;
use crate::error::{AppError, Result};
use crate::infrastructure::PageDriver;

const ANCHOR_FRAME: &str = "iframe[title=\"reCAPTCHA\"]";
const ANCHOR_CHECKBOX: &str = "#recaptcha-anchor";
const AUDIO_BUTTON: &str = "#recaptcha-audio-button";
const DOWNLOAD_LINK: &str = ".rc-audiochallenge-tdownload-link";
const ANSWER_FIELD: &str = "#audio-response";
const VERIFY_BUTTON: &str = "#recaptcha-verify-button";

/// How long each widget element may take to appear.
const WIDGET_WAIT: Duration = Duration::from_secs(15);
/// Network timeout for downloading the audio asset.
const AUDIO_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

pub struct RecaptchaChallenge<'a> {
    driver: &'a PageDriver,
    http: &'a reqwest::Client,
}

impl<'a> RecaptchaChallenge<'a> {
    pub fn new(driver: &'a PageDriver, http: &'a reqwest::Client) -> Self {
        Self { driver, http }
    }
}

#[async_trait]
impl AudioChallenge for RecaptchaChallenge<'_> {
    async fn is_present(&self) -> Result<bool> {
        self.driver
            .eval_as::<bool>(format!(
                "!!document.querySelector('{ANCHOR_FRAME}')"
            ))
            .await
    }

    async fn request_audio_variant(&self) -> Result<()> {
        // Checkbox first; the challenge frame only exists after it is ticked.
        self.driver.wait_for(ANCHOR_CHECKBOX, WIDGET_WAIT).await?;
        self.driver.click(ANCHOR_CHECKBOX).await?;
        self.driver.wait_for(AUDIO_BUTTON, WIDGET_WAIT).await?;
        self.driver.click(AUDIO_BUTTON).await?;
        self.driver.wait_for(DOWNLOAD_LINK, WIDGET_WAIT).await?;
        Ok(())
    }

    async fn fetch_audio(&self) -> Result<Vec<u8>> {
        let url: Option<String> = self
            .driver
            .eval_as(format!(
                "document.querySelector('{DOWNLOAD_LINK}')?.href ?? null"
            ))
            .await?;
        let url = url.ok_or_else(|| {
            AppError::Other("audio challenge download link has no href".into())
        })?;

        let response = self
            .http
            .get(&url)
            .timeout(AUDIO_FETCH_TIMEOUT)
            .send()
            .await
            .map_err(|err| AppError::http(&url, err))?
            .error_for_status()
            .map_err(|err| AppError::http(&url, err))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| AppError::http(&url, err))?;
        Ok(bytes.to_vec())
    }

    async fn submit_transcript(&self, transcript: &str) -> Result<()> {
        self.driver.wait_for(ANSWER_FIELD, WIDGET_WAIT).await?;
        self.driver.type_slowly(ANSWER_FIELD, transcript).await?;
        self.driver.click(VERIFY_BUTTON).await?;
        Ok(())
    }

    async fn is_verified(&self) -> Result<bool> {
        self.driver
            .eval_as::<bool>(format!(
                "document.querySelector('{ANCHOR_CHECKBOX}')?.getAttribute('aria-checked') === 'true'"
            ))
            .await
    }
}
