//! Page driver - infrastructure layer.
//!
//! Holds the scarce resource (the page) and exposes capabilities only. It
//! knows nothing about registries, records, or search flows.

use std::time::Duration;

use chromiumoxide::Page;
use rand::Rng;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio::time::sleep;

use crate::error::{AppError, Result};

/// How often element waits re-check the page.
const WAIT_POLL: Duration = Duration::from_millis(250);

pub struct PageDriver {
    page: Page,
}

impl PageDriver {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub async fn goto(&self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        Ok(())
    }

    /// Evaluate JavaScript and return its JSON result.
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        Ok(result.into_value()?)
    }

    /// Evaluate JavaScript and deserialize the result.
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let value = self.eval(js_code).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Wait until `selector` matches an element, polling up to `budget`.
    pub async fn wait_for(&self, selector: &str, budget: Duration) -> Result<()> {
        self.wait_for_any(&[selector], budget).await.map(|_| ())
    }

    /// Wait until any of `selectors` matches; returns the index of the first
    /// selector that did.
    pub async fn wait_for_any(&self, selectors: &[&str], budget: Duration) -> Result<usize> {
        let deadline = tokio::time::Instant::now() + budget;
        loop {
            for (index, selector) in selectors.iter().enumerate() {
                if self.page.find_element(*selector).await.is_ok() {
                    return Ok(index);
                }
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(AppError::ElementTimeout {
                    selector: selectors.join(", "),
                    waited_ms: budget.as_millis() as u64,
                });
            }
            sleep(WAIT_POLL).await;
        }
    }

    pub async fn click(&self, selector: &str) -> Result<()> {
        self.page.find_element(selector).await?.click().await?;
        Ok(())
    }

    pub async fn press_key(&self, selector: &str, key: &str) -> Result<()> {
        self.page.find_element(selector).await?.press_key(key).await?;
        Ok(())
    }

    /// Type into an element one character at a time with a small random delay,
    /// the way a person would.
    pub async fn type_slowly(&self, selector: &str, text: &str) -> Result<()> {
        let element = self.page.find_element(selector).await?;
        element.click().await?;
        for ch in text.chars() {
            element.type_str(ch.to_string()).await?;
            let jitter_ms = rand::thread_rng().gen_range(50..=120);
            sleep(Duration::from_millis(jitter_ms)).await;
        }
        Ok(())
    }
}
