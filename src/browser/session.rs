//! One browser process per adapter invocation.
//!
//! Each query that needs a browser launches its own headless Chromium,
//! drives it through a [`PageDriver`], and tears the process down on every
//! exit path. Nothing is shared between concurrently running adapters.

use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::infrastructure::PageDriver;

pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    driver: PageDriver,
}

impl BrowserSession {
    /// Launch a fresh headless browser with a blank page.
    pub async fn launch() -> Result<Self> {
        let config = BrowserConfig::builder()
            .build()
            .map_err(AppError::Other)?;
        let (browser, mut handler) = Browser::launch(config).await?;

        // Drain CDP events in the background for the life of the session.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page("about:blank").await?;
        Ok(Self {
            browser,
            handler_task,
            driver: PageDriver::new(page),
        })
    }

    pub fn driver(&self) -> &PageDriver {
        &self.driver
    }

    /// Tear down the browser process. Best effort; adapters call this on
    /// every exit path.
    pub async fn shutdown(mut self) {
        if let Err(err) = self.browser.close().await {
            debug!("browser close failed: {err}");
        }
        if let Err(err) = self.browser.wait().await {
            debug!("browser wait failed: {err}");
        }
        self.handler_task.abort();
    }
}
