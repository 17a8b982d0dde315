use crate::{ChromeLauncher, ChromePage, Error, ProfileManager, Result, normalize_url};
use chromiumoxide::Page;
use chromiumoxide::browser::Browser;
use futures::StreamExt;
use std::process::Child;
use std::time::Duration;
use tokio::task::JoinHandle;

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// A Chrome process parley launched, the CDP connection to it, and the
/// chat page it drives.
///
/// Dropping the session kills Chrome; [`BrowserSession::close`] shuts it
/// down gracefully first.
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: Page,
    chrome: Option<Child>,
    // dropped after Chrome is gone, which deletes a temporary profile
    profile: ProfileManager,
}

impl BrowserSession {
    /// Launch Chrome, connect over CDP and open `url`
    pub async fn start(launcher: &ChromeLauncher, profile: ProfileManager, url: &str) -> Result<Self> {
        let url = normalize_url(url)?;
        let mut chrome = launcher.launch()?;
        tracing::info!("Chrome started (pid {})", chrome.id());

        match Self::connect(launcher.debugging_port(), &url).await {
            Ok((browser, handler_task, page)) => Ok(Self {
                browser,
                handler_task,
                page,
                chrome: Some(chrome),
                profile,
            }),
            Err(e) => {
                let _ = chrome.kill();
                let _ = chrome.wait();
                Err(e)
            }
        }
    }

    async fn connect(port: u16, url: &str) -> Result<(Browser, JoinHandle<()>, Page)> {
        tracing::info!("CDP session: connecting to Chrome on port {}", port);

        // Chrome may not be listening yet right after spawn
        let endpoint = format!("http://localhost:{}", port);
        let (browser, mut handler) = {
            let mut retries = CONNECT_ATTEMPTS;
            loop {
                tracing::debug!("Attempting CDP connection to {}...", endpoint);
                match Browser::connect(&endpoint).await {
                    Ok(result) => {
                        tracing::info!("CDP connection established");
                        break result;
                    }
                    Err(e) => {
                        retries -= 1;
                        if retries == 0 {
                            return Err(Error::Cdp(format!(
                                "Failed to connect to Chrome after {} attempts: {}",
                                CONNECT_ATTEMPTS, e
                            )));
                        }
                        tracing::debug!(
                            "CDP connection attempt failed, retrying... ({} left)",
                            retries
                        );
                        tokio::time::sleep(CONNECT_RETRY_DELAY).await;
                    }
                }
            }
        };

        // The handler must be polled for any browser command to complete
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        tokio::time::sleep(CONNECT_RETRY_DELAY).await;

        let page = match browser.pages().await?.into_iter().next() {
            Some(page) => {
                let current = page.url().await?.unwrap_or_default();
                if current.starts_with(url) {
                    tracing::debug!("CDP: using existing page at {}", current);
                } else {
                    tracing::debug!("CDP: navigating existing page from '{}' to {}", current, url);
                    page.goto(url).await?;
                }
                page
            }
            None => {
                tracing::debug!("CDP: no existing pages, opening {}", url);
                browser.new_page(url).await?
            }
        };

        tracing::info!("Chat page open at {}", url);
        Ok((browser, handler_task, page))
    }

    /// Page accessor for the chat page
    pub fn chat_page(&self) -> ChromePage {
        ChromePage::new(self.page.clone())
    }

    /// Close the browser over CDP, then make sure the process is gone
    pub async fn close(mut self) -> Result<()> {
        if let Err(e) = self.browser.close().await {
            tracing::debug!("CDP close failed (killing Chrome instead): {}", e);
        }
        self.handler_task.abort();

        if let Some(mut chrome) = self.chrome.take() {
            let status = tokio::task::spawn_blocking(move || {
                if matches!(chrome.try_wait(), Ok(None)) {
                    let _ = chrome.kill();
                }
                chrome.wait()
            })
            .await
            .map_err(|e| Error::Browser(format!("Failed to reap Chrome: {}", e)))??;
            tracing::info!("Chrome stopped (exit code: {})", status.code().unwrap_or(-1));
        }

        if self.profile.is_temporary() {
            tracing::debug!("Removing temporary profile {}", self.profile.path().display());
        }

        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler_task.abort();
        if let Some(mut chrome) = self.chrome.take() {
            let _ = chrome.kill();
            let _ = chrome.wait();
        }
    }
}
