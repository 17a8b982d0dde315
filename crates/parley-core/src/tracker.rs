use crate::config::TrackerConfig;
use crate::normalize::normalize;
use crate::page::{Key, Keystroke, PageAccessor, encode_prompt};
use crate::stability::{Observation, StabilitySnapshot};
use crate::wait::wait_for_presence;
use crate::{Error, Result};

/// Submits prompts and follows the reply they produce until it stops
/// changing.
///
/// A reply is identified by position: if `n` replies were on the page
/// before the prompt was sent, the new reply is the element at index `n`.
/// This only holds while a single exchange is in flight.
#[derive(Debug, Clone, Default)]
pub struct ReplyTracker {
    config: TrackerConfig,
}

impl ReplyTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Send `prompt` and return the normalized text of the reply it
    /// produces.
    ///
    /// On the first exchange of a session the baseline is taken to be zero
    /// instead of being queried.
    pub async fn submit_and_await<P: PageAccessor>(
        &self,
        page: &P,
        prompt: &str,
        first_exchange: bool,
    ) -> Result<String> {
        self.exchange(page, prompt, first_exchange, || {}).await
    }

    /// [`ReplyTracker::submit_and_await`] with a hook that runs once the
    /// prompt has reached the page, before the reply is awaited.
    ///
    /// The hook does not run when the prompt is rejected or could not be
    /// typed.
    pub async fn exchange<P: PageAccessor, F: FnOnce()>(
        &self,
        page: &P,
        prompt: &str,
        first_exchange: bool,
        on_submitted: F,
    ) -> Result<String> {
        check_prompt(prompt)?;
        let baseline = self.baseline(page, first_exchange).await;
        self.submit(page, prompt).await?;
        on_submitted();
        self.await_reply(page, baseline).await
    }

    /// Number of replies already on the page.
    ///
    /// Waits up to `history_timeout` for history to render; a page that
    /// shows no reply by then has a baseline of zero.
    pub async fn baseline<P: PageAccessor>(&self, page: &P, first_exchange: bool) -> usize {
        if first_exchange {
            return 0;
        }

        match wait_for_presence(
            page,
            &self.config.reply_selector,
            self.config.history_timeout,
            self.config.presence_interval,
        )
        .await
        {
            Ok(count) => {
                tracing::debug!("Baseline: {} earlier replies", count);
                count
            }
            Err(e) => {
                tracing::warn!("No earlier replies found ({}); using a baseline of 0", e);
                0
            }
        }
    }

    /// Clear the input control, type the prompt with soft newlines and
    /// press Enter.
    pub async fn submit<P: PageAccessor>(&self, page: &P, prompt: &str) -> Result<()> {
        check_prompt(prompt)?;

        let selector = &self.config.input_selector;
        let input = page
            .find_first_clickable(selector, self.config.input_timeout)
            .await
            .map_err(|source| Error::InputUnavailable {
                selector: selector.clone(),
                source,
            })?;

        page.clear(&input).await?;
        for keystroke in encode_prompt(prompt) {
            match keystroke {
                Keystroke::Text(text) => page.send_text(&input, &text).await?,
                Keystroke::Key(key) => page.send_key(&input, key).await?,
            }
        }
        page.send_key(&input, Key::Enter).await?;

        tracing::info!("Prompt submitted ({} chars)", prompt.chars().count());
        Ok(())
    }

    /// Wait for the reply at index `baseline` to appear and settle, then
    /// return its normalized text.
    pub async fn await_reply<P: PageAccessor>(&self, page: &P, baseline: usize) -> Result<String> {
        let reply = self.await_appearance(page, baseline).await?;
        self.await_stability(page, baseline, reply).await
    }

    /// Poll the reply count until it exceeds `baseline` and return the
    /// element at index `baseline`.
    pub async fn await_appearance<P: PageAccessor>(
        &self,
        page: &P,
        baseline: usize,
    ) -> Result<P::Handle> {
        let attempts = self.config.appearance_attempts;

        for attempt in 1..=attempts {
            match page.find_elements(&self.config.reply_selector).await {
                Ok(replies) if replies.len() > baseline => {
                    if let Some(reply) = replies.into_iter().nth(baseline) {
                        tracing::info!("New reply appeared after {} check(s)", attempt);
                        return Ok(reply);
                    }
                }
                Ok(replies) => tracing::debug!(
                    "Waiting for reply ({} present, baseline {}), check {}/{}",
                    replies.len(),
                    baseline,
                    attempt,
                    attempts
                ),
                Err(e) => tracing::debug!("Reply lookup failed (retrying): {}", e),
            }

            if attempt < attempts {
                tokio::time::sleep(self.config.appearance_interval).await;
            }
        }

        tracing::warn!("No new reply after {} checks", attempts);
        Err(Error::NoReply { attempts })
    }

    /// Read the reply until its markup is identical for
    /// `stability_threshold` consecutive reads, then normalize it.
    ///
    /// A failed read drops the handle; the next poll looks the reply up
    /// again at the same index. Markup that normalizes to nothing is never
    /// accepted as a finished reply.
    pub async fn await_stability<P: PageAccessor>(
        &self,
        page: &P,
        baseline: usize,
        reply: P::Handle,
    ) -> Result<String> {
        let attempts = self.config.stability_attempts;
        let mut pinned = Some(reply);
        let mut snapshot = StabilitySnapshot::new(self.config.stability_threshold);

        for attempt in 1..=attempts {
            if pinned.is_none() {
                pinned = self.resolve(page, baseline).await;
            }

            let read = match &pinned {
                Some(handle) => Some(page.rendered_content(handle).await),
                None => None,
            };

            match read {
                Some(Ok(content)) => match snapshot.observe(content) {
                    Observation::Stable => {
                        let text = normalize(snapshot.content().unwrap_or_default())?;
                        if !text.is_empty() {
                            tracing::info!("Reply stable after {} check(s)", attempt);
                            return Ok(text);
                        }
                        tracing::debug!("Reply is stable but blank; still waiting");
                        snapshot.reset();
                    }
                    Observation::Repeated(n) => {
                        tracing::debug!("Reply unchanged ({} in a row)", n)
                    }
                    Observation::Changed => tracing::debug!("Reply still rendering"),
                },
                Some(Err(e)) => {
                    tracing::debug!("Reply read failed (retrying): {}", e);
                    pinned = None;
                }
                None => tracing::debug!("Reply {} not found, retrying", baseline),
            }

            if attempt < attempts {
                tokio::time::sleep(self.config.stability_interval).await;
            }
        }

        tracing::warn!("Reply did not stabilize after {} checks", attempts);
        Err(Error::UnstableReply { attempts })
    }

    async fn resolve<P: PageAccessor>(&self, page: &P, index: usize) -> Option<P::Handle> {
        match page.find_elements(&self.config.reply_selector).await {
            Ok(replies) => replies.into_iter().nth(index),
            Err(e) => {
                tracing::debug!("Reply lookup failed (retrying): {}", e);
                None
            }
        }
    }
}

fn check_prompt(prompt: &str) -> Result<()> {
    if prompt.trim().is_empty() {
        return Err(Error::EmptyPrompt);
    }
    Ok(())
}
