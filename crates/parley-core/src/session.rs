use crate::config::TrackerConfig;
use crate::page::PageAccessor;
use crate::tracker::ReplyTracker;
use crate::wait::wait_for_presence;
use crate::{Error, Result};

/// An open chat page plus the state needed to run exchanges against it.
///
/// `send` takes `&mut self`, so a session never has more than one exchange
/// in flight.
pub struct Session<P: PageAccessor> {
    page: P,
    tracker: ReplyTracker,
    first_exchange: bool,
    exchanges: usize,
}

impl<P: PageAccessor> Session<P> {
    pub fn new(page: P, config: TrackerConfig) -> Self {
        Self {
            page,
            tracker: ReplyTracker::new(config),
            first_exchange: true,
            exchanges: 0,
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn config(&self) -> &TrackerConfig {
        self.tracker.config()
    }

    /// Number of prompts submitted so far
    pub fn exchanges(&self) -> usize {
        self.exchanges
    }

    /// Whether the next exchange will assume an empty page
    pub fn is_first_exchange(&self) -> bool {
        self.first_exchange
    }

    /// Wait until the chat input is available.
    ///
    /// A page that is already logged in shows the input within
    /// `login_grace`. Otherwise `on_manual_login` is called once and the
    /// user gets `login_timeout` to log in through the browser window.
    ///
    /// If the page already displays replies once ready (a resumed
    /// conversation), the first exchange queries its baseline instead of
    /// assuming zero.
    pub async fn wait_for_login<F: FnOnce()>(&mut self, on_manual_login: F) -> Result<()> {
        let config = self.tracker.config();
        let selector = &config.input_selector;

        let ready = wait_for_presence(
            &self.page,
            selector,
            config.login_grace,
            config.presence_interval,
        )
        .await;

        if ready.is_err() {
            tracing::info!("Chat input not found; waiting for manual login");
            on_manual_login();

            wait_for_presence(
                &self.page,
                selector,
                config.login_timeout,
                config.presence_interval,
            )
            .await
            .map_err(|_| Error::LoginTimeout {
                selector: selector.clone(),
                waited: config.login_grace + config.login_timeout,
            })?;
            tracing::info!("Login successful");
        }

        let existing = match self.page.find_elements(&config.reply_selector).await {
            Ok(replies) => replies.len(),
            Err(e) => {
                tracing::debug!("Could not count existing replies: {}", e);
                0
            }
        };
        if existing > 0 {
            tracing::info!(
                "Page already shows {} replies; first baseline will be counted",
                existing
            );
            self.first_exchange = false;
        }

        Ok(())
    }

    /// Submit `prompt` and return the normalized reply text.
    ///
    /// The first-exchange shortcut is used at most once: it is dropped as
    /// soon as a prompt reaches the page, even if no reply follows.
    pub async fn send(&mut self, prompt: &str) -> Result<String> {
        let Self {
            page,
            tracker,
            first_exchange,
            exchanges,
        } = self;

        tracker
            .exchange(page, prompt, *first_exchange, || {
                *first_exchange = false;
                *exchanges += 1;
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockPage, html};
    use std::cell::Cell;
    use std::time::Duration;

    fn config() -> TrackerConfig {
        TrackerConfig::default().without_delays()
    }

    #[tokio::test]
    async fn test_login_ready_without_prompting() {
        let mut session = Session::new(MockPage::new(), config());
        let prompted = Cell::new(false);

        session.wait_for_login(|| prompted.set(true)).await.unwrap();

        assert!(!prompted.get());
        assert!(session.is_first_exchange());
    }

    #[tokio::test]
    async fn test_login_asks_for_manual_login() {
        let config = config().with_login_timeouts(Duration::ZERO, Duration::from_secs(5));
        let page = MockPage::new().with_input_presence([false, false, true]);
        let mut session = Session::new(page, config);
        let prompted = Cell::new(0);

        session
            .wait_for_login(|| prompted.set(prompted.get() + 1))
            .await
            .unwrap();

        assert_eq!(prompted.get(), 1);
    }

    #[tokio::test]
    async fn test_login_timeout() {
        let config = config().with_login_timeouts(Duration::ZERO, Duration::ZERO);
        let page = MockPage::new().with_input_presence([false]);
        let mut session = Session::new(page, config);

        let result = session.wait_for_login(|| {}).await;

        assert!(matches!(result, Err(Error::LoginTimeout { .. })));
    }

    #[tokio::test]
    async fn test_resumed_page_counts_first_baseline() {
        let page = MockPage::new()
            .with_counts([Ok(3), Ok(3), Ok(4)])
            .with_contents([html("<p>resumed</p>")]);
        let mut session = Session::new(page, config());

        session.wait_for_login(|| {}).await.unwrap();
        assert!(!session.is_first_exchange());

        let reply = session.send("continue").await.unwrap();

        assert_eq!(reply, "resumed");
        assert!(session.page().reads().iter().all(|idx| *idx == 3));
    }

    #[tokio::test]
    async fn test_consecutive_exchanges_advance_baseline() {
        let page = MockPage::new()
            .with_counts([Ok(1), Ok(1), Ok(2)])
            .with_contents([html("<p>one</p>")]);
        let mut session = Session::new(page, config());

        let first = session.send("first").await.unwrap();
        assert_eq!(first, "one");
        assert_eq!(session.exchanges(), 1);
        assert!(!session.is_first_exchange());

        let second = session.send("second").await.unwrap();
        assert_eq!(second, "one");
        assert_eq!(session.exchanges(), 2);

        let reads = session.page().reads();
        assert_eq!(reads.first(), Some(&0));
        assert_eq!(reads.last(), Some(&1));
    }

    #[tokio::test]
    async fn test_failed_exchange_still_clears_first_flag() {
        let config = config().with_appearance(2, Duration::ZERO);
        let page = MockPage::new().with_counts([Ok(0)]);
        let mut session = Session::new(page, config);

        let result = session.send("lost").await;

        assert!(matches!(result, Err(Error::NoReply { attempts: 2 })));
        assert!(!session.is_first_exchange());
        assert_eq!(session.exchanges(), 1);
    }

    #[tokio::test]
    async fn test_empty_prompt_keeps_first_flag() {
        let mut session = Session::new(MockPage::new(), config());

        assert!(matches!(session.send("").await, Err(Error::EmptyPrompt)));
        assert!(session.is_first_exchange());
        assert_eq!(session.exchanges(), 0);
    }
}
