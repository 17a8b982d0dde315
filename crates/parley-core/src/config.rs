use std::time::Duration;

/// Chat page the tracker talks to when nothing else is configured.
pub const DEFAULT_CHAT_URL: &str = "https://chat.deepseek.com/";

/// Selector of the prompt textarea on the default chat page.
pub const DEFAULT_INPUT_SELECTOR: &str = "textarea#chat-input";

/// Selector matching one rendered assistant reply on the default chat page.
pub const DEFAULT_REPLY_SELECTOR: &str = ".ds-markdown";

/// Tunables for one chat page: where to type, what a reply looks like, and
/// how long each polling phase may take.
///
/// `Default` reproduces the stock budgets: 60 appearance checks one second
/// apart, 60 stability checks half a second apart, and three consecutive
/// identical reads to call a reply finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// CSS selector of the prompt input control
    pub input_selector: String,
    /// CSS selector matching every assistant reply element
    pub reply_selector: String,
    /// Maximum polls waiting for a new reply element
    pub appearance_attempts: u32,
    /// Delay between appearance polls
    pub appearance_interval: Duration,
    /// Maximum polls waiting for the reply content to settle
    pub stability_attempts: u32,
    /// Delay between stability polls
    pub stability_interval: Duration,
    /// Consecutive identical reads required to call content stable
    pub stability_threshold: u32,
    /// Bounded wait for existing replies when counting the baseline
    pub history_timeout: Duration,
    /// Bounded wait for the input control to become clickable
    pub input_timeout: Duration,
    /// Wait for an already logged-in page before asking for manual login
    pub login_grace: Duration,
    /// Wait for a manual login to complete
    pub login_timeout: Duration,
    /// Delay between presence polls (login and baseline waits)
    pub presence_interval: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            input_selector: DEFAULT_INPUT_SELECTOR.to_string(),
            reply_selector: DEFAULT_REPLY_SELECTOR.to_string(),
            appearance_attempts: 60,
            appearance_interval: Duration::from_secs(1),
            stability_attempts: 60,
            stability_interval: Duration::from_millis(500),
            stability_threshold: 3,
            history_timeout: Duration::from_secs(10),
            input_timeout: Duration::from_secs(10),
            login_grace: Duration::from_secs(15),
            login_timeout: Duration::from_secs(120),
            presence_interval: Duration::from_millis(250),
        }
    }
}

impl TrackerConfig {
    /// Create a config with the stock selectors and budgets
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different prompt input selector
    pub fn with_input_selector(mut self, selector: impl Into<String>) -> Self {
        self.input_selector = selector.into();
        self
    }

    /// Use a different reply element selector
    pub fn with_reply_selector(mut self, selector: impl Into<String>) -> Self {
        self.reply_selector = selector.into();
        self
    }

    /// Set the appearance phase budget
    pub fn with_appearance(mut self, attempts: u32, interval: Duration) -> Self {
        self.appearance_attempts = attempts;
        self.appearance_interval = interval;
        self
    }

    /// Set the stability phase budget
    pub fn with_stability(mut self, attempts: u32, interval: Duration) -> Self {
        self.stability_attempts = attempts;
        self.stability_interval = interval;
        self
    }

    /// Set how many consecutive identical reads mark a reply as finished.
    /// Clamped to at least one.
    pub fn with_stability_threshold(mut self, threshold: u32) -> Self {
        self.stability_threshold = threshold.max(1);
        self
    }

    /// Set the grace period and the manual login timeout
    pub fn with_login_timeouts(mut self, grace: Duration, timeout: Duration) -> Self {
        self.login_grace = grace;
        self.login_timeout = timeout;
        self
    }

    /// Set the bounded waits used before submission
    pub fn with_lookup_timeouts(mut self, history: Duration, input: Duration) -> Self {
        self.history_timeout = history;
        self.input_timeout = input;
        self
    }

    /// Make every wait instant. Used by tests driving a scripted page.
    pub fn without_delays(mut self) -> Self {
        self.appearance_interval = Duration::ZERO;
        self.stability_interval = Duration::ZERO;
        self.presence_interval = Duration::ZERO;
        self
    }
}
