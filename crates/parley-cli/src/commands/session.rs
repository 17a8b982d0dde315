use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use parley_browser::{
    BrowserSession, ChromeFinder, ChromeLauncher, ChromePage, DEFAULT_DEBUGGING_PORT,
    DEFAULT_PROFILE, ProfileManager,
};
use parley_core::{
    DEFAULT_CHAT_URL, DEFAULT_INPUT_SELECTOR, DEFAULT_REPLY_SELECTOR, Session, TrackerConfig,
};
use std::path::PathBuf;
use std::time::Duration;

/// Browser and page options shared by `ask` and `chat`
#[derive(Args, Debug, Clone)]
pub struct BrowserArgs {
    /// Chat page to open
    #[arg(long, env = "PARLEY_URL", default_value = DEFAULT_CHAT_URL)]
    pub url: String,

    /// Path to Chrome binary (auto-detected if not specified)
    #[arg(long, env = "PARLEY_CHROME", value_name = "PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Named profile under ~/.parley/profiles that keeps the chat login [default: default]
    #[arg(long, value_name = "NAME", conflicts_with = "user_data_dir")]
    pub profile: Option<String>,

    /// Use a temporary profile deleted on exit (the login is not kept)
    #[arg(long)]
    pub temp: bool,

    /// Use an existing Chrome user-data directory instead of a named profile
    #[arg(long, value_name = "DIR")]
    pub user_data_dir: Option<PathBuf>,

    /// Run Chrome without a window (needs a profile that is already logged in)
    #[arg(long)]
    pub headless: bool,

    /// Chrome remote debugging port
    #[arg(long, default_value_t = DEFAULT_DEBUGGING_PORT)]
    pub port: u16,

    /// CSS selector of the prompt input
    #[arg(long, default_value = DEFAULT_INPUT_SELECTOR)]
    pub input_selector: String,

    /// CSS selector matching each assistant reply
    #[arg(long, default_value = DEFAULT_REPLY_SELECTOR)]
    pub reply_selector: String,

    /// Checks (one per second) to wait for a reply to appear
    #[arg(long, default_value_t = 60)]
    pub reply_attempts: u32,

    /// Consecutive identical reads that mark a reply as finished
    #[arg(long, default_value_t = 3)]
    pub stable_checks: u32,

    /// Seconds allowed for a manual login
    #[arg(long, value_name = "SECS", default_value_t = 120)]
    pub login_timeout: u64,
}

impl BrowserArgs {
    /// Tracker settings derived from the command line
    pub fn tracker_config(&self) -> TrackerConfig {
        let defaults = TrackerConfig::default();

        TrackerConfig::new()
            .with_input_selector(self.input_selector.clone())
            .with_reply_selector(self.reply_selector.clone())
            .with_appearance(self.reply_attempts, defaults.appearance_interval)
            .with_stability_threshold(self.stable_checks)
            .with_login_timeouts(
                defaults.login_grace,
                Duration::from_secs(self.login_timeout),
            )
    }

    /// Resolve the profile Chrome runs in. `--temp` wins over everything.
    pub fn profile_manager(&self) -> Result<ProfileManager> {
        if self.temp {
            if self.profile.is_some() || self.user_data_dir.is_some() {
                eprintln!("⚠️  --temp given; ignoring --profile/--user-data-dir");
            }
            tracing::info!("Using temporary profile");
            return Ok(ProfileManager::temporary()?);
        }

        if let Some(dir) = &self.user_data_dir {
            tracing::info!("Using user-data-dir: {}", dir.display());
            return Ok(ProfileManager::persistent(dir.clone())?);
        }

        let name = self.profile.as_deref().unwrap_or(DEFAULT_PROFILE);
        let profile = ProfileManager::named(name)?;
        tracing::info!("Using profile '{}': {}", name, profile.path().display());
        Ok(profile)
    }
}

/// A launched Chrome window with a logged-in chat session on it
pub struct ChatBrowser {
    browser: BrowserSession,
    pub session: Session<ChromePage>,
}

impl ChatBrowser {
    /// Find and launch Chrome, open the chat page and wait for the login
    pub async fn open(args: &BrowserArgs) -> Result<Self> {
        let chrome_binary = ChromeFinder::new(args.chrome_path.clone()).find()?;
        tracing::info!("Found Chrome at: {}", chrome_binary.display());

        let profile = args.profile_manager()?;
        let launcher = ChromeLauncher::new(
            chrome_binary,
            profile.path().to_path_buf(),
            Some(args.url.clone()),
        )
        .with_debugging_port(args.port)
        .with_headless(args.headless);

        let browser = BrowserSession::start(&launcher, profile, &args.url).await?;
        let mut session = Session::new(browser.chat_page(), args.tracker_config());

        let login = session
            .wait_for_login(|| {
                eprintln!(
                    "Please log in manually in the Chrome window within {} seconds...",
                    args.login_timeout
                );
            })
            .await;

        if let Err(e) = login {
            let _ = browser.close().await;
            return Err(e.into());
        }

        tracing::info!("Ready to chat");
        Ok(Self { browser, session })
    }

    /// Shut Chrome down
    pub async fn close(self) -> Result<()> {
        self.browser.close().await?;
        Ok(())
    }
}

/// Combine the result of a command with the result of closing Chrome.
///
/// A failed shutdown is logged; it never replaces the command's own outcome.
pub fn settle<T>(outcome: Result<T>, closed: Result<()>) -> Result<T> {
    if let Err(e) = closed {
        tracing::warn!("Failed to shut Chrome down cleanly: {:#}", e);
    }
    outcome
}

/// Spinner shown on stderr while a reply is pending
pub fn waiting_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Waiting for response...");
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Build the multi-threaded runtime the browser commands run on
pub fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, Parser};

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        browser: BrowserArgs,
    }

    fn parse(args: &[&str]) -> BrowserArgs {
        TestCli::parse_from(std::iter::once("parley").chain(args.iter().copied())).browser
    }

    #[test]
    fn test_defaults_match_tracker_defaults() {
        let args = parse(&[]);

        assert_eq!(args.port, 9222);
        assert_eq!(args.tracker_config(), TrackerConfig::default());
    }

    #[test]
    fn test_url_defaults_to_chat_url() {
        // checked on the definition so PARLEY_URL in the environment does not matter
        let cmd = TestCli::command();
        let url = cmd
            .get_arguments()
            .find(|arg| arg.get_id() == "url")
            .unwrap();

        assert_eq!(url.get_default_values(), &[DEFAULT_CHAT_URL]);
        assert_eq!(url.get_env(), Some(std::ffi::OsStr::new("PARLEY_URL")));
    }

    #[test]
    fn test_explicit_url_wins() {
        let args = parse(&["--url", "https://chat.example.com/"]);
        assert_eq!(args.url, "https://chat.example.com/");
    }

    #[test]
    fn test_settle_keeps_reply_when_close_fails() {
        let settled = settle(Ok("4".to_string()), Err(anyhow::anyhow!("reap failed")));
        assert_eq!(settled.unwrap(), "4");
    }

    #[test]
    fn test_settle_keeps_exchange_error_when_close_fails() {
        let outcome: Result<String> = Err(parley_core::Error::NoReply { attempts: 60 }.into());

        let err = settle(outcome, Err(anyhow::anyhow!("reap failed"))).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<parley_core::Error>(),
            Some(parley_core::Error::NoReply { attempts: 60 })
        ));
    }

    #[test]
    fn test_flags_reach_tracker_config() {
        let args = parse(&[
            "--reply-selector",
            ".answer",
            "--input-selector",
            "#prompt",
            "--reply-attempts",
            "90",
            "--stable-checks",
            "5",
            "--login-timeout",
            "30",
        ]);
        let config = args.tracker_config();

        assert_eq!(config.reply_selector, ".answer");
        assert_eq!(config.input_selector, "#prompt");
        assert_eq!(config.appearance_attempts, 90);
        assert_eq!(config.stability_threshold, 5);
        assert_eq!(config.login_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_profile_conflicts_with_user_data_dir() {
        let result = TestCli::try_parse_from([
            "parley",
            "--profile",
            "work",
            "--user-data-dir",
            "/tmp/chrome",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_temp_profile_wins() {
        let args = parse(&["--temp", "--profile", "work"]);
        let profile = args.profile_manager().unwrap();
        assert!(profile.is_temporary());
    }

    #[test]
    fn test_user_data_dir_is_used_as_is() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("chrome-data");
        let args = parse(&["--user-data-dir", dir.to_str().unwrap()]);

        let profile = args.profile_manager().unwrap();

        assert_eq!(profile.path(), dir);
        assert!(!profile.is_temporary());
    }
}
