use crate::{Error, Result};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use url::Url;

/// Default Chrome DevTools port
pub const DEFAULT_DEBUGGING_PORT: u16 = 9222;

/// Manages the Chrome process a chat session runs in
pub struct ChromeLauncher {
    chrome_path: PathBuf,
    profile_path: PathBuf,
    initial_url: Option<String>,
    debugging_port: u16,
    headless: bool,
}

impl ChromeLauncher {
    /// Create a new ChromeLauncher
    pub fn new(chrome_path: PathBuf, profile_path: PathBuf, initial_url: Option<String>) -> Self {
        Self {
            chrome_path,
            profile_path,
            initial_url,
            debugging_port: DEFAULT_DEBUGGING_PORT,
            headless: false,
        }
    }

    /// Use a different DevTools port
    pub fn with_debugging_port(mut self, port: u16) -> Self {
        self.debugging_port = port;
        self
    }

    /// Run without a visible window. Manual login is impossible in this mode,
    /// so it only makes sense with a profile that is already logged in.
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Launch Chrome process
    pub fn launch(&self) -> Result<Child> {
        let args = self.build_args()?;
        tracing::debug!("Launching {} {}", self.chrome_path.display(), args.join(" "));

        Command::new(&self.chrome_path)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::Browser(format!("Failed to launch Chrome: {}", e)))
    }

    /// Build Chrome command-line arguments
    fn build_args(&self) -> Result<Vec<String>> {
        let mut args = vec![
            format!("--remote-debugging-port={}", self.debugging_port),
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-blink-features=AutomationControlled".to_string(),
            format!("--user-data-dir={}", self.profile_path.display()),
        ];

        if self.headless {
            args.push("--headless=new".to_string());
        }

        match &self.initial_url {
            Some(url) => args.push(normalize_url(url)?),
            None => args.push("about:blank".to_string()),
        }

        Ok(args)
    }

    /// Get the debugging port
    pub fn debugging_port(&self) -> u16 {
        self.debugging_port
    }
}

/// Add an `https://` scheme to bare hosts and check the result parses
pub fn normalize_url(url: &str) -> Result<String> {
    let with_scheme = if !url.starts_with("http://") && !url.starts_with("https://") {
        format!("https://{}", url)
    } else {
        url.to_string()
    };

    Url::parse(&with_scheme)
        .map(|parsed| parsed.to_string())
        .map_err(|e| Error::Browser(format!("Invalid chat URL '{}': {}", url, e)))
}
