use crate::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// Profile used when none is named on the command line
pub const DEFAULT_PROFILE: &str = "default";

/// Manages the Chrome user-data directory a chat session runs in.
///
/// Persistent profiles keep the login cookies between runs, which is what
/// lets parley skip the manual login after the first time.
pub struct ProfileManager {
    path: PathBuf,
    is_temporary: bool,
}

impl ProfileManager {
    /// Create a temporary profile that will be deleted on drop
    pub fn temporary() -> Result<Self> {
        let path = tempfile::tempdir()?.keep();

        Ok(Self {
            path,
            is_temporary: true,
        })
    }

    /// Create or use a persistent profile at the given path
    pub fn persistent(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(&path)?;
        }

        Ok(Self {
            path,
            is_temporary: false,
        })
    }

    /// Create or use the named profile under [`ProfileManager::profiles_dir`]
    pub fn named(name: &str) -> Result<Self> {
        Self::persistent(Self::named_path(name)?)
    }

    /// Location of the named profile, without creating it.
    ///
    /// Fails for names that are not a single plain path component, so the
    /// result always lies directly inside [`ProfileManager::profiles_dir`].
    pub fn named_path(name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(Self::profiles_dir()?.join(name))
    }

    /// Directory holding all named profiles (`~/.parley/profiles`)
    pub fn profiles_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Profile("Could not determine home directory".to_string()))?;
        Ok(home.join(".parley").join("profiles"))
    }

    /// Get the profile directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if this is a temporary profile
    pub fn is_temporary(&self) -> bool {
        self.is_temporary
    }

    /// Total size of the profile directory in bytes
    pub fn size(&self) -> Result<u64> {
        dir_size(&self.path)
    }

    /// Whether Chrome has written a cookie store (i.e. a login may be saved)
    pub fn has_cookies(&self) -> bool {
        self.path.join("Default").join("Cookies").exists() || self.path.join("Cookies").exists()
    }
}

impl Drop for ProfileManager {
    fn drop(&mut self) {
        if self.is_temporary && self.path.exists() {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }
}

fn validate_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    let single = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );

    if !single || name.contains(['/', '\\', ':']) {
        return Err(Error::Profile(format!("Invalid profile name: '{}'", name)));
    }
    Ok(())
}

fn dir_size(path: &Path) -> Result<u64> {
    let mut total = 0;
    for entry in std::fs::read_dir(path)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if metadata.is_dir() {
            total += dir_size(&entry.path())?;
        } else {
            total += metadata.len();
        }
    }
    Ok(total)
}
