mod chrome_finder;
mod connection;
mod error;
mod launcher;
mod page;
mod profile;

pub use chrome_finder::ChromeFinder;
pub use connection::BrowserSession;
pub use error::{Error, Result};
pub use launcher::{ChromeLauncher, DEFAULT_DEBUGGING_PORT, normalize_url};
pub use page::ChromePage;
pub use profile::{DEFAULT_PROFILE, ProfileManager};
