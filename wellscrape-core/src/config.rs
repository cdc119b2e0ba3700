use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;
use wellscrape_fetch::transport::{DEFAULT_DELAY, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};

/// Links are resolved against this origin.
pub const BASE_URL: &str = "https://www.rrc.state.tx.us";

/// Everything is written below this directory, relative to the working
/// directory.
pub const DATA_ROOT: &str = "data";

/// What to do when a second artifact in the same run maps to a path that
/// was already written.
///
/// Filenames are derived from link text, which is not guaranteed unique.
/// Across runs a rerun always overwrites; this only governs repeats within
/// one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollisionPolicy {
    /// Replace the earlier artifact and log a warning.
    #[default]
    Overwrite,
    /// Keep the earlier artifact; the later one is skipped.
    Skip,
    /// Write the later artifact as `name_2.ext`, `name_3.ext`, ...
    Disambiguate,
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub base_url: Url,
    pub data_root: PathBuf,
    pub user_agent: String,
    pub delay: Duration,
    pub timeout: Duration,
    pub collision: CollisionPolicy,
    /// Lowercase extensions of documents that get text extraction after
    /// download.
    pub extract_extensions: Vec<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(BASE_URL).expect("BASE_URL is a valid URL"),
            data_root: PathBuf::from(DATA_ROOT),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            delay: DEFAULT_DELAY,
            timeout: DEFAULT_TIMEOUT,
            collision: CollisionPolicy::default(),
            extract_extensions: vec!["pdf".to_string()],
        }
    }
}

impl ScraperConfig {
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_data_root(mut self, data_root: impl Into<PathBuf>) -> Self {
        self.data_root = data_root.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_collision_policy(mut self, collision: CollisionPolicy) -> Self {
        self.collision = collision;
        self
    }

    pub fn with_extract_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extract_extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    pub fn wants_extraction(&self, extension: &str) -> bool {
        let extension = extension.to_ascii_lowercase();
        self.extract_extensions.iter().any(|e| *e == extension)
    }
}
