use crate::config::CollisionPolicy;
use crate::error::Result;
use crate::extract::{ExtractOutcome, TextExtractor, extract_document};
use crate::layout::{PathLayout, extension_of, numbered};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn};
use wellscrape_fetch::Transport;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RetrieveOutcome {
    Saved {
        path: PathBuf,
        extraction: Option<ExtractOutcome>,
    },
    Skipped {
        url: String,
        reason: String,
    },
}

impl RetrieveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, RetrieveOutcome::Saved { .. })
    }
}

/// Downloads documents into the data root.
///
/// A failed download is logged and reported as `Skipped`; it never becomes
/// an `Err`, so one broken link cannot stop a batch. Only filesystem
/// failures are returned as errors.
pub struct Retriever<'a> {
    transport: &'a Transport,
    layout: &'a PathLayout,
    extractor: &'a dyn TextExtractor,
    collision: CollisionPolicy,
    extract_extensions: Vec<String>,
    written: Mutex<HashSet<PathBuf>>,
}

impl<'a> Retriever<'a> {
    pub fn new(
        transport: &'a Transport,
        layout: &'a PathLayout,
        extractor: &'a dyn TextExtractor,
    ) -> Self {
        Self {
            transport,
            layout,
            extractor,
            collision: CollisionPolicy::default(),
            extract_extensions: vec!["pdf".to_string()],
            written: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_collision_policy(mut self, collision: CollisionPolicy) -> Self {
        self.collision = collision;
        self
    }

    pub fn with_extract_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extract_extensions = extensions;
        self
    }

    pub async fn retrieve(&self, url: &str, relative_path: &Path) -> Result<RetrieveOutcome> {
        // Validate before spending a request on it
        self.layout.absolute(relative_path)?;

        let (relative_path, fresh) = match self.claim(relative_path) {
            Some(claimed) => claimed,
            None => {
                warn!(
                    "Skipping {}: {} was already written in this run",
                    url,
                    relative_path.display()
                );
                return Ok(RetrieveOutcome::Skipped {
                    url: url.to_string(),
                    reason: format!("{} already written", relative_path.display()),
                });
            }
        };

        let fetched = match self.transport.fetch(url).await {
            Ok(fetched) => fetched,
            Err(e) => {
                if fresh {
                    self.release(&relative_path);
                }
                warn!("Skipping {}: {}", url, e);
                return Ok(RetrieveOutcome::Skipped {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        let path = self.layout.resolve(&relative_path)?;
        fs::write(&path, &fetched.body)?;
        info!("Saved {} to {}", url, path.display());

        let extraction = match extension_of(&path) {
            Some(ext) if self.extract_extensions.iter().any(|e| *e == ext) => {
                Some(extract_document(self.extractor, &path))
            }
            _ => None,
        };

        Ok(RetrieveOutcome::Saved { path, extraction })
    }

    /// Reserve a relative path for this run according to the collision
    /// policy. `None` means the artifact should be skipped; the flag tells
    /// whether the path was unclaimed before.
    fn claim(&self, relative_path: &Path) -> Option<(PathBuf, bool)> {
        let mut written = self.written.lock().unwrap_or_else(|e| e.into_inner());

        if written.insert(relative_path.to_path_buf()) {
            return Some((relative_path.to_path_buf(), true));
        }

        match self.collision {
            CollisionPolicy::Overwrite => {
                warn!(
                    "{} was already written in this run and will be overwritten",
                    relative_path.display()
                );
                Some((relative_path.to_path_buf(), false))
            }
            CollisionPolicy::Skip => None,
            CollisionPolicy::Disambiguate => {
                let mut n = 2;
                loop {
                    let candidate = numbered(relative_path, n);
                    if written.insert(candidate.clone()) {
                        info!(
                            "{} already written in this run, using {}",
                            relative_path.display(),
                            candidate.display()
                        );
                        return Some((candidate, true));
                    }
                    n += 1;
                }
            }
        }
    }

    /// Give back a freshly claimed path whose download never happened.
    fn release(&self, relative_path: &Path) {
        let mut written = self.written.lock().unwrap_or_else(|e| e.into_inner());
        written.remove(relative_path);
    }
}
