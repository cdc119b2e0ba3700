//! Where artifacts live on disk.
//!
//! Every artifact path is a pure function of (category, sub-key, filename)
//! joined under the data root. Nothing run-specific or time-based goes into
//! a path, so reruns land on the same files.

use crate::error::{CoreError, Result};
use regex::Regex;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;
use wellscrape_fetch::document::normalize_whitespace;
use wellscrape_fetch::page::SAVED_PAGES_DIR;

pub const LOG_FILE: &str = "scrape.log";
pub const SUMMARY_FILE: &str = "run_summary.json";
pub const METADATA_SUFFIX: &str = "_metadata.txt";
pub const CONTENT_SUFFIX: &str = "_parsed.txt";

#[derive(Debug, Clone)]
pub struct PathLayout {
    root: PathBuf,
}

impl PathLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `category/sub_key/filename`. `category` may itself contain `/`
    /// separated segments; an empty sub-key is left out.
    pub fn relative(category: &str, sub_key: &str, filename: &str) -> PathBuf {
        let mut path = PathBuf::new();
        for segment in category.split('/').filter(|s| !s.is_empty()) {
            path.push(segment);
        }
        if !sub_key.is_empty() {
            path.push(sub_key);
        }
        path.push(filename);
        path
    }

    /// Join a relative artifact path under the root without touching the
    /// filesystem.
    pub fn absolute(&self, relative: &Path) -> Result<PathBuf> {
        validate_relative(relative)?;
        Ok(self.root.join(relative))
    }

    /// Join under the root and create every missing parent directory.
    pub fn resolve(&self, relative: &Path) -> Result<PathBuf> {
        let path = self.absolute(relative)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(path)
    }

    pub fn saved_page(&self, name: &str) -> PathBuf {
        self.root.join(SAVED_PAGES_DIR).join(name)
    }

    pub fn log_file(&self) -> PathBuf {
        self.root.join(LOG_FILE)
    }

    pub fn summary_file(&self) -> PathBuf {
        self.root.join(SUMMARY_FILE)
    }
}

fn validate_relative(relative: &Path) -> Result<()> {
    if relative.as_os_str().is_empty() {
        return Err(CoreError::InvalidPath("empty path".to_string()));
    }
    for component in relative.components() {
        match component {
            Component::Normal(_) => {}
            _ => {
                return Err(CoreError::InvalidPath(format!(
                    "{} must stay below the data root",
                    relative.display()
                )));
            }
        }
    }
    Ok(())
}

/// Metadata and content artifact paths for an extracted document:
/// `report.pdf` → (`report_metadata.txt`, `report_parsed.txt`).
pub fn sibling_artifacts(path: &Path) -> (PathBuf, PathBuf) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let metadata = path.with_file_name(format!("{}{}", stem, METADATA_SUFFIX));
    let content = path.with_file_name(format!("{}{}", stem, CONTENT_SUFFIX));
    (metadata, content)
}

/// Lowercased extension, if any.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .filter(|e| !e.is_empty())
}

/// `name.ext` → `name_<n>.ext`.
pub fn numbered(path: &Path, n: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match extension_of(path) {
        Some(ext) => path.with_file_name(format!("{}_{}.{}", stem, n, ext)),
        None => path.with_file_name(format!("{}_{}", stem, n)),
    }
}

/// Turn link or heading text into a path segment.
///
/// Whitespace runs become a single `_`; commas and any other punctuation
/// except `-`, `_` and `.` are dropped. The result is stable: sanitizing an
/// already sanitized segment returns it unchanged. Different texts can map
/// to the same segment.
pub fn sanitize_segment(text: &str) -> String {
    let normalized = normalize_whitespace(text);
    let mut out = String::with_capacity(normalized.len());
    for ch in normalized.chars() {
        let mapped = if ch == ' ' {
            Some('_')
        } else if ch.is_alphanumeric() || matches!(ch, '-' | '_' | '.') {
            Some(ch)
        } else {
            None
        };
        if let Some(c) = mapped {
            if c == '_' && out.ends_with('_') {
                continue;
            }
            out.push(c);
        }
    }
    out.trim_matches(|c| c == '_' || c == '.').to_string()
}

/// Sub-key for a heading such as a fiscal year: `FY 2020` → `FY_2020`.
pub fn sub_key_from_text(text: &str) -> String {
    sanitize_segment(text)
}

/// Filename for a document from its link text, e.g. `FY 2020` + `PDF` →
/// `FY_2020.pdf`. The extension is forced to lowercase and not doubled when
/// the text already ends with it. Returns `None` when nothing usable is
/// left of the text.
pub fn derive_filename(text: &str, extension: &str) -> Option<String> {
    let extension = extension.trim_start_matches('.').to_ascii_lowercase();
    let mut stem = sanitize_segment(text);

    if !extension.is_empty() {
        let suffix = format!(".{}", extension);
        if stem.to_ascii_lowercase().ends_with(&suffix) {
            stem.truncate(stem.len() - suffix.len());
            stem = stem.trim_end_matches(|c| c == '_' || c == '.').to_string();
        }
    }

    if stem.is_empty() {
        return None;
    }

    if extension.is_empty() {
        Some(stem)
    } else {
        Some(format!("{}.{}", stem, extension))
    }
}

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^0-9])((?:19|20)[0-9]{2})(?:[^0-9]|$)").unwrap());

/// First plausible four-digit year (1900–2099) in the text. Longer digit
/// runs never count.
pub fn year_in_text(text: &str) -> Option<String> {
    YEAR.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
