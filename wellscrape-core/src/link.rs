use crate::layout::{PathLayout, derive_filename, extension_of};
use serde::Serialize;
use std::path::{Path, PathBuf};
use url::Url;
use wellscrape_fetch::ElementRef;
use wellscrape_fetch::document::{element_text, resolve_href};

/// A document link found on a page, with the place its download will be
/// written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRecord {
    pub url: String,
    pub relative_path: PathBuf,
    pub filename: String,
}

impl LinkRecord {
    /// Build a record from an anchor element.
    ///
    /// The filename comes from the anchor text. When the text yields nothing
    /// usable, the last segment of the URL path is used instead. The
    /// extension is taken from the URL, falling back to `default_extension`.
    pub fn from_anchor(
        anchor: ElementRef<'_>,
        origin: &Url,
        category: &str,
        sub_key: &str,
        default_extension: &str,
    ) -> Option<Self> {
        let href = anchor.value().attr("href")?;
        let url = resolve_href(origin, href)?;
        let text = element_text(anchor);
        Self::from_parts(&url, &text, category, sub_key, default_extension)
    }

    pub fn from_parts(
        url: &Url,
        text: &str,
        category: &str,
        sub_key: &str,
        default_extension: &str,
    ) -> Option<Self> {
        let url_file = url
            .path_segments()
            .and_then(|segments| segments.last())
            .unwrap_or_default()
            .to_string();
        let extension =
            extension_of(Path::new(&url_file)).unwrap_or_else(|| default_extension.to_string());

        let filename = derive_filename(text, &extension).or_else(|| {
            let stem = Path::new(&url_file)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            derive_filename(&stem, &extension)
        })?;

        Some(Self {
            url: url.to_string(),
            relative_path: PathLayout::relative(category, sub_key, &filename),
            filename,
        })
    }
}

/// Work a rule hands to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Task {
    /// Download a document and write it under the data root.
    Retrieve(LinkRecord),
    /// Write table rows as CSV under the data root.
    WriteTable {
        relative_path: PathBuf,
        rows: Vec<Vec<String>>,
    },
}
