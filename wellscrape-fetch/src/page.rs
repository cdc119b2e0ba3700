use crate::document::Document;
use crate::error::Result;
use crate::transport::Transport;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Directory under the data root holding pretty-printed copies of every
/// fetched page.
pub const SAVED_PAGES_DIR: &str = "saved_pages";

/// A fetched page as written for offline inspection.
#[derive(Debug, Clone, Serialize)]
pub struct SavedPage {
    pub url: String,
    pub original_html: String,
    pub normalized_html: String,
    pub path: PathBuf,
}

/// Fetches HTML pages, parses them and keeps a readable copy on disk.
///
/// The three steps are exposed separately so they can be exercised without
/// a network; `get_parsed_page` composes them.
pub struct PageStore<'a> {
    transport: &'a Transport,
    pages_dir: PathBuf,
}

impl<'a> PageStore<'a> {
    pub fn new(transport: &'a Transport, data_root: &Path) -> Self {
        Self {
            transport,
            pages_dir: data_root.join(SAVED_PAGES_DIR),
        }
    }

    pub fn pages_dir(&self) -> &Path {
        &self.pages_dir
    }

    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        self.transport.fetch_text(url).await
    }

    /// Write the pretty-printed form of `document` to
    /// `saved_pages/<save_name>`, creating directories as needed.
    pub fn persist(
        &self,
        url: &str,
        original_html: &str,
        document: &Document,
        save_name: &str,
    ) -> Result<SavedPage> {
        let path = self.pages_dir.join(save_name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let normalized_html = document.pretty();
        fs::write(&path, &normalized_html)?;
        info!("Saved page {} to {}", url, path.display());

        Ok(SavedPage {
            url: url.to_string(),
            original_html: original_html.to_string(),
            normalized_html,
            path,
        })
    }

    /// Fetch, parse and persist. The returned document is parsed from the
    /// original HTML; the pretty-printed copy is for humans only.
    pub async fn get_parsed_page(&self, url: &str, save_name: &str) -> Result<Document> {
        let html = self.fetch_html(url).await?;
        let document = Document::parse(&html);
        self.persist(url, &html, &document, save_name)?;
        Ok(document)
    }
}
