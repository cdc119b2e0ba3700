//! Per-report extraction rules.
//!
//! Each rule knows one page of the RRC site: where it lives, what its saved
//! copy is called, and how to turn its markup into work for the pipeline.
//! Rules only read the parsed page; the pipeline does all fetching and
//! writing, so a rule can be checked against a synthetic HTML fixture.

pub mod abandoned;
pub mod cleanup;
pub mod distribution;
pub mod districts;

pub use abandoned::AbandonedWellsRule;
pub use cleanup::CleanupReportsRule;
pub use distribution::WellDistributionRule;
pub use districts::DistrictsRule;

use crate::error::{CoreError, Result};
use crate::layout::extension_of;
use crate::link::Task;
use std::path::Path;
use url::Url;
use wellscrape_fetch::document::resolve_href;
use wellscrape_fetch::{Document, ElementRef};

pub trait Rule {
    /// Short name used in logs and the run summary.
    fn name(&self) -> &'static str;

    /// Path of the page on the site, joined onto the configured origin.
    fn page_path(&self) -> &'static str;

    /// File name of the pretty-printed copy under `saved_pages/`.
    fn save_name(&self) -> &'static str;

    /// Turn the parsed page into tasks. A missing anchor, table or id is a
    /// `TargetNotFound` error and abandons this report only.
    fn plan(&self, page: &Document, origin: &Url) -> Result<Vec<Task>>;
}

/// All reports, in the order a run processes them.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(DistrictsRule),
        Box::new(CleanupReportsRule),
        Box::new(WellDistributionRule),
        Box::new(AbandonedWellsRule),
    ]
}

pub(crate) fn required<'a>(element: Option<ElementRef<'a>>, what: &str) -> Result<ElementRef<'a>> {
    element.ok_or_else(|| CoreError::TargetNotFound(what.to_string()))
}

/// Anchors whose target has one of `extensions`, with their resolved URLs,
/// in document order.
pub(crate) fn document_links<'a>(
    page: &'a Document,
    origin: &Url,
    extensions: &[&str],
) -> Result<Vec<(ElementRef<'a>, Url)>> {
    let mut links = Vec::new();
    for anchor in page.select_all("a[href]")? {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve_href(origin, href) else {
            continue;
        };
        let is_document = extension_of(Path::new(url.path()))
            .map(|ext| extensions.contains(&ext.as_str()))
            .unwrap_or(false);
        if is_document {
            links.push((anchor, url));
        }
    }
    Ok(links)
}
