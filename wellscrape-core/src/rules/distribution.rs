use super::{Rule, document_links};
use crate::error::{CoreError, Result};
use crate::layout::year_in_text;
use crate::link::{LinkRecord, Task};
use url::Url;
use wellscrape_fetch::Document;
use wellscrape_fetch::document::element_text;

pub const CATEGORY: &str = "well_distribution";
pub const UNDATED: &str = "undated";
const EXTENSIONS: &[&str] = &["pdf", "xls", "xlsx", "csv"];

/// Well distribution tables (well counts by type and status).
///
/// Every linked document on the page is kept, filed under the first year
/// found in its link text, or in its URL when the text has none.
pub struct WellDistributionRule;

impl Rule for WellDistributionRule {
    fn name(&self) -> &'static str {
        "well distribution reports"
    }

    fn page_path(&self) -> &'static str {
        "/oil-gas/research-and-statistics/well-information/well-distribution-tables-well-counts-by-type-and-status/"
    }

    fn save_name(&self) -> &'static str {
        "well_distributions.html"
    }

    fn plan(&self, page: &Document, origin: &Url) -> Result<Vec<Task>> {
        let mut tasks = Vec::new();
        for (anchor, url) in document_links(page, origin, EXTENSIONS)? {
            let text = element_text(anchor);
            let year = year_in_text(&text)
                .or_else(|| year_in_text(url.path()))
                .unwrap_or_else(|| UNDATED.to_string());
            if let Some(record) = LinkRecord::from_parts(&url, &text, CATEGORY, &year, "pdf") {
                tasks.push(Task::Retrieve(record));
            }
        }

        if tasks.is_empty() {
            return Err(CoreError::TargetNotFound(
                "well distribution document links".to_string(),
            ));
        }
        Ok(tasks)
    }
}
