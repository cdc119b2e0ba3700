use super::{Rule, document_links};
use crate::error::{CoreError, Result};
use crate::link::{LinkRecord, Task};
use url::Url;
use wellscrape_fetch::Document;
use wellscrape_fetch::document::element_text;

pub const CATEGORY: &str = "abandoned_wells";
pub const SUB_KEY: &str = "orphan_wells_12_months";
const EXTENSIONS: &[&str] = &["xlsx", "xls", "csv"];

/// Spreadsheet of orphaned wells inactive for twelve months or more, which
/// are the wells currently waiting to be plugged.
pub struct AbandonedWellsRule;

impl Rule for AbandonedWellsRule {
    fn name(&self) -> &'static str {
        "abandoned wells report"
    }

    fn page_path(&self) -> &'static str {
        "/oil-gas/research-and-statistics/well-information/orphan-wells-12-months/"
    }

    fn save_name(&self) -> &'static str {
        "abandoned_wells.html"
    }

    fn plan(&self, page: &Document, origin: &Url) -> Result<Vec<Task>> {
        let tasks: Vec<Task> = document_links(page, origin, EXTENSIONS)?
            .into_iter()
            .filter_map(|(anchor, url)| {
                LinkRecord::from_parts(&url, &element_text(anchor), CATEGORY, SUB_KEY, "xlsx")
            })
            .map(Task::Retrieve)
            .collect();

        if tasks.is_empty() {
            return Err(CoreError::TargetNotFound(
                "orphan wells spreadsheet link".to_string(),
            ));
        }
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spreadsheet_link() {
        let origin = Url::parse("https://www.rrc.state.tx.us").unwrap();
        let page = Document::parse(
            r#"<p><a href="/media/orphan-list.pdf">Guide</a>
               <a href="/media/orphan-wells.xlsx">Orphan Wells with Delinquent P-5 Inactive 12 Months or More</a></p>"#,
        );

        let tasks = AbandonedWellsRule.plan(&page, &origin).unwrap();
        assert_eq!(tasks.len(), 1);
        let Task::Retrieve(record) = &tasks[0] else {
            panic!("expected a retrieval");
        };
        assert_eq!(record.url, "https://www.rrc.state.tx.us/media/orphan-wells.xlsx");
        assert_eq!(
            record.filename,
            "Orphan_Wells_with_Delinquent_P-5_Inactive_12_Months_or_More.xlsx"
        );
        assert!(record.relative_path.starts_with("abandoned_wells/orphan_wells_12_months"));
    }
}
