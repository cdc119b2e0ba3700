use super::{Rule, required};
use crate::error::{CoreError, Result};
use crate::layout::PathLayout;
use crate::link::Task;
use url::Url;
use wellscrape_fetch::Document;
use wellscrape_fetch::document::{element_text, is_tag, row_cells, table_rows, text_contains};

pub const CATEGORY: &str = "districts";
pub const SUB_KEY: &str = "counties_by_district";
pub const FILENAME: &str = "districts.csv";

/// RRC districts with their counties and county codes.
///
/// The page has a single data table mentioning counties; its rows are
/// written out as-is, one CSV line per non-empty row.
pub struct DistrictsRule;

impl Rule for DistrictsRule {
    fn name(&self) -> &'static str {
        "district codes"
    }

    fn page_path(&self) -> &'static str {
        "/about-us/organization-activities/rrc-locations/counties-by-dist/"
    }

    fn save_name(&self) -> &'static str {
        "districts.html"
    }

    fn plan(&self, page: &Document, _origin: &Url) -> Result<Vec<Task>> {
        let county = text_contains("county");
        let table = required(
            page.find_all(is_tag("table")).find(|t| county(t)),
            "table of counties by district",
        )?;

        let rows: Vec<Vec<String>> = table_rows(table)
            .into_iter()
            .map(|row| row_cells(row).into_iter().map(element_text).collect::<Vec<_>>())
            .filter(|cells| cells.iter().any(|c| !c.is_empty()))
            .collect();

        if rows.is_empty() {
            return Err(CoreError::TargetNotFound(
                "rows in table of counties by district".to_string(),
            ));
        }

        Ok(vec![Task::WriteTable {
            relative_path: PathLayout::relative(CATEGORY, SUB_KEY, FILENAME),
            rows,
        }])
    }
}
