use super::{Rule, required};
use crate::error::Result;
use crate::layout::sub_key_from_text;
use crate::link::{LinkRecord, Task};
use tracing::{debug, warn};
use url::Url;
use wellscrape_fetch::document::{
    direct_text, find_all_in, find_tag, has_direct_text, is_tag, next_sibling_element,
    parent_element, row_cells, table_rows,
};
use wellscrape_fetch::{Document, ElementRef};

pub const QUARTERLY_ID: &str = "OCP_quarterly";
pub const ANNUAL_ID: &str = "OCP_annual";
pub const QUARTERLY_CATEGORY: &str = "cleanup_reports/quarterly";
pub const ANNUAL_CATEGORY: &str = "cleanup_reports/annual";

/// Oilfield Cleanup Program quarterly and annual reports.
///
/// Both sections are an `<h3>` holding an empty anchor with a known id,
/// followed by a table. The quarterly table has one column per fiscal year,
/// headed by the year in the first row; every later row has at most one
/// report link per column. The annual table is just a list of links.
pub struct CleanupReportsRule;

impl Rule for CleanupReportsRule {
    fn name(&self) -> &'static str {
        "cleanup reports"
    }

    fn page_path(&self) -> &'static str {
        "/oil-gas/environmental-cleanup-programs/oil-gas-regulation-and-cleanup-fund/"
    }

    fn save_name(&self) -> &'static str {
        "cleanup_reports.html"
    }

    fn plan(&self, page: &Document, origin: &Url) -> Result<Vec<Task>> {
        let mut tasks = quarterly_reports(section_table(page, QUARTERLY_ID)?, origin)?;
        tasks.extend(annual_reports(section_table(page, ANNUAL_ID)?, origin));
        Ok(tasks)
    }
}

/// The table following the heading that contains the anchor with `id`.
fn section_table<'a>(page: &'a Document, id: &str) -> Result<ElementRef<'a>> {
    let anchor = required(page.find_by_id(id), &format!("element with id {}", id))?;
    let header = required(parent_element(anchor), &format!("heading around {}", id))?;
    let table = required(next_sibling_element(header), &format!("table after {}", id))?;
    if !is_tag("table")(&table) {
        warn!("Element after {} heading is <{}>, not a table", id, table.value().name());
    }
    Ok(table)
}

fn quarterly_reports(table: ElementRef<'_>, origin: &Url) -> Result<Vec<Task>> {
    let rows = table_rows(table);
    let header_row = required(rows.first().copied(), "quarterly report year row")?;

    let years: Vec<String> = find_all_in(header_row, has_direct_text)
        .map(|tag| sub_key_from_text(&direct_text(tag)))
        .collect();
    debug!("Quarterly report years: {:?}", years);

    let mut tasks = Vec::new();
    for row in rows.iter().skip(1) {
        for (index, cell) in row_cells(*row).into_iter().enumerate() {
            let Some(anchor) = find_tag(cell, "a") else {
                continue;
            };
            let Some(year) = years.get(index) else {
                warn!("Quarterly report link in column {} has no year heading", index + 1);
                continue;
            };
            if let Some(record) =
                LinkRecord::from_anchor(anchor, origin, QUARTERLY_CATEGORY, year, "pdf")
            {
                tasks.push(Task::Retrieve(record));
            }
        }
    }
    Ok(tasks)
}

fn annual_reports(table: ElementRef<'_>, origin: &Url) -> Vec<Task> {
    find_all_in(table, is_tag("a"))
        .filter_map(|anchor| LinkRecord::from_anchor(anchor, origin, ANNUAL_CATEGORY, "", "pdf"))
        .map(Task::Retrieve)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use std::path::PathBuf;

    const PAGE: &str = r#"<html><body>
    <h3>
     <a id="OCP_quarterly">
     </a>
     Oilfield Cleanup Program Quarterly Reports
    </h3>
    <table height="44" width="752">
     <tbody>
      <tr>
       <td><strong>FY 2020</strong></td>
       <td><strong>FY 2019</strong></td>
      </tr>
      <tr>
       <td><a href="/media/q1-fy20.pdf">September 2019</a></td>
       <td><a href="/media/q1-fy19.pdf">September 2018</a></td>
      </tr>
      <tr>
       <td></td>
       <td><a href="/media/q2-fy19.pdf">December, 2018</a></td>
      </tr>
     </tbody>
    </table>
    <h3><a id="OCP_annual"></a>Annual Reports</h3>
    <table>
     <tr><td><a href="/media/annual-2019.pdf">Fiscal Year 2019</a></td></tr>
     <tr><td><a href="/media/annual-2018.PDF">Fiscal Year 2018</a></td></tr>
    </table>
    </body></html>"#;

    fn origin() -> Url {
        Url::parse("https://www.rrc.state.tx.us").unwrap()
    }

    fn records(tasks: &[Task]) -> Vec<&LinkRecord> {
        tasks
            .iter()
            .filter_map(|t| match t {
                Task::Retrieve(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_quarterly_links_land_in_year_directories() {
        let tasks = CleanupReportsRule.plan(&Document::parse(PAGE), &origin()).unwrap();
        let records = records(&tasks);

        assert_eq!(records.len(), 5);
        assert_eq!(records[0].url, "https://www.rrc.state.tx.us/media/q1-fy20.pdf");
        assert_eq!(
            records[0].relative_path,
            PathBuf::from("cleanup_reports/quarterly/FY_2020/September_2019.pdf")
        );
        assert_eq!(
            records[1].relative_path,
            PathBuf::from("cleanup_reports/quarterly/FY_2019/September_2018.pdf")
        );
        assert_eq!(
            records[2].relative_path,
            PathBuf::from("cleanup_reports/quarterly/FY_2019/December_2018.pdf")
        );
    }

    #[test]
    fn test_annual_links() {
        let tasks = CleanupReportsRule.plan(&Document::parse(PAGE), &origin()).unwrap();
        let records = records(&tasks);

        assert_eq!(
            records[3].relative_path,
            PathBuf::from("cleanup_reports/annual/Fiscal_Year_2019.pdf")
        );
        assert_eq!(
            records[4].relative_path,
            PathBuf::from("cleanup_reports/annual/Fiscal_Year_2018.pdf")
        );
    }

    #[test]
    fn test_missing_section_is_target_not_found() {
        let page = Document::parse("<html><body><h3>Nothing here</h3></body></html>");
        let err = CleanupReportsRule.plan(&page, &origin()).unwrap_err();
        assert!(matches!(err, CoreError::TargetNotFound(ref what) if what.contains("OCP_quarterly")));
    }

    #[test]
    fn test_link_without_year_heading_is_skipped() {
        let page = Document::parse(
            r#"<h3><a id="OCP_quarterly"></a>Q</h3>
            <table>
              <tr><td><b>FY 2021</b></td></tr>
              <tr><td><a href="/a.pdf">A</a></td><td><a href="/b.pdf">B</a></td></tr>
            </table>
            <h3><a id="OCP_annual"></a>A</h3><table></table>"#,
        );
        let tasks = CleanupReportsRule.plan(&page, &origin()).unwrap();
        assert_eq!(tasks.len(), 1);
    }
}
