//! Drives the rules: fetch each rule's page, let the rule plan, then carry
//! out the plan.
//!
//! Failures are contained at two levels. A document that cannot be
//! downloaded or extracted is skipped by the retriever. A page that cannot be
//! fetched, or that lacks what its rule looks for, ends that rule and the run
//! moves on to the next. Filesystem errors end the run.

use crate::config::ScraperConfig;
use crate::error::{CoreError, Result};
use crate::extract::{PdfExtractor, TextExtractor};
use crate::layout::PathLayout;
use crate::link::Task;
use crate::report::{RuleReport, RunSummary};
use crate::retrieve::Retriever;
use crate::rules::Rule;
use crate::table::write_csv;
use std::fs;
use tracing::{error, info, warn};
use url::Url;
use wellscrape_fetch::{FetchError, PageStore, Transport};

pub struct Pipeline {
    config: ScraperConfig,
    transport: Transport,
    layout: PathLayout,
    extractor: Box<dyn TextExtractor>,
}

impl Pipeline {
    pub fn from_config(config: ScraperConfig) -> Result<Self> {
        let transport = Transport::with_settings(&config.user_agent, config.delay, config.timeout)?;
        let layout = PathLayout::new(&config.data_root);
        Ok(Self {
            config,
            transport,
            layout,
            extractor: Box::new(PdfExtractor),
        })
    }

    /// Replace the PDF backend, e.g. with a stub in tests.
    pub fn with_extractor(mut self, extractor: Box<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn layout(&self) -> &PathLayout {
        &self.layout
    }

    pub fn page_url(&self, rule: &dyn Rule) -> Result<Url> {
        Ok(self.config.base_url.join(rule.page_path())?)
    }

    /// A retriever sharing this pipeline's transport, layout and extractor.
    /// Collisions are tracked per retriever, so one run should use one.
    pub fn retriever(&self) -> Retriever<'_> {
        Retriever::new(&self.transport, &self.layout, self.extractor.as_ref())
            .with_collision_policy(self.config.collision)
            .with_extract_extensions(self.config.extract_extensions.clone())
    }

    pub async fn run_rule(&self, rule: &dyn Rule, retriever: &Retriever<'_>) -> Result<RuleReport> {
        let page_url = self.page_url(rule)?;
        let mut report = RuleReport::new(rule.name(), page_url.as_str());
        info!("Scraping {} from {}", rule.name(), page_url);

        let tasks = match self.plan(rule, &page_url).await {
            Ok(tasks) => tasks,
            Err(CoreError::Fetch(FetchError::Io(e))) => return Err(CoreError::Io(e)),
            Err(CoreError::Fetch(e)) => {
                // The transport has already logged the failed request
                let reason = format!("Failed to fetch {}: {}", page_url, e);
                warn!("Abandoning {}: {}", rule.name(), reason);
                report.error = Some(reason);
                return Ok(report);
            }
            Err(CoreError::TargetNotFound(what)) => {
                let reason = format!("{} not found on {}", what, page_url);
                error!("Abandoning {}: {}", rule.name(), reason);
                report.error = Some(reason);
                return Ok(report);
            }
            Err(e) => return Err(e),
        };

        for task in tasks {
            match task {
                Task::Retrieve(record) => {
                    let outcome = retriever.retrieve(&record.url, &record.relative_path).await?;
                    report.record(&outcome);
                }
                Task::WriteTable {
                    relative_path,
                    rows,
                } => {
                    let path = self.layout.resolve(&relative_path)?;
                    write_csv(&path, &rows)?;
                    info!("Wrote {} rows to {}", rows.len(), path.display());
                    report.tables_written += 1;
                }
            }
        }

        Ok(report)
    }

    /// Run every rule in order, then log the summary and write it to
    /// `run_summary.json` under the data root.
    pub async fn run(&self, rules: &[Box<dyn Rule>]) -> Result<RunSummary> {
        let retriever = self.retriever();
        let mut summary = RunSummary::default();

        for rule in rules {
            let report = self.run_rule(rule.as_ref(), &retriever).await?;
            summary.rules.push(report);
        }

        fs::create_dir_all(self.layout.root())?;
        let summary_path = self.layout.summary_file();
        fs::write(&summary_path, summary.to_json()?)?;

        for line in summary.render().lines() {
            info!("{}", line);
        }
        info!("Run summary written to {}", summary_path.display());

        Ok(summary)
    }

    /// Fetch, save and parse the rule's page and let the rule plan. The
    /// parsed page does not outlive this call.
    async fn plan(&self, rule: &dyn Rule, page_url: &Url) -> Result<Vec<Task>> {
        let store = PageStore::new(&self.transport, self.layout.root());
        let page = store
            .get_parsed_page(page_url.as_str(), rule.save_name())
            .await?;
        rule.plan(&page, page_url)
    }
}
