// Per-rule outcome counts and the run summary

use crate::extract::ExtractOutcome;
use crate::retrieve::RetrieveOutcome;
use serde::Serialize;

const RULE_LINE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleReport {
    pub name: String,
    pub page_url: String,
    pub saved: usize,
    pub skipped: usize,
    pub extracted: usize,
    pub empty: usize,
    pub extraction_failures: usize,
    pub tables_written: usize,
    /// Why the rule stopped early, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RuleReport {
    pub fn new(name: &str, page_url: &str) -> Self {
        Self {
            name: name.to_string(),
            page_url: page_url.to_string(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: &RetrieveOutcome) {
        match outcome {
            RetrieveOutcome::Saved { extraction, .. } => {
                self.saved += 1;
                match extraction {
                    Some(ExtractOutcome::Written { .. }) => self.extracted += 1,
                    Some(ExtractOutcome::Empty) => self.empty += 1,
                    Some(ExtractOutcome::Failed(_)) => self.extraction_failures += 1,
                    None => {}
                }
            }
            RetrieveOutcome::Skipped { .. } => self.skipped += 1,
        }
    }

    pub fn aborted(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub rules: Vec<RuleReport>,
}

impl RunSummary {
    pub fn total_saved(&self) -> usize {
        self.rules.iter().map(|r| r.saved).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.rules.iter().map(|r| r.skipped).sum()
    }

    pub fn total_tables(&self) -> usize {
        self.rules.iter().map(|r| r.tables_written).sum()
    }

    pub fn aborted_rules(&self) -> usize {
        self.rules.iter().filter(|r| r.aborted()).count()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Plain text rendering for the log.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(RULE_LINE);
        out.push_str("RUN SUMMARY\n");
        out.push_str(RULE_LINE);

        for rule in &self.rules {
            out.push_str(&format!("{}\n", rule.name));
            out.push_str(&format!("  Page:        {}\n", rule.page_url));
            if let Some(error) = &rule.error {
                out.push_str(&format!("  Aborted:     {}\n", error));
            }
            out.push_str(&format!(
                "  Documents:   {} saved, {} skipped\n",
                rule.saved, rule.skipped
            ));
            if rule.extracted + rule.empty + rule.extraction_failures > 0 {
                out.push_str(&format!(
                    "  Extraction:  {} written, {} empty, {} failed\n",
                    rule.extracted, rule.empty, rule.extraction_failures
                ));
            }
            if rule.tables_written > 0 {
                out.push_str(&format!("  Tables:      {}\n", rule.tables_written));
            }
        }

        out.push_str(RULE_LINE);
        out.push_str(&format!(
            "Total: {} saved, {} skipped, {} tables, {} of {} rules aborted\n",
            self.total_saved(),
            self.total_skipped(),
            self.total_tables(),
            self.aborted_rules(),
            self.rules.len()
        ));
        out
    }
}
