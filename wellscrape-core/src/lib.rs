//! Scraping rules and storage for Railroad Commission of Texas reports.
//!
//! The [`Pipeline`] fetches each rule's page through the shared transport,
//! keeps a readable copy of it, and downloads or tabulates whatever the rule
//! finds, extracting text from PDFs as it goes.

pub mod config;
pub mod error;
pub mod extract;
pub mod layout;
pub mod link;
pub mod pipeline;
pub mod report;
pub mod retrieve;
pub mod rules;
pub mod table;

pub use config::{CollisionPolicy, ScraperConfig};
pub use error::{CoreError, ExtractError, Result};
pub use extract::{ExtractOutcome, ExtractedDocument, PdfExtractor, TextExtractor, extract_document};
pub use layout::PathLayout;
pub use link::{LinkRecord, Task};
pub use pipeline::Pipeline;
pub use report::{RuleReport, RunSummary};
pub use retrieve::{RetrieveOutcome, Retriever};
pub use rules::{Rule, default_rules};
