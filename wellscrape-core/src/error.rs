use thiserror::Error;
use wellscrape_fetch::FetchError;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Extraction target not found: {0}")]
    TargetNotFound(String),

    #[error("Invalid artifact path: {0}")]
    InvalidPath(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures of the text/metadata extraction backend. These never leave the
/// extractor boundary; they are logged and turned into an outcome.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("PDF error: {0}")]
    Pdf(#[from] pdf_oxide::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
