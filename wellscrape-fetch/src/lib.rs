pub mod document;
pub mod error;
pub mod page;
pub mod result;
pub mod transport;

pub use document::Document;
pub use error::FetchError;
pub use page::{PageStore, SavedPage};
pub use result::FetchResult;
pub use scraper::ElementRef;
pub use transport::Transport;
