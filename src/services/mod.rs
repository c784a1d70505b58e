pub mod analysis;
pub mod document_session;
pub mod page_text;

pub use document_session::{DocumentError, DocumentSession};
