//! Readable-text extraction: DOM to markdown, markdown to pageable chunks.

pub mod chunk;
pub mod extract;

pub use chunk::{chunk, Chunk};
pub use extract::extract_markdown;
