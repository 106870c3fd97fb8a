//! CDP page session for interacting with a single page target.

mod core;
mod dom;
mod input;
mod js;
mod navigation;

pub use self::core::PageSession;
