//! DOM perception: structured snapshot in, indexed element tree out.
//!
//! `node` defines the host-independent snapshot shape, `builder` runs the
//! walk, and the rest are the pure classifiers and utilities the walk leans
//! on. Nothing in here talks to a browser.

pub mod builder;
pub mod interactive;
pub mod node;
pub mod selector;
pub mod text;
pub mod visibility;

pub use builder::{BuiltTree, ElementRegistry, NodeRef, build_tree};
pub use node::{DomNodeData, DomSnapshotData, NodeKind};
