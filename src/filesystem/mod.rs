//! Captured filesystem trees.
//!
//! A [`Node`] records one entry's metadata and, for directories, the nodes of
//! every entry it contained. [`TreeBuilder`] walks a real directory to produce one.

mod node;
mod tree_builder;

pub use node::{ContentHash, ModifiedTime, Node};
pub use tree_builder::{TreeBuildError, TreeBuilder};
