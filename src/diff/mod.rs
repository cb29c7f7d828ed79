//! Comparison of two captured snapshots.
//!
//! Entries are matched by name within each directory level; see
//! [`TreeDiffer::compare_tree`] for the exact rules.

mod change;
mod tree_differ;

pub use change::{Change, ChangeKind};
pub use tree_differ::TreeDiffer;
