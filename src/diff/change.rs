use derive_more::Display;

use crate::filesystem::Node;

/// One line of the change report, borrowing the nodes it describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Change<'a> {
    /// A leaf entry present on both sides whose rendering differs
    #[display("{old} != {new}")]
    Changed { old: &'a Node, new: &'a Node },
    #[display("removed {_0}")]
    Removed(&'a Node),
    #[display("new {_0}")]
    Added(&'a Node),
    /// A root stored in the previous snapshot but not requested this run
    #[display("directory {_0} not mentioned on command line")]
    RootNotMentioned(&'a str),
    /// A root requested this run that the previous snapshot did not have
    #[display("directory {_0} newly mentioned on command line")]
    RootNewlyMentioned(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Changed,
    Removed,
    Added,
    RootNotMentioned,
    RootNewlyMentioned,
}

impl Change<'_> {
    pub fn kind(&self) -> ChangeKind {
        match self {
            Change::Changed { .. } => ChangeKind::Changed,
            Change::Removed(_) => ChangeKind::Removed,
            Change::Added(_) => ChangeKind::Added,
            Change::RootNotMentioned(_) => ChangeKind::RootNotMentioned,
            Change::RootNewlyMentioned(_) => ChangeKind::RootNewlyMentioned,
        }
    }
}
