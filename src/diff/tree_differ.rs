use tracing::debug;

use crate::diff::Change;
use crate::filesystem::Node;
use crate::snapshot::Snapshot;

pub struct TreeDiffer;

impl TreeDiffer {
    /// Compares every root of two snapshots, pairing roots by requested path.
    ///
    /// Old roots are visited in old snapshot order, then roots only present in
    /// the new snapshot are reported in new snapshot order.
    pub fn diff<'a>(old: &'a Snapshot, new: &'a Snapshot) -> Vec<Change<'a>> {
        let mut changes = Vec::new();

        for (path, old_root) in old.iter() {
            match new.get(path) {
                Some(new_root) => {
                    debug!("Comparing root {path}");
                    changes.extend(Self::compare_tree(old_root, new_root));
                }
                None => changes.push(Change::RootNotMentioned(path)),
            }
        }

        changes.extend(
            new.paths()
                .filter(|path| !old.contains(path))
                .map(Change::RootNewlyMentioned),
        );

        changes
    }

    /// Compares the children of two directory nodes.
    ///
    /// For each old child the first new child with the same name is its match.
    /// A matched pair where either side has children is compared recursively,
    /// so the directories' own size, mode and mtime are not compared. Any other
    /// matched pair yields a [`Change::Changed`] when their renderings differ.
    /// Unmatched old children are then reported as removed, followed by
    /// unmatched new children as added.
    pub fn compare_tree<'a>(old: &'a Node, new: &'a Node) -> Vec<Change<'a>> {
        let mut changes = Vec::new();
        Self::compare_into(old, new, &mut changes);
        changes
    }

    fn compare_into<'a>(old: &'a Node, new: &'a Node, changes: &mut Vec<Change<'a>>) {
        let old_children = old.children();
        let new_children = new.children();
        let mut old_matched = vec![false; old_children.len()];
        let mut new_matched = vec![false; new_children.len()];

        for (old_index, old_child) in old_children.iter().enumerate() {
            // Linear scan keeps the first match, even if it was matched before
            let Some(new_index) = new_children
                .iter()
                .position(|new_child| new_child.name == old_child.name)
            else {
                continue;
            };
            let new_child = &new_children[new_index];
            old_matched[old_index] = true;
            new_matched[new_index] = true;

            if old_child.has_children() || new_child.has_children() {
                Self::compare_into(old_child, new_child, changes);
            } else if old_child.to_string() != new_child.to_string() {
                changes.push(Change::Changed {
                    old: old_child,
                    new: new_child,
                });
            }
        }

        changes.extend(
            old_children
                .iter()
                .zip(&old_matched)
                .filter(|(_, matched)| !**matched)
                .map(|(child, _)| Change::Removed(child)),
        );
        changes.extend(
            new_children
                .iter()
                .zip(&new_matched)
                .filter(|(_, matched)| !**matched)
                .map(|(child, _)| Change::Added(child)),
        );
    }
}
