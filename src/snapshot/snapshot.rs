use hashlink::LinkedHashMap;

use crate::filesystem::Node;

/// Captured root trees keyed by the path string they were requested with.
///
/// Iteration follows insertion order, which is the order the roots were
/// given on the command line (or stored in the freeze file).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    roots: LinkedHashMap<String, Node>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a root tree. Returns `false` and leaves the snapshot untouched if
    /// the path is already present.
    pub fn insert(&mut self, path: impl Into<String>, root: Node) -> bool {
        let path = path.into();
        if self.roots.contains_key(&path) {
            return false;
        }
        self.roots.insert(path, root);
        true
    }

    pub fn contains(&self, path: &str) -> bool {
        self.roots.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&Node> {
        self.roots.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.roots.iter().map(|(path, root)| (path.as_str(), root))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.roots.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }
}

impl FromIterator<(String, Node)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, Node)>>(iter: I) -> Self {
        let mut snapshot = Self::new();
        for (path, root) in iter {
            snapshot.insert(path, root);
        }
        snapshot
    }
}
