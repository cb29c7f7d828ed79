use std::fs::{self, File, Metadata};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use snafu::{ResultExt, Snafu, ensure};
use tracing::{debug, trace};

use crate::filesystem::{ContentHash, Node};

/// Read buffer used while streaming file contents through the hasher
const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Captures a directory and its full recursive contents as a [`Node`] tree.
pub struct TreeBuilder;

impl TreeBuilder {
    pub fn build(path: impl AsRef<Path>) -> Result<Node, TreeBuildError> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).context(OpenDirectorySnafu { path })?;
        ensure!(metadata.is_dir(), NotADirectorySnafu { path });

        Self::build_directory(path, root_name(path), &metadata)
    }

    fn build_directory(
        path: &Path,
        name: String,
        metadata: &Metadata,
    ) -> Result<Node, TreeBuildError> {
        debug!("Capturing directory {}", path.display());

        let mut children = Vec::new();
        for entry in fs::read_dir(path).context(ReadDirectorySnafu { path })? {
            let entry = entry.context(ReadDirectorySnafu { path })?;
            let entry_path = entry.path();
            // Does not follow symlinks
            let entry_metadata = entry.metadata().context(EntryMetadataSnafu {
                path: &entry_path,
            })?;
            let entry_name = entry.file_name().to_string_lossy().into_owned();

            let child = if entry_metadata.is_dir() {
                Self::build_directory(&entry_path, entry_name, &entry_metadata)?
            } else {
                let mut leaf = Node::leaf(entry_name, &entry_metadata);
                if entry_metadata.is_file() {
                    leaf.hash = Some(hash_file(&entry_path)?);
                }
                leaf
            };
            children.push(child);
        }

        Ok(Node::directory(name, metadata, children))
    }
}

fn hash_file(path: &Path) -> Result<ContentHash, TreeBuildError> {
    trace!("Hashing {}", path.display());
    let file = File::open(path).context(OpenFileSnafu { path })?;
    let mut reader = BufReader::with_capacity(HASH_BUFFER_SIZE, file);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher).context(HashFileSnafu { path })?;

    Ok(hasher.finalize().into())
}

/// Last component of the requested root (`..` for `some/..`, `/` for `/`).
fn root_name(path: &Path) -> String {
    match path.components().next_back() {
        Some(component) => component.as_os_str().to_string_lossy().into_owned(),
        None => path.to_string_lossy().into_owned(),
    }
}

#[derive(Debug, Snafu)]
pub enum TreeBuildError {
    #[snafu(display("Failed to open directory {}", path.display()))]
    OpenDirectoryError { path: PathBuf, source: io::Error },
    #[snafu(display("{} is not a directory", path.display()))]
    NotADirectoryError { path: PathBuf },
    #[snafu(display("Failed to list directory {}", path.display()))]
    ReadDirectoryError { path: PathBuf, source: io::Error },
    #[snafu(display("Failed to read metadata of {}", path.display()))]
    EntryMetadataError { path: PathBuf, source: io::Error },
    #[snafu(display("Failed to open file {}", path.display()))]
    OpenFileError { path: PathBuf, source: io::Error },
    #[snafu(display("Failed to hash contents of {}", path.display()))]
    HashFileError { path: PathBuf, source: io::Error },
}
