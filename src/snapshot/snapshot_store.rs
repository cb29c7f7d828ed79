use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use compio::fs;
use snafu::{ResultExt, Snafu, ensure};
use tracing::{debug, info, warn};

use crate::filesystem::Node;
use crate::snapshot::Snapshot;

/// Version written at the start of every freeze file payload
const FORMAT_VERSION: u32 = 1;
const COMPRESSION_LEVEL: i32 = 3;
const TEMPORARY_SUFFIX: &str = ".tmp";
/// Upper bound on memory a decode may claim, so a corrupt length prefix fails
/// instead of allocating
const DECODE_LIMIT: usize = 1 << 30;

/// Reads and writes a [`Snapshot`] at a freeze file location.
///
/// The file is a zstd stream wrapping a bincode payload: the format version
/// followed by the list of `(root path, tree)` pairs in snapshot order.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the previously saved snapshot. A missing freeze file is not an
    /// error and yields `None`.
    pub async fn load(&self) -> Result<Option<Snapshot>, SnapshotLoadError> {
        debug!("Reading snapshot from {}", self.path.display());
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(
                    "No existing snapshot found at {}, starting fresh",
                    self.path.display()
                );
                return Ok(None);
            }
            Err(err) => {
                return Err(err).context(ReadSnafu { path: &self.path });
            }
        };

        let snapshot = decode(&bytes).context(CorruptSnafu { path: &self.path })?;
        debug!("Read snapshot with {} roots", snapshot.len());
        Ok(Some(snapshot))
    }

    /// Persists the snapshot, replacing any previous freeze file.
    ///
    /// The data is written to a sibling temporary file first and renamed into
    /// place, so an interrupted save leaves the previous file intact.
    pub async fn save(&self, snapshot: &Snapshot) -> Result<(), SnapshotSaveError> {
        let bytes = encode(snapshot)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .context(CreateParentSnafu { path: parent })?;
        }

        let temporary = self.temporary_path();
        debug!(
            "Writing {} bytes of snapshot data to {}",
            bytes.len(),
            temporary.display()
        );
        fs::write(&temporary, bytes)
            .await
            .0
            .context(WriteSnafu { path: &temporary })?;

        if let Err(source) = fs::rename(&temporary, &self.path).await {
            if let Err(err) = fs::remove_file(&temporary).await {
                warn!(
                    "Failed to remove temporary snapshot {}: {err}",
                    temporary.display()
                );
            }
            return Err(source).context(RenameSnafu { path: &self.path });
        }

        info!("Saved snapshot to {}", self.path.display());
        Ok(())
    }

    fn temporary_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(TEMPORARY_SUFFIX);
        self.path.with_file_name(name)
    }
}

fn encode(snapshot: &Snapshot) -> Result<Vec<u8>, SnapshotSaveError> {
    let config = bincode::config::standard();
    let roots = snapshot.iter().collect::<Vec<(&str, &Node)>>();

    let mut payload = bincode::encode_to_vec(FORMAT_VERSION, config).context(EncodeSnafu)?;
    payload.extend(bincode::encode_to_vec(&roots, config).context(EncodeSnafu)?);

    zstd::encode_all(payload.as_slice(), COMPRESSION_LEVEL).context(CompressSnafu)
}

fn decode(bytes: &[u8]) -> Result<Snapshot, DecodeError> {
    let config = bincode::config::standard().with_limit::<DECODE_LIMIT>();
    let payload = zstd::decode_all(bytes).context(DecompressSnafu)?;

    let (version, header_len): (u32, usize) =
        bincode::decode_from_slice(&payload, config).context(MalformedSnafu)?;
    ensure!(
        version == FORMAT_VERSION,
        UnsupportedVersionSnafu {
            found: version,
            expected: FORMAT_VERSION
        }
    );

    let (roots, body_len): (Vec<(String, Node)>, usize) =
        bincode::decode_from_slice(&payload[header_len..], config).context(MalformedSnafu)?;
    let trailing = payload.len() - header_len - body_len;
    ensure!(trailing == 0, TrailingBytesSnafu { count: trailing });

    Ok(roots.into_iter().collect())
}

/// Reasons a freeze file's contents could not be turned back into a snapshot
#[derive(Debug, Snafu)]
pub enum DecodeError {
    #[snafu(display("Failed to decompress snapshot data"))]
    DecompressError { source: io::Error },
    #[snafu(display("Unsupported snapshot format version {found}, expected {expected}"))]
    UnsupportedVersionError { found: u32, expected: u32 },
    #[snafu(display("Malformed snapshot data"))]
    MalformedError { source: bincode::error::DecodeError },
    #[snafu(display("Snapshot data has {count} unexpected trailing bytes"))]
    TrailingBytesError { count: usize },
}

#[derive(Debug, Snafu)]
pub enum SnapshotLoadError {
    #[snafu(display("Failed to read freeze file {}", path.display()))]
    ReadError { path: PathBuf, source: io::Error },
    #[snafu(display("Freeze file {} is corrupt", path.display()))]
    CorruptError { path: PathBuf, source: DecodeError },
}

#[derive(Debug, Snafu)]
pub enum SnapshotSaveError {
    #[snafu(display("Failed to encode snapshot"))]
    EncodeError { source: bincode::error::EncodeError },
    #[snafu(display("Failed to compress snapshot"))]
    CompressError { source: io::Error },
    #[snafu(display("Failed to create directory {}", path.display()))]
    CreateParentError { path: PathBuf, source: io::Error },
    #[snafu(display("Failed to write snapshot to {}", path.display()))]
    WriteError { path: PathBuf, source: io::Error },
    #[snafu(display("Failed to move new snapshot into place at {}", path.display()))]
    RenameError { path: PathBuf, source: io::Error },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filesystem::fixtures::{dir, file};
    use tempfile::TempDir;

    fn sample_snapshot() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert(
            "/srv/data",
            dir(
                "data",
                vec![
                    file("b.txt", 2, 0xbb),
                    dir("nested", vec![file("c.bin", 3, 0xcc)]),
                    dir("empty", vec![]),
                    file("a.txt", 1, 0xaa),
                ],
            ),
        );
        snapshot.insert("relative/dir", dir("dir", vec![]));
        snapshot
    }

    #[compio::test]
    async fn test_load_returns_none_when_file_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = SnapshotStore::new(temp_dir.path().join("freeze"));

        let result = store.load().await;

        assert!(matches!(result, Ok(None)));
    }

    #[compio::test]
    async fn test_saved_snapshot_loads_back_in_order() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = SnapshotStore::new(temp_dir.path().join("freeze"));
        let snapshot = sample_snapshot();

        store.save(&snapshot).await.expect("Failed to save snapshot");
        let loaded = store
            .load()
            .await
            .expect("Failed to load snapshot")
            .expect("Expected a snapshot");

        assert_eq!(loaded, snapshot);
        assert_eq!(
            loaded.paths().collect::<Vec<_>>(),
            vec!["/srv/data", "relative/dir"]
        );
        let names = loaded
            .get("/srv/data")
            .map(|root| root.children().iter().map(|n| n.name.as_str()).collect::<Vec<_>>())
            .unwrap_or_default();
        assert_eq!(names, vec!["b.txt", "nested", "empty", "a.txt"]);
    }

    #[compio::test]
    async fn test_save_overwrites_previous_file_and_leaves_no_temporary() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = SnapshotStore::new(temp_dir.path().join("freeze"));

        store.save(&sample_snapshot()).await.expect("Failed to save snapshot");
        let mut replacement = Snapshot::new();
        replacement.insert("other", dir("other", vec![]));
        store.save(&replacement).await.expect("Failed to save snapshot");

        let loaded = store
            .load()
            .await
            .expect("Failed to load snapshot")
            .expect("Expected a snapshot");
        assert_eq!(loaded, replacement);
        assert!(!temp_dir.path().join("freeze.tmp").exists());
    }

    #[compio::test]
    async fn test_save_creates_missing_parent_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("state/nested/freeze");
        let store = SnapshotStore::new(&path);

        store.save(&Snapshot::new()).await.expect("Failed to save snapshot");

        assert!(path.exists());
    }

    #[compio::test]
    async fn test_load_rejects_garbage() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("freeze");
        std::fs::write(&path, b"definitely not a snapshot").expect("Failed to write file");

        let result = SnapshotStore::new(&path).load().await;

        assert!(matches!(
            result,
            Err(SnapshotLoadError::CorruptError {
                source: DecodeError::DecompressError { .. },
                ..
            })
        ));
    }

    #[compio::test]
    async fn test_load_rejects_unknown_version() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("freeze");
        let config = bincode::config::standard();
        let mut payload = bincode::encode_to_vec(FORMAT_VERSION + 1, config).unwrap();
        payload.extend(bincode::encode_to_vec(Vec::<(String, Node)>::new(), config).unwrap());
        std::fs::write(&path, zstd::encode_all(payload.as_slice(), 0).unwrap())
            .expect("Failed to write file");

        let result = SnapshotStore::new(&path).load().await;

        match result {
            Err(SnapshotLoadError::CorruptError {
                source: DecodeError::UnsupportedVersionError { found, expected },
                ..
            }) => {
                assert_eq!(found, FORMAT_VERSION + 1);
                assert_eq!(expected, FORMAT_VERSION);
            }
            other => panic!("Expected UnsupportedVersionError, got {other:?}"),
        }
    }

    #[compio::test]
    async fn test_load_rejects_truncated_payload() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("freeze");
        let config = bincode::config::standard();
        let mut payload = bincode::encode_to_vec(FORMAT_VERSION, config).unwrap();
        let roots = vec![("root".to_string(), dir("root", vec![file("a", 1, 1)]))];
        let body = bincode::encode_to_vec(roots, config).unwrap();
        payload.extend(&body[..body.len() / 2]);
        std::fs::write(&path, zstd::encode_all(payload.as_slice(), 0).unwrap())
            .expect("Failed to write file");

        let result = SnapshotStore::new(&path).load().await;

        assert!(matches!(
            result,
            Err(SnapshotLoadError::CorruptError {
                source: DecodeError::MalformedError { .. },
                ..
            })
        ));
    }

    #[compio::test]
    async fn test_load_rejects_oversized_length_prefix() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("freeze");
        let config = bincode::config::standard();
        let mut payload = bincode::encode_to_vec(FORMAT_VERSION, config).unwrap();
        payload.extend(bincode::encode_to_vec(u64::MAX / 2, config).unwrap());
        std::fs::write(&path, zstd::encode_all(payload.as_slice(), 0).unwrap())
            .expect("Failed to write file");

        let result = SnapshotStore::new(&path).load().await;

        assert!(matches!(
            result,
            Err(SnapshotLoadError::CorruptError {
                source: DecodeError::MalformedError { .. },
                ..
            })
        ));
    }

    #[compio::test]
    async fn test_load_rejects_oversized_name_length() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("freeze");
        let config = bincode::config::standard();
        let mut payload = bincode::encode_to_vec(FORMAT_VERSION, config).unwrap();
        // One root whose path string claims to be far larger than the payload
        payload.extend(bincode::encode_to_vec(1u64, config).unwrap());
        payload.extend(bincode::encode_to_vec((DECODE_LIMIT as u64) * 2, config).unwrap());
        std::fs::write(&path, zstd::encode_all(payload.as_slice(), 0).unwrap())
            .expect("Failed to write file");

        let result = SnapshotStore::new(&path).load().await;

        assert!(matches!(
            result,
            Err(SnapshotLoadError::CorruptError {
                source: DecodeError::MalformedError { .. },
                ..
            })
        ));
    }

    #[compio::test]
    async fn test_load_rejects_trailing_bytes() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("freeze");
        let config = bincode::config::standard();
        let mut payload = bincode::encode_to_vec(FORMAT_VERSION, config).unwrap();
        payload.extend(bincode::encode_to_vec(Vec::<(String, Node)>::new(), config).unwrap());
        payload.extend([1, 2, 3]);
        std::fs::write(&path, zstd::encode_all(payload.as_slice(), 0).unwrap())
            .expect("Failed to write file");

        let result = SnapshotStore::new(&path).load().await;

        assert!(matches!(
            result,
            Err(SnapshotLoadError::CorruptError {
                source: DecodeError::TrailingBytesError { count: 3 },
                ..
            })
        ));
    }

    #[compio::test]
    async fn test_failed_rename_keeps_previous_file_and_removes_temporary() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("freeze");
        std::fs::create_dir(&path).expect("Failed to create dir");
        std::fs::write(path.join("occupant"), b"x").expect("Failed to write file");
        let store = SnapshotStore::new(&path);

        let result = store.save(&sample_snapshot()).await;

        assert!(matches!(result, Err(SnapshotSaveError::RenameError { .. })));
        assert!(path.join("occupant").exists());
        assert!(!temp_dir.path().join("freeze.tmp").exists());
    }

    #[test]
    fn test_temporary_path_is_sibling() {
        let store = SnapshotStore::new("/var/lib/dircheck/freeze.bin");
        assert_eq!(
            store.temporary_path(),
            PathBuf::from("/var/lib/dircheck/freeze.bin.tmp")
        );
    }
}
