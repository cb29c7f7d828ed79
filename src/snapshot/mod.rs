mod snapshot;
mod snapshot_store;

pub use snapshot::Snapshot;
pub use snapshot_store::{SnapshotLoadError, SnapshotSaveError, SnapshotStore};
