use std::io::Write;

use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::application::RuntimeConfig;
use crate::diff::TreeDiffer;
use crate::filesystem::{TreeBuildError, TreeBuilder};
use crate::report::{ReportError, ReportSummary, Reporter};
use crate::snapshot::{Snapshot, SnapshotLoadError, SnapshotSaveError, SnapshotStore};

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let mut reporter = Reporter::stdout();
        Self::run_with_reporter(&app_config, &mut reporter).await?;
        Ok(())
    }

    /// Captures every root, reports differences against the stored snapshot
    /// and stores the fresh one.
    ///
    /// Returns `None` when there was no stored snapshot to compare against.
    pub async fn run_with_reporter<W: Write>(
        app_config: &RuntimeConfig,
        reporter: &mut Reporter<W>,
    ) -> Result<Option<ReportSummary>, ApplicationError> {
        let current = Self::capture(&app_config.roots)?;

        let store = SnapshotStore::new(&app_config.freeze_file);
        let previous = store.load().await.context(SnapshotLoadSnafu)?;

        let summary = match &previous {
            Some(previous) => {
                let changes = TreeDiffer::diff(previous, &current);
                debug!("Found {} changes", changes.len());
                Some(reporter.print(&changes).context(ReportSnafu)?)
            }
            None => {
                info!("No previous snapshot to compare against");
                None
            }
        };

        debug!("Saving snapshot to {}", store.path().display());
        store.save(&current).await.context(SnapshotSaveSnafu)?;
        Ok(summary)
    }

    fn capture(roots: &[String]) -> Result<Snapshot, ApplicationError> {
        let mut snapshot = Snapshot::new();

        for root in roots {
            if snapshot.contains(root) {
                warn!("Directory {root} was given more than once, capturing it once");
                continue;
            }
            info!("Capturing {root}");
            let tree = TreeBuilder::build(root).context(CaptureSnafu { root })?;
            snapshot.insert(root.as_str(), tree);
        }

        Ok(snapshot)
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while capturing {root}"))]
    CaptureError { root: String, source: TreeBuildError },
    #[snafu(display("Critical failure encountered while loading the previous snapshot"))]
    SnapshotLoadError { source: SnapshotLoadError },
    #[snafu(display("Critical failure encountered while printing the report"))]
    ReportError { source: ReportError },
    #[snafu(display("Critical failure encountered while saving the new snapshot"))]
    SnapshotSaveError { source: SnapshotSaveError },
}
