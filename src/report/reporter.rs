use std::io::{self, Write};

use colored::{ColoredString, Colorize};
use snafu::{ResultExt, Snafu};
use tracing::info;

use crate::diff::{Change, ChangeKind};

/// Writes change records as report lines.
pub struct Reporter<W: Write> {
    out: W,
    colorize: bool,
}

/// Number of records written, per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub changed: usize,
    pub removed: usize,
    pub added: usize,
    pub roots_not_mentioned: usize,
    pub roots_newly_mentioned: usize,
}

impl ReportSummary {
    pub fn total(&self) -> usize {
        self.changed
            + self.removed
            + self.added
            + self.roots_not_mentioned
            + self.roots_newly_mentioned
    }

    fn record(&mut self, kind: ChangeKind) {
        match kind {
            ChangeKind::Changed => self.changed += 1,
            ChangeKind::Removed => self.removed += 1,
            ChangeKind::Added => self.added += 1,
            ChangeKind::RootNotMentioned => self.roots_not_mentioned += 1,
            ChangeKind::RootNewlyMentioned => self.roots_newly_mentioned += 1,
        }
    }
}

impl Reporter<io::Stdout> {
    /// Reporter on standard output, coloured when the terminal supports it.
    pub fn stdout() -> Self {
        let colorize = supports_color::on(supports_color::Stream::Stdout).is_some();
        colored::control::set_override(colorize);
        Self::new(io::stdout(), colorize)
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, colorize: bool) -> Self {
        Self { out, colorize }
    }

    /// Writes one line per change, in the order given.
    pub fn print(&mut self, changes: &[Change]) -> Result<ReportSummary, ReportError> {
        let mut summary = ReportSummary::default();

        for change in changes {
            let line = change.to_string();
            if self.colorize {
                writeln!(self.out, "{}", paint(change.kind(), &line)).context(WriteSnafu)?;
            } else {
                writeln!(self.out, "{line}").context(WriteSnafu)?;
            }
            summary.record(change.kind());
        }
        self.out.flush().context(WriteSnafu)?;

        info!(
            "Reported {} changes: {} changed, {} removed, {} new, {} roots dropped, {} roots added",
            summary.total(),
            summary.changed,
            summary.removed,
            summary.added,
            summary.roots_not_mentioned,
            summary.roots_newly_mentioned
        );
        Ok(summary)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn paint(kind: ChangeKind, line: &str) -> ColoredString {
    match kind {
        ChangeKind::Changed => line.yellow(),
        ChangeKind::Removed => line.red(),
        ChangeKind::Added => line.green(),
        ChangeKind::RootNotMentioned | ChangeKind::RootNewlyMentioned => line.bold(),
    }
}

#[derive(Debug, Snafu)]
pub enum ReportError {
    #[snafu(display("Failed to write the change report"))]
    WriteError { source: io::Error },
}
