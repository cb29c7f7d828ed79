mod reporter;

pub use reporter::{ReportError, ReportSummary, Reporter};
