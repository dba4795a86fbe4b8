//! Spreadsheet ingestion.
//!
//! A delimited file is parsed into a [`Sheet`], its headers are mapped onto
//! participant fields by keyword, and the [`Ingestor`] turns each row into a
//! record creation call against a [`RecordSink`](crate::store::RecordSink),
//! collecting an [`ImportReport`].

mod mapping;
mod session;
mod sheet;

pub use mapping::{ColumnMapping, TargetField};
pub use session::{
    ImportOutcome, ImportReport, IngestPhase, Ingestor, OutcomeStatus, DEFAULT_TITLE,
    ERROR_REASON, SKIP_REASON,
};
pub use sheet::Sheet;
