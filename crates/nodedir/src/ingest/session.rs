//! The import session state machine and its outcome log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::mapping::{ColumnMapping, TargetField};
use super::sheet::Sheet;
use crate::catalog;
use crate::error::{Error, Result};
use crate::model::NewParticipant;
use crate::store::RecordSink;

/// Reason recorded for rows without a name or organization.
pub const SKIP_REASON: &str = "Missing Name/Org mapping";

/// Reason recorded for rows the sink rejected.
pub const ERROR_REASON: &str = "Sync Failure";

/// Title used when no column feeds the title field.
pub const DEFAULT_TITLE: &str = "Leader";

/// Result of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutcomeStatus {
    /// The record was created.
    Success,
    /// The sink rejected the record.
    Error,
    /// The row lacked required fields and was not submitted.
    Skipped,
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::Success => "SUCCESS",
            Self::Error => "ERROR",
            Self::Skipped => "SKIPPED",
        })
    }
}

/// One entry of the outcome log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOutcome {
    /// Spreadsheet row number; the header is row 1.
    pub row: usize,
    /// Participant name, or `Row N` when the name is blank.
    pub identifier: String,
    /// What happened.
    pub status: OutcomeStatus,
    /// Why, for non-success entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Outcome log of one import run. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Per-row outcomes in file order.
    pub outcomes: Vec<ImportOutcome>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

impl ImportReport {
    fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Rows turned into records.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.count(OutcomeStatus::Success)
    }

    /// Rows skipped for missing fields.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(OutcomeStatus::Skipped)
    }

    /// Rows the sink rejected.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(OutcomeStatus::Error)
    }

    /// Closing line shown after the run.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Import session concluded. {} identity nodes established.",
            self.succeeded()
        )
    }
}

/// Where the ingestor is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestPhase {
    /// No file loaded.
    Idle,
    /// A file is loaded and its mapping may be edited.
    MappingReview,
    /// Rows are being submitted.
    Importing,
}

/// Spreadsheet import session.
///
/// `load` moves Idle to MappingReview; `commit` runs the rows and returns
/// to Idle with a report; `abort` discards the file.
#[derive(Debug)]
pub struct Ingestor {
    default_title: String,
    phase: IngestPhase,
    pending: Option<(Sheet, ColumnMapping)>,
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE)
    }
}

impl Ingestor {
    /// Create an idle ingestor.
    #[must_use]
    pub fn new(default_title: impl Into<String>) -> Self {
        Self {
            default_title: default_title.into(),
            phase: IngestPhase::Idle,
            pending: None,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> IngestPhase {
        self.phase
    }

    /// Accept a parsed sheet and infer its mapping.
    ///
    /// A sheet loaded while another is under review replaces it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImportState`] while an import is running.
    pub fn load(&mut self, sheet: Sheet) -> Result<&ColumnMapping> {
        if self.phase == IngestPhase::Importing {
            return Err(Error::import_state("an import is already running"));
        }
        let mapping = ColumnMapping::auto_map(sheet.headers());
        debug!(rows = sheet.len(), mapped = mapping.len(), "Sheet loaded for review");
        self.phase = IngestPhase::MappingReview;
        Ok(&self.pending.insert((sheet, mapping)).1)
    }

    /// The loaded sheet, if any.
    #[must_use]
    pub fn sheet(&self) -> Option<&Sheet> {
        self.pending.as_ref().map(|(sheet, _)| sheet)
    }

    /// The current mapping, if a sheet is loaded.
    #[must_use]
    pub fn mapping(&self) -> Option<&ColumnMapping> {
        self.pending.as_ref().map(|(_, mapping)| mapping)
    }

    /// Point `field` at `header` of the loaded sheet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImportState`] outside mapping review, or a
    /// validation error if `header` is not a column of the sheet.
    pub fn set_mapping(&mut self, field: TargetField, header: &str) -> Result<()> {
        let (sheet, mapping) = self.reviewing()?;
        mapping.set(field, header, sheet.headers())
    }

    /// Leave `field` unmapped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImportState`] outside mapping review.
    pub fn clear_mapping(&mut self, field: TargetField) -> Result<()> {
        let (_, mapping) = self.reviewing()?;
        mapping.clear(field);
        Ok(())
    }

    /// Discard the loaded sheet and return to idle.
    pub fn abort(&mut self) {
        if self.pending.take().is_some() {
            debug!("Import aborted");
        }
        self.phase = IngestPhase::Idle;
    }

    /// Submit every row to `sink`, in file order, one at a time.
    ///
    /// Rows already submitted stay submitted whatever happens to later rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImportState`] when no sheet is under review.
    pub async fn commit<S: RecordSink + ?Sized>(&mut self, sink: &mut S) -> Result<ImportReport> {
        if self.phase != IngestPhase::MappingReview {
            return Err(Error::import_state("no spreadsheet is awaiting confirmation"));
        }
        let Some((sheet, mapping)) = self.pending.take() else {
            self.phase = IngestPhase::Idle;
            return Err(Error::internal("mapping review without a loaded sheet"));
        };

        self.phase = IngestPhase::Importing;
        let started_at = Utc::now();
        info!(rows = sheet.len(), "Import started");

        let mut outcomes = Vec::with_capacity(sheet.len());
        for (index, cells) in sheet.rows().iter().enumerate() {
            let row = index + 2;
            let cell = |field: TargetField| {
                mapping
                    .get(field)
                    .and_then(|header| sheet.column(header))
                    .map_or("", |col| cells[col].as_str())
            };

            let name = cell(TargetField::Name).trim();
            let organization = cell(TargetField::Organization).trim();
            if name.is_empty() || organization.is_empty() {
                debug!(row, "Skipping row without name or organization");
                outcomes.push(ImportOutcome {
                    row,
                    identifier: identifier(name, row),
                    status: OutcomeStatus::Skipped,
                    reason: Some(SKIP_REASON.to_string()),
                });
                continue;
            }

            let fields = self.row_fields(&mapping, name, organization, &cell);
            match sink.add(fields).await {
                Ok(_) => outcomes.push(ImportOutcome {
                    row,
                    identifier: name.to_string(),
                    status: OutcomeStatus::Success,
                    reason: None,
                }),
                Err(e) => {
                    warn!(row, error = %e, "Row could not be stored");
                    outcomes.push(ImportOutcome {
                        row,
                        identifier: name.to_string(),
                        status: OutcomeStatus::Error,
                        reason: Some(ERROR_REASON.to_string()),
                    });
                }
            }
        }

        self.phase = IngestPhase::Idle;
        let report = ImportReport {
            outcomes,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            succeeded = report.succeeded(),
            skipped = report.skipped(),
            failed = report.failed(),
            "Import finished"
        );
        Ok(report)
    }

    fn reviewing(&mut self) -> Result<(&Sheet, &mut ColumnMapping)> {
        match (&self.phase, self.pending.as_mut()) {
            (IngestPhase::MappingReview, Some((sheet, mapping))) => Ok((&*sheet, mapping)),
            _ => Err(Error::import_state("no spreadsheet is under review")),
        }
    }

    fn row_fields<'a>(
        &self,
        mapping: &ColumnMapping,
        name: &str,
        organization: &str,
        cell: &impl Fn(TargetField) -> &'a str,
    ) -> NewParticipant {
        let title = if mapping.get(TargetField::Title).is_some() {
            cell(TargetField::Title).to_string()
        } else {
            self.default_title.clone()
        };
        let promo = cell(TargetField::PromoPhotoUrl);

        NewParticipant {
            name: name.to_string(),
            title,
            organization: organization.to_string(),
            country: catalog::resolve_country(cell(TargetField::Country).trim()),
            origin_country: None,
            bio: cell(TargetField::Bio).to_string(),
            testimony: cell(TargetField::Testimony).to_string(),
            phone: cell(TargetField::Phone).to_string(),
            email: cell(TargetField::Email).to_string(),
            website: cell(TargetField::Website).to_string(),
            photo_url: cell(TargetField::PhotoUrl).to_string(),
            promo_photo_url: (!promo.is_empty()).then(|| promo.to_string()),
            events: None,
        }
    }
}

fn identifier(name: &str, row: usize) -> String {
    if name.is_empty() {
        format!("Row {row}")
    } else {
        name.to_string()
    }
}
