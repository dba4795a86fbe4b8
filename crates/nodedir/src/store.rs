//! The participant record store.
//!
//! [`RecordStore`] exposes list/add/update/delete/reset over the record slot
//! of a [`KeyValueStore`]. It keeps no copy of the records: every operation
//! reads the slot, changes it, and writes it back. When the write is
//! rejected the caller gets [`Error::PersistenceFailure`] and the slot still
//! holds the previous collection.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog;
use crate::error::{Error, Result};
use crate::model::{generate_id, NewParticipant, Participant, ParticipantPatch};
use crate::storage::KeyValueStore;

/// Slot holding the JSON array of participants.
pub const RECORDS_SLOT: &str = "leaders_summit_db";

/// Slot holding the display theme.
pub const THEME_SLOT: &str = "theme";

/// Display theme remembered between sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark theme.
    #[default]
    Dark,
    /// Light theme.
    Light,
}

impl Theme {
    /// The other theme.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Slot representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            other => Err(Error::validation(
                "theme",
                format!("expected 'dark' or 'light', got '{other}'"),
            )),
        }
    }
}

/// Destination for records created by an import run.
///
/// The ingestor awaits each call before moving to the next row, so an
/// implementation sees rows strictly in file order.
#[async_trait]
pub trait RecordSink: Send {
    /// Create one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record could not be stored.
    async fn add(&mut self, fields: NewParticipant) -> Result<Participant>;
}

/// Participant persistence over a slot backend.
#[derive(Debug)]
pub struct RecordStore<B> {
    backend: B,
}

impl<B: KeyValueStore> RecordStore<B> {
    /// Wrap a backend.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Borrow the backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Give the backend back.
    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Return the stored participants.
    ///
    /// An absent, unparsable, or non-array slot is replaced by the default
    /// participant set, which is persisted before being returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read, or
    /// [`Error::PersistenceFailure`] if the reseed cannot be written.
    pub fn list(&mut self) -> Result<Vec<Participant>> {
        let Some(raw) = self.backend.get(RECORDS_SLOT)? else {
            debug!("Record slot is empty, seeding defaults");
            return self.seed();
        };

        match serde_json::from_str::<Vec<Participant>>(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(error = %e, "Record slot is corrupt, resetting to defaults");
                self.seed()
            }
        }
    }

    /// Look up one participant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no participant has this identifier.
    pub fn get(&mut self, id: &str) -> Result<Participant> {
        self.list()?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::not_found(id))
    }

    /// Store a new participant under a freshly generated identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PersistenceFailure`] if the write is rejected.
    pub fn add(&mut self, fields: NewParticipant) -> Result<Participant> {
        let mut records = self.list()?;
        let participant = fields.with_id(generate_id());
        records.push(participant.clone());
        self.save(&records)?;
        info!(id = %participant.id, name = %participant.name, "Added participant");
        Ok(participant)
    }

    /// Merge `patch` over the participant with identifier `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `id` is unknown, or
    /// [`Error::PersistenceFailure`] if the write is rejected.
    pub fn update(&mut self, id: &str, patch: ParticipantPatch) -> Result<Participant> {
        let mut records = self.list()?;
        let target = records
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::not_found(id))?;
        patch.apply(target);
        let updated = target.clone();
        self.save(&records)?;
        info!(id, "Updated participant");
        Ok(updated)
    }

    /// Remove the participant with identifier `id`.
    ///
    /// Returns `true` if a participant was removed. Deleting an unknown
    /// identifier is a no-op that still rewrites the slot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PersistenceFailure`] if the write is rejected.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let mut records = self.list()?;
        let before = records.len();
        records.retain(|p| p.id != id);
        let removed = records.len() != before;
        self.save(&records)?;
        if removed {
            info!(id, "Deleted participant");
        } else {
            debug!(id, "Delete requested for unknown participant");
        }
        Ok(removed)
    }

    /// Wipe every slot and reseed the default participant set.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be cleared, or
    /// [`Error::PersistenceFailure`] if the seed cannot be written.
    pub fn reset(&mut self) -> Result<Vec<Participant>> {
        self.backend.clear()?;
        warn!("All stored state cleared");
        self.seed()
    }

    /// Read the display theme, defaulting to dark.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn theme(&self) -> Result<Theme> {
        Ok(self
            .backend
            .get(THEME_SLOT)?
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default())
    }

    /// Remember the display theme.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PersistenceFailure`] if the write is rejected.
    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.backend
            .set(THEME_SLOT, theme.as_str())
            .map_err(|e| Error::persistence(THEME_SLOT, e))
    }

    fn seed(&mut self) -> Result<Vec<Participant>> {
        let defaults = catalog::default_participants();
        self.save(&defaults)?;
        Ok(defaults)
    }

    fn save(&mut self, records: &[Participant]) -> Result<()> {
        let json = serde_json::to_string(records)?;
        self.backend.set(RECORDS_SLOT, &json).map_err(|e| {
            warn!(error = %e, "Cannot persist participant records");
            Error::persistence(RECORDS_SLOT, e)
        })
    }
}

#[async_trait]
impl<B: KeyValueStore> RecordSink for RecordStore<B> {
    async fn add(&mut self, fields: NewParticipant) -> Result<Participant> {
        RecordStore::add(self, fields)
    }
}
