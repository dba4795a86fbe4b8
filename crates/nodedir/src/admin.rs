//! Admin console: access gate, manual edit form, and gated mutations.
//!
//! The [`AccessGate`] compares a single shared code against the configured
//! value. It is a convenience gate that keeps casual users out of the
//! editing commands. It is **not** a security boundary: there is no
//! hashing, rate limiting, expiry, or audit, and anyone who can read the
//! configuration or the slot database can bypass it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog;
use crate::error::{Error, Result};
use crate::ingest::{ColumnMapping, ImportReport, Ingestor, Sheet, TargetField};
use crate::media::ImagePolicy;
use crate::model::{Country, NewParticipant, Participant, ParticipantPatch};
use crate::storage::KeyValueStore;
use crate::store::RecordStore;

/// Shared-secret gate in front of mutating operations.
#[derive(Clone)]
pub struct AccessGate {
    secret: String,
    authorized: bool,
}

impl std::fmt::Debug for AccessGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGate")
            .field("authorized", &self.authorized)
            .finish_non_exhaustive()
    }
}

impl AccessGate {
    /// Create a closed gate for `secret`.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            authorized: false,
        }
    }

    /// Try to open the gate. Once open it stays open.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccessDenied`] if `code` does not match.
    pub fn unlock(&mut self, code: &str) -> Result<()> {
        if code == self.secret {
            self.authorized = true;
            debug!("Admin access granted");
            Ok(())
        } else {
            warn!("Admin access denied");
            Err(Error::AccessDenied)
        }
    }

    /// Check whether the gate is open.
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    /// Fail unless the gate is open.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccessDenied`] while the gate is closed.
    pub fn require(&self) -> Result<()> {
        if self.authorized {
            Ok(())
        } else {
            Err(Error::AccessDenied)
        }
    }
}

/// An image given either as a reference or as a local file to embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageInput {
    /// Remote URL, embedded data URL, or empty for no image.
    Reference(String),
    /// Local file to embed as a data URL.
    File(PathBuf),
}

impl ImageInput {
    fn resolve(self, field: &'static str, policy: &ImagePolicy) -> Result<String> {
        match self {
            Self::Reference(reference) => {
                let reference = reference.trim().to_string();
                policy.validate_reference(field, &reference)?;
                Ok(reference)
            }
            Self::File(path) => policy.embed_file(field, &path),
        }
    }
}

/// Raw input of the manual add/edit form.
///
/// Every field is optional so the same form serves creation and partial
/// edits. Creation requires `name` and `country_code`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticipantForm {
    /// Display name.
    pub name: Option<String>,
    /// Role title.
    pub title: Option<String>,
    /// Organization.
    pub organization: Option<String>,
    /// Residency catalog code.
    pub country_code: Option<String>,
    /// Origin catalog code.
    pub origin_code: Option<String>,
    /// Biography.
    pub bio: Option<String>,
    /// Testimony.
    pub testimony: Option<String>,
    /// Phone number.
    pub phone: Option<String>,
    /// Email address.
    pub email: Option<String>,
    /// Website.
    pub website: Option<String>,
    /// Portrait.
    pub photo: Option<ImageInput>,
    /// Promotional image.
    pub promo_photo: Option<ImageInput>,
    /// Event names.
    pub events: Option<Vec<String>>,
}

impl ParticipantForm {
    /// Validate the form as a new participant.
    ///
    /// An empty promotional image or event list becomes absent.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first offending field.
    pub fn into_new(self, policy: &ImagePolicy) -> Result<NewParticipant> {
        let name = required("name", self.name.as_deref())?;
        let code = required("country", self.country_code.as_deref())?;
        let country = lookup("country", &code)?;
        let origin_country = self.origin_code.as_deref().map(optional_country).transpose()?.flatten();
        let photo_url = resolve_image("photoUrl", self.photo, policy)?.unwrap_or_default();
        let promo_photo_url = resolve_image("promoPhotoUrl", self.promo_photo, policy)?
            .filter(|s| !s.is_empty());

        Ok(NewParticipant {
            name,
            title: trimmed(self.title),
            organization: trimmed(self.organization),
            country,
            origin_country,
            bio: self.bio.unwrap_or_default(),
            testimony: self.testimony.unwrap_or_default(),
            phone: trimmed(self.phone),
            email: trimmed(self.email),
            website: trimmed(self.website),
            photo_url,
            promo_photo_url,
            events: self.events.map(clean_events).filter(|e| !e.is_empty()),
        })
    }

    /// Validate the form as an edit of an existing participant.
    ///
    /// Fields left `None` are untouched; a given name must not be blank.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first offending field.
    pub fn into_patch(self, policy: &ImagePolicy) -> Result<ParticipantPatch> {
        let name = match self.name.as_deref() {
            Some(name) => Some(required("name", Some(name))?),
            None => None,
        };
        let country = match self.country_code.as_deref() {
            Some(code) => Some(lookup("country", code.trim())?),
            None => None,
        };
        let origin_country = self.origin_code.as_deref().map(optional_country).transpose()?.flatten();

        Ok(ParticipantPatch {
            name,
            title: self.title.map(|s| s.trim().to_string()),
            organization: self.organization.map(|s| s.trim().to_string()),
            country,
            origin_country,
            bio: self.bio,
            testimony: self.testimony,
            phone: self.phone.map(|s| s.trim().to_string()),
            email: self.email.map(|s| s.trim().to_string()),
            website: self.website.map(|s| s.trim().to_string()),
            photo_url: resolve_image("photoUrl", self.photo, policy)?,
            promo_photo_url: resolve_image("promoPhotoUrl", self.promo_photo, policy)?,
            events: self.events.map(clean_events),
        })
    }
}

fn required(field: &'static str, value: Option<&str>) -> Result<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(Error::validation(field, "is required")),
    }
}

fn lookup(field: &'static str, code: &str) -> Result<Country> {
    catalog::country_by_code(&code.to_uppercase())
        .ok_or_else(|| Error::validation(field, format!("'{code}' is not a catalog code")))
}

fn optional_country(code: &str) -> Result<Option<Country>> {
    let code = code.trim();
    if code.is_empty() {
        Ok(None)
    } else {
        lookup("originCountry", code).map(Some)
    }
}

fn resolve_image(
    field: &'static str,
    input: Option<ImageInput>,
    policy: &ImagePolicy,
) -> Result<Option<String>> {
    input.map(|i| i.resolve(field, policy)).transpose()
}

fn trimmed(value: Option<String>) -> String {
    value.map(|s| s.trim().to_string()).unwrap_or_default()
}

fn clean_events(events: Vec<String>) -> Vec<String> {
    events
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

/// The admin surface over a record store.
///
/// Reads are open. Every mutation, including import commits, requires the
/// gate to be unlocked first.
#[derive(Debug)]
pub struct AdminConsole<B> {
    store: RecordStore<B>,
    gate: AccessGate,
    policy: ImagePolicy,
    ingestor: Ingestor,
}

impl<B: KeyValueStore> AdminConsole<B> {
    /// Build a console with a closed gate.
    #[must_use]
    pub fn new(store: RecordStore<B>, gate: AccessGate, policy: ImagePolicy, ingestor: Ingestor) -> Self {
        Self {
            store,
            gate,
            policy,
            ingestor,
        }
    }

    /// Try to open the gate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccessDenied`] if `code` does not match.
    pub fn unlock(&mut self, code: &str) -> Result<()> {
        self.gate.unlock(code)
    }

    /// Check whether mutations are allowed.
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.gate.is_authorized()
    }

    /// The underlying store.
    pub fn store(&mut self) -> &mut RecordStore<B> {
        &mut self.store
    }

    /// Give the store back.
    #[must_use]
    pub fn into_store(self) -> RecordStore<B> {
        self.store
    }

    /// Create a participant from a validated form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccessDenied`], a validation error, or a
    /// persistence failure.
    pub fn add(&mut self, form: ParticipantForm) -> Result<Participant> {
        self.gate.require()?;
        let fields = form.into_new(&self.policy)?;
        self.store.add(fields)
    }

    /// Apply a validated form to an existing participant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccessDenied`], a validation error,
    /// [`Error::NotFound`], or a persistence failure.
    pub fn update(&mut self, id: &str, form: ParticipantForm) -> Result<Participant> {
        self.gate.require()?;
        let patch = form.into_patch(&self.policy)?;
        if patch.is_empty() {
            debug!(id, "Empty edit, nothing to change");
            return self.store.get(id);
        }
        self.store.update(id, patch)
    }

    /// Delete a participant.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccessDenied`] or a persistence failure.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        self.gate.require()?;
        self.store.delete(id)
    }

    /// Wipe all stored state and reseed the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccessDenied`] or a persistence failure.
    pub fn reset(&mut self) -> Result<Vec<Participant>> {
        self.gate.require()?;
        self.store.reset()
    }

    /// Load a spreadsheet for mapping review.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccessDenied`] or [`Error::ImportState`].
    pub fn load_sheet(&mut self, sheet: Sheet) -> Result<&ColumnMapping> {
        self.gate.require()?;
        self.ingestor.load(sheet)
    }

    /// Point a field at a header of the loaded sheet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImportState`] or a validation error.
    pub fn map_field(&mut self, field: TargetField, header: &str) -> Result<()> {
        self.ingestor.set_mapping(field, header)
    }

    /// Leave a field unmapped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImportState`] outside mapping review.
    pub fn unmap_field(&mut self, field: TargetField) -> Result<()> {
        self.ingestor.clear_mapping(field)
    }

    /// The mapping under review, if any.
    #[must_use]
    pub fn mapping(&self) -> Option<&ColumnMapping> {
        self.ingestor.mapping()
    }

    /// Drop the loaded sheet.
    pub fn abort_import(&mut self) {
        self.ingestor.abort();
    }

    /// Run the import into the store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccessDenied`] or [`Error::ImportState`]. Row
    /// failures are reported in the returned log, not as errors.
    pub async fn commit_import(&mut self) -> Result<ImportReport> {
        self.gate.require()?;
        let report = self.ingestor.commit(&mut self.store).await?;
        info!("{}", report.summary());
        Ok(report)
    }
}
