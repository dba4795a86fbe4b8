//! Core directory types for nodedir.
//!
//! A [`Participant`] is one identity node in the directory. Records are
//! serialized with camelCase field names so the persisted slot stays
//! readable by other tools that understand the same layout.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog;

/// Alphabet used for generated participant identifiers.
const ID_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of generated participant identifiers.
pub const ID_LENGTH: usize = 5;

/// A locality reference value (country or region).
///
/// Records hold copies of catalog entries, so editing the catalog never
/// rewrites stored participants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Country {
    /// Display name, e.g. "Germany".
    pub name: String,
    /// Flag glyph.
    pub flag: String,
    /// Two-letter code, e.g. "DE".
    pub code: String,
}

impl Country {
    /// Create a new locality value.
    #[must_use]
    pub fn new(name: impl Into<String>, flag: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flag: flag.into(),
            code: code.into(),
        }
    }
}

impl std::fmt::Display for Country {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.flag, self.name)
    }
}

/// One participant record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Generated identifier; never changes once assigned.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Role title.
    pub title: String,

    /// Organization or ministry.
    pub organization: String,

    /// Residency locality.
    pub country: Country,

    /// Origin locality, when it differs from residency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_country: Option<Country>,

    /// Free-text biography.
    #[serde(default)]
    pub bio: String,

    /// Free-text testimony.
    #[serde(default)]
    pub testimony: String,

    /// Phone number.
    #[serde(default)]
    pub phone: String,

    /// Email address.
    #[serde(default)]
    pub email: String,

    /// Website URL.
    #[serde(default)]
    pub website: String,

    /// Portrait reference: a remote URL or an embedded `data:` URL.
    #[serde(default)]
    pub photo_url: String,

    /// Promotional image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_photo_url: Option<String>,

    /// Events this participant is associated with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<String>>,
}

/// The fields of a participant that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewParticipant {
    /// Display name.
    pub name: String,
    /// Role title.
    pub title: String,
    /// Organization or ministry.
    pub organization: String,
    /// Residency locality.
    pub country: Country,
    /// Origin locality.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_country: Option<Country>,
    /// Biography.
    #[serde(default)]
    pub bio: String,
    /// Testimony.
    #[serde(default)]
    pub testimony: String,
    /// Phone number.
    #[serde(default)]
    pub phone: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Website URL.
    #[serde(default)]
    pub website: String,
    /// Portrait reference.
    #[serde(default)]
    pub photo_url: String,
    /// Promotional image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_photo_url: Option<String>,
    /// Events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<String>>,
}

impl Default for NewParticipant {
    fn default() -> Self {
        Self {
            name: String::new(),
            title: String::new(),
            organization: String::new(),
            country: catalog::default_country(),
            origin_country: None,
            bio: String::new(),
            testimony: String::new(),
            phone: String::new(),
            email: String::new(),
            website: String::new(),
            photo_url: String::new(),
            promo_photo_url: None,
            events: None,
        }
    }
}

impl NewParticipant {
    /// Create a new participant with the required fields set.
    #[must_use]
    pub fn new(name: impl Into<String>, organization: impl Into<String>, country: Country) -> Self {
        Self {
            name: name.into(),
            organization: organization.into(),
            country,
            ..Self::default()
        }
    }

    /// Attach an identifier, producing a stored record.
    #[must_use]
    pub fn with_id(self, id: String) -> Participant {
        Participant {
            id,
            name: self.name,
            title: self.title,
            organization: self.organization,
            country: self.country,
            origin_country: self.origin_country,
            bio: self.bio,
            testimony: self.testimony,
            phone: self.phone,
            email: self.email,
            website: self.website,
            photo_url: self.photo_url,
            promo_photo_url: self.promo_photo_url,
            events: self.events,
        }
    }
}

/// A partial update of a participant.
///
/// `None` leaves the stored value untouched. An empty promotional image or
/// an empty event list clears the optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParticipantPatch {
    /// New display name.
    pub name: Option<String>,
    /// New role title.
    pub title: Option<String>,
    /// New organization.
    pub organization: Option<String>,
    /// New residency locality.
    pub country: Option<Country>,
    /// New origin locality.
    pub origin_country: Option<Country>,
    /// New biography.
    pub bio: Option<String>,
    /// New testimony.
    pub testimony: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New email address.
    pub email: Option<String>,
    /// New website URL.
    pub website: Option<String>,
    /// New portrait reference.
    pub photo_url: Option<String>,
    /// New promotional image reference; empty clears it.
    pub promo_photo_url: Option<String>,
    /// New event list; empty clears it.
    pub events: Option<Vec<String>>,
}

impl ParticipantPatch {
    /// Check whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merge the patch over `participant`. The identifier is never touched.
    pub fn apply(self, participant: &mut Participant) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        set(&mut participant.name, self.name);
        set(&mut participant.title, self.title);
        set(&mut participant.organization, self.organization);
        set(&mut participant.country, self.country);
        if let Some(origin) = self.origin_country {
            participant.origin_country = Some(origin);
        }
        set(&mut participant.bio, self.bio);
        set(&mut participant.testimony, self.testimony);
        set(&mut participant.phone, self.phone);
        set(&mut participant.email, self.email);
        set(&mut participant.website, self.website);
        set(&mut participant.photo_url, self.photo_url);
        if let Some(promo) = self.promo_photo_url {
            participant.promo_photo_url = Some(promo).filter(|s| !s.is_empty());
        }
        if let Some(events) = self.events {
            participant.events = Some(events).filter(|e| !e.is_empty());
        }
    }
}

/// Generate a short uppercase base-36 participant identifier.
///
/// Collisions are possible but unlikely at directory scale.
#[must_use]
pub fn generate_id() -> String {
    let mut rng = rand::rng();
    (0..ID_LENGTH)
        .map(|_| char::from(ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())]))
        .collect()
}
