//! Column-to-field mapping for spreadsheet imports.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Participant field a spreadsheet column can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetField {
    /// Display name.
    Name,
    /// Organization or ministry.
    Organization,
    /// Role title.
    Title,
    /// Residency locality.
    Country,
    /// Biography.
    Bio,
    /// Testimony.
    Testimony,
    /// Email address.
    Email,
    /// Phone number.
    Phone,
    /// Website.
    Website,
    /// Portrait reference.
    PhotoUrl,
    /// Promotional image reference.
    PromoPhotoUrl,
}

impl TargetField {
    /// Every target field, in display order.
    pub const ALL: [Self; 11] = [
        Self::Name,
        Self::Organization,
        Self::Title,
        Self::Country,
        Self::Bio,
        Self::Testimony,
        Self::Email,
        Self::Phone,
        Self::Website,
        Self::PhotoUrl,
        Self::PromoPhotoUrl,
    ];

    /// Lower-case fragments that mark a header as feeding this field.
    #[must_use]
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Name => &["name"],
            Self::Organization => &["org", "ministry"],
            Self::Title => &["title", "role"],
            Self::Country => &["country", "hub"],
            Self::Bio => &["bio", "desc"],
            Self::Testimony => &["testimony", "quote"],
            Self::Email => &["email"],
            Self::Phone => &["phone"],
            Self::Website => &["web"],
            Self::PhotoUrl => &["photo", "avatar"],
            Self::PromoPhotoUrl => &["promo", "hero"],
        }
    }

    /// Field name as stored in records.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Organization => "organization",
            Self::Title => "title",
            Self::Country => "country",
            Self::Bio => "bio",
            Self::Testimony => "testimony",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Website => "website",
            Self::PhotoUrl => "photoUrl",
            Self::PromoPhotoUrl => "promoPhotoUrl",
        }
    }
}

impl fmt::Display for TargetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TargetField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::validation("mapping", format!("unknown target field '{s}'")))
    }
}

/// Assignment of source headers to target fields.
///
/// Each field maps to at most one header. A header may feed several fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    fields: BTreeMap<TargetField, String>,
}

impl ColumnMapping {
    /// Infer a mapping from header names.
    ///
    /// Headers are tested in order; when several headers match a field the
    /// last one wins.
    #[must_use]
    pub fn auto_map(headers: &[String]) -> Self {
        let mut fields = BTreeMap::new();
        for header in headers {
            let lowered = header.to_lowercase();
            for field in TargetField::ALL {
                if field.keywords().iter().any(|k| lowered.contains(k)) {
                    fields.insert(field, header.clone());
                }
            }
        }
        Self { fields }
    }

    /// Header feeding `field`, if any.
    #[must_use]
    pub fn get(&self, field: TargetField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    /// Point `field` at `header`, which must be one of `headers`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `header` is not a column of the file.
    pub fn set(&mut self, field: TargetField, header: &str, headers: &[String]) -> Result<()> {
        if !headers.iter().any(|h| h == header) {
            return Err(Error::validation(
                "mapping",
                format!("'{header}' is not a column of the uploaded file"),
            ));
        }
        self.fields.insert(field, header.to_string());
        Ok(())
    }

    /// Leave `field` unmapped.
    pub fn clear(&mut self, field: TargetField) {
        self.fields.remove(&field);
    }

    /// Mapped fields and their headers, in field order.
    pub fn iter(&self) -> impl Iterator<Item = (TargetField, &str)> {
        self.fields.iter().map(|(f, h)| (*f, h.as_str()))
    }

    /// Number of mapped fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check whether no field is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
