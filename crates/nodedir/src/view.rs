//! Text rendering of directory cards, profiles, and listings.

use std::fmt::Write as _;

use serde::Serialize;

use crate::error::Result;
use crate::media::is_embedded;
use crate::model::Participant;

/// Events shown on a profile that lists none of its own.
pub const DEFAULT_EVENTS: [&str; 3] = [
    "Regional Leadership Gathering '26",
    "Digital Missions Forum",
    "Stuttgart Strategic Hub Launch",
];

/// Events to show for a participant, falling back to [`DEFAULT_EVENTS`].
#[must_use]
pub fn events(participant: &Participant) -> Vec<&str> {
    match participant.events.as_deref() {
        Some(events) if !events.is_empty() => events.iter().map(String::as_str).collect(),
        _ => DEFAULT_EVENTS.to_vec(),
    }
}

/// Website without its `https://` prefix.
#[must_use]
pub fn display_website(website: &str) -> &str {
    website.strip_prefix("https://").unwrap_or(website)
}

/// Short description of an image reference; embedded payloads are not
/// printed in full.
#[must_use]
pub fn describe_image(reference: &str) -> String {
    if is_embedded(reference) {
        let mime = reference
            .get(5..)
            .and_then(|rest| rest.split(';').next())
            .unwrap_or("image");
        format!("embedded {mime} ({} bytes)", reference.len())
    } else {
        reference.to_string()
    }
}

/// Directory card: name, title, organization, and residency.
#[must_use]
pub fn card(participant: &Participant) -> String {
    format!(
        "{} [{}]\n  {}, {}\n  {}\n",
        participant.name,
        participant.id,
        participant.title,
        participant.organization,
        participant.country
    )
}

/// Full detail profile.
#[must_use]
pub fn profile(participant: &Participant) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", participant.name);
    let _ = writeln!(out, "{}", "=".repeat(participant.name.chars().count().max(3)));
    let _ = writeln!(out, "{} at {}", participant.title, participant.organization);
    let _ = writeln!(out, "Residency:  {}", participant.country);
    if let Some(origin) = &participant.origin_country {
        let _ = writeln!(out, "Origin:     {origin}");
    }
    let _ = writeln!(out, "Identifier: {}", participant.id);

    if !participant.bio.is_empty() {
        let _ = writeln!(out, "\nBiography\n  {}", participant.bio);
    }
    if !participant.testimony.is_empty() {
        let _ = writeln!(out, "\nTestimony\n  \"{}\"", participant.testimony);
    }

    let contacts = [
        ("Phone", participant.phone.as_str()),
        ("Email", participant.email.as_str()),
        ("Web", display_website(&participant.website)),
    ];
    if contacts.iter().any(|(_, v)| !v.is_empty()) {
        let _ = writeln!(out, "\nContact");
        for (label, value) in contacts.iter().filter(|(_, v)| !v.is_empty()) {
            let _ = writeln!(out, "  {label:<6} {value}");
        }
    }

    let images = [
        ("Portrait", Some(participant.photo_url.as_str())),
        ("Promo", participant.promo_photo_url.as_deref()),
    ];
    if images.iter().any(|(_, v)| v.is_some_and(|s| !s.is_empty())) {
        let _ = writeln!(out, "\nImages");
        for (label, value) in images {
            if let Some(value) = value.filter(|s| !s.is_empty()) {
                let _ = writeln!(out, "  {label:<9} {}", describe_image(value));
            }
        }
    }

    let _ = writeln!(out, "\nEvents");
    for event in events(participant) {
        let _ = writeln!(out, "  - {event}");
    }
    out
}

/// Aligned table of participants.
#[must_use]
pub fn table(participants: &[&Participant]) -> String {
    let headers = ["ID", "NAME", "TITLE", "ORGANIZATION", "COUNTRY"];
    let rows: Vec<[&str; 5]> = participants
        .iter()
        .map(|p| {
            [
                p.id.as_str(),
                p.name.as_str(),
                p.title.as_str(),
                p.organization.as_str(),
                p.country.code.as_str(),
            ]
        })
        .collect();

    let mut widths = headers.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in std::iter::once(&headers).chain(&rows) {
        let line = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

/// Pretty JSON for any serializable view.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
