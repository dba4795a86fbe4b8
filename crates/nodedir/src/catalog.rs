//! Static reference data: the locality catalog and the default seed set.

use crate::model::{Country, Participant};

/// Catalog entries as `(name, flag, code)`. The first entry is the default.
const COUNTRIES: &[(&str, &str, &str)] = &[
    ("Germany", "🇩🇪", "DE"),
    ("France", "🇫🇷", "FR"),
    ("United Kingdom", "🇬🇧", "GB"),
    ("Italy", "🇮🇹", "IT"),
    ("Spain", "🇪🇸", "ES"),
    ("Sweden", "🇸🇪", "SE"),
    ("Portugal", "🇵🇹", "PT"),
    ("Hungary", "🇭🇺", "HU"),
    ("Czech Republic", "🇨🇿", "CZ"),
    ("Bulgaria", "🇧🇬", "BG"),
    ("Ireland", "🇮🇪", "IE"),
    ("United States", "🇺🇸", "US"),
    ("Slovenia", "🇸🇮", "SI"),
    ("United Arab Emirates", "🇦🇪", "AE"),
    ("Luxembourg", "🇱🇺", "LU"),
];

/// All catalog localities, in catalog order.
#[must_use]
pub fn countries() -> Vec<Country> {
    COUNTRIES
        .iter()
        .map(|(name, flag, code)| Country::new(*name, *flag, *code))
        .collect()
}

/// The locality used when nothing else matches.
#[must_use]
pub fn default_country() -> Country {
    let (name, flag, code) = COUNTRIES[0];
    Country::new(name, flag, code)
}

/// Look up a locality by exact code.
#[must_use]
pub fn country_by_code(code: &str) -> Option<Country> {
    COUNTRIES
        .iter()
        .find(|(_, _, c)| *c == code)
        .map(|(name, flag, code)| Country::new(*name, *flag, *code))
}

/// Resolve free text to a locality.
///
/// Matches the name case-insensitively or the code after upper-casing the
/// input.
#[must_use]
pub fn find_country(text: &str) -> Option<Country> {
    let text = text.trim();
    let upper = text.to_uppercase();
    COUNTRIES
        .iter()
        .find(|(name, _, code)| name.eq_ignore_ascii_case(text) || *code == upper)
        .map(|(name, flag, code)| Country::new(*name, *flag, *code))
}

/// Resolve free text to a locality, falling back to the catalog head.
#[must_use]
pub fn resolve_country(text: &str) -> Country {
    find_country(text).unwrap_or_else(default_country)
}

/// The fixed default participant set written on first use and on reset.
#[must_use]
pub fn default_participants() -> Vec<Participant> {
    vec![
        seed(
            "1",
            "Matthias Greve",
            "CEO",
            "Alpha & Omega Stiftung",
            "DE",
            "Serial entrepreneur and visionary supporting international projects to build the kingdom of God.",
            "After 40 years of high-tech innovation, my greatest joy is seeing the Spirit transform lives across Europe.",
            ("+49 123 456789", "matthias@example.org", "https://alpha-omega.org"),
            "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?q=80&w=400&h=400&fit=crop",
            "https://images.unsplash.com/photo-1542744095-2ad48424b66a?q=80&w=1200&h=600&fit=crop",
        ),
        seed(
            "2",
            "Anna Csöngedi",
            "Executive Director",
            "Europe For Christ",
            "HU",
            "Dedicated to mobilizing young leaders across Eastern Europe for sustainable community impact.",
            "My journey started in Budapest, where I saw the transformative power of faith in rebuilding social fabrics.",
            ("+36 123 45678", "anna@example.org", "https://europeforchrist.org"),
            "https://images.unsplash.com/photo-1494790108377-be9c29b29330?q=80&w=400&h=400&fit=crop",
            "https://images.unsplash.com/photo-1517245386807-bb43f82c33c4?q=80&w=1200&h=600&fit=crop",
        ),
        seed(
            "3",
            "Arnd Herrmann",
            "Director Partnerships",
            "Alpha EMENA",
            "AE",
            "Engaging with ministries and church networks across Europe, Middle East and Northern Africa.",
            "From a football hooligan to a man of God, my life is a testament to the radical grace found on an Alpha course.",
            ("+971 50 1234567", "arnd@alpha.org", "https://alpha.org"),
            "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?q=80&w=400&h=400&fit=crop",
            "https://images.unsplash.com/photo-1552664730-d307ca884978?q=80&w=1200&h=600&fit=crop",
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn seed(
    id: &str,
    name: &str,
    title: &str,
    organization: &str,
    code: &str,
    bio: &str,
    testimony: &str,
    (phone, email, website): (&str, &str, &str),
    photo_url: &str,
    promo_photo_url: &str,
) -> Participant {
    Participant {
        id: id.to_string(),
        name: name.to_string(),
        title: title.to_string(),
        organization: organization.to_string(),
        country: country_by_code(code).unwrap_or_else(default_country),
        origin_country: None,
        bio: bio.to_string(),
        testimony: testimony.to_string(),
        phone: phone.to_string(),
        email: email.to_string(),
        website: website.to_string(),
        photo_url: photo_url.to_string(),
        promo_photo_url: Some(promo_photo_url.to_string()),
        events: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_size_and_head() {
        assert_eq!(countries().len(), 15);
        assert_eq!(default_country().code, "DE");
    }

    #[test]
    fn test_catalog_codes_are_unique() {
        let mut codes: Vec<_> = countries().into_iter().map(|c| c.code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 15);
    }

    #[test]
    fn test_find_country_by_name_case_insensitive() {
        let found = find_country("hungary").unwrap();
        assert_eq!(found.code, "HU");
        assert_eq!(find_country("  United Kingdom ").unwrap().code, "GB");
    }

    #[test]
    fn test_find_country_by_code() {
        assert_eq!(find_country("fr").unwrap().name, "France");
        assert_eq!(find_country("AE").unwrap().name, "United Arab Emirates");
    }

    #[test]
    fn test_resolve_country_falls_back_to_head() {
        assert_eq!(resolve_country("Atlantis"), default_country());
        assert_eq!(resolve_country(""), default_country());
    }

    #[test]
    fn test_country_by_code_is_exact() {
        assert!(country_by_code("de").is_none());
        assert!(country_by_code("DE").is_some());
    }

    #[test]
    fn test_default_participants() {
        let seeded = default_participants();
        assert_eq!(seeded.len(), 3);
        let ids: Vec<_> = seeded.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(seeded[1].country.code, "HU");
        assert_eq!(seeded[2].country.code, "AE");
        assert!(seeded.iter().all(|p| p.promo_photo_url.is_some()));
    }
}
