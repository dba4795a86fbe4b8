//! Directory filtering and search.
//!
//! [`filter_participants`] is a pure function: it never reorders, copies, or
//! mutates records, it only selects the ones matching every active
//! criterion of a [`DirectoryQuery`].

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::model::{Country, Participant};

/// Facet value that disables a facet.
pub const ALL: &str = "ALL";

/// Current search text and facet selections of the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryQuery {
    /// Free text matched against name, organization, and title.
    pub query: String,
    /// Residency code, or [`ALL`].
    pub country: String,
    /// Exact organization, or [`ALL`].
    pub organization: String,
    /// Exact role title, or [`ALL`].
    pub role: String,
}

impl Default for DirectoryQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            country: ALL.to_string(),
            organization: ALL.to_string(),
            role: ALL.to_string(),
        }
    }
}

impl DirectoryQuery {
    /// Check whether any criterion narrows the directory.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.query.is_empty() || self.country != ALL || self.organization != ALL || self.role != ALL
    }

    /// Clear the search text and every facet.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Check a single participant against every criterion.
    #[must_use]
    pub fn matches(&self, participant: &Participant) -> bool {
        let needle = self.query.to_lowercase();
        let matches_search = participant.name.to_lowercase().contains(&needle)
            || participant.organization.to_lowercase().contains(&needle)
            || participant.title.to_lowercase().contains(&needle);
        let matches_country = self.country == ALL || participant.country.code == self.country;
        let matches_organization =
            self.organization == ALL || participant.organization == self.organization;
        let matches_role = self.role == ALL || participant.title == self.role;

        matches_search && matches_country && matches_organization && matches_role
    }
}

/// Select the participants matching `query`, preserving input order.
#[must_use]
pub fn filter_participants<'a>(
    records: &'a [Participant],
    query: &DirectoryQuery,
) -> Vec<&'a Participant> {
    records.iter().filter(|p| query.matches(p)).collect()
}

/// Catalog localities used by at least one participant, in catalog order.
#[must_use]
pub fn active_countries(records: &[Participant]) -> Vec<Country> {
    let in_use: HashSet<&str> = records.iter().map(|p| p.country.code.as_str()).collect();
    catalog::countries()
        .into_iter()
        .filter(|c| in_use.contains(c.code.as_str()))
        .collect()
}

/// Distinct organizations, sorted.
#[must_use]
pub fn unique_organizations(records: &[Participant]) -> Vec<String> {
    records
        .iter()
        .map(|p| p.organization.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct role titles, sorted.
#[must_use]
pub fn unique_roles(records: &[Participant]) -> Vec<String> {
    records
        .iter()
        .map(|p| p.title.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{default_participants, find_country};
    use crate::model::NewParticipant;

    fn person(id: &str, name: &str, org: &str, title: &str, code: &str) -> Participant {
        let mut fresh = NewParticipant::new(name, org, find_country(code).unwrap());
        fresh.title = title.to_string();
        fresh.with_id(id.to_string())
    }

    fn sample() -> Vec<Participant> {
        vec![
            person("a", "Ada Lovelace", "Analytical Society", "Director", "GB"),
            person("b", "Grace Hopper", "Navy Labs", "Admiral", "US"),
            person("c", "Anna Schmidt", "Alpha EMENA", "Director", "DE"),
            person("d", "Jean Dupont", "Alpha EMENA", "Pastor", "FR"),
        ]
    }

    fn ids(found: &[&Participant]) -> Vec<String> {
        found.iter().map(|p| p.id.clone()).collect()
    }

    fn is_ordered_subset(found: &[&Participant], all: &[Participant]) -> bool {
        let mut cursor = all.iter();
        found
            .iter()
            .all(|f| cursor.any(|candidate| candidate.id == f.id))
    }

    #[test]
    fn test_default_query_matches_all() {
        let records = sample();
        let query = DirectoryQuery::default();
        assert!(!query.is_active());
        assert_eq!(filter_participants(&records, &query).len(), 4);
    }

    #[test]
    fn test_query_is_case_insensitive_over_three_fields() {
        let records = sample();
        let by_name = DirectoryQuery {
            query: "GRACE".to_string(),
            ..DirectoryQuery::default()
        };
        assert_eq!(ids(&filter_participants(&records, &by_name)), vec!["b"]);

        let by_org = DirectoryQuery {
            query: "alpha".to_string(),
            ..DirectoryQuery::default()
        };
        assert_eq!(ids(&filter_participants(&records, &by_org)), vec!["c", "d"]);

        let by_title = DirectoryQuery {
            query: "direct".to_string(),
            ..DirectoryQuery::default()
        };
        assert_eq!(ids(&filter_participants(&records, &by_title)), vec!["a", "c"]);
    }

    #[test]
    fn test_query_does_not_search_bio() {
        let mut records = sample();
        records[0].bio = "unique-marker".to_string();
        let query = DirectoryQuery {
            query: "unique-marker".to_string(),
            ..DirectoryQuery::default()
        };
        assert!(filter_participants(&records, &query).is_empty());
    }

    #[test]
    fn test_facets_are_anded() {
        let records = sample();
        let query = DirectoryQuery {
            query: String::new(),
            country: "DE".to_string(),
            organization: "Alpha EMENA".to_string(),
            role: "Director".to_string(),
        };
        assert!(query.is_active());
        assert_eq!(ids(&filter_participants(&records, &query)), vec!["c"]);

        let none = DirectoryQuery {
            role: "Pastor".to_string(),
            ..query
        };
        assert!(filter_participants(&records, &none).is_empty());
    }

    #[test]
    fn test_organization_and_role_are_exact() {
        let records = sample();
        let query = DirectoryQuery {
            organization: "alpha emena".to_string(),
            ..DirectoryQuery::default()
        };
        assert!(filter_participants(&records, &query).is_empty());
    }

    #[test]
    fn test_output_is_ordered_subset() {
        let records = sample();
        let queries = [
            DirectoryQuery::default(),
            DirectoryQuery {
                query: "a".to_string(),
                ..DirectoryQuery::default()
            },
            DirectoryQuery {
                country: "FR".to_string(),
                ..DirectoryQuery::default()
            },
            DirectoryQuery {
                query: "zzz".to_string(),
                ..DirectoryQuery::default()
            },
            DirectoryQuery {
                role: "Director".to_string(),
                query: "an".to_string(),
                ..DirectoryQuery::default()
            },
        ];
        for query in &queries {
            let found = filter_participants(&records, query);
            assert!(found.len() <= records.len());
            assert!(is_ordered_subset(&found, &records), "query {query:?}");
        }
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut query = DirectoryQuery {
            query: "x".to_string(),
            country: "DE".to_string(),
            organization: "Org".to_string(),
            role: "CEO".to_string(),
        };
        query.reset();
        assert_eq!(query, DirectoryQuery::default());
    }

    #[test]
    fn test_active_countries_in_catalog_order() {
        let codes: Vec<_> = active_countries(&sample())
            .into_iter()
            .map(|c| c.code)
            .collect();
        assert_eq!(codes, vec!["DE", "FR", "GB", "US"]);
    }

    #[test]
    fn test_unique_facets_sorted() {
        let records = sample();
        assert_eq!(
            unique_organizations(&records),
            vec!["Alpha EMENA", "Analytical Society", "Navy Labs"]
        );
        assert_eq!(unique_roles(&records), vec!["Admiral", "Director", "Pastor"]);
    }

    #[test]
    fn test_facets_of_default_set() {
        let records = default_participants();
        let codes: Vec<_> = active_countries(&records)
            .into_iter()
            .map(|c| c.code)
            .collect();
        assert_eq!(codes, vec!["DE", "HU", "AE"]);
    }
}
