//! Derives the display projection of a record set: filter by a free-text term,
//! then order by one sort key.
//!
//! [`project`] is a pure function of its inputs and never touches the slice it
//! is given. Sorting is stable, so records with equal key values keep the order
//! they had after filtering in both directions.

use std::cmp::Ordering;

use icu_collator::{Collator, CollatorOptions, Strength};
use shared::domain::{SearchField, SortDirection, SortKey, UserRecord};
use tracing::warn;

thread_local! {
    static ROOT_COLLATOR: Option<Collator> = root_collator();
}

fn root_collator() -> Option<Collator> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Tertiary);
    match Collator::try_new(&Default::default(), options) {
        Ok(collator) => Some(collator),
        Err(err) => {
            warn!(error = ?err, "root collation unavailable; sorting by case-folded text");
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub search_term: String,
    pub search_fields: Vec<SearchField>,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            search_fields: SearchField::DEFAULT.to_vec(),
            sort_key: SortKey::default(),
            sort_direction: SortDirection::default(),
        }
    }
}

impl Query {
    pub fn matches(&self, record: &UserRecord) -> bool {
        matches_term(record, &self.search_term.to_lowercase(), &self.search_fields)
    }
}

fn matches_term(record: &UserRecord, needle: &str, fields: &[SearchField]) -> bool {
    if needle.is_empty() {
        return true;
    }
    fields
        .iter()
        .any(|field| record.search_value(*field).to_lowercase().contains(needle))
}

pub fn project(records: &[UserRecord], query: &Query) -> Vec<UserRecord> {
    let needle = query.search_term.to_lowercase();
    let mut projected: Vec<UserRecord> = records
        .iter()
        .filter(|record| matches_term(record, &needle, &query.search_fields))
        .cloned()
        .collect();

    let key = query.sort_key;
    projected.sort_by(|a, b| {
        let ordering = collate(a.sort_value(key), b.sort_value(key));
        match query.sort_direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    projected
}

/// Root-locale collation at tertiary strength: accents and case only split
/// strings that are otherwise equal, and lowercase sorts first. Strings the
/// collator considers equal fall back to code-point order.
pub fn collate(a: &str, b: &str) -> Ordering {
    ROOT_COLLATOR
        .with(|collator| match collator {
            Some(collator) => collator.compare(a, b),
            None => folded_order(a, b),
        })
        .then_with(|| a.cmp(b))
}

fn folded_order(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
