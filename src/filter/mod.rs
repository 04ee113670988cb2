use std::collections::BTreeSet;

use crate::stopwords::StopwordTable;

/// A grant record as seen by the filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub categories: Vec<String>,
    pub description: Option<String>,
}

impl Record {
    pub fn new(categories: Vec<String>, description: Option<String>) -> Self {
        Self {
            categories,
            description,
        }
    }

    /// Build a record from raw cells. Labels are trimmed and empty labels dropped.
    pub fn from_fields(category_field: &str, description: Option<&str>, separator: &str) -> Self {
        let categories = category_field
            .split(separator)
            .map(str::trim)
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            categories,
            description: description.map(str::to_string),
        }
    }

    /// True when the description is absent or blank.
    pub fn missing_description(&self) -> bool {
        self.description
            .as_deref()
            .map_or(true, |d| d.trim().is_empty())
    }
}

/// Result of filtering one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    pub filtered_categories: BTreeSet<String>,
    pub stopwords_found: BTreeSet<String>,
    /// Categories that were removed, each paired with the stopword that triggered it.
    pub removals: Vec<(String, String)>,
}

impl FilterOutcome {
    pub fn removed_any(&self) -> bool {
        !self.removals.is_empty()
    }

    pub fn joined_categories(&self, separator: &str) -> String {
        join(&self.filtered_categories, separator)
    }

    /// Triggering stopwords joined by `separator`, or `sentinel` when none triggered.
    pub fn joined_stopwords(&self, separator: &str, sentinel: &str) -> String {
        if self.stopwords_found.is_empty() {
            sentinel.to_string()
        } else {
            join(&self.stopwords_found, separator)
        }
    }
}

fn join(set: &BTreeSet<String>, separator: &str) -> String {
    set.iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Removes categories whose stopwords occur as whole words in the description.
///
/// Holds no per-run state; one instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct CategoryFilter {
    table: StopwordTable,
}

impl CategoryFilter {
    pub fn new(table: StopwordTable) -> Self {
        Self { table }
    }

    pub fn apply(&self, record: &Record) -> FilterOutcome {
        self.filter(record.categories.as_slice(), record.description.as_deref())
    }

    /// Filter a category list against a description.
    ///
    /// A missing description behaves as the empty string: nothing can match,
    /// so every category passes through.
    pub fn filter<S: AsRef<str>>(&self, categories: &[S], description: Option<&str>) -> FilterOutcome {
        let snapshot: BTreeSet<String> = categories
            .iter()
            .map(|c| c.as_ref().to_string())
            .collect();
        let lowered = description.unwrap_or_default().to_lowercase();

        let mut outcome = FilterOutcome {
            filtered_categories: snapshot.clone(),
            ..Default::default()
        };

        for category in &snapshot {
            let Some(stopwords) = self.table.get(category) else {
                continue;
            };
            // First match wins; stopwords are in lexicographic order
            if let Some(hit) = stopwords.iter().find(|s| s.is_found_in(&lowered)) {
                outcome.filtered_categories.remove(category);
                outcome.stopwords_found.insert(hit.word().to_string());
                outcome
                    .removals
                    .push((category.clone(), hit.word().to_string()));
            }
        }

        outcome
    }
}
