//! Stopword table: category label -> disqualifying terms.
//!
//! The table is loaded from a CSV file where every column header names a
//! category and every non-empty cell below it is a stopword for that
//! category. Words are lowercased, de-duplicated and kept in lexicographic
//! order, each with a pre-compiled whole-word pattern.

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::error::{FilterError, Result};
use crate::io;

/// A single lowercase stopword with its compiled `\b<word>\b` pattern.
#[derive(Debug, Clone)]
pub struct Stopword {
    word: String,
    pattern: Regex,
}

impl Stopword {
    pub fn new(word: &str) -> Result<Self> {
        let word = word.to_lowercase();
        // Regex metacharacters in the word are matched literally
        let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(&word))).map_err(|e| {
            FilterError::Pattern {
                word: word.clone(),
                source: e,
            }
        })?;
        Ok(Self { word, pattern })
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    /// Whole-word test against an already lowercased description.
    pub fn is_found_in(&self, lowered_description: &str) -> bool {
        self.pattern.is_match(lowered_description)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StopwordTable {
    entries: BTreeMap<String, Vec<Stopword>>,
}

impl StopwordTable {
    /// Build a table from `(category, words)` pairs.
    ///
    /// Category names and words are trimmed; empty words are ignored. Pairs
    /// naming the same category are merged.
    pub fn from_lists<C, L, W>(lists: impl IntoIterator<Item = (C, L)>) -> Result<Self>
    where
        C: AsRef<str>,
        L: IntoIterator<Item = W>,
        W: AsRef<str>,
    {
        let mut words: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (category, list) in lists {
            let set = words
                .entry(category.as_ref().trim().to_string())
                .or_default();
            for word in list {
                let word = word.as_ref().trim();
                if !word.is_empty() {
                    set.insert(word.to_lowercase());
                }
            }
        }

        let mut entries = BTreeMap::new();
        for (category, set) in words {
            let compiled = set
                .iter()
                .map(|w| Stopword::new(w))
                .collect::<Result<Vec<_>>>()?;
            entries.insert(category, compiled);
        }

        Ok(Self { entries })
    }

    /// Load the table from a CSV file with one column per category.
    pub fn load(path: &Path, delimiter: u8) -> Result<Self> {
        let dataset = io::read_dataset(path, delimiter)?;

        let mut lists: Vec<(String, Vec<String>)> = Vec::with_capacity(dataset.headers.len());
        for (col, header) in dataset.headers.iter().enumerate() {
            let cells: Vec<String> = (0..dataset.len())
                .filter_map(|row| dataset.cell(row, col))
                .filter(|cell| !cell.trim().is_empty())
                .map(str::to_string)
                .collect();

            if header.trim().is_empty() {
                // Trailing delimiters produce blank, empty columns; tolerate those
                if cells.is_empty() {
                    continue;
                }
                return Err(FilterError::EmptyCategoryHeader {
                    path: path.to_path_buf(),
                    index: col,
                });
            }

            lists.push((header.clone(), cells));
        }

        Self::from_lists(lists)
    }

    /// Stopwords for `category` in lexicographic order, if the category has an entry.
    pub fn get(&self, category: &str) -> Option<&[Stopword]> {
        self.entries.get(category).map(Vec::as_slice)
    }

    pub fn contains_category(&self, category: &str) -> bool {
        self.entries.contains_key(category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn category_count(&self) -> usize {
        self.entries.len()
    }

    pub fn stopword_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn words(table: &StopwordTable, category: &str) -> Vec<String> {
        table
            .get(category)
            .unwrap_or_default()
            .iter()
            .map(|s| s.word().to_string())
            .collect()
    }

    #[test]
    fn test_whole_word_match() {
        let cat = Stopword::new("cat").unwrap();
        assert!(cat.is_found_in("the cat sat"));
        assert!(cat.is_found_in("cat"));
        assert!(cat.is_found_in("a cat, a dog"));
        assert!(!cat.is_found_in("the cataloging process"));
        assert!(!cat.is_found_in("bobcat"));
    }

    #[test]
    fn test_stopword_is_lowercased() {
        let grant = Stopword::new("Grant").unwrap();
        assert_eq!(grant.word(), "grant");
        assert!(grant.is_found_in("a small grant"));
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let dotted = Stopword::new("c.d.c").unwrap();
        assert!(dotted.is_found_in("funded by the c.d.c program"));
        assert!(!dotted.is_found_in("funded by the cxdxc program"));

        let parens = Stopword::new("(pilot)").unwrap();
        assert!(!parens.is_found_in("pilot study"));
        assert!(parens.is_found_in("x(pilot)x"));
    }

    #[test]
    fn test_from_lists_dedups_and_sorts() {
        let table = StopwordTable::from_lists(vec![
            ("Education", vec!["schools", "School", "school", "  "]),
            (" Health ", vec!["disease", "clinic"]),
        ])
        .unwrap();

        assert_eq!(table.category_count(), 2);
        assert_eq!(table.stopword_count(), 4);
        assert_eq!(words(&table, "Education"), vec!["school", "schools"]);
        assert_eq!(words(&table, "Health"), vec!["clinic", "disease"]);
        assert!(table.contains_category("Health"));
        assert!(!table.contains_category("Energy"));
    }

    #[test]
    fn test_load_from_csv_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stopwords.csv");
        fs::write(
            &path,
            "Health , Education,\ndisease,school,\nclinic,,\nDisease,schools,\n",
        )
        .unwrap();

        let table = StopwordTable::load(&path, b',').unwrap();
        assert_eq!(
            table.categories().collect::<Vec<_>>(),
            vec!["Education", "Health"]
        );
        assert_eq!(words(&table, "Health"), vec!["clinic", "disease"]);
        assert_eq!(words(&table, "Education"), vec!["school", "schools"]);
    }

    #[test]
    fn test_load_rejects_unnamed_column_with_words() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stopwords.csv");
        fs::write(&path, "Health,\ndisease,orphan\n").unwrap();

        let err = StopwordTable::load(&path, b',').unwrap_err();
        assert!(matches!(
            err,
            FilterError::EmptyCategoryHeader { index: 1, .. }
        ));
    }
}
