use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::JobConfig;
use crate::filter::{FilterOutcome, Record};
use crate::stopwords::StopwordTable;

/// Summary of one de-noising run, written as the JSON run manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub job_name: String,
    pub input_path: PathBuf,
    pub stopwords_path: PathBuf,
    pub output_path: PathBuf,
    pub table_categories: usize,
    pub table_stopwords: usize,
    pub total_rows: usize,
    pub rows_with_removals: usize,
    pub categories_removed: usize,
    pub missing_descriptions: usize,
    pub empty_category_rows: usize,
    pub removals_by_category: BTreeMap<String, usize>,
    pub triggers_by_stopword: BTreeMap<String, usize>,
}

impl RunReport {
    pub fn new(config: &JobConfig, table: &StopwordTable) -> Self {
        Self {
            job_name: config.name.clone(),
            input_path: config.input.path.clone(),
            stopwords_path: config.stopwords.path.clone(),
            output_path: config.output.path.clone(),
            table_categories: table.category_count(),
            table_stopwords: table.stopword_count(),
            ..Default::default()
        }
    }

    /// Account for one filtered record. `row` is the zero-based data row index.
    pub fn record(&mut self, row: usize, record: &Record, outcome: &FilterOutcome) {
        self.total_rows += 1;

        if record.missing_description() {
            self.missing_descriptions += 1;
            tracing::debug!(row, "missing description, categories passed through");
        }
        if record.categories.is_empty() {
            self.empty_category_rows += 1;
            tracing::debug!(row, "empty category field");
        }

        if outcome.removed_any() {
            self.rows_with_removals += 1;
        }
        for (category, stopword) in &outcome.removals {
            self.categories_removed += 1;
            *self
                .removals_by_category
                .entry(category.clone())
                .or_default() += 1;
            *self
                .triggers_by_stopword
                .entry(stopword.clone())
                .or_default() += 1;
        }
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}
