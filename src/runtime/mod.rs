use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::config::JobConfig;
use crate::filter::{CategoryFilter, FilterOutcome, Record};
use crate::io::{self, Dataset};
use crate::stopwords::StopwordTable;

mod manifest;
pub use manifest::RunReport;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub show_progress: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            show_progress: true,
        }
    }
}

/// Inputs loaded and checked before any record is filtered.
pub struct PreparedJob {
    pub table: StopwordTable,
    pub dataset: Dataset,
    pub category_col: usize,
    pub description_col: usize,
}

/// Load the stopword table and the dataset, and resolve the required columns.
///
/// Every malformed-input error surfaces here, before processing starts.
pub fn prepare(config: &JobConfig) -> Result<PreparedJob> {
    let table = StopwordTable::load(&config.stopwords.path, config.stopwords_delimiter()?)
        .context("Failed to load stopword table")?;
    tracing::debug!(
        categories = table.category_count(),
        stopwords = table.stopword_count(),
        "stopword table loaded"
    );

    let dataset = io::read_dataset(&config.input.path, config.input_delimiter()?)
        .context("Failed to read input dataset")?;
    let category_col = dataset.column_index(&config.input.category_column)?;
    let description_col = dataset.column_index(&config.input.description_column)?;

    Ok(PreparedJob {
        table,
        dataset,
        category_col,
        description_col,
    })
}

pub fn run_job(config: &JobConfig, options: &RunOptions) -> Result<RunReport> {
    println!("Running job: {}", config.name);

    let PreparedJob {
        table,
        mut dataset,
        category_col,
        description_col,
    } = prepare(config)?;

    println!(
        "  Loaded {} stopwords for {} categories from: {:?}",
        table.stopword_count(),
        table.category_count(),
        config.stopwords.path
    );
    println!(
        "  Read {} rows from: {:?}",
        dataset.len(),
        config.input.path
    );

    let records: Vec<Record> = (0..dataset.len())
        .map(|row| {
            Record::from_fields(
                dataset.cell(row, category_col).unwrap_or_default(),
                dataset.cell(row, description_col),
                &config.category_separator,
            )
        })
        .collect();

    let mut report = RunReport::new(config, &table);
    let filter = CategoryFilter::new(table);

    let pb = progress_bar(records.len(), options.show_progress)?;
    let outcomes = filter_records(&filter, &records, config.parallel, &pb);
    pb.finish_with_message("All records processed");

    for (row, (record, outcome)) in records.iter().zip(&outcomes).enumerate() {
        report.record(row, record, outcome);
    }

    let stopwords_col = dataset.ensure_column(&config.output.stopwords_column);
    let filtered_col = dataset.ensure_column(&config.output.filtered_column);
    for (row, outcome) in outcomes.iter().enumerate() {
        dataset.set_cell(
            row,
            stopwords_col,
            outcome.joined_stopwords(&config.category_separator, &config.output.no_match_sentinel),
        );
        dataset.set_cell(
            row,
            filtered_col,
            outcome.joined_categories(&config.category_separator),
        );
    }

    io::write_dataset(&dataset, &config.output.path, config.input_delimiter()?)
        .context("Failed to write output dataset")?;

    println!(
        "  Categories removed: {} across {} of {} rows",
        report.categories_removed, report.rows_with_removals, report.total_rows
    );
    if report.missing_descriptions > 0 || report.empty_category_rows > 0 {
        tracing::warn!(
            missing_descriptions = report.missing_descriptions,
            empty_category_rows = report.empty_category_rows,
            "rows passed through without filtering"
        );
    }
    println!("  ✓ Wrote {} rows to: {:?}", dataset.len(), config.output.path);

    if let Some(manifest_path) = &config.output.manifest {
        report
            .write_to_file(manifest_path)
            .with_context(|| format!("Failed to write manifest: {:?}", manifest_path))?;
        println!("  ✓ Manifest written to: {}", manifest_path.display());
    }

    println!("\n✓ Job completed successfully!");
    Ok(report)
}

/// Filter every record, keeping input order in the returned vector.
fn filter_records(
    filter: &CategoryFilter,
    records: &[Record],
    parallel: bool,
    pb: &ProgressBar,
) -> Vec<FilterOutcome> {
    let apply = |record: &Record| {
        let outcome = filter.apply(record);
        pb.inc(1);
        outcome
    };

    if parallel {
        records.par_iter().map(apply).collect()
    } else {
        records.iter().map(apply).collect()
    }
}

fn progress_bar(len: usize, visible: bool) -> Result<ProgressBar> {
    if !visible {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows ({percent}%)",
            )
            .context("Invalid progress bar template")?,
    );
    Ok(pb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_and_parallel_agree() {
        let table = StopwordTable::from_lists(vec![
            ("Health", vec!["clinic", "hospital"]),
            ("Energy", vec!["coal"]),
        ])
        .unwrap();
        let filter = CategoryFilter::new(table);
        let records: Vec<Record> = (0..200)
            .map(|i| {
                let description = match i % 3 {
                    0 => "a rural clinic",
                    1 => "coal and hospital",
                    _ => "nothing relevant",
                };
                Record::from_fields("Health|Energy|Arts", Some(description), "|")
            })
            .collect();

        let pb = ProgressBar::hidden();
        let sequential = filter_records(&filter, &records, false, &pb);
        let parallel = filter_records(&filter, &records, true, &pb);

        assert_eq!(sequential, parallel);
        assert_eq!(sequential[0].joined_categories("|"), "Arts|Energy");
        assert_eq!(sequential[1].joined_categories("|"), "Arts");
        assert_eq!(sequential[2].joined_categories("|"), "Arts|Energy|Health");
    }
}
