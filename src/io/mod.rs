use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{FilterError, Result};

/// A CSV dataset held in memory: one header row plus string cells.
///
/// Rows may be shorter than the header; a missing trailing cell reads as
/// absent (`None`) rather than as an error.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    path: PathBuf,
}

impl Dataset {
    pub fn new(path: impl Into<PathBuf>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers,
            rows,
            path: path.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolve a column by exact header name.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| FilterError::MissingColumn {
                column: name.to_string(),
                path: self.path.clone(),
                available: self.headers.clone(),
            })
    }

    /// Index of `name`, appending a new empty column if the header is not present yet.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.headers.iter().position(|h| h == name) {
            return idx;
        }
        self.headers.push(name.to_string());
        self.headers.len() - 1
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: String) {
        let width = self.headers.len().max(col + 1);
        if let Some(cells) = self.rows.get_mut(row) {
            if cells.len() < width {
                cells.resize(width, String::new());
            }
            cells[col] = value;
        }
    }
}

/// Parse a configured delimiter into the single byte the csv crate expects.
pub fn parse_delimiter(delimiter: &str) -> Result<u8> {
    match delimiter.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ if delimiter == "\\t" => Ok(b'\t'),
        _ => Err(FilterError::InvalidDelimiter(delimiter.to_string())),
    }
}

/// Read a headed CSV file into memory.
///
/// Rows shorter than the header are kept; a row wider than the header is
/// fatal, since its extra cells have no column to land in.
pub fn read_dataset(path: &Path, delimiter: u8) -> Result<Dataset> {
    let file = File::open(path).map_err(|e| FilterError::io(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| FilterError::csv(path, e))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| FilterError::csv(path, e))?;
        if record.len() > headers.len() {
            return Err(FilterError::RaggedRow {
                path: path.to_path_buf(),
                line: record.position().map_or(rows.len() as u64 + 2, |p| p.line()),
                expected: headers.len(),
                found: record.len(),
            });
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Dataset::new(path, headers, rows))
}

/// Write a dataset as CSV, padding short rows to the header width.
pub fn write_dataset(dataset: &Dataset, path: &Path, delimiter: u8) -> Result<()> {
    // Create directory if it doesn't exist
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| FilterError::io(parent, e))?;
        }
    }

    let file = File::create(path).map_err(|e| FilterError::io(path, e))?;
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(file);

    writer
        .write_record(&dataset.headers)
        .map_err(|e| FilterError::csv(path, e))?;

    let width = dataset.headers.len();
    for row in &dataset.rows {
        let padded = row
            .iter()
            .map(String::as_str)
            .chain(std::iter::repeat("").take(width.saturating_sub(row.len())));
        writer
            .write_record(padded)
            .map_err(|e| FilterError::csv(path, e))?;
    }

    writer.flush().map_err(|e| FilterError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_delimiter() {
        assert_eq!(parse_delimiter(",").unwrap(), b',');
        assert_eq!(parse_delimiter("\t").unwrap(), b'\t');
        assert_eq!(parse_delimiter("\\t").unwrap(), b'\t');
        assert!(matches!(
            parse_delimiter(";;"),
            Err(FilterError::InvalidDelimiter(_))
        ));
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("§").is_err());
    }

    #[test]
    fn test_read_short_rows_and_quoted_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grants.csv");
        fs::write(
            &path,
            "Id,Categories,Description\n1,Health|Education,\"rural, remote schools\"\n2,Energy\n",
        )
        .unwrap();

        let dataset = read_dataset(&path, b',').unwrap();
        assert_eq!(dataset.headers, vec!["Id", "Categories", "Description"]);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.cell(0, 2), Some("rural, remote schools"));
        assert_eq!(dataset.cell(1, 1), Some("Energy"));
        assert_eq!(dataset.cell(1, 2), None);
    }

    #[test]
    fn test_row_wider_than_header_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grants.csv");
        fs::write(
            &path,
            "Categories,Description\nArts,a mural\nHealth,a clinic,EXTRA_DATA\n",
        )
        .unwrap();

        let err = read_dataset(&path, b',').unwrap_err();
        assert!(matches!(
            err,
            FilterError::RaggedRow {
                line: 3,
                expected: 2,
                found: 3,
                ..
            }
        ));
        assert!(err.to_string().contains("grants.csv"));
    }

    #[test]
    fn test_missing_column_lists_available_headers() {
        let dataset = Dataset::new(
            "grants.csv",
            vec!["Id".to_string(), "Categories".to_string()],
            Vec::new(),
        );
        let err = dataset.column_index("Description").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'Description'"));
        assert!(message.contains("Id, Categories"));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        let err = read_dataset(&path, b',').unwrap_err();
        assert!(matches!(err, FilterError::Io { .. }));
        assert!(err.to_string().contains("absent.csv"));
    }

    #[test]
    fn test_ensure_column_reuses_existing_header() {
        let mut dataset = Dataset::new(
            "grants.csv",
            vec!["Categories".to_string(), "Stopwords".to_string()],
            vec![vec!["Health".to_string()]],
        );
        assert_eq!(dataset.ensure_column("Stopwords"), 1);
        assert_eq!(dataset.ensure_column("Filtered_Categories"), 2);
        assert_eq!(dataset.headers.len(), 3);

        dataset.set_cell(0, 2, "Health".to_string());
        assert_eq!(dataset.rows[0], vec!["Health", "", "Health"]);
    }

    #[test]
    fn test_write_pads_rows_and_creates_parent_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("filtered.csv");
        let dataset = Dataset::new(
            "in.csv",
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
            vec![
                vec!["1".to_string()],
                vec!["x|y".to_string(), "two words".to_string(), "3".to_string()],
            ],
        );

        write_dataset(&dataset, &path, b',').unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "A,B,C\n1,,\nx|y,two words,3\n");
    }
}
