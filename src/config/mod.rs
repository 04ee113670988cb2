use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::io::parse_delimiter;

/// A single de-noising job: one grants dataset, one stopword table, one output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    #[serde(default = "default_job_name")]
    pub name: String,
    pub input: InputConfig,
    pub stopwords: StopwordsConfig,
    pub output: OutputConfig,
    #[serde(default = "default_category_separator")]
    pub category_separator: String,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: PathBuf,
    #[serde(default = "default_category_column")]
    pub category_column: String,
    #[serde(default = "default_description_column")]
    pub description_column: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopwordsConfig {
    pub path: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: PathBuf,
    #[serde(default = "default_stopwords_column")]
    pub stopwords_column: String,
    #[serde(default = "default_filtered_column")]
    pub filtered_column: String,
    #[serde(default = "default_sentinel")]
    pub no_match_sentinel: String,
    /// Optional path for the JSON run manifest.
    #[serde(default)]
    pub manifest: Option<PathBuf>,
}

fn default_job_name() -> String {
    "category-filter".to_string()
}

fn default_category_separator() -> String {
    "|".to_string()
}

fn default_parallel() -> bool {
    true
}

fn default_category_column() -> String {
    "Categories".to_string()
}

fn default_description_column() -> String {
    "Description".to_string()
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_stopwords_column() -> String {
    "Stopwords".to_string()
}

fn default_filtered_column() -> String {
    "Filtered_Categories".to_string()
}

fn default_sentinel() -> String {
    "-".to_string()
}

impl InputConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            category_column: default_category_column(),
            description_column: default_description_column(),
            delimiter: default_delimiter(),
        }
    }
}

impl StopwordsConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: default_delimiter(),
        }
    }
}

impl OutputConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stopwords_column: default_stopwords_column(),
            filtered_column: default_filtered_column(),
            no_match_sentinel: default_sentinel(),
            manifest: None,
        }
    }
}

impl JobConfig {
    /// Config with every optional field at its default.
    pub fn new(input: InputConfig, stopwords: StopwordsConfig, output: OutputConfig) -> Self {
        Self {
            name: default_job_name(),
            input,
            stopwords,
            output,
            category_separator: default_category_separator(),
            parallel: default_parallel(),
        }
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: JobConfig =
            serde_yaml::from_str(content).context("Failed to parse YAML configuration")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (label, path) in [
            ("input", &self.input.path),
            ("stopwords", &self.stopwords.path),
            ("output", &self.output.path),
        ] {
            if path.as_os_str().is_empty() {
                anyhow::bail!("{} path must not be empty", label);
            }
        }

        let mut written = vec![("output", &self.output.path)];
        if let Some(manifest) = &self.output.manifest {
            if manifest.as_os_str().is_empty() {
                anyhow::bail!("manifest path must not be empty");
            }
            written.push(("manifest", manifest));
        }
        let roles = [("input", &self.input.path), ("stopwords", &self.stopwords.path)]
            .into_iter()
            .chain(written.iter().copied())
            .collect::<Vec<_>>();
        for (label, path) in &written {
            for (other_label, other) in &roles {
                if label != other_label && same_file(path, other) {
                    anyhow::bail!(
                        "{} path {:?} would overwrite the {} file {:?}",
                        label,
                        path,
                        other_label,
                        other
                    );
                }
            }
        }

        parse_delimiter(&self.input.delimiter).context("Invalid input delimiter")?;
        parse_delimiter(&self.stopwords.delimiter).context("Invalid stopwords delimiter")?;

        if self.category_separator.is_empty() {
            anyhow::bail!("category_separator must not be empty");
        }

        let columns = [
            ("category_column", &self.input.category_column),
            ("description_column", &self.input.description_column),
            ("stopwords_column", &self.output.stopwords_column),
            ("filtered_column", &self.output.filtered_column),
        ];
        let mut seen = HashSet::new();
        for (label, column) in columns {
            if column.trim().is_empty() {
                anyhow::bail!("{} must not be empty", label);
            }
            if !seen.insert(column.as_str()) {
                anyhow::bail!("Column '{}' is used for more than one role", column);
            }
        }

        Ok(())
    }

    pub fn input_delimiter(&self) -> Result<u8> {
        Ok(parse_delimiter(&self.input.delimiter)?)
    }

    pub fn stopwords_delimiter(&self) -> Result<u8> {
        Ok(parse_delimiter(&self.stopwords.delimiter)?)
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Lexical comparison, falling back to canonical paths when both exist.
fn same_file(a: &Path, b: &Path) -> bool {
    if normalize(a) == normalize(b) {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
