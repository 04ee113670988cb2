//! Grant category de-noising.
//!
//! Each grant record carries a `|`-joined list of category labels and a
//! free-text description. A stopword table maps categories to terms whose
//! whole-word presence in the description disqualifies the category; the
//! [`filter::CategoryFilter`] drops those categories and records which
//! stopwords triggered the removal.

pub mod config;
pub mod error;
pub mod filter;
pub mod io;
pub mod runtime;
pub mod stopwords;

pub use config::JobConfig;
pub use error::FilterError;
pub use filter::{CategoryFilter, FilterOutcome, Record};
pub use runtime::{run_job, RunOptions, RunReport};
pub use stopwords::{Stopword, StopwordTable};
