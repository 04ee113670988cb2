use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gcf::config::{InputConfig, JobConfig, OutputConfig, StopwordsConfig};
use gcf::runtime::{self, RunOptions};

#[derive(Parser)]
#[command(name = "gcf")]
#[command(about = "Grant category filter - drop categories contradicted by description stopwords", long_about = None)]
struct Cli {
    /// Hide the progress bar
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a job from YAML configuration
    Run {
        /// Path to job YAML file
        #[arg(short, long)]
        config: PathBuf,
        /// Process records on a single thread
        #[arg(long)]
        sequential: bool,
    },
    /// Run a job configured entirely from flags
    Filter(FilterArgs),
    /// Validate a job configuration and its input files
    Validate {
        /// Path to job YAML file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show version information
    Version,
}

#[derive(Args)]
struct FilterArgs {
    /// Grants CSV with category and description columns
    #[arg(short, long)]
    input: PathBuf,
    /// Stopword CSV, one column per category
    #[arg(short, long)]
    stopwords: PathBuf,
    /// Where to write the augmented CSV
    #[arg(short, long)]
    output: PathBuf,
    #[arg(long, default_value = "Categories")]
    category_column: String,
    #[arg(long, default_value = "Description")]
    description_column: String,
    /// Field delimiter of the grants CSV and the output
    #[arg(long, default_value = ",")]
    delimiter: String,
    /// Field delimiter of the stopword CSV
    #[arg(long, default_value = ",")]
    stopwords_delimiter: String,
    /// Separator between category labels within a cell
    #[arg(long, default_value = "|")]
    category_separator: String,
    /// Value written to the Stopwords column when nothing matched
    #[arg(long, default_value = "-")]
    no_match_sentinel: String,
    /// Write a JSON run manifest to this path
    #[arg(long)]
    manifest: Option<PathBuf>,
    /// Process records on a single thread
    #[arg(long)]
    sequential: bool,
}

impl FilterArgs {
    fn into_job(self) -> anyhow::Result<JobConfig> {
        let mut input = InputConfig::new(self.input);
        input.category_column = self.category_column;
        input.description_column = self.description_column;
        input.delimiter = self.delimiter;
        let mut stopwords = StopwordsConfig::new(self.stopwords);
        stopwords.delimiter = self.stopwords_delimiter;
        let mut output = OutputConfig::new(self.output);
        output.no_match_sentinel = self.no_match_sentinel;
        output.manifest = self.manifest;

        let mut job = JobConfig::new(input, stopwords, output);
        job.category_separator = self.category_separator;
        job.parallel = !self.sequential;
        job.validate()?;
        Ok(job)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("gcf=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let options = RunOptions {
        show_progress: !cli.quiet,
    };

    match cli.command {
        Commands::Run { config, sequential } => {
            let mut job = JobConfig::from_yaml_file(&config)?;
            if sequential {
                job.parallel = false;
            }
            runtime::run_job(&job, &options)?;
        }
        Commands::Filter(args) => {
            let job = args.into_job()?;
            runtime::run_job(&job, &options)?;
        }
        Commands::Validate { config } => {
            let job = JobConfig::from_yaml_file(&config)?;
            let prepared = runtime::prepare(&job)?;
            println!(
                "✓ Job configuration is valid ({} rows, {} stopword categories)",
                prepared.dataset.len(),
                prepared.table.category_count()
            );
        }
        Commands::Version => {
            println!("gcf version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
