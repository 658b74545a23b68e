use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use variorum::{
    config::Config,
    edition::{cleaned_file_name, edition_key, Corpus, EditionMetadata},
    metric::MetricKind,
};

#[derive(Debug, clap::Parser)]
#[command(version, about)]
struct CommandLine {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Tokenization strategy, overrides the configuration file.
    #[arg(long, global = true)]
    tokenization: Option<String>,
    /// Stopword list, overrides the configuration file.
    #[arg(long, global = true)]
    stopwords: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Clean and count an edition document or a directory of them.
    Clean {
        input: PathBuf,
        /// Directory for the `*_cleaned.json` documents; defaults to the input's directory.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Only process editions whose key contains this string.
        #[arg(long)]
        filter: Option<String>,
    },
    /// Compare a candidate edition against a reference edition.
    Compare {
        reference: PathBuf,
        candidate: PathBuf,
        #[arg(long, default_value = "IntrinsicOverallMatch")]
        metric: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CommandLine::parse();
    // stored frequencies were counted with whatever options were used back then
    let reanalyse =
        args.config.is_some() || args.tokenization.is_some() || args.stopwords.is_some();

    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(tokenization) = args.tokenization {
        config.tokenization = tokenization;
    }
    if let Some(stopwords) = args.stopwords {
        config.stopwords = stopwords;
    }

    // fail on bad names before any edition is read
    let cleaner_config = config.resolve().context("invalid configuration")?;

    match args.command {
        Command::Clean {
            input,
            output,
            filter,
        } => {
            if input.is_dir() {
                let mut corpus = Corpus::load_dir(&input, filter.as_deref())
                    .with_context(|| format!("failed to load editions from {}", input.display()))?;
                corpus.analyse_all(&cleaner_config, config.top_words)?;

                let output = output.unwrap_or(input);
                for path in corpus.write_cleaned(&output)? {
                    println!("{}", path.display());
                }
            } else {
                let key = edition_key(&input)
                    .with_context(|| format!("no edition key in {}", input.display()))?;
                let mut edition = EditionMetadata::load(&input)
                    .with_context(|| format!("failed to load edition {}", input.display()))?;
                edition.analyse(&cleaner_config, config.top_words)?;

                let output = output.unwrap_or_else(|| {
                    input
                        .parent()
                        .map(Path::to_path_buf)
                        .unwrap_or_default()
                });
                std::fs::create_dir_all(&output)
                    .with_context(|| format!("failed to create {}", output.display()))?;
                let path = output.join(cleaned_file_name(&key));
                edition.write(&path)?;
                println!("{}", path.display());
            }
        }
        Command::Compare {
            reference,
            candidate,
            metric,
        } => {
            let metric: MetricKind = metric.parse()?;

            let load = |path: &Path| -> anyhow::Result<EditionMetadata> {
                let mut edition = EditionMetadata::load(path)
                    .with_context(|| format!("failed to load edition {}", path.display()))?;
                let stored = edition.is_analysed();
                if edition.ensure_analysed(&cleaner_config, config.top_words, reanalyse)? {
                    if stored {
                        tracing::info!(path = %path.display(), "re-analysed edition with the given cleaning options");
                    } else {
                        tracing::info!(path = %path.display(), "analysed edition without stored word frequencies");
                    }
                } else {
                    tracing::debug!(path = %path.display(), "using stored word frequencies");
                }
                Ok(edition)
            };
            let reference_edition = load(&reference)?;
            let candidate_edition = load(&candidate)?;

            let output = metric.run(&reference_edition, &candidate_edition)?;
            tracing::info!(
                "{} metric between '{}' and '{}': {}",
                output.name,
                reference.display(),
                candidate.display(),
                output.result
            );
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
