use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;
use webqa_core::config::{AppConfig, Config};
use webqa_core::store::ContentStore;
use webqa_strategies::{ModelRegistry, DEFAULT_MODEL};
use webqa_text::{discover_files, ContentProcessor, Corpus, FileExtractor};

/// Answer questions over local documents with interchangeable strategies.
#[derive(Parser, Debug)]
#[command(name = "webqa", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract and clean sources, print the ingest report as JSON.
    Ingest(Sources),
    /// Answer a question over the given sources, print the answer as JSON.
    Ask {
        question: String,
        /// Strategy key (default, lexical-advanced, distilbert, universal-encoder, sentence-transformer).
        #[arg(long, short, default_value = DEFAULT_MODEL)]
        model: String,
        #[command(flatten)]
        sources: Sources,
    },
    /// Print the strategy catalogue as JSON.
    Models,
}

#[derive(Args, Debug)]
struct Sources {
    /// Source URLs (`file://` or plain paths).
    #[arg(long = "url", short)]
    urls: Vec<String>,
    /// Also read every .md/.txt file below this directory.
    #[arg(long)]
    dir: Option<PathBuf>,
}

impl Sources {
    fn resolve(&self) -> Result<Vec<String>> {
        let mut urls = self.urls.clone();
        if let Some(dir) = &self.dir {
            urls.extend(discover_files(dir, &["md", "txt"]));
        }
        if urls.is_empty() {
            bail!("No URLs provided (use --url or --dir)");
        }
        Ok(urls)
    }
}

fn corpus(app: &AppConfig) -> Corpus {
    Corpus::new(
        Arc::new(ContentStore::new()),
        Arc::new(FileExtractor::new()),
        ContentProcessor::new(app.summary.max_chars),
    )
    .with_summary_sentences(app.summary.max_sentences)
}

fn ingest_with_progress(corpus: &Corpus, urls: &[String]) -> Result<webqa_text::IngestReport> {
    let pb = ProgressBar::new(urls.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} sources {msg}")?
            .progress_chars("#>-"),
    );
    let report = corpus.ingest_with(urls, |url, ok| {
        pb.set_message(if ok { url.to_string() } else { format!("failed: {url}") });
        pb.inc(1);
    });
    pb.finish_with_message(format!("{} sources, {} failed", report.url_count, report.failures.len()));
    Ok(report)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let app = Config::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?.app()?;

    match cli.command {
        Command::Ingest(sources) => {
            let urls = sources.resolve()?;
            let report = ingest_with_progress(&corpus(&app), &urls)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Ask { question, model, sources } => {
            if question.is_empty() {
                bail!("No question provided");
            }
            let urls = sources.resolve()?;
            let corpus = corpus(&app);
            ingest_with_progress(&corpus, &urls)?;
            let content = corpus.combined_content(&urls);
            info!("Answering over {} chars of content", content.len());

            let registry = ModelRegistry::build(&app);
            let served = registry.answer(&model, &question, &content);
            println!("{}", serde_json::to_string_pretty(&served)?);
        }
        Command::Models => {
            let registry = ModelRegistry::build(&app);
            println!("{}", serde_json::to_string_pretty(&registry.list_models())?);
        }
    }
    Ok(())
}
