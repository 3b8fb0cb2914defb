use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

use patent_topics::{
    clean::{batch_clean, CleanContext},
    corpus::metadata::{Granularity, Metadata},
    pipeline::{keyword_counts, load_corpus, run_lsa},
    KeyPolicy, Method, PipelineConfig, Result, TextBarChart, TopicError, TopicRenderer,
};

/// Topic modeling of patent text corpora
#[derive(Parser)]
#[command(name = "patent-topics", version, about)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Cache root (overrides `cache.root`)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean raw text files into the corpus directory
    Clean {
        /// directory of raw `.txt` files (overrides `paths.raw_txt_dir`)
        #[arg(long)]
        src: Option<PathBuf>,
        /// output directory (overrides `paths.txt_dir`)
        #[arg(long)]
        dest: Option<PathBuf>,
        /// keep already cleaned files
        #[arg(long)]
        no_overwrite: bool,
    },
    /// Build the topic model and chart documents per topic
    Lsa {
        #[command(flatten)]
        model: ModelArgs,
        /// only the N most populated topics
        #[arg(long)]
        top: Option<usize>,
        /// print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Topic counts per priority year or month
    Trend {
        #[command(flatten)]
        model: ModelArgs,
        /// metadata csv, or a directory of csv files (overrides `paths.metadata_csv`)
        #[arg(long)]
        metadata: Option<PathBuf>,
        /// group by month instead of year
        #[arg(long)]
        monthly: bool,
    },
    /// Frequency of keyword-defined topics from `[keywords]`
    Keywords {
        /// per-text cap on a keyword's count
        #[arg(long)]
        max_count: Option<u64>,
    },
}

#[derive(Args)]
struct ModelArgs {
    /// directory of cleaned `.txt` files (overrides `paths.txt_dir`)
    #[arg(long)]
    txt_dir: Option<PathBuf>,
    #[arg(short = 'k', long)]
    n_topics: Option<usize>,
    /// SVD or NMF
    #[arg(short, long)]
    method: Option<Method>,
    #[arg(long)]
    vocab_size: Option<usize>,
    /// NMF update rounds
    #[arg(long)]
    max_iterations: Option<usize>,
    /// damp term counts as `1 + ln(tf)`
    #[arg(long)]
    sublinear_tf: bool,
    /// plain `TFIDF` / `LSA_<method>` cache directories
    #[arg(long)]
    legacy_cache: bool,
}

impl ModelArgs {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(dir) = &self.txt_dir {
            config.paths.txt_dir = dir.clone();
        }
        if let Some(k) = self.n_topics {
            config.lsa.n_topics = k;
        }
        if let Some(method) = self.method {
            config.lsa.method = method;
        }
        if let Some(v) = self.vocab_size {
            config.tfidf.vocab_size = v;
        }
        if let Some(n) = self.max_iterations {
            config.lsa.max_iterations = n;
        }
        if self.sublinear_tf {
            config.tfidf.sublinear_tf = true;
        }
        if self.legacy_cache {
            config.cache.key_policy = KeyPolicy::Legacy;
        }
    }
}

fn chart(config: &PipelineConfig, title: &str) -> TextBarChart {
    TextBarChart {
        title: title.to_string(),
        width: config.report.bar_width,
        ..Default::default()
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = cli.cache_dir {
        config.cache.root = dir;
    }
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Clean { src, dest, no_overwrite } => {
            let src = src.unwrap_or(config.paths.raw_txt_dir);
            let dest = dest.unwrap_or(config.paths.txt_dir);
            let summary = batch_clean(&src, &dest, &CleanContext::default(), !no_overwrite)?;
            writeln!(out, "cleaned {} files, skipped {}", summary.cleaned, summary.skipped)?;
        }
        Commands::Lsa { model, top, json } => {
            model.apply(&mut config);
            if top.is_some() {
                config.report.top_topics = top;
            }
            config.validate()?;
            let corpus = load_corpus(&config)?;
            let report = run_lsa(&corpus, &config)?.report(&config.report)?;
            if json {
                serde_json::to_writer_pretty(&mut out, &report)?;
                writeln!(out)?;
            } else {
                let title = format!("{} topic counts", report.method);
                chart(&config, &title).render(&report.topics, &mut out)?;
            }
        }
        Commands::Trend { model, metadata, monthly } => {
            model.apply(&mut config);
            if let Some(path) = metadata {
                config.paths.metadata_csv = path;
            }
            if monthly {
                config.report.granularity = Granularity::Month;
            }
            config.validate()?;
            let corpus = load_corpus(&config)?;
            let meta = Metadata::from_path(&config.paths.metadata_csv)?;
            let trend = run_lsa(&corpus, &config)?.trend(&corpus, &meta, &config.report)?;
            for (topic, terms) in trend.topic_terms.iter().enumerate() {
                writeln!(out, "Topic {topic}: {}", terms.join(" "))?;
            }
            for (period, counts) in &trend.periods {
                let cells: Vec<String> = counts.iter().map(usize::to_string).collect();
                writeln!(out, "{period}\t{}", cells.join("\t"))?;
            }
            if trend.undated > 0 {
                writeln!(out, "({} documents without a priority date)", trend.undated)?;
            }
        }
        Commands::Keywords { max_count } => {
            if max_count.is_some() {
                config.keywords.max_count = max_count;
            }
            if config.keywords.topics.is_empty() {
                return Err(TopicError::Config("no [keywords.topics] configured".into()));
            }
            let corpus = load_corpus(&config)?;
            for (topic, freq) in keyword_counts(&corpus, &config)? {
                writeln!(out, "{topic}\t{freq:.2}")?;
            }
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
