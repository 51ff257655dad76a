use std::{
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use salesdesk::{
    config::Config,
    summarizer::{ChatCompletionsClient, Summarizer, Unavailable},
    workbook::{CsvDirectory, DatasetSource, SpreadsheetFile},
    Engine,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Ask questions about the weekly sales workbook.
#[derive(Debug, Parser)]
#[command(name = "salesdesk", version)]
struct Args {
    /// YAML config file (defaults to $SALESDESK_CONFIG, then built-in defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Workbook file (.xlsx/.xls/.ods) or directory of per-sheet CSVs
    #[arg(long)]
    workbook: Option<PathBuf>,

    /// Question to answer; reads one question per line from stdin when omitted
    question: Vec<String>,
}

fn dataset_source(path: &Path) -> Box<dyn DatasetSource> {
    if path.is_dir() {
        Box::new(CsvDirectory::new(path))
    } else {
        Box::new(SpreadsheetFile::new(path))
    }
}

fn summarizer(cfg: &Config) -> Result<Box<dyn Summarizer>> {
    let s = &cfg.summarizer;
    match s.api_key() {
        Some(key) => Ok(Box::new(ChatCompletionsClient::new(
            s.endpoint_url()?,
            s.model.clone(),
            key,
            s.temperature,
            s.timeout(),
        )?)),
        None => {
            warn!(var = %s.api_key_env, "API key not set; unmatched questions cannot be summarized");
            Ok(Box::new(Unavailable::new(format!("{} is not set", s.api_key_env))))
        }
    }
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) config ───────────────────────────────────────────────────
    let args = Args::parse();
    let mut cfg = Config::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(wb) = args.workbook {
        cfg.workbook = wb;
    }
    info!(workbook = %cfg.workbook.display(), "startup");

    let source = dataset_source(&cfg.workbook);
    let summarizer = summarizer(&cfg)?;
    let engine = Engine::new(cfg.digest);

    // ─── 3) answer ───────────────────────────────────────────────────
    if !args.question.is_empty() {
        let question = args.question.join(" ");
        println!("{}", engine.answer(&question, source.as_ref(), summarizer.as_ref()));
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in io::stdin().lock().lines() {
        let line = line.context("reading question from stdin")?;
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        writeln!(out, "{}", engine.answer(question, source.as_ref(), summarizer.as_ref()))?;
        out.flush()?;
    }
    Ok(())
}
