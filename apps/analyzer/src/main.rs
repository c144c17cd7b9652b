mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resumatch::config::Config;
use resumatch::errors::{AnalyzeError, ErrorBody};
use resumatch::history::{HistoryStore, SortOrder};
use resumatch::matching::response::MatchResponse;
use resumatch::models::analysis::AnalysisRecord;
use resumatch::{Analyzer, JobPosting};

use crate::cli::{AnalyzeArgs, Cli, Commands, HistoryArgs};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Logs go to stderr; stdout carries only JSON
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting resumatch v{}", env!("CARGO_PKG_VERSION"));

    let outcome = match cli.command {
        Commands::Analyze(args) => run_analyze(args, &config),
        Commands::History(args) => run_history(args, &config),
    };

    if let Err(err) = outcome {
        let body = match err.downcast_ref::<AnalyzeError>() {
            Some(analyze_err) => ErrorBody::from(analyze_err),
            None => ErrorBody {
                error: format!("{err:#}"),
            },
        };
        println!("{}", serde_json::to_string_pretty(&body)?);
        std::process::exit(1);
    }

    Ok(())
}

fn run_analyze(args: AnalyzeArgs, config: &Config) -> Result<()> {
    if !has_pdf_extension(&args.resume) {
        bail!("Only PDF resumes are supported (got '{}')", args.resume.display());
    }

    let resume = std::fs::read(&args.resume)
        .with_context(|| format!("Failed to read resume '{}'", args.resume.display()))?;
    let description = match (&args.job, args.job_text) {
        (Some(path), _) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read job description '{}'", path.display()))?,
        (None, Some(text)) => text,
        (None, None) => bail!("A job description is required (--job or --job-text)"),
    };

    let mut posting = JobPosting::new(description);
    if let Some(level) = args.min_education {
        posting = posting.with_min_education(level);
    }
    if let Some(months) = args.min_experience_months {
        posting = posting.with_min_experience_months(months);
    }

    let pipeline = config.pipeline_config(Utc::now().date_naive())?;
    let analyzer = Analyzer::new(Arc::new(pipeline));
    let result = analyzer.analyze(&resume, &posting)?;

    if args.save {
        let label = args
            .resume
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| args.resume.display().to_string());
        let record = AnalysisRecord::new(label, posting.description, result.clone());
        HistoryStore::new(&config.history_path).append(&record)?;
    }

    println!("{}", serde_json::to_string_pretty(&MatchResponse::from(&result))?);
    Ok(())
}

fn run_history(args: HistoryArgs, config: &Config) -> Result<()> {
    let order = if args.asc {
        SortOrder::Ascending
    } else {
        SortOrder::Descending
    };
    let records = HistoryStore::new(&config.history_path).list(args.sort.into(), order)?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}
