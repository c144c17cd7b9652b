use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use resumatch::extraction::education::DegreeLevel;
use resumatch::history::SortKey;

#[derive(Parser)]
#[command(name = "resumatch", version)]
#[command(about = "Score a resume against a job description", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze one resume against one job description and print the result as JSON
    Analyze(AnalyzeArgs),
    /// List saved analyses
    History(HistoryArgs),
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Resume PDF
    #[arg(short, long)]
    pub resume: PathBuf,

    /// File containing the job description
    #[arg(short, long, conflicts_with = "job_text", required_unless_present = "job_text")]
    pub job: Option<PathBuf>,

    /// Job description given inline
    #[arg(long)]
    pub job_text: Option<String>,

    /// Minimum degree, overriding what the job description states
    #[arg(long)]
    pub min_education: Option<DegreeLevel>,

    /// Minimum experience in months, overriding what the job description states
    #[arg(long)]
    pub min_experience_months: Option<u32>,

    /// Append the analysis to the history file
    #[arg(long)]
    pub save: bool,
}

#[derive(Args)]
pub struct HistoryArgs {
    #[arg(short, long, value_enum, default_value_t = HistorySort::Date)]
    pub sort: HistorySort,

    /// Oldest / lowest first
    #[arg(long)]
    pub asc: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HistorySort {
    Date,
    Result,
    MatchCount,
}

impl From<HistorySort> for SortKey {
    fn from(sort: HistorySort) -> Self {
        match sort {
            HistorySort::Date => SortKey::Date,
            HistorySort::Result => SortKey::Result,
            HistorySort::MatchCount => SortKey::MatchCount,
        }
    }
}
