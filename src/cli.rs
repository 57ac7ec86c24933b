use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "cannifind",
    version,
    about = "Keyword cannibalization analysis for search performance exports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Inspect(InspectArgs),
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[arg(long)]
    pub input: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long, default_value = "reports")]
    pub out_dir: PathBuf,

    #[arg(long, default_value_t = 1.0)]
    pub position_min: f64,

    #[arg(long, default_value_t = 20.0)]
    pub position_max: f64,

    #[arg(long, default_value_t = 0)]
    pub min_impressions: u64,

    #[arg(long, default_value_t = 0)]
    pub min_clicks: u64,

    #[arg(long, default_value_t = 2)]
    pub min_competing_pages: usize,

    #[arg(long, default_value_t = false)]
    pub keep_anchor_urls: bool,

    #[arg(long, default_value_t = false)]
    pub keep_templated_pages: bool,
}
