use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::pixabay::DEFAULT_API_BASE;

#[derive(Parser, Debug)]
#[command(
    name = "labelarena",
    version,
    about = "Human vs. AI label duels: catalog tooling, image roulette, and quiz scoring"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Ingest(IngestArgs),
    Search(SearchArgs),
    Resolve(ResolveArgs),
    Fetch(FetchArgs),
    Judge(JudgeArgs),
    Play(PlayArgs),
    History(HistoryArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    #[arg(long, default_value = ".cache/labelarena")]
    pub data_root: PathBuf,

    /// Explicit catalog source; otherwise label.txt then
    /// imagenet21k_labels.txt inside the data root.
    #[arg(long)]
    pub catalog_path: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long)]
    pub db_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    #[arg(long, default_value = ".cache/labelarena")]
    pub data_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub query: String,

    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    #[arg(long, default_value = ".cache/labelarena")]
    pub data_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Free-text model output to resolve against the catalog.
    #[arg(long)]
    pub prediction: String,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    #[arg(long, default_value = ".cache/labelarena")]
    pub data_root: PathBuf,

    #[arg(long)]
    pub query: String,

    /// Overrides PIXABAY_API_KEY / the data-root .env file.
    #[arg(long)]
    pub api_key: Option<String>,

    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// 1-based hit index to download into the data root's images directory.
    #[arg(long)]
    pub download: Option<usize>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct JudgeArgs {
    #[arg(long, default_value = ".cache/labelarena")]
    pub data_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// AI guess: a label id or free text resolved against the catalog.
    #[arg(long)]
    pub ai: String,

    /// Human guess: a label id or free text resolved against the catalog.
    #[arg(long)]
    pub user: String,

    /// Optional secret ground-truth label.
    #[arg(long)]
    pub truth: Option<String>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PlayArgs {
    #[arg(long, default_value = ".cache/labelarena")]
    pub data_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long, value_parser = parse_round_count, default_value_t = 5)]
    pub rounds: usize,

    /// External classifier command; the image path is appended as the
    /// last argument and the first stdout line is taken as the prediction.
    #[arg(long)]
    pub ai_command: Option<String>,

    #[arg(long)]
    pub api_key: Option<String>,

    #[arg(long, default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Per-round secret label overrides (repeatable); rounds beyond the
    /// overrides draw at random.
    #[arg(long = "secret")]
    pub secrets: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct HistoryArgs {
    #[arg(long, default_value = ".cache/labelarena")]
    pub data_root: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/labelarena")]
    pub data_root: PathBuf,
}

fn parse_round_count(value: &str) -> Result<usize, String> {
    match value {
        "5" => Ok(5),
        "10" => Ok(10),
        _ => Err("round count must be 5 or 10".to_string()),
    }
}
