use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "hst",
    about = "Fill, inspect and verify histogram containers",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Container settings (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fill a 1-D histogram and write it to a container
    Fill(FillArgs),
    /// List the directory tree of a container
    Ls(LsArgs),
    /// Print one histogram
    Show(ShowArgs),
    /// Check container integrity
    Verify(VerifyArgs),
}

#[derive(Args)]
pub struct FillArgs {
    /// Container file to write
    pub output: PathBuf,
    /// Store key, e.g. `hist/pt`
    #[arg(short, long)]
    pub key: String,
    #[arg(long, default_value = "100")]
    pub bins: u32,
    #[arg(long, allow_negative_numbers = true, default_value = "0")]
    pub min: f64,
    #[arg(long, allow_negative_numbers = true, default_value = "1")]
    pub max: f64,
    #[arg(long)]
    pub title: Option<String>,
    /// Axis label
    #[arg(long, default_value = "")]
    pub label: String,
    #[arg(short, long, allow_negative_numbers = true, default_value = "1")]
    pub weight: f64,
    /// Add to an existing container instead of replacing it
    #[arg(long)]
    pub update: bool,
    /// Container directory to write below
    #[arg(long)]
    pub dir: Option<String>,
    /// Values to fill
    #[arg(allow_negative_numbers = true)]
    pub values: Vec<f64>,
}

#[derive(Args)]
pub struct LsArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ShowArgs {
    pub file: PathBuf,
    /// Object path inside the container
    pub key: String,
    /// Include empty bins
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct VerifyArgs {
    pub file: PathBuf,
}
