use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "prg-ingest",
    version,
    about = "Batch loader for OCR-extracted land claim records"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Ingest(IngestArgs),
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    /// Directory scanned for *.json records produced by the OCR stage.
    #[arg(long, default_value = "ocr_output")]
    pub folder: PathBuf,

    /// Connection string; takes precedence over the DATABASE_URL environment variable.
    #[arg(long)]
    pub database_url: Option<String>,
}
