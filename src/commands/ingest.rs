use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use crate::cli::IngestArgs;
use crate::config::DatabaseConfig;
use crate::ingestor::Ingestor;
use crate::util::{now_utc_string, utc_compact_string};

#[derive(Debug, Default, Clone, Copy)]
pub struct BatchStats {
    pub files: usize,
    pub documents: usize,
    pub claimants: usize,
}

pub fn run(args: IngestArgs) -> Result<()> {
    let started = Instant::now();
    let run_id = format!("batch-{}", utc_compact_string(Utc::now()));

    let config = match args.database_url {
        Some(url) => DatabaseConfig::new(url),
        None => DatabaseConfig::from_env(),
    };
    let ingestor = Ingestor::new(config);

    info!(
        folder = %args.folder.display(),
        run_id = %run_id,
        started_at = %now_utc_string(),
        "starting batch ingest"
    );

    let stats = run_batch(&ingestor, &args.folder)?;

    info!(
        files = stats.files,
        documents = stats.documents,
        claimants = stats.claimants,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "batch completed"
    );

    Ok(())
}

/// Processes every `*.json` file in `folder` sequentially. The first failing
/// file aborts the batch; files are independent otherwise.
pub fn run_batch(ingestor: &Ingestor, folder: &Path) -> Result<BatchStats> {
    let mut stats = BatchStats::default();

    for path in json_files(folder)? {
        let outcome = ingestor
            .ingest(&path)
            .with_context(|| format!("ingestion failed for {}", path.display()))?;

        stats.files += 1;
        stats.documents += 1;
        if outcome.claimant_id.is_some() {
            stats.claimants += 1;
        }

        match outcome.claimant_id {
            Some(claimant_id) => info!(
                path = %path.display(),
                document_id = outcome.document_id,
                claimant_id,
                "ingested document with claimant"
            ),
            None => info!(
                path = %path.display(),
                document_id = outcome.document_id,
                "ingested document"
            ),
        }
    }

    Ok(stats)
}

fn json_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(folder)
        .with_context(|| format!("failed to list directory {}", folder.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to list directory {}", folder.display()))?;
        let path = entry.path();
        let is_json = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(".json"));
        if is_json {
            paths.push(path);
        }
    }

    // Directory order is OS-dependent; sort for deterministic reruns.
    paths.sort();
    Ok(paths)
}
