//! JSON dump of the sync points of a duo comparison.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::analysis::duo::DuoReport;
use crate::analysis::reconcile::SyncInterval;
use crate::analysis::ChromosomeStatus;
use crate::output::OutputError;
use crate::utils::validation::output_path;

#[derive(Debug, Serialize)]
pub struct ChromosomeSyncPoints<'a> {
    pub chromosome: &'a str,
    #[serde(flatten)]
    pub status: &'a ChromosomeStatus,
    pub sync_points: &'a [SyncInterval],
}

#[derive(Debug, Serialize)]
pub struct SyncPointDump<'a> {
    pub chromosomes: Vec<ChromosomeSyncPoints<'a>>,
}

impl<'a> SyncPointDump<'a> {
    #[must_use]
    pub fn from_report(report: &'a DuoReport) -> Self {
        Self {
            chromosomes: report
                .chromosomes
                .iter()
                .map(|c| ChromosomeSyncPoints {
                    chromosome: &c.name,
                    status: &c.status,
                    sync_points: &c.sync_points,
                })
                .collect(),
        }
    }
}

/// Write `<prefix>_syncpoints.json`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or serialization fails.
pub fn write_sync_points(prefix: &Path, report: &DuoReport) -> Result<PathBuf, OutputError> {
    let path = output_path(prefix, "_syncpoints.json");
    let dump = SyncPointDump::from_report(report);

    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, &dump)?;
    writeln!(writer)?;
    writer.flush()?;

    let total: usize = dump.chromosomes.iter().map(|c| c.sync_points.len()).sum();
    info!(path = %path.display(), sync_points = total, "Wrote sync points");
    Ok(path)
}
