use std::fs;
use std::path::Path;

use postgres::{Client, NoTls, Transaction};
use tracing::warn;

use crate::config::DatabaseConfig;
use crate::error::IngestError;
use crate::geometry::{Geometry, WGS84_SRID};
use crate::model::{ClaimantDetails, OcrRecord};

/// Loads one OCR record per file into the `documents` and `claimants` tables.
///
/// Each call opens its own connection and runs every statement for the file
/// inside a single transaction, so a failure mid-file (malformed geometry,
/// constraint violation) leaves no partial document row behind. Connection and
/// transaction are released on every exit path by scope.
pub struct Ingestor {
    config: DatabaseConfig,
}

#[derive(Debug, Clone, Copy)]
pub struct IngestOutcome {
    pub document_id: i32,
    pub claimant_id: Option<i32>,
}

impl Ingestor {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    pub fn ingest(&self, path: &Path) -> Result<IngestOutcome, IngestError> {
        let record = read_record(path)?;

        let mut client =
            Client::connect(self.config.url(), NoTls).map_err(IngestError::Connection)?;
        let outcome = ingest_record(&mut client, &record)?;
        client.close().map_err(IngestError::Database)?;

        Ok(outcome)
    }
}

pub fn read_record(path: &Path) -> Result<OcrRecord, IngestError> {
    let raw = fs::read(path).map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&raw).map_err(|source| IngestError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn ingest_record(client: &mut Client, record: &OcrRecord) -> Result<IngestOutcome, IngestError> {
    let mut tx = client.transaction()?;

    let document_id = insert_document(&mut tx, record)?;

    // A claimant without geometry carries nothing the claimants table can
    // anchor spatially; it is dropped without error and the document keeps a
    // NULL claimant_id.
    let mut claimant_id = None;
    if let Some(claimant) = &record.claimant
        && let Some(raw_geometry) = claimant.geometry()
    {
        let geometry = Geometry::parse(raw_geometry)?;
        let village_id = match &claimant.village {
            Some(name) => resolve_village(&mut tx, name)?.into_id(name),
            None => None,
        };

        let id = insert_claimant(&mut tx, claimant, &geometry, village_id)?;
        tx.execute(
            "UPDATE documents SET claimant_id = $1 WHERE id = $2",
            &[&id, &document_id],
        )?;
        claimant_id = Some(id);
    }

    tx.commit()?;

    Ok(IngestOutcome {
        document_id,
        claimant_id,
    })
}

fn insert_document(tx: &mut Transaction<'_>, record: &OcrRecord) -> Result<i32, postgres::Error> {
    let row = tx.query_one(
        "INSERT INTO documents (filename, file_path, raw_text, structured, ocr_confidence, uploaded_by)
         VALUES ($1, $2, $3, $4, $5::float8, $6)
         RETURNING id",
        &[
            &record.file,
            &record.file_path,
            &record.text,
            &record.fields,
            &record.confidence,
            &record.uploaded_by(),
        ],
    )?;
    Ok(row.get(0))
}

fn insert_claimant(
    tx: &mut Transaction<'_>,
    claimant: &ClaimantDetails,
    geometry: &Geometry,
    village_id: Option<i32>,
) -> Result<i32, IngestError> {
    let geojson = geometry.to_geojson()?;
    let properties = claimant.properties_or_empty();

    let row = tx.query_one(
        "INSERT INTO claimants (name, claimant_type, tribal_group, village_id, area_ha, geom, properties)
         VALUES ($1, $2, $3, $4, $5::float8, ST_SetSRID(ST_GeomFromGeoJSON($6), $7), $8)
         RETURNING id",
        &[
            &claimant.name,
            &claimant.claimant_type,
            &claimant.tribe,
            &village_id,
            &claimant.area_ha,
            &geojson,
            &WGS84_SRID,
            &properties,
        ],
    )?;
    Ok(row.get(0))
}

/// Outcome of resolving a claimant's free-text village name against the
/// read-only `villages` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VillageMatch {
    Unique(i32),
    NoMatch,
    Ambiguous { id: i32, matches: usize },
}

impl VillageMatch {
    fn classify(ids: &[i32]) -> Self {
        match ids {
            [] => Self::NoMatch,
            [id] => Self::Unique(*id),
            [first, ..] => Self::Ambiguous {
                id: *first,
                matches: ids.len(),
            },
        }
    }

    /// Collapses the match to a nullable foreign key, warning when several
    /// villages share the name. The lowest id wins deterministically.
    fn into_id(self, name: &str) -> Option<i32> {
        match self {
            Self::Unique(id) => Some(id),
            Self::NoMatch => None,
            Self::Ambiguous { id, matches } => {
                warn!(village = %name, matches, "village name is ambiguous; using lowest id");
                Some(id)
            }
        }
    }
}

fn resolve_village(tx: &mut Transaction<'_>, name: &str) -> Result<VillageMatch, postgres::Error> {
    let rows = tx.query(
        "SELECT id FROM villages WHERE name = $1 ORDER BY id",
        &[&name],
    )?;
    let ids: Vec<i32> = rows.iter().map(|row| row.get(0)).collect();
    Ok(VillageMatch::classify(&ids))
}
