use std::path::PathBuf;

use thiserror::Error;

use crate::geometry::GeometryError;

/// Failure modes of a single-file ingestion. All variants propagate to the
/// batch driver uncaught; there is no per-file recovery.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON record in {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to connect to database")]
    Connection(#[source] postgres::Error),

    #[error("invalid claimant geometry")]
    Geometry(#[from] GeometryError),

    #[error("database statement failed")]
    Database(#[from] postgres::Error),
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn read_error_names_the_offending_file() {
        let err = IngestError::Read {
            path: Path::new("ocr_output/scan1.json").to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "failed to read ocr_output/scan1.json");
    }

    #[test]
    fn geometry_error_converts_into_ingest_error() {
        let err: IngestError = GeometryError::PositionArity(1).into();
        assert!(matches!(err, IngestError::Geometry(_)));
    }
}
