//! Read/write classifier artifact files.
//!
//! The file is the artifact's JSON form (see `model::ClassifierArtifact`).
//! Reloading yields a classifier whose predictions are identical to the one
//! that was saved.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::error::AppError;
use crate::model::ClassifierArtifact;

/// Write an artifact file, replacing any existing one.
pub fn write_artifact_json(path: &Path, artifact: &ClassifierArtifact) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create model file '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    artifact.to_writer(&mut writer)?;
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to write model file '{}': {e}", path.display())))?;

    info!(path = %path.display(), "model saved");
    Ok(())
}

/// Read an artifact file.
pub fn read_artifact_json(path: &Path) -> Result<ClassifierArtifact, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open model file '{}': {e}", path.display())))?;
    let artifact = ClassifierArtifact::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(e.exit_code(), format!("'{}': {e}", path.display())))?;

    info!(
        path = %path.display(),
        trained_at = %artifact.trained_at(),
        n_records = artifact.n_records(),
        "model loaded"
    );
    Ok(artifact)
}
