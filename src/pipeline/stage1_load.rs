use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::input::InputError;
use crate::input::metadata::{METADATA_FILE, MetadataRow, read_metadata};
use crate::input::repertoire::read_repertoire;
use crate::model::dataset::RepertoireDataset;
use crate::model::repertoire::{Repertoire, RepertoireMetadata, Sample};

#[derive(Debug, Error)]
pub enum Stage1Error {
    #[error("input error: {0}")]
    Input(#[from] InputError),
    #[error("dataset {0} lists no repertoires")]
    EmptyDataset(String),
}

#[derive(Debug, Clone)]
pub struct DatasetCtx {
    pub input_dir: PathBuf,
    pub metadata_path: PathBuf,
    pub dataset: RepertoireDataset,
    pub n_repertoires: usize,
    pub n_sequences: usize,
    pub empty_repertoires: usize,
}

pub fn run_stage1(input_dir: &Path) -> Result<DatasetCtx, Stage1Error> {
    let metadata_path = find_metadata_file(input_dir)?;
    let rows = read_metadata(&metadata_path)?;

    let name = input_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "dataset".to_string());
    if rows.is_empty() {
        return Err(Stage1Error::EmptyDataset(name));
    }

    let mut repertoires = Vec::with_capacity(rows.len());
    let mut n_sequences = 0usize;
    let mut empty_repertoires = 0usize;
    for row in rows {
        let repertoire = load_repertoire(input_dir, row)?;
        if repertoire.is_empty() {
            warn!(repertoire = %repertoire.identifier, "repertoire has no sequences");
            empty_repertoires += 1;
        }
        debug!(
            repertoire = %repertoire.identifier,
            sequences = repertoire.len(),
            "loaded repertoire"
        );
        n_sequences += repertoire.len();
        repertoires.push(repertoire);
    }

    Ok(DatasetCtx {
        input_dir: input_dir.to_path_buf(),
        metadata_path,
        n_repertoires: repertoires.len(),
        n_sequences,
        empty_repertoires,
        dataset: RepertoireDataset::new(name, repertoires),
    })
}

fn find_metadata_file(input_dir: &Path) -> Result<PathBuf, InputError> {
    let plain = input_dir.join(METADATA_FILE);
    if plain.is_file() {
        return Ok(plain);
    }
    let gz = input_dir.join(format!("{METADATA_FILE}.gz"));
    if gz.is_file() {
        return Ok(gz);
    }
    Err(InputError::MissingFile(
        plain.to_string_lossy().to_string(),
    ))
}

fn load_repertoire(input_dir: &Path, row: MetadataRow) -> Result<Repertoire, InputError> {
    let path = input_dir.join(&row.filename);
    if !path.is_file() {
        return Err(InputError::MissingFile(path.to_string_lossy().to_string()));
    }
    let sequences = read_repertoire(&path)?;

    let mut custom = BTreeMap::new();
    custom.insert("filename".to_string(), row.filename.clone());
    let metadata = RepertoireMetadata {
        sample: Sample {
            subject_id: row.subject_id.clone(),
            name: Some(row.subject_id.clone()),
            custom_params: row.custom,
        },
        custom,
        ..RepertoireMetadata::default()
    };
    Ok(Repertoire::new(row.subject_id, sequences, metadata))
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_load.rs"]
mod tests;
