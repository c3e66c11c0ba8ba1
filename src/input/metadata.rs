use std::collections::{BTreeMap, HashSet};
use std::io::BufRead;
use std::path::Path;

use crate::input::{InputError, open_reader, path_display};

pub const METADATA_FILE: &str = "metadata.tsv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRow {
    pub filename: String,
    pub subject_id: String,
    pub custom: BTreeMap<String, String>,
}

/// Reads the dataset-level metadata table: one row per repertoire file.
pub fn read_metadata(path: &Path) -> Result<Vec<MetadataRow>, InputError> {
    let mut reader = open_reader(path)?;
    let mut line = String::new();

    let mut header_line = String::new();
    let read = reader.read_line(&mut header_line)?;
    if read == 0 {
        return Err(InputError::InvalidTsvRow {
            line: 0,
            reason: "empty metadata file".to_string(),
        });
    }

    let header = header_line.trim_end_matches(['\n', '\r']);
    let columns: Vec<&str> = header.split('\t').collect();
    let missing = |column: &str| InputError::MissingColumn {
        path: path_display(path).to_string(),
        column: column.to_string(),
    };
    let filename_idx = columns
        .iter()
        .position(|c| *c == "filename")
        .ok_or_else(|| missing("filename"))?;
    let subject_idx = columns
        .iter()
        .position(|c| *c == "subject_id")
        .ok_or_else(|| missing("subject_id"))?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut rows = Vec::new();
    let mut line_no = 1usize;
    loop {
        line.clear();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            break;
        }
        line_no += 1;
        let value = line.trim_end_matches(['\n', '\r']);
        if value.is_empty() {
            continue;
        }
        let parts: Vec<&str> = value.split('\t').collect();
        if parts.len() != columns.len() {
            return Err(InputError::InvalidTsvRow {
                line: line_no,
                reason: format!("expected {} fields, found {}", columns.len(), parts.len()),
            });
        }
        let filename = parts[filename_idx];
        let subject_id = parts[subject_idx];
        if filename.is_empty() || subject_id.is_empty() {
            return Err(InputError::InvalidTsvRow {
                line: line_no,
                reason: "filename and subject_id must be non-empty".to_string(),
            });
        }
        if !seen.insert(subject_id.to_string()) {
            return Err(InputError::DuplicateRepertoire(subject_id.to_string()));
        }

        let custom = columns
            .iter()
            .zip(parts.iter())
            .enumerate()
            .filter(|(i, _)| *i != filename_idx && *i != subject_idx)
            .map(|(_, (c, v))| ((*c).to_string(), (*v).to_string()))
            .collect();

        rows.push(MetadataRow {
            filename: filename.to_string(),
            subject_id: subject_id.to_string(),
            custom,
        });
    }

    Ok(rows)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/metadata.rs"]
mod tests;
