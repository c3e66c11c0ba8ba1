use std::collections::BTreeMap;
use std::path::Path;

use crate::input::{InputError, open_reader, path_display};
use crate::model::sequence::{ReceptorSequence, SequenceMetadata};

const KNOWN_COLUMNS: [&str; 8] = [
    "sequence_id",
    "sequence_aa",
    "sequence",
    "v_call",
    "j_call",
    "locus",
    "duplicate_count",
    "region_type",
];

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Reads one AIRR-style repertoire table. `sequence_aa` is required; columns
/// outside the known set land in the sequence's custom metadata.
pub fn read_repertoire(path: &Path) -> Result<Vec<ReceptorSequence>, InputError> {
    let reader = open_reader(path)?;
    let mut tsv = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(reader);

    let headers = tsv.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);
    let aa_idx = column("sequence_aa").ok_or_else(|| InputError::MissingColumn {
        path: path_display(path).to_string(),
        column: "sequence_aa".to_string(),
    })?;
    let id_idx = column("sequence_id");
    let nt_idx = column("sequence");
    let v_idx = column("v_call");
    let j_idx = column("j_call");
    let locus_idx = column("locus");
    let count_idx = column("duplicate_count");
    let region_idx = column("region_type");
    let custom_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !KNOWN_COLUMNS.contains(h))
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    let mut sequences = Vec::new();
    for (row, record) in tsv.records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(row + 2);
        let field = |idx: Option<usize>| idx.and_then(|i| record.get(i));

        let amino_acids = record.get(aa_idx).unwrap_or("");
        if amino_acids.is_empty() {
            return Err(InputError::InvalidTsvRow {
                line,
                reason: "empty sequence_aa".to_string(),
            });
        }

        let count = match non_empty(field(count_idx)) {
            Some(raw) => Some(raw.parse::<u64>().map_err(|e| InputError::InvalidTsvRow {
                line,
                reason: format!("duplicate_count {raw:?}: {e}"),
            })?),
            None => None,
        };

        let mut custom = BTreeMap::new();
        for (idx, name) in &custom_columns {
            if let Some(value) = record.get(*idx)
                && !value.is_empty()
            {
                custom.insert(name.clone(), value.to_string());
            }
        }

        let identifier = non_empty(field(id_idx)).unwrap_or_else(|| row.to_string());
        let mut sequence = ReceptorSequence::new(identifier, amino_acids).with_metadata(
            SequenceMetadata {
                v_gene: non_empty(field(v_idx)),
                j_gene: non_empty(field(j_idx)),
                chain: non_empty(field(locus_idx)),
                count,
                region_type: non_empty(field(region_idx)),
                custom,
            },
        );
        if let Some(nt) = non_empty(field(nt_idx)) {
            sequence = sequence.with_nucleotide_sequence(nt);
        }
        sequences.push(sequence);
    }

    Ok(sequences)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/repertoire.rs"]
mod tests;
