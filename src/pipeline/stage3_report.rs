use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use crc::{CRC_64_ECMA_182, Crc};
use serde::Serialize;
use thiserror::Error;

use crate::model::repertoire::{Repertoire, signal_label};
use crate::model::sequence::ImplantAnnotation;
use crate::pipeline::stage2_simulate::SimulateContext;
use crate::report::json::write_summary;
use crate::report::text::render_report;

const CRC64: Crc<u64> = Crc::<u64>::new(&CRC_64_ECMA_182);
pub const REPERTOIRE_DIR: &str = "repertoires";

#[derive(Debug, Error)]
pub enum Stage3Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("tsv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("tsv writer error: {0}")]
    IntoInner(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub tool: ToolSummary,
    pub run: RunSummary,
    pub rules: Vec<RuleSummary>,
    pub signals: BTreeMap<String, SignalSummary>,
    pub repertoires: Vec<RepertoireSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolSummary {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub dataset: String,
    pub seed: u64,
    pub batch_size: usize,
    pub n_repertoires: usize,
    pub n_sequences: usize,
    pub unassigned_repertoires: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleSummary {
    pub name: String,
    pub dataset_implanting_rate: f64,
    pub repertoire_implanting_rate: f64,
    pub signals: Vec<String>,
    pub repertoires: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SignalSummary {
    pub repertoires_flagged: usize,
    pub sequences_implanted: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RepertoireSummary {
    pub identifier: String,
    pub file: String,
    pub sequences: usize,
    pub implanted_sequences: usize,
    pub crc64: String,
}

pub fn run_stage3_report(
    ctx: &SimulateContext,
    out_dir: &Path,
) -> Result<SimulationSummary, Stage3Error> {
    let rep_dir = out_dir.join(REPERTOIRE_DIR);
    std::fs::create_dir_all(&rep_dir)?;

    let mut repertoires = Vec::with_capacity(ctx.output.len());
    let mut used_stems = HashSet::with_capacity(ctx.output.len());
    for repertoire in ctx.output.repertoires() {
        let file_name = format!("{}.tsv", unique_stem(&repertoire.identifier, &mut used_stems));
        let bytes = encode_repertoire(repertoire)?;
        std::fs::write(rep_dir.join(&file_name), &bytes)?;
        repertoires.push(RepertoireSummary {
            identifier: repertoire.identifier.clone(),
            file: format!("{}/{}", REPERTOIRE_DIR, file_name),
            sequences: repertoire.len(),
            implanted_sequences: repertoire.implanted_sequence_count(),
            crc64: format!("{:016x}", CRC64.checksum(&bytes)),
        });
    }

    write_metadata_tsv(out_dir, ctx, &repertoires)?;

    let summary = build_summary(ctx, repertoires);
    write_summary(out_dir, &summary)?;
    std::fs::write(out_dir.join("report.txt"), render_report(&summary))?;

    Ok(summary)
}

pub fn file_stem(identifier: &str) -> String {
    identifier
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Sanitized stem, suffixed with `_<n>` when an earlier identifier already
/// mapped to it.
fn unique_stem(identifier: &str, used: &mut HashSet<String>) -> String {
    let base = file_stem(identifier);
    let mut stem = base.clone();
    let mut n = 1usize;
    while used.contains(&stem) {
        stem = format!("{base}_{n}");
        n += 1;
    }
    used.insert(stem.clone());
    stem
}

/// Repertoire table in the same layout the loader reads, plus implant
/// provenance columns.
pub fn encode_repertoire(repertoire: &Repertoire) -> Result<Vec<u8>, Stage3Error> {
    let custom_columns: BTreeSet<&str> = repertoire
        .sequences
        .iter()
        .flat_map(|s| s.metadata.custom.keys().map(String::as_str))
        .collect();

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(Vec::new());

    let mut header = vec![
        "sequence_id",
        "sequence_aa",
        "sequence",
        "v_call",
        "j_call",
        "locus",
        "duplicate_count",
        "region_type",
        "implant_signal",
        "implant_motif",
        "implant_instance",
        "implant_gap",
        "implant_position",
    ];
    header.extend(custom_columns.iter().copied());
    writer.write_record(&header)?;

    for sequence in &repertoire.sequences {
        let implants = &sequence.annotation.implants;
        let meta = &sequence.metadata;
        let mut record = vec![
            sequence.identifier.clone(),
            sequence.amino_acid_sequence.clone(),
            sequence.nucleotide_sequence.clone().unwrap_or_default(),
            meta.v_gene.clone().unwrap_or_default(),
            meta.j_gene.clone().unwrap_or_default(),
            meta.chain.clone().unwrap_or_default(),
            meta.count.map(|c| c.to_string()).unwrap_or_default(),
            meta.region_type.clone().unwrap_or_default(),
            join_implants(implants, |i| i.signal_id.clone()),
            join_implants(implants, |i| i.motif_id.clone()),
            join_implants(implants, |i| i.motif_instance.instance.clone()),
            join_implants(implants, |i| i.motif_instance.gap.to_string()),
            join_implants(implants, |i| i.position.to_string()),
        ];
        for column in &custom_columns {
            record.push(meta.custom.get(*column).cloned().unwrap_or_default());
        }
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| Stage3Error::IntoInner(e.to_string()))
}

/// Comma-joined when a sequence carries more than one implant.
fn join_implants<F>(implants: &[ImplantAnnotation], field: F) -> String
where
    F: Fn(&ImplantAnnotation) -> String,
{
    implants.iter().map(field).collect::<Vec<_>>().join(",")
}

fn write_metadata_tsv(
    out_dir: &Path,
    ctx: &SimulateContext,
    repertoires: &[RepertoireSummary],
) -> Result<(), Stage3Error> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(out_dir.join("metadata.tsv"))?;

    let labels: Vec<String> = ctx
        .signals
        .iter()
        .map(|s| signal_label(&s.identifier))
        .collect();
    let mut header = vec!["filename".to_string(), "subject_id".to_string()];
    header.extend(labels.iter().cloned());
    writer.write_record(&header)?;

    for (repertoire, written) in ctx.output.repertoires().iter().zip(repertoires) {
        let mut record = vec![
            written.file.clone(),
            repertoire.metadata.sample.subject_id.clone(),
        ];
        for label in &labels {
            let value = repertoire.metadata.labels.get(label).copied().unwrap_or(false);
            record.push(if value { "True" } else { "False" }.to_string());
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

fn build_summary(ctx: &SimulateContext, repertoires: Vec<RepertoireSummary>) -> SimulationSummary {
    let rules = ctx
        .simulation
        .implantings()
        .iter()
        .zip(ctx.assignment.counts())
        .map(|(implanting, count)| RuleSummary {
            name: implanting.name.clone(),
            dataset_implanting_rate: implanting.dataset_implanting_rate,
            repertoire_implanting_rate: implanting.repertoire_implanting_rate,
            signals: implanting
                .signals()
                .iter()
                .map(|s| s.identifier.clone())
                .collect(),
            repertoires: *count,
        })
        .collect();

    let mut signals: BTreeMap<String, SignalSummary> = ctx
        .signals
        .iter()
        .map(|s| (s.identifier.clone(), SignalSummary::default()))
        .collect();
    for repertoire in ctx.output.repertoires() {
        for (signal_id, entry) in signals.iter_mut() {
            if repertoire.metadata.signal_flag(signal_id) == Some(true) {
                entry.repertoires_flagged += 1;
            }
        }
        for sequence in &repertoire.sequences {
            for implant in &sequence.annotation.implants {
                if let Some(entry) = signals.get_mut(&implant.signal_id) {
                    entry.sequences_implanted += 1;
                }
            }
        }
    }

    SimulationSummary {
        tool: ToolSummary {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        run: RunSummary {
            dataset: ctx.output.name.clone(),
            seed: ctx.seed,
            batch_size: ctx.batch_size,
            n_repertoires: ctx.output.len(),
            n_sequences: ctx.output.repertoires().iter().map(Repertoire::len).sum(),
            unassigned_repertoires: ctx.assignment.unassigned(),
        },
        rules,
        signals,
        repertoires,
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_report.rs"]
mod tests;
