use super::*;
use crate::config::loader::parse_simulation_config;
use crate::model::repertoire::RepertoireMetadata;
use crate::model::sequence::ReceptorSequence;
use crate::pipeline::stage2_simulate::{SimulateOptions, run_stage2};
use std::fs;
use tempfile::tempdir;

const CONFIG: &str = r#"
seed = 21

[[motif]]
id = "m1"
seed = "WW/W"
instantiation = { type = "gapped_kmer", min_gap = 1, max_gap = 1 }

[[motif]]
id = "m2"
seed = "YYY"

[[signal]]
id = "s1"
motifs = ["m1"]

[[signal]]
id = "s2"
motifs = ["m2"]

[[implanting]]
name = "first"
dataset_implanting_rate = 0.5
repertoire_implanting_rate = 0.5
signals = ["s1"]
"#;

fn context() -> SimulateContext {
    context_for(&["p1", "p/2"])
}

fn context_for(ids: &[&str]) -> SimulateContext {
    let repertoires = ids
        .iter()
        .map(|id| {
            let seqs = (0..4)
                .map(|s| ReceptorSequence::new(format!("seq{s}"), "ACDEFGHI"))
                .collect();
            Repertoire::new(*id, seqs, RepertoireMetadata::default())
        })
        .collect();
    let dataset = crate::model::dataset::RepertoireDataset::new("d", repertoires);
    let config = parse_simulation_config(CONFIG).expect("config");
    run_stage2(dataset, &config, SimulateOptions::default()).expect("stage2")
}

#[test]
fn writes_all_outputs() {
    let dir = tempdir().expect("tempdir");
    let ctx = context();
    let summary = run_stage3_report(&ctx, dir.path()).expect("stage3");

    assert!(dir.path().join("summary.json").is_file());
    assert!(dir.path().join("report.txt").is_file());
    assert!(dir.path().join("repertoires").join("p1.tsv").is_file());
    assert!(dir.path().join("repertoires").join("p_2.tsv").is_file());

    assert_eq!(summary.run.n_repertoires, 2);
    assert_eq!(summary.run.n_sequences, 8);
    assert_eq!(summary.run.seed, 21);
    assert_eq!(summary.rules[0].repertoires, 1);
    assert_eq!(summary.signals["s1"].repertoires_flagged, 1);
    assert_eq!(summary.signals["s1"].sequences_implanted, 2);
    assert_eq!(summary.signals["s2"].repertoires_flagged, 0);
}

#[test]
fn metadata_has_label_per_signal() {
    let dir = tempdir().expect("tempdir");
    let ctx = context();
    run_stage3_report(&ctx, dir.path()).expect("stage3");

    let text = fs::read_to_string(dir.path().join("metadata.tsv")).expect("read metadata");
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("filename\tsubject_id\tsignal_s1\tsignal_s2")
    );
    let rows: Vec<Vec<&str>> = lines.map(|l| l.split('\t').collect()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], "repertoires/p1.tsv");
    let s1_true = rows.iter().filter(|r| r[2] == "True").count();
    assert_eq!(s1_true, 1);
    assert!(rows.iter().all(|r| r[3] == "False"));
}

#[test]
fn checksums_match_written_files() {
    let dir = tempdir().expect("tempdir");
    let ctx = context();
    let summary = run_stage3_report(&ctx, dir.path()).expect("stage3");
    for repertoire in &summary.repertoires {
        let bytes = fs::read(dir.path().join(&repertoire.file)).expect("read repertoire");
        assert_eq!(repertoire.crc64, format!("{:016x}", CRC64.checksum(&bytes)));
    }
}

#[test]
fn repertoire_table_round_trips_through_loader() {
    let dir = tempdir().expect("tempdir");
    let ctx = context();
    let summary = run_stage3_report(&ctx, dir.path()).expect("stage3");

    for (entry, repertoire) in summary.repertoires.iter().zip(ctx.output.repertoires()) {
        assert_eq!(entry.identifier, repertoire.identifier);
        let path = dir.path().join(&entry.file);
        let loaded = crate::input::repertoire::read_repertoire(&path).expect("read repertoire");
        assert_eq!(loaded.len(), repertoire.len());
        for (read, written) in loaded.iter().zip(&repertoire.sequences) {
            assert_eq!(read.identifier, written.identifier);
            assert_eq!(read.sequence(), written.sequence());
        }
    }
}

#[test]
fn implant_columns_describe_the_splice() {
    let ctx = context();
    let implanted = ctx
        .output
        .repertoires()
        .iter()
        .find(|r| r.implanted_sequence_count() > 0)
        .expect("implanted repertoire");
    let bytes = encode_repertoire(implanted).expect("encode");
    let text = String::from_utf8(bytes).expect("utf8");
    let header: Vec<&str> = text.lines().next().expect("header").split('\t').collect();
    let instance_col = header
        .iter()
        .position(|h| *h == "implant_instance")
        .expect("instance column");
    let gap_col = header.iter().position(|h| *h == "implant_gap").expect("gap column");

    let implanted_rows: Vec<Vec<&str>> = text
        .lines()
        .skip(1)
        .map(|l| l.split('\t').collect::<Vec<_>>())
        .filter(|r| !r[instance_col].is_empty())
        .collect();
    assert_eq!(implanted_rows.len(), 2);
    for row in implanted_rows {
        assert_eq!(row[instance_col], "WW/W");
        assert_eq!(row[gap_col], "1");
    }
}

#[test]
fn report_lists_rules_and_signals() {
    let dir = tempdir().expect("tempdir");
    let ctx = context();
    run_stage3_report(&ctx, dir.path()).expect("stage3");
    let report = fs::read_to_string(dir.path().join("report.txt")).expect("read report");
    assert!(report.contains("- first: 1 repertoires"));
    assert!(report.contains("- s2: 0 repertoires flagged"));
}

#[test]
fn colliding_identifiers_get_distinct_files() {
    let dir = tempdir().expect("tempdir");
    let ctx = context_for(&["a/b", "a_b", "a b"]);
    let summary = run_stage3_report(&ctx, dir.path()).expect("stage3");

    let files: Vec<&str> = summary.repertoires.iter().map(|r| r.file.as_str()).collect();
    assert_eq!(
        files,
        vec!["repertoires/a_b.tsv", "repertoires/a_b_1.tsv", "repertoires/a_b_2.tsv"]
    );
    for entry in &summary.repertoires {
        let bytes = fs::read(dir.path().join(&entry.file)).expect("read repertoire");
        assert_eq!(entry.crc64, format!("{:016x}", CRC64.checksum(&bytes)));
    }

    let text = fs::read_to_string(dir.path().join("metadata.tsv")).expect("read metadata");
    let listed: Vec<&str> = text
        .lines()
        .skip(1)
        .map(|l| l.split('\t').next().unwrap_or_default())
        .collect();
    assert_eq!(listed, files);
}

#[test]
fn metadata_quotes_subject_ids_with_tabs() {
    let dir = tempdir().expect("tempdir");
    let mut ctx = context();
    let repertoires = ctx
        .output
        .repertoires()
        .iter()
        .map(|r| {
            let mut metadata = r.metadata.clone();
            metadata.sample.subject_id = format!("{}\tx", r.identifier);
            Repertoire::new(r.identifier.clone(), r.sequences.clone(), metadata)
        })
        .collect();
    ctx.output = crate::model::dataset::RepertoireDataset::new("d", repertoires);
    run_stage3_report(&ctx, dir.path()).expect("stage3");

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(dir.path().join("metadata.tsv"))
        .expect("open metadata");
    let subjects: Vec<String> = reader
        .records()
        .map(|r| r.expect("record")[1].to_string())
        .collect();
    assert_eq!(subjects, vec!["p1\tx".to_string(), "p/2\tx".to_string()]);
}
