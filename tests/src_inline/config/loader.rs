use super::*;
use std::fs;
use tempfile::tempdir;

const FULL: &str = r#"
seed = 7
batch_size = 2

[[motif]]
id = "m1"
seed = "CA/S"
instantiation = { type = "gapped_kmer", min_gap = 0, max_gap = 2 }

[[motif]]
id = "m2"
seed = "WYW"

[motif.instantiation]
type = "hamming_gapped_kmer"
hamming_distance_probabilities = { "0" = 0.7, "1" = 0.3 }
position_weights = [1.0, 0.0, 1.0]
alphabet_weights = { a = 1.0, g = 2.0 }

[[signal]]
id = "s1"
motifs = ["m1", "m2"]

[[signal]]
id = "s2"
motifs = ["m2"]
implanting = { type = "healthy_sequence", sequence_implanting = "gapped_motif", sequence_position_weights = { "1" = 1.0, "2" = 3.0 } }

[[implanting]]
name = "both"
dataset_implanting_rate = 0.2
repertoire_implanting_rate = 0.5
signals = ["s1", "s2"]

[[implanting]]
dataset_implanting_rate = 0.3
repertoire_implanting_rate = 0.25
signals = ["s2"]
"#;

#[test]
fn full_config_builds_all_objects() {
    let config = parse_simulation_config(FULL).expect("config");
    assert_eq!(config.seed, Some(7));
    assert_eq!(config.batch_size, Some(2));
    assert_eq!(config.motifs.len(), 2);
    assert_eq!(config.motifs[0].max_length(), 5);
    assert_eq!(config.motifs[1].instantiation().name(), "hamming_gapped_kmer");

    assert_eq!(config.signals.len(), 2);
    assert_eq!(config.signals[0].motifs().len(), 2);
    assert_eq!(config.signals[0].implanting_strategy().name(), "healthy_sequence");

    let rules = config.simulation.implantings();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].name, "both");
    assert_eq!(rules[1].name, "implanting_2");
    assert!(rules[1].contains_signal("s2"));
}

#[test]
fn load_reads_from_disk() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("simulation.toml");
    fs::write(&path, FULL).expect("write file");
    let config = load_simulation_config(&path).expect("config");
    assert_eq!(config.definition.implantings.len(), 2);
}

#[test]
fn unknown_motif_is_reported() {
    let text = r#"
[[motif]]
id = "m1"
seed = "AAA"

[[signal]]
id = "s1"
motifs = ["missing"]
"#;
    let err = parse_simulation_config(text).unwrap_err();
    match err {
        ConfigError::UnknownMotif { signal, motif } => {
            assert_eq!(signal, "s1");
            assert_eq!(motif, "missing");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_signal_is_reported() {
    let text = r#"
[[motif]]
id = "m1"
seed = "AAA"

[[signal]]
id = "s1"
motifs = ["m1"]

[[implanting]]
name = "r1"
dataset_implanting_rate = 0.5
repertoire_implanting_rate = 0.5
signals = ["s9"]
"#;
    assert!(matches!(
        parse_simulation_config(text),
        Err(ConfigError::UnknownSignal { .. })
    ));
}

#[test]
fn duplicate_ids_are_rejected() {
    let text = r#"
[[motif]]
id = "m1"
seed = "AAA"

[[motif]]
id = "m1"
seed = "CCC"
"#;
    assert!(matches!(
        parse_simulation_config(text),
        Err(ConfigError::DuplicateId { kind: "motif", .. })
    ));
}

#[test]
fn bad_map_keys_are_rejected() {
    let text = r#"
[[motif]]
id = "m1"
seed = "AAA"
instantiation = { type = "hamming_gapped_kmer", hamming_distance_probabilities = { one = 1.0 } }
"#;
    match parse_simulation_config(text).unwrap_err() {
        ConfigError::InvalidKey { field, key, .. } => {
            assert_eq!(field, "hamming_distance_probabilities");
            assert_eq!(key, "one");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn invalid_objects_surface_their_errors() {
    let gap_without_marker = r#"
[[motif]]
id = "m1"
seed = "AAA"
instantiation = { type = "gapped_kmer", max_gap = 1 }
"#;
    assert!(matches!(
        parse_simulation_config(gap_without_marker),
        Err(ConfigError::Motif(_))
    ));

    let rates_too_high = r#"
[[motif]]
id = "m1"
seed = "AAA"

[[signal]]
id = "s1"
motifs = ["m1"]

[[implanting]]
dataset_implanting_rate = 0.7
repertoire_implanting_rate = 0.5
signals = ["s1"]

[[implanting]]
dataset_implanting_rate = 0.7
repertoire_implanting_rate = 0.5
signals = ["s1"]
"#;
    assert!(matches!(
        parse_simulation_config(rates_too_high),
        Err(ConfigError::Plan(PlanError::DatasetRatesExceedOne(_)))
    ));

    let bad_toml = "seed = ";
    assert!(matches!(
        parse_simulation_config(bad_toml),
        Err(ConfigError::Toml(_))
    ));
}
