use super::*;
use crate::config::loader::parse_simulation_config;
use crate::model::repertoire::{Repertoire, RepertoireMetadata};
use crate::model::sequence::ReceptorSequence;

const CONFIG: &str = r#"
seed = 5
batch_size = 3

[[motif]]
id = "m1"
seed = "WWW"

[[signal]]
id = "s1"
motifs = ["m1"]

[[implanting]]
name = "r1"
dataset_implanting_rate = 0.5
repertoire_implanting_rate = 0.5
signals = ["s1"]
"#;

fn dataset() -> RepertoireDataset {
    let repertoires = (0..4)
        .map(|r| {
            let seqs = (0..4)
                .map(|s| ReceptorSequence::new(s.to_string(), "ACDEFG"))
                .collect();
            Repertoire::new(format!("p{r}"), seqs, RepertoireMetadata::default())
        })
        .collect();
    RepertoireDataset::new("d", repertoires)
}

#[test]
fn file_settings_apply_without_overrides() {
    let config = parse_simulation_config(CONFIG).expect("config");
    let ctx = run_stage2(dataset(), &config, SimulateOptions::default())
        .expect("stage2");
    assert_eq!(ctx.seed, 5);
    assert_eq!(ctx.batch_size, 3);
    assert_eq!(ctx.assignment.counts(), &[2]);
    assert_eq!(ctx.output.len(), 4);
    assert_eq!(ctx.input, dataset());
}

#[test]
fn cli_options_override_file() {
    let config = parse_simulation_config(CONFIG).expect("config");
    let options = SimulateOptions {
        seed: Some(9),
        batch_size: Some(1),
    };
    let ctx = run_stage2(dataset(), &config, options).expect("stage2");
    assert_eq!(ctx.seed, 9);
    assert_eq!(ctx.batch_size, 1);
}

#[test]
fn defaults_fill_missing_settings() {
    let text = CONFIG.replace("seed = 5\nbatch_size = 3\n", "");
    let config = parse_simulation_config(&text).expect("config");
    let ctx = run_stage2(dataset(), &config, SimulateOptions::default())
        .expect("stage2");
    assert_eq!(ctx.seed, DEFAULT_SEED);
    assert_eq!(ctx.batch_size, DEFAULT_BATCH_SIZE);
}
