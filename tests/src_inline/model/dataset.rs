use super::*;
use crate::model::repertoire::RepertoireMetadata;
use crate::model::sequence::ReceptorSequence;

fn repertoire(id: &str) -> Repertoire {
    Repertoire::new(
        id,
        vec![ReceptorSequence::new("1", "CASSLG")],
        RepertoireMetadata::default(),
    )
}

#[test]
fn rebuild_keeps_name_and_order() {
    let dataset = RepertoireDataset::new("d", vec![repertoire("r1"), repertoire("r2")]);
    let rebuilt = dataset
        .rebuild(vec![repertoire("r1"), repertoire("r2")])
        .expect("rebuild");
    assert_eq!(rebuilt.name, "d");
    assert_eq!(rebuilt.example_ids(), vec!["r1", "r2"]);
}

#[test]
fn rebuild_rejects_count_mismatch() {
    let dataset = RepertoireDataset::new("d", vec![repertoire("r1"), repertoire("r2")]);
    let err = dataset.rebuild(vec![repertoire("r1")]).unwrap_err();
    assert!(matches!(
        err,
        DatasetError::CountMismatch {
            expected: 2,
            found: 1
        }
    ));
}

#[test]
fn rebuild_rejects_reordered_repertoires() {
    let dataset = RepertoireDataset::new("d", vec![repertoire("r1"), repertoire("r2")]);
    let err = dataset
        .rebuild(vec![repertoire("r2"), repertoire("r1")])
        .unwrap_err();
    match err {
        DatasetError::IdentifierMismatch { index, .. } => assert_eq!(index, 0),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn labels_use_signal_prefix() {
    let labelled = repertoire("r1").with_labels([("s1", true), ("s2", false)]);
    assert_eq!(labelled.metadata.labels.get("signal_s1"), Some(&true));
    assert_eq!(labelled.metadata.signal_flag("s2"), Some(false));
    assert_eq!(labelled.metadata.signal_flag("s3"), None);
}
