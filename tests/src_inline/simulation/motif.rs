use super::*;
use crate::simulation::instantiation::{GapRange, GappedKmerInstantiation};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

fn gapped(min_gap: usize, max_gap: usize) -> Arc<dyn MotifInstantiation> {
    Arc::new(GappedKmerInstantiation::new(GapRange::new(min_gap, max_gap)))
}

#[test]
fn seed_parse_splits_on_gap_marker() {
    let seed = MotifSeed::parse("m1", "ab/c").expect("parse");
    assert_eq!(seed.residues(), &['A', 'B', 'C']);
    assert_eq!(seed.gap_after(), Some(2));
    assert_eq!(seed.render(&['X', 'Y', 'Z']), "XY/Z");
}

#[test]
fn seed_parse_rejects_malformed_seeds() {
    for raw in ["", "/AB", "AB/", "A/B/C", "A1B"] {
        assert!(MotifSeed::parse("m1", raw).is_err(), "seed {raw:?} accepted");
    }
}

#[test]
fn instance_span_includes_gap() {
    let instance = MotifInstance::new("AB/C", 2);
    assert_eq!(instance.left(), "AB");
    assert_eq!(instance.right(), "C");
    assert_eq!(instance.span(), 5);
    assert_eq!(instance.to_string(), "AB/C[gap=2]");

    let plain = MotifInstance::new("ABC", 0);
    assert_eq!(plain.right(), "");
    assert_eq!(plain.span(), 3);
    assert_eq!(plain.to_string(), "ABC");
}

#[test]
fn motif_max_length_adds_max_gap() {
    let motif = Motif::new("m1", "AA/C", gapped(0, 2)).expect("motif");
    assert_eq!(motif.max_length(), 5);
}

#[test]
fn one_residue_seed_with_gap_range_is_rejected() {
    let err = Motif::new("m1", "A", gapped(0, 1)).unwrap_err();
    let MotifError::InvalidMotifConfiguration { motif_id, reason } = err;
    assert_eq!(motif_id, "m1");
    assert!(reason.contains("no room for a gap"), "{reason}");
}

#[test]
fn gapped_instances_stay_within_range() {
    let motif = Motif::new("m1", "AA/C", gapped(1, 3)).expect("motif");
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
    for _ in 0..100 {
        let instance = motif.instantiate(&mut rng).expect("instance");
        assert_eq!(instance.instance, "AA/C");
        assert!((1..=3).contains(&instance.gap));
    }
}
