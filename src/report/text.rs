use crate::pipeline::stage3_report::SimulationSummary;

pub fn render_report(summary: &SimulationSummary) -> String {
    let mut out = String::new();
    out.push_str("Immune Implant Report\n");
    out.push_str("=====================\n\n");
    out.push_str("Signals were implanted into copies of the input repertoires. ");
    out.push_str("Input files are left untouched; labels mark which signals each repertoire was assigned.\n\n");

    out.push_str("Dataset overview:\n");
    out.push_str(&format!("- Dataset: {}\n", summary.run.dataset));
    out.push_str(&format!("- Repertoires: {}\n", summary.run.n_repertoires));
    out.push_str(&format!("- Sequences: {}\n", summary.run.n_sequences));
    out.push_str(&format!("- Seed: {}\n\n", summary.run.seed));

    out.push_str("Implanting rules:\n");
    for rule in &summary.rules {
        out.push_str(&format!(
            "- {}: {} repertoires (dataset rate {:.3}, repertoire rate {:.3}), signals {}\n",
            rule.name,
            rule.repertoires,
            rule.dataset_implanting_rate,
            rule.repertoire_implanting_rate,
            rule.signals.join(", ")
        ));
    }
    out.push_str(&format!(
        "- unassigned: {} repertoires\n\n",
        summary.run.unassigned_repertoires
    ));

    out.push_str("Signals:\n");
    for (signal_id, signal) in &summary.signals {
        out.push_str(&format!(
            "- {}: {} repertoires flagged, {} sequences implanted\n",
            signal_id, signal.repertoires_flagged, signal.sequences_implanted
        ));
    }
    out.push('\n');

    out
}
