use crate::pipeline::stage3_report::SimulationSummary;

pub type Summary = SimulationSummary;

pub fn write_summary(out_dir: &std::path::Path, summary: &Summary) -> Result<(), serde_json::Error> {
    let json = serde_json::to_string_pretty(summary)?;
    let path = out_dir.join("summary.json");
    std::fs::write(path, json).map_err(serde_json::Error::io)
}
