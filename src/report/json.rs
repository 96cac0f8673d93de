use crate::report::RunSummary;

pub fn render_summary_json(summary: &RunSummary) -> serde_json::Result<String> {
    let mut out = serde_json::to_string_pretty(summary)?;
    out.push('\n');
    Ok(out)
}
