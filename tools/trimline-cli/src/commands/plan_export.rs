//! Show the trim job an export would submit.

use serde::Serialize;

use trimline_timeline_model::export::{export_filename, TrimOptions};
use trimline_timeline_model::frames::is_trim_active;
use trimline_timeline_model::trim::TrimRange;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportPlan {
    source_id: String,
    trim_active: bool,
    /// Absent when the source is downloaded as-is.
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<TrimOptions>,
    filename: String,
}

pub fn run(
    fps: f64,
    total: u64,
    start: u64,
    end: Option<u64>,
    source_id: String,
) -> anyhow::Result<()> {
    let end = end.unwrap_or(total);
    let range = TrimRange::validated(start, end, total, 1)
        .map_err(|e| anyhow::anyhow!("Invalid trim range: {e}"))?;

    let trim_active = is_trim_active(&range, total);
    let options = trim_active.then(|| TrimOptions::from_range(&range, fps));
    let plan = ExportPlan {
        filename: export_filename(&source_id, options.as_ref()),
        source_id,
        trim_active,
        options,
    };

    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
