//! CSV rendering of outage history

use crate::records::{format_instant, Outage};

pub const CSV_HEADER: &str = "ID,System Name,Impact Level,Start Time,ETA,Description,Teams Bridge URL";

/// Render outages as CSV, one row per outage, header first
pub fn outages_csv(outages: &[Outage]) -> String {
    let mut csv = String::from(CSV_HEADER);
    csv.push('\n');
    for outage in outages {
        let row = [
            outage.id.clone(),
            quoted(&outage.system_name),
            outage.impact_level.as_str().to_string(),
            outage.start_time.as_ref().map(format_instant).unwrap_or_default(),
            outage.eta.as_ref().map(format_instant).unwrap_or_default(),
            quoted(&outage.description),
            outage.teams_bridge_url.clone().unwrap_or_default(),
        ];
        csv.push_str(&row.join(","));
        csv.push('\n');
    }
    csv
}

fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
