use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;

/// Print a report as one JSON object on stdout.
pub fn emit<T: Serialize>(report: &T, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(report)
    } else {
        serde_json::to_string(report)
    }
    .context("Failed to serialize command output")?;
    println!("{rendered}");
    Ok(())
}

/// The object printed when a command cannot produce its report.
pub fn error_report(err: &anyhow::Error) -> serde_json::Value {
    json!({
        "result": "error",
        "reason": format!("{err:#}"),
    })
}
