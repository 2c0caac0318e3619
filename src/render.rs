//! Terminal rendering of run results.

use std::path::Path;

use eventcal_core::pipeline::RunSummary;
use owo_colors::OwoColorize;

pub fn summary(summary: &RunSummary) -> String {
    let pages = format!(
        "{} page{} ({})",
        summary.pages_fetched,
        if summary.pages_fetched == 1 { "" } else { "s" },
        summary.stop
    );

    let added = if summary.added > 0 {
        format!("+{} new", summary.added).green().to_string()
    } else {
        "no new events".dimmed().to_string()
    };

    let mut line = format!(
        "Harvested {} events from {}: {}",
        summary.harvested.bold(),
        pages,
        added
    );

    if summary.updated > 0 {
        line.push_str(&format!(", {}", format!("~{} updated", summary.updated).yellow()));
    }

    line.push_str(&format!(" {}", format!("({} stored)", summary.total).dimmed()));
    line
}

pub fn calendar_written(path: &Path, count: usize) -> String {
    format!("Wrote {} events to {}", count.bold(), path.display())
}
