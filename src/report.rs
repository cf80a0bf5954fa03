#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! The per-file results report and the terminal summary.

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Panel, Style, Width, object::Rows},
};

use crate::{grade::GradingBatch, util};

/// Column separator of the report.
const SEPARATOR: char = ',';

/// Header row of the report.
const HEADER: [&str; 3] = ["File", "Score", "Feedback"];

/// One report line: the outcome for one extracted file.
#[derive(Tabled, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ReportRow {
    /// Original file name inside the archive.
    #[tabled(rename = "File")]
    pub file:     String,
    /// Score recorded for the file.
    #[tabled(rename = "Score")]
    pub score:    u32,
    /// Feedback joined into one string.
    #[tabled(rename = "Feedback")]
    pub feedback: String,
}

/// Renders `rows` as CSV text with a header line.
pub fn render_csv(rows: &[ReportRow]) -> String {
    let mut out = String::new();
    push_row(&mut out, &HEADER.map(String::from));
    for row in rows {
        push_row(
            &mut out,
            &[row.file.clone(), row.score.to_string(), row.feedback.clone()],
        );
    }
    out
}

/// Writes the report to `path`, replacing any earlier report.
pub fn write_report(path: &Path, rows: &[ReportRow]) -> Result<()> {
    util::write_replacing(path, render_csv(rows).as_bytes())?;
    tracing::info!("Report written to {}", path.display());
    Ok(())
}

/// Appends one CSV line to `out`.
fn push_row(out: &mut String, cells: &[String]) {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push(SEPARATOR);
        }
        if needs_quotes(cell) {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}

/// Whether `field` must be quoted to survive a round trip.
fn needs_quotes(field: &str) -> bool {
    field.contains(SEPARATOR) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Terminal table of the batch in hand-off order.
pub fn summary_table(batch: &GradingBatch, assignment: &str) -> String {
    let late = batch.late().len();
    Table::new(batch.records())
        .with(Panel::header(format!("Grading results: {assignment}")))
        .with(Panel::footer(format!(
            "{} submissions, {late} late",
            batch.records().len()
        )))
        .with(Modify::new(Rows::new(1..)).with(Width::wrap(48).keep_words(true)))
        .with(
            Modify::new(Rows::first())
                .with(Alignment::center())
                .with(Alignment::center_vertical()),
        )
        .with(
            Modify::new(Rows::last())
                .with(Alignment::center())
                .with(Alignment::center_vertical()),
        )
        .with(Style::modern())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_with_separators_are_quoted() {
        let rows = vec![ReportRow {
            file:     "amy_dungeon.html".into(),
            score:    35,
            feedback: "Missing image; said \"hi\", twice".into(),
        }];
        assert_eq!(
            render_csv(&rows),
            "File,Score,Feedback\namy_dungeon.html,35,\"Missing image; said \"\"hi\"\", twice\"\n"
        );
    }
}
