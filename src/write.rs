use crate::data::{BudgetSummary, ElectionResult, Error};
use rust_decimal::Decimal;
use std::{fs::File, io::Write, path::Path};
use tracing::info;

/// Renders a decimal the way the historical reports printed their numbers: no
/// trailing zeros, but always at least one fractional digit (`340.0`, `33.33`).
pub(crate) fn render(value: Decimal) -> String {
    // `normalize` also turns -0 into 0
    let value = value.normalize();
    if value.scale() == 0 {
        format!("{value}.0")
    } else {
        value.to_string()
    }
}

pub(crate) fn budget_report(summary: &BudgetSummary) -> Vec<String> {
    vec![
        "Financial Analysis".to_owned(),
        format!("Total months: {}", summary.period_count),
        format!("Total: {}", render(summary.total_amount)),
        format!("Average: ${}", render(summary.average_delta)),
        format!(
            "Greatest Increase in Profits: {},Greatest Month: {}",
            render(summary.max_delta.delta),
            summary.max_delta.period
        ),
        format!(
            "Greatest Decrease in Profits: {},Worst Month: {}",
            render(summary.min_delta.delta),
            summary.min_delta.period
        ),
    ]
}

/// One line per candidate in first-seen order, then the ballot count alone.
pub(crate) fn election_report(result: &ElectionResult) -> Vec<String> {
    result
        .tally
        .iter()
        .zip(result.percentages.0.iter())
        .map(|((candidate, votes), (_, pct))| {
            format!("{candidate}: {}% ({votes})", render(*pct))
        })
        .chain(std::iter::once(result.total_ballots.to_string()))
        .collect()
}

pub(crate) fn write_lines<W: Write>(mut writer: W, lines: &[String]) -> std::io::Result<()> {
    for line in lines {
        writeln!(writer, "{line}")?;
    }
    writer.flush()
}

/// Writes `lines` to a freshly truncated file at `path`. The file is closed on
/// return whether or not the write went through.
pub(crate) fn write_report_file(path: &Path, lines: &[String]) -> Result<(), Error> {
    let output_error = |e: std::io::Error| Error::Output {
        path: path.display().to_string(),
        reason: e.to_string(),
    };
    let file = File::create(path).map_err(output_error)?;
    write_lines(std::io::BufWriter::new(file), lines).map_err(output_error)?;
    info!(path = %path.display(), lines = lines.len(), "report written");
    Ok(())
}
