use anyhow::Context;
use clap::{Parser, Subcommand};
use compute::{ingest_budget, ingest_election};
use data::{Ballot, BudgetRecord, CountMode};
use read::{open_input, read_ballots, read_budget};
use std::{io::Write, path::PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use write::{budget_report, election_report, write_lines, write_report_file};

mod compute;
mod data;
mod read;
mod write;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Budget change statistics and election vote tallies from CSV files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Month-over-month change statistics of a budget file
    Budget {
        /// CSV with a header line, then `period,amount` rows
        #[arg(default_value = "Resources/budget_data.csv")]
        input: PathBuf,
        /// File receiving a copy of the report
        #[arg(short, long, default_value = "output.txt")]
        output: PathBuf,
    },
    /// Votes and percentages per candidate of an election file
    Election {
        /// CSV with a header line; the candidate is the third column
        #[arg(default_value = "Resources/election_data.csv")]
        input: PathBuf,
        /// Credit a candidate's first ballot twice, like the historical report
        #[arg(long)]
        legacy_count: bool,
    },
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse().command, std::io::stdout().lock())
}

/// Runs one subcommand, printing its report on `stdout`. On failure nothing has
/// been written to `stdout` or to the report file.
fn run<W: Write>(command: Commands, stdout: W) -> Result<(), anyhow::Error> {
    match command {
        Commands::Budget { input, output } => {
            let mut records: Vec<BudgetRecord> = Vec::new();
            read_budget(open_input(&input)?, &mut records)?;
            let analysis = ingest_budget(records)?;
            info!(
                periods = analysis.summary.period_count,
                deltas = analysis.deltas.len(),
                "budget analysed"
            );
            let lines = budget_report(&analysis.summary);
            write_report_file(&output, &lines)?;
            write_lines(stdout, &lines).context("writing to stdout")?;
        }
        Commands::Election {
            input,
            legacy_count,
        } => {
            let mode = if legacy_count {
                CountMode::Legacy
            } else {
                CountMode::Corrected
            };
            let mut ballots: Vec<Ballot> = Vec::new();
            read_ballots(open_input(&input)?, &mut ballots)?;
            let lines = election_report(&ingest_election(ballots, mode)?);
            write_lines(stdout, &lines).context("writing to stdout")?;
        }
    }
    Ok(())
}
