use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

/// Line number in the input file, 1-based, the header being line 1.
pub type Line = u64;

pub const ROUNDING_DIGITS: u32 = 2;

/// Column of the candidate identifier in an election row.
pub const CANDIDATE_COLUMN: usize = 2;

/// One row of the budget file. Decoded by position, the header names are ignored
/// (historical files call the columns `Date` and `Profit/Losses`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct BudgetRecord {
    pub period: String,
    pub amount: Decimal,
}

/// Change between a period and the one before it; `period` is the label of the
/// later period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DeltaRecord {
    pub period: String,
    pub delta: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BudgetSummary {
    pub total_amount: Decimal,
    pub period_count: usize,
    /// Already rounded to `ROUNDING_DIGITS`.
    pub average_delta: Decimal,
    pub max_delta: DeltaRecord,
    pub min_delta: DeltaRecord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BudgetAnalysis {
    pub deltas: Vec<DeltaRecord>,
    pub summary: BudgetSummary,
}

/// A single ballot; only the candidate matters for counting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Ballot {
    pub candidate: String,
}

/// How a candidate is seeded the first time it shows up.
///
/// `Legacy` reproduces the historical report, which credited a candidate twice
/// for its first ballot. Its counts no longer add up to the number of ballots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum CountMode {
    #[default]
    Corrected,
    Legacy,
}

impl CountMode {
    pub fn seed(self) -> u64 {
        match self {
            CountMode::Corrected => 0,
            CountMode::Legacy => 1,
        }
    }
}

/// Votes per candidate, keeping candidates in the order they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct VoteTally {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl VoteTally {
    /// Credits one vote to `candidate`, inserting it with `seed` votes first if unseen.
    pub fn credit(&mut self, candidate: &str, seed: u64) {
        let slot = match self.index.get(candidate) {
            Some(&slot) => slot,
            None => {
                self.entries.push((candidate.to_owned(), seed));
                self.index.insert(candidate.to_owned(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        self.entries[slot].1 += 1;
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(c, n)| (c.as_str(), *n))
    }

    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, n)| n).sum()
    }
}

/// Share of the ballots per candidate, in percent, same order as the `VoteTally`
/// it was derived from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct VotePercentage(pub Vec<(String, Decimal)>);

impl VotePercentage {
    #[cfg(test)]
    pub fn get(&self, candidate: &str) -> Option<Decimal> {
        self.0
            .iter()
            .find(|(c, _)| c == candidate)
            .map(|(_, pct)| *pct)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ElectionResult {
    pub tally: VoteTally,
    pub percentages: VotePercentage,
    pub total_ballots: u64,
}

/// Everything that can stop a run. None of these are recoverable: the tool is a
/// one-shot batch and prints nothing when it fails.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Cannot read input file {path}: {reason}")]
    FileNotFound { path: String, reason: String },
    #[error("Input became unreadable: {0}")]
    Unreadable(String),
    #[error("Malformed row at line {line}: {reason}")]
    MalformedRow { line: Line, reason: String },
    #[error("Input has no data rows")]
    EmptyInput,
    #[error("Input needs at least two data rows to compute changes")]
    InsufficientData,
    #[error("Amounts out of range at period {0}")]
    Overflow(String),
    #[error("Cannot write output file {path}: {reason}")]
    Output { path: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::{CountMode, VoteTally};

    #[test]
    fn tally_keeps_first_seen_order() {
        let mut tally = VoteTally::default();
        for c in ["Khan", "Correy", "Khan", "Li", "O'Tooley", "Li"] {
            tally.credit(c, CountMode::Corrected.seed());
        }
        assert_eq!(
            tally.iter().collect::<Vec<_>>(),
            [("Khan", 2), ("Correy", 1), ("Li", 2), ("O'Tooley", 1)]
        );
        assert_eq!(tally.total(), 6);
    }

    #[test]
    fn legacy_seed_double_credits_first_ballot() {
        let mut tally = VoteTally::default();
        tally.credit("Khan", CountMode::Legacy.seed());
        assert_eq!(tally.iter().collect::<Vec<_>>(), [("Khan", 2)]);
        tally.credit("Khan", CountMode::Legacy.seed());
        tally.credit("Li", CountMode::Legacy.seed());
        assert_eq!(tally.iter().collect::<Vec<_>>(), [("Khan", 3), ("Li", 2)]);
    }
}
