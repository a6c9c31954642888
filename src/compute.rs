use crate::{
    data::{
        Ballot, BudgetAnalysis, BudgetRecord, BudgetSummary, CountMode, DeltaRecord,
        ElectionResult, Error, VotePercentage, VoteTally, ROUNDING_DIGITS,
    },
    read::RecordUser,
};
use rust_decimal::Decimal;
use tracing::debug;

/// Running state of the budget pass. Deltas are computed as soon as each record
/// arrives, the summary only once everything has been seen.
#[derive(Debug, Default)]
pub(crate) struct BudgetAggregator {
    previous: Option<Decimal>,
    total_amount: Decimal,
    period_count: usize,
    deltas: Vec<DeltaRecord>,
}

impl BudgetAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> Result<BudgetAnalysis, Error> {
        if self.period_count == 0 {
            return Err(Error::EmptyInput);
        }
        // `reduce` keeps its accumulator on ties, so the earliest period wins.
        let max_delta = self
            .deltas
            .iter()
            .reduce(|best, d| if d.delta > best.delta { d } else { best })
            .ok_or(Error::InsufficientData)?
            .clone();
        let min_delta = self
            .deltas
            .iter()
            .reduce(|best, d| if d.delta < best.delta { d } else { best })
            .ok_or(Error::InsufficientData)?
            .clone();
        let sum = self.deltas.iter().try_fold(Decimal::ZERO, |sum, d| {
            sum.checked_add(d.delta)
                .ok_or_else(|| Error::Overflow(d.period.clone()))
        })?;
        let average_delta =
            (sum / Decimal::from(self.deltas.len())).round_dp(ROUNDING_DIGITS);
        debug!(
            periods = self.period_count,
            total = %self.total_amount,
            average = %average_delta,
            "budget aggregated"
        );
        Ok(BudgetAnalysis {
            summary: BudgetSummary {
                total_amount: self.total_amount,
                period_count: self.period_count,
                average_delta,
                max_delta,
                min_delta,
            },
            deltas: self.deltas,
        })
    }
}

impl RecordUser<BudgetRecord> for BudgetAggregator {
    fn use_record(&mut self, record: BudgetRecord) -> Result<(), Error> {
        let overflow = || Error::Overflow(record.period.clone());
        let delta = match self.previous {
            Some(previous) => Some(
                record
                    .amount
                    .checked_sub(previous)
                    .ok_or_else(overflow)?,
            ),
            None => None,
        };
        self.total_amount = self
            .total_amount
            .checked_add(record.amount)
            .ok_or_else(overflow)?;
        if let Some(delta) = delta {
            self.deltas.push(DeltaRecord {
                period: record.period,
                delta,
            });
        }
        self.period_count += 1;
        self.previous = Some(record.amount);
        Ok(())
    }
}

pub(crate) fn ingest_budget<I: IntoIterator<Item = BudgetRecord>>(
    records: I,
) -> Result<BudgetAnalysis, Error> {
    let mut aggregator = BudgetAggregator::new();
    for record in records {
        aggregator.use_record(record)?;
    }
    aggregator.finish()
}

/// Running state of the election pass.
#[derive(Debug, Default)]
pub(crate) struct VoteCounter {
    mode: CountMode,
    tally: VoteTally,
    total_ballots: u64,
}

impl VoteCounter {
    pub fn new(mode: CountMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn finish(self) -> Result<ElectionResult, Error> {
        if self.total_ballots == 0 {
            return Err(Error::EmptyInput);
        }
        let total = Decimal::from(self.total_ballots);
        let percentages = VotePercentage(
            self.tally
                .iter()
                .map(|(candidate, votes)| {
                    let pct = Decimal::from(votes) * Decimal::ONE_HUNDRED / total;
                    (candidate.to_owned(), pct.round_dp(ROUNDING_DIGITS))
                })
                .collect(),
        );
        debug!(
            ballots = self.total_ballots,
            credited = self.tally.total(),
            mode = ?self.mode,
            "election aggregated"
        );
        Ok(ElectionResult {
            tally: self.tally,
            percentages,
            total_ballots: self.total_ballots,
        })
    }
}

impl RecordUser<Ballot> for VoteCounter {
    fn use_record(&mut self, ballot: Ballot) -> Result<(), Error> {
        self.tally.credit(&ballot.candidate, self.mode.seed());
        self.total_ballots += 1;
        Ok(())
    }
}

pub(crate) fn ingest_election<I: IntoIterator<Item = Ballot>>(
    ballots: I,
    mode: CountMode,
) -> Result<ElectionResult, Error> {
    let mut counter = VoteCounter::new(mode);
    for ballot in ballots {
        counter.use_record(ballot)?;
    }
    counter.finish()
}
