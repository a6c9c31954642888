use crate::data::{Ballot, BudgetRecord, Error, Line, CANDIDATE_COLUMN};
use std::{fs::File, path::Path};
use tracing::{debug, trace};

/// Trait for doing something with a record read from a CSV file. The aggregators
/// implement it so they can run in the same forward pass as the read; tests use a
/// plain `Vec` to check what comes out of a CSV stream.
pub(crate) trait RecordUser<T> {
    fn use_record(&mut self, record: T) -> Result<(), Error>;
}

impl<T> RecordUser<T> for Vec<T> {
    fn use_record(&mut self, record: T) -> Result<(), Error> {
        self.push(record);
        Ok(())
    }
}

pub(crate) fn open_input(path: &Path) -> Result<File, Error> {
    File::open(path).map_err(|e| Error::FileNotFound {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Every field is trimmed, candidate names included: `" Khan"` and `"Khan"` count
/// as the same candidate.
fn csv_reader<R: std::io::Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader)
}

/// Maps a reader failure; anything with a position is the row's fault, the rest
/// is the file going away under us.
fn read_error(err: csv::Error) -> Error {
    match err.position() {
        Some(pos) => Error::MalformedRow {
            line: pos.line(),
            reason: err.to_string(),
        },
        None => Error::Unreadable(err.to_string()),
    }
}

fn line_of(record: &csv::StringRecord) -> Line {
    record.position().map(|p| p.line()).unwrap_or_default()
}

/// CSV importer for `BudgetRecord`s; the header line is skipped.
pub(crate) fn read_budget<R: std::io::Read, U: RecordUser<BudgetRecord>>(
    reader: R,
    user: &mut U,
) -> Result<(), Error> {
    let mut rdr = csv_reader(reader);
    let mut rows = 0usize;
    for result in rdr.records() {
        let record = result.map_err(read_error)?;
        let line = line_of(&record);
        let budget: BudgetRecord =
            record
                .deserialize(None)
                .map_err(|e| Error::MalformedRow {
                    line,
                    reason: match e.kind() {
                        csv::ErrorKind::Deserialize { err, .. } => err.to_string(),
                        _ => e.to_string(),
                    },
                })?;
        trace!(line, period = %budget.period, amount = %budget.amount, "budget row");
        user.use_record(budget)?;
        rows += 1;
    }
    debug!(rows, "budget file read");
    Ok(())
}

/// CSV importer for `Ballot`s. Only the candidate column is looked at, so rows
/// may carry any number of fields past it.
pub(crate) fn read_ballots<R: std::io::Read, U: RecordUser<Ballot>>(
    reader: R,
    user: &mut U,
) -> Result<(), Error> {
    let mut rdr = csv_reader(reader);
    let mut rows = 0usize;
    for result in rdr.records() {
        let record = result.map_err(read_error)?;
        let candidate = record
            .get(CANDIDATE_COLUMN)
            .ok_or_else(|| Error::MalformedRow {
                line: line_of(&record),
                reason: format!(
                    "expected at least {} fields, found {}",
                    CANDIDATE_COLUMN + 1,
                    record.len()
                ),
            })?;
        user.use_record(Ballot {
            candidate: candidate.to_owned(),
        })?;
        rows += 1;
    }
    debug!(rows, "election file read");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{
        data::{Ballot, BudgetRecord, Error},
        read::{open_input, read_ballots, read_budget},
    };
    use rust_decimal_macros::dec;

    #[test]
    fn read_budget_rows() {
        let mut storage: Vec<BudgetRecord> = Vec::new();
        let budget_csv = b"\
Date,     Profit/Losses
Jan-2010, 867884
Feb-2010, 984655
Mar-2010, -322.50
";
        read_budget(&budget_csv[..], &mut storage).unwrap();
        assert_eq!(
            storage,
            [
                BudgetRecord {
                    period: "Jan-2010".into(),
                    amount: dec!(867884)
                },
                BudgetRecord {
                    period: "Feb-2010".into(),
                    amount: dec!(984655)
                },
                BudgetRecord {
                    period: "Mar-2010".into(),
                    amount: dec!(-322.50)
                },
            ]
        )
    }

    #[test]
    fn header_only_yields_nothing() {
        let mut storage: Vec<BudgetRecord> = Vec::new();
        read_budget(&b"Date,Profit/Losses\n"[..], &mut storage).unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn non_numeric_amount_names_the_line() {
        let mut storage: Vec<BudgetRecord> = Vec::new();
        let budget_csv = b"\
Date,Profit/Losses
Jan-2010,100
Feb-2010,lots
";
        let err = read_budget(&budget_csv[..], &mut storage).unwrap_err();
        assert!(matches!(err, Error::MalformedRow { line: 3, .. }), "{err:?}");
    }

    #[test]
    fn missing_amount_is_malformed() {
        let mut storage: Vec<BudgetRecord> = Vec::new();
        let budget_csv = b"\
Date,Profit/Losses
Jan-2010
";
        let err = read_budget(&budget_csv[..], &mut storage).unwrap_err();
        assert!(matches!(err, Error::MalformedRow { line: 2, .. }), "{err:?}");
    }

    #[test]
    fn read_ballot_rows() {
        let mut storage: Vec<Ballot> = Vec::new();
        let election_csv = b"\
Ballot ID,County,Candidate
1323913,Jefferson,Charles Casper Stockham
1005842,Jefferson,Diana DeGette,District 1
1880345,Arapahoe,Raymon Anthony Doane
";
        read_ballots(&election_csv[..], &mut storage).unwrap();
        let candidates: Vec<_> = storage.iter().map(|b| b.candidate.as_str()).collect();
        assert_eq!(
            candidates,
            [
                "Charles Casper Stockham",
                "Diana DeGette",
                "Raymon Anthony Doane"
            ]
        );
    }

    #[test]
    fn candidate_names_are_trimmed() {
        let mut storage: Vec<Ballot> = Vec::new();
        let election_csv = b"Ballot ID,County,Candidate\n1,Marsh, Khan\n2,Marsh,Khan  \n";
        read_ballots(&election_csv[..], &mut storage).unwrap();
        assert_eq!(storage[0], storage[1]);
        assert_eq!(storage[0].candidate, "Khan");
    }

    #[test]
    fn short_ballot_row_is_malformed() {
        let mut storage: Vec<Ballot> = Vec::new();
        let election_csv = b"\
Ballot ID,County,Candidate
1323913,Jefferson,Charles Casper Stockham
1005842,Jefferson
";
        let err = read_ballots(&election_csv[..], &mut storage).unwrap_err();
        assert_eq!(
            err,
            Error::MalformedRow {
                line: 3,
                reason: "expected at least 3 fields, found 2".into()
            }
        );
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_input(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }), "{err:?}");
    }
}
