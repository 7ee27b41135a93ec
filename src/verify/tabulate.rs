// Trial results -> contingency table for one clause
//
// A probability clause `P[field] == p` over n trials becomes a 2x2 table:
//
//              event        no event
//   observed   e            n - e
//   expected   round(p*n)   n - round(p*n)
//
// The expected row is the count the target probability implies for the
// same number of trials. All-zero columns (p == 0 or p == 1 with a program
// that agrees) are left to the frequency filter.

use crate::decision::{ContingencyTable, DecisionError};
use crate::spec::{FieldExpr, ProbabilityClause};
use crate::trial::{TrialResult, Value};
use crate::verify::CheckError;

pub const OBSERVED: &str = "observed";
pub const EXPECTED: &str = "expected";
pub const EVENT: &str = "event";
pub const NO_EVENT: &str = "no event";

/// Number of trials in which the clause's field is an event
pub fn count_events(clause: &ProbabilityClause, results: &[TrialResult]) -> Result<u64, CheckError> {
    let mut events = 0u64;
    for (trial, result) in results.iter().enumerate() {
        let value = select(&clause.field, &result.outcome, trial, clause.line)?;
        match value.is_event() {
            Some(true) => events += 1,
            Some(false) => {}
            None => {
                return Err(CheckError::NotAnEvent {
                    trial,
                    line: clause.line,
                    value: value.to_string(),
                })
            }
        }
    }
    Ok(events)
}

fn select<'a>(
    field: &FieldExpr,
    outcome: &'a Value,
    trial: usize,
    line: usize,
) -> Result<&'a Value, CheckError> {
    match field {
        FieldExpr::Output => Ok(outcome),
        FieldExpr::OutputElement(index) => {
            outcome
                .element(*index)
                .ok_or_else(|| CheckError::MissingElement {
                    trial,
                    line,
                    index: *index,
                    len: match outcome {
                        Value::List(items) => items.len(),
                        _ => 0,
                    },
                })
        }
    }
}

/// Observed-vs-expected table for a clause over `trials` trials with
/// `events` observed events
pub fn clause_table(target: f64, events: u64, trials: u64) -> Result<ContingencyTable, DecisionError> {
    if !(0.0..=1.0).contains(&target) {
        return Err(DecisionError::InvalidProbability(target));
    }
    let expected_events = (target * trials as f64).round() as u64;
    ContingencyTable::new(
        vec![OBSERVED.to_string(), EXPECTED.to_string()],
        vec![EVENT.to_string(), NO_EVENT.to_string()],
        vec![
            vec![events, trials.saturating_sub(events)],
            vec![expected_events, trials - expected_events],
        ],
    )
}
