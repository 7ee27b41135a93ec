//! Verification driver and reporter
//!
//! Ties the pipeline together: parse the specification, run the trials,
//! tabulate each acceptance clause into a contingency table, decide, and
//! aggregate the clause verdicts into a [`VerificationReport`].
//!
//! # Example
//!
//! ```
//! use rand::Rng;
//! use stochcheck::config::CheckConfig;
//! use stochcheck::trial::TrialResult;
//! use stochcheck::verify::check_properties;
//!
//! let spec = "Input real;\nOutput bool;\nACC Probability over runs [ Output ] == 0.5";
//! let config = CheckConfig {
//!     num_trials: 500,
//!     seed: Some(7),
//!     ..CheckConfig::default()
//! };
//!
//! let report = check_properties(
//!     &config,
//!     spec,
//!     |_rng| 0.5,
//!     |_p, _ctx| (),
//!     |input, p| Ok(TrialResult::new(input.rng().gen_bool(*p))),
//! )
//! .unwrap();
//! assert_eq!(report.clauses.len(), 1);
//! assert_eq!(report.clauses[0].trials, 500);
//! ```

mod driver;
mod report;
mod resources;
mod tabulate;

pub use driver::{check_properties, check_specification, unsupported_clauses};
pub use report::{ClauseReport, VerificationReport};
pub use resources::{ResourceSummary, SampleStats};
pub use tabulate::{clause_table, count_events, EVENT, EXPECTED, NO_EVENT, OBSERVED};

use crate::decision::DecisionError;
use crate::spec::SpecError;
use crate::trial::TrialError;
use thiserror::Error;

/// Any failure that stops a verification run
///
/// Every variant names the stage that failed. None of them is a rejected
/// verdict; a rejection is a successful run with `accepted == false`.
#[derive(Error, Debug)]
pub enum CheckError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Spec(#[from] SpecError),

    /// The clause parsed but cannot be evaluated by the decision engine
    #[error("unsupported clause at line {line} (`{clause}`): {reason}")]
    UnsupportedClause {
        line: usize,
        clause: String,
        reason: String,
    },

    /// A hand-built clause that `parse` would have rejected
    #[error("invalid clause at line {line} (`{clause}`): {reason}")]
    InvalidClause {
        line: usize,
        clause: String,
        reason: String,
    },

    #[error("trial run aborted after {num_trials} scheduled trials: {source}")]
    Trial {
        num_trials: usize,
        #[source]
        source: TrialError,
    },

    /// A trial returned an outcome that does not match the declared Output
    #[error("trial {trial} returned {found} `{value}`, but the specification declares Output {expected}")]
    OutcomeType {
        trial: usize,
        expected: String,
        found: String,
        value: String,
    },

    /// `Output[k]` selected an element the trial's list does not have
    #[error("trial {trial} returned a list of {len} elements, clause at line {line} reads Output[{index}]")]
    MissingElement {
        trial: usize,
        line: usize,
        index: usize,
        len: usize,
    },

    /// The selected field is a list or a NaN real
    #[error("trial {trial} returned `{value}` for the clause at line {line}, which is not an event (expected bool, int or a non-NaN real)")]
    NotAnEvent {
        trial: usize,
        line: usize,
        value: String,
    },

    /// The decision engine could not evaluate a clause
    #[error("clause at line {line} (`{clause}`): {source}")]
    Decision {
        line: usize,
        clause: String,
        #[source]
        source: DecisionError,
    },
}

impl CheckError {
    /// Trial index implicated by the failure, if any
    pub fn trial_index(&self) -> Option<usize> {
        match self {
            CheckError::Trial { source, .. } => source.trial_index(),
            CheckError::OutcomeType { trial, .. }
            | CheckError::MissingElement { trial, .. }
            | CheckError::NotAnEvent { trial, .. } => Some(*trial),
            _ => None,
        }
    }

    /// Whether the failure is a degenerate contingency table
    pub fn is_degenerate(&self) -> bool {
        matches!(
            self,
            CheckError::Decision {
                source: DecisionError::DegenerateTable { .. },
                ..
            }
        )
    }
}
