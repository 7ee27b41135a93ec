//! Trial orchestration
//!
//! Runs a program-under-test over many independently generated trials on a
//! bounded worker pool. Each trial receives an explicit, seeded random
//! context instead of touching global state, so a seeded run produces the
//! same results whatever the number of workers.
//!
//! # Example
//!
//! ```
//! use rand::Rng;
//! use stochcheck::trial::{TrialResult, TrialRunner};
//!
//! let runner = TrialRunner::new(100, Some(2), 42);
//! let batch = runner
//!     .run(
//!         |_rng| 0.5,                 // trial config: success probability
//!         |_config, _ctx| (),         // no per-trial arguments
//!         |input, p| Ok(TrialResult::new(input.rng().gen_bool(*p))),
//!     )
//!     .unwrap();
//! assert_eq!(batch.len(), 100);
//! ```

mod context;
mod record;
mod runner;

pub use context::{run_rng, trial_seed, TrialContext, TrialInput};
pub use record::{TrialResult, Value};
pub use runner::{TrialBatch, TrialRunner};

use thiserror::Error;

/// Fatal failures of a trial run
#[derive(Error, Debug)]
pub enum TrialError {
    /// The program-under-test (or its argument generator) returned an error
    #[error("trial {index} failed: {source}")]
    Execution {
        index: usize,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The program-under-test (or its argument generator) panicked
    #[error("trial {index} panicked: {message}")]
    Panicked { index: usize, message: String },

    #[error("worker pool failure: {0}")]
    WorkerPool(String),
}

impl TrialError {
    /// Index of the trial that failed, if the failure belongs to one
    pub fn trial_index(&self) -> Option<usize> {
        match self {
            TrialError::Execution { index, .. } | TrialError::Panicked { index, .. } => {
                Some(*index)
            }
            TrialError::WorkerPool(_) => None,
        }
    }
}
