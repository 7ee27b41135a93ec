// Bounded worker pool for independent trials
//
// ┌──────────────┐  job queue (trial indices)  ┌──────────┐
// │  dispatcher  │ ─────────────────────────▶ │ worker 0 │──┐
// │              │                             │ worker 1 │──┤ results
// │              │ ◀─────────────────────────  │   ...    │──┘ (index, result)
// └──────────────┘   reduce after pool drains  └──────────┘
//
// Trials share nothing but the immutable trial config. The first failure
// raises a cancellation flag; workers stop taking new jobs and the run
// reports the failure without any partial results.

use crate::trial::context::{run_rng, TrialContext, TrialInput};
use crate::trial::record::TrialResult;
use crate::trial::TrialError;
use crossbeam::channel;
use rand::rngs::StdRng;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Results of a completed run, ordered by trial index
#[derive(Debug, Clone)]
pub struct TrialBatch {
    pub results: Vec<TrialResult>,
    /// Wall-clock time for the whole run
    pub elapsed: Duration,
    /// Number of workers actually used
    pub workers: usize,
}

impl TrialBatch {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Drives repeated execution of a program-under-test
#[derive(Debug, Clone)]
pub struct TrialRunner {
    num_trials: usize,
    workers: usize,
    seed: u64,
}

impl TrialRunner {
    /// `cores = None` uses every available CPU. The pool never has more
    /// workers than trials.
    pub fn new(num_trials: usize, cores: Option<usize>, seed: u64) -> Self {
        let requested = cores.unwrap_or_else(num_cpus::get).max(1);
        Self {
            num_trials,
            workers: requested.min(num_trials.max(1)),
            seed,
        }
    }

    pub fn num_trials(&self) -> usize {
        self.num_trials
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run every trial
    ///
    /// `input_config_gen` is called exactly once. For each trial index,
    /// `per_trial_args_gen` builds the extra arguments from the trial
    /// config and the trial's private context, then `program` runs on the
    /// resulting [`TrialInput`].
    ///
    /// # Errors
    ///
    /// Fails fast with the failing trial's index if `program` (or the
    /// argument generator) returns an error or panics. When several trials
    /// fail before cancellation takes effect, the lowest index is reported.
    pub fn run<C, A, I, G, P>(
        &self,
        input_config_gen: I,
        per_trial_args_gen: G,
        program: P,
    ) -> Result<TrialBatch, TrialError>
    where
        C: Sync,
        I: FnOnce(&mut StdRng) -> C,
        G: Fn(&C, &mut TrialContext) -> A + Sync,
        P: Fn(&mut TrialInput<A>, &C) -> anyhow::Result<TrialResult> + Sync,
    {
        let start = Instant::now();
        let config = input_config_gen(&mut run_rng(self.seed));

        tracing::info!(
            num_trials = self.num_trials,
            workers = self.workers,
            seed = self.seed,
            "starting trials"
        );

        let (job_tx, job_rx) = channel::unbounded::<usize>();
        for index in 0..self.num_trials {
            job_tx
                .send(index)
                .map_err(|e| TrialError::WorkerPool(e.to_string()))?;
        }
        drop(job_tx);

        let (result_tx, result_rx) = channel::unbounded::<(usize, Result<TrialResult, TrialError>)>();
        let cancelled = AtomicBool::new(false);
        let seed = self.seed;

        crossbeam::thread::scope(|scope| {
            for _ in 0..self.workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let cancelled = &cancelled;
                let config = &config;
                let per_trial_args_gen = &per_trial_args_gen;
                let program = &program;

                scope.spawn(move |_| {
                    for index in job_rx.iter() {
                        if cancelled.load(Ordering::Acquire) {
                            break;
                        }
                        let outcome = run_trial(seed, index, config, per_trial_args_gen, program);
                        if outcome.is_err() {
                            cancelled.store(true, Ordering::Release);
                        }
                        if result_tx.send((index, outcome)).is_err() {
                            break;
                        }
                    }
                });
            }
        })
        .map_err(|_| TrialError::WorkerPool("a worker thread panicked".to_string()))?;
        drop(result_tx);

        let mut slots: Vec<Option<TrialResult>> = (0..self.num_trials).map(|_| None).collect();
        let mut failure: Option<(usize, TrialError)> = None;

        for (index, outcome) in result_rx.iter() {
            match outcome {
                Ok(result) => slots[index] = Some(result),
                Err(err) => {
                    let earlier = match &failure {
                        Some((failed_index, _)) => index < *failed_index,
                        None => true,
                    };
                    if earlier {
                        failure = Some((index, err));
                    }
                }
            }
        }

        if let Some((index, err)) = failure {
            tracing::warn!(trial = index, "trial failed, run aborted: {}", err);
            return Err(err);
        }

        let results = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| TrialError::WorkerPool(format!("trial {} produced no result", index)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let elapsed = start.elapsed();
        tracing::debug!(
            trials = results.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "trials complete"
        );

        Ok(TrialBatch {
            results,
            elapsed,
            workers: self.workers,
        })
    }
}

fn run_trial<C, A, G, P>(
    seed: u64,
    index: usize,
    config: &C,
    per_trial_args_gen: &G,
    program: &P,
) -> Result<TrialResult, TrialError>
where
    G: Fn(&C, &mut TrialContext) -> A,
    P: Fn(&mut TrialInput<A>, &C) -> anyhow::Result<TrialResult>,
{
    let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut context = TrialContext::new(seed, index);
        let args = per_trial_args_gen(config, &mut context);
        let mut input = TrialInput::new(context, args);
        program(&mut input, config)
    }));

    match attempt {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(source)) => Err(TrialError::Execution {
            index,
            source: source.into(),
        }),
        Err(payload) => Err(TrialError::Panicked {
            index,
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
