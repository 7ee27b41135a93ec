//! Built-in programs-under-test for the command-line driver
//!
//! - [`Bernoulli`]: coin flip with a fixed success probability, useful for
//!   calibrating a specification
//! - [`CommandProgram`]: runs an external command once per trial and reads
//!   its result record from stdout as JSON

use crate::trial::{TrialInput, TrialResult, Value};
use anyhow::{Context, Result};
use rand::Rng;
use serde::Deserialize;
use std::process::Command;
use std::time::{Duration, Instant};

/// Environment variable carrying the trial index
pub const TRIAL_ENV: &str = "STOCHCHECK_TRIAL";
/// Environment variable carrying the trial's seed
pub const SEED_ENV: &str = "STOCHCHECK_SEED";

/// Coin flip returning `int` 1 with probability `probability`, else 0
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bernoulli {
    probability: f64,
}

impl Bernoulli {
    pub fn new(probability: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&probability) {
            anyhow::bail!("probability must be in [0, 1], got {}", probability);
        }
        Ok(Self { probability })
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn run(&self, input: &mut TrialInput<()>) -> Result<TrialResult> {
        let start = Instant::now();
        let outcome = input.rng().gen_bool(self.probability) as i64;
        Ok(TrialResult::new(outcome).with_time(start.elapsed()))
    }
}

/// External command run once per trial
///
/// The command receives the trial index and seed in `STOCHCHECK_TRIAL` and
/// `STOCHCHECK_SEED`. Its last non-empty line of stdout must be JSON:
/// either a bare outcome (`1`, `true`, `[0, 1]`) or an object
/// `{"outcome": ..., "time": <seconds>, "space": <units>}` where `acc` is
/// accepted for `outcome` and `time`/`space` are optional. A missing `time`
/// is replaced by the measured wall time of the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandProgram {
    program: String,
    args: Vec<String>,
}

impl CommandProgram {
    pub fn new(argv: Vec<String>) -> Result<Self> {
        let mut argv = argv.into_iter();
        let program = argv
            .next()
            .context("command program needs a command (pass it after --)")?;
        Ok(Self {
            program,
            args: argv.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn run<A>(&self, input: &mut TrialInput<A>) -> Result<TrialResult> {
        let start = Instant::now();
        let output = Command::new(&self.program)
            .args(&self.args)
            .env(TRIAL_ENV, input.index().to_string())
            .env(SEED_ENV, input.seed().to_string())
            .output()
            .with_context(|| format!("Failed to execute {}", self.program))?;
        let measured = start.elapsed();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_trial_output(&stdout, measured)
            .with_context(|| format!("Invalid result from {}", self.program))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CommandOutput {
    Record(OutputRecord),
    Bare(Value),
}

#[derive(Deserialize)]
struct OutputRecord {
    #[serde(alias = "acc")]
    outcome: Value,
    time: Option<f64>,
    space: Option<u64>,
}

/// Parse the JSON result record printed by an external program
pub fn parse_trial_output(stdout: &str, measured: Duration) -> Result<TrialResult> {
    let line = stdout
        .lines()
        .map(str::trim)
        .rfind(|l| !l.is_empty())
        .context("no output")?;

    let parsed: CommandOutput =
        serde_json::from_str(line).with_context(|| format!("not a JSON result record: `{}`", line))?;

    match parsed {
        CommandOutput::Bare(outcome) => Ok(TrialResult::new(outcome).with_time(measured)),
        CommandOutput::Record(record) => {
            let time = match record.time {
                Some(secs) => Duration::try_from_secs_f64(secs)
                    .with_context(|| format!("invalid time {}", secs))?,
                None => measured,
            };
            Ok(TrialResult::new(record.outcome)
                .with_time(time)
                .with_space(record.space.unwrap_or(0)))
        }
    }
}
