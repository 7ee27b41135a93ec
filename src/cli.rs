//! CLI argument parsing for stochcheck

use crate::config::CheckConfig;
use crate::decision::PowerDivergence;
use crate::programs::{Bernoulli, CommandProgram};
use crate::verify::{check_properties, VerificationReport};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::PathBuf;

/// Output format for the verification report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

/// Program-under-test to check
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProgramKind {
    /// Built-in coin flip with success probability --probability
    Bernoulli,
    /// External command given after --, run once per trial
    Command,
}

#[derive(Parser, Debug)]
#[command(name = "stochcheck")]
#[command(version)]
#[command(about = "Statistical property checking for randomized programs", long_about = None)]
pub struct Cli {
    /// Specification file with Input, Output and ACC statements
    #[arg(short, long, value_name = "FILE")]
    pub spec: PathBuf,

    /// Number of trials (default: 1000)
    #[arg(short = 'n', long = "trials", value_name = "N")]
    pub trials: Option<usize>,

    /// Worker threads (default: all CPUs)
    #[arg(short = 'j', long = "cores", value_name = "N")]
    pub cores: Option<usize>,

    /// Significance level of each clause's test (default: 0.05)
    #[arg(short = 'a', long = "alpha", value_name = "ALPHA")]
    pub alpha: Option<f64>,

    /// Base seed; a fresh seed is drawn and reported when omitted
    #[arg(long = "seed", value_name = "SEED")]
    pub seed: Option<u64>,

    /// Disable Yates' continuity correction for 2x2 tables
    #[arg(long = "no-correction")]
    pub no_correction: bool,

    /// Power-divergence statistic: pearson, log-likelihood, freeman-tukey,
    /// mod-log-likelihood, neyman, cressie-read or a lambda value
    #[arg(long = "divergence", value_name = "NAME|LAMBDA", allow_hyphen_values = true)]
    pub divergence: Option<PowerDivergence>,

    /// TOML configuration file; command-line flags override its values
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Program-under-test
    #[arg(long = "program", value_enum, default_value = "bernoulli")]
    pub program: ProgramKind,

    /// Success probability of the built-in bernoulli program
    #[arg(long = "probability", value_name = "P", default_value = "0.5")]
    pub probability: f64,

    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable debug tracing to stderr
    #[arg(long = "debug")]
    pub debug: bool,

    /// Command to check (everything after --)
    #[arg(last = true)]
    pub command: Option<Vec<String>>,
}

impl Cli {
    /// Configuration file values (or defaults) overridden by flags
    pub fn check_config(&self) -> Result<CheckConfig> {
        let mut config = match &self.config {
            Some(path) => CheckConfig::from_file(path)?,
            None => CheckConfig::default(),
        };

        if let Some(trials) = self.trials {
            config.num_trials = trials;
        }
        if let Some(cores) = self.cores {
            config.cores = Some(cores);
        }
        if let Some(alpha) = self.alpha {
            config.significance_level = alpha;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if self.no_correction {
            config.correction = false;
        }
        if let Some(divergence) = self.divergence {
            config.divergence = divergence;
        }

        Ok(config)
    }
}

/// Check the selected program against the specification file
pub fn run(args: &Cli) -> Result<VerificationReport> {
    let spec_text = fs::read_to_string(&args.spec)
        .with_context(|| format!("Failed to read specification {}", args.spec.display()))?;
    let config = args.check_config()?;

    let report = match (args.program, &args.command) {
        (ProgramKind::Bernoulli, None) => {
            let coin = Bernoulli::new(args.probability)?;
            check_properties(&config, &spec_text, |_| coin, |_, _| (), |input, coin| {
                coin.run(input)
            })?
        }
        (ProgramKind::Command, Some(argv)) => {
            let command = CommandProgram::new(argv.clone())?;
            check_properties(&config, &spec_text, |_| (), |_, _| (), |input, _| {
                command.run(input)
            })?
        }
        (ProgramKind::Bernoulli, Some(_)) => {
            anyhow::bail!("A command was given after --; use --program command to check it.");
        }
        (ProgramKind::Command, None) => {
            anyhow::bail!("--program command needs a command. Usage: stochcheck --spec FILE --program command -- COMMAND [ARGS...]");
        }
    };

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_command() {
        let cli = Cli::parse_from(["stochcheck", "--spec", "coin.spec", "--program", "command", "--", "./sim", "--fast"]);
        assert_eq!(cli.program, ProgramKind::Command);
        let cmd = cli.command.unwrap();
        assert_eq!(cmd[0], "./sim");
        assert_eq!(cmd[1], "--fast");
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["stochcheck", "--spec", "coin.spec"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.program, ProgramKind::Bernoulli);
        assert_eq!(cli.probability, 0.5);
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.debug);

        let config = cli.check_config().unwrap();
        assert_eq!(config, CheckConfig::default());
    }

    #[test]
    fn test_cli_flags_override_config() {
        let cli = Cli::parse_from([
            "stochcheck",
            "--spec",
            "coin.spec",
            "-n",
            "2000",
            "-j",
            "4",
            "--alpha",
            "0.01",
            "--seed",
            "7",
            "--no-correction",
            "--divergence",
            "log-likelihood",
        ]);
        let config = cli.check_config().unwrap();
        assert_eq!(config.num_trials, 2000);
        assert_eq!(config.cores, Some(4));
        assert_eq!(config.significance_level, 0.01);
        assert_eq!(config.seed, Some(7));
        assert!(!config.correction);
        assert_eq!(config.divergence, PowerDivergence::LogLikelihood);
    }

    #[test]
    fn test_cli_negative_lambda() {
        let cli = Cli::parse_from(["stochcheck", "--spec", "s", "--divergence", "-0.5"]);
        assert_eq!(cli.divergence, Some(PowerDivergence::Custom(-0.5)));
    }

    #[test]
    fn test_cli_rejects_unknown_divergence() {
        let result = Cli::try_parse_from(["stochcheck", "--spec", "s", "--divergence", "chebyshev"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_requires_spec() {
        assert!(Cli::try_parse_from(["stochcheck"]).is_err());
    }
}
