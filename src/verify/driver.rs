// Verification driver
//
// parse -> reject unsupported clauses -> run trials -> type-check outcomes
//       -> tabulate per clause -> decide -> aggregate
//
// Everything that can be rejected without running the program is rejected
// before the first trial.

use crate::config::CheckConfig;
use crate::decision::decide;
use crate::spec::{parse, Clause, CmpOp, Specification};
use crate::trial::{TrialContext, TrialInput, TrialResult, TrialRunner};
use crate::verify::report::{ClauseReport, VerificationReport};
use crate::verify::resources::ResourceSummary;
use crate::verify::tabulate::{clause_table, count_events};
use crate::verify::CheckError;
use rand::rngs::StdRng;
use rand::Rng;

/// Check a program-under-test against a specification
///
/// Parses `spec_text`, then runs `config.num_trials` trials on up to
/// `config.cores` workers and decides every acceptance clause at
/// `config.significance_level`. The run is accepted iff every clause is.
///
/// # Errors
///
/// - [`CheckError::InvalidConfig`], [`CheckError::Spec`] and
///   [`CheckError::UnsupportedClause`] before any trial runs
/// - [`CheckError::Trial`] when a trial fails or panics (no verdict)
/// - [`CheckError::OutcomeType`] / [`CheckError::MissingElement`] when an
///   outcome does not fit the declared Output
/// - [`CheckError::Decision`] when a clause's table is degenerate
pub fn check_properties<C, A, I, G, P>(
    config: &CheckConfig,
    spec_text: &str,
    input_config_gen: I,
    per_trial_args_gen: G,
    program: P,
) -> Result<VerificationReport, CheckError>
where
    C: Sync,
    I: FnOnce(&mut StdRng) -> C,
    G: Fn(&C, &mut TrialContext) -> A + Sync,
    P: Fn(&mut TrialInput<A>, &C) -> anyhow::Result<TrialResult> + Sync,
{
    config.validate().map_err(CheckError::InvalidConfig)?;
    let spec = parse(spec_text)?;
    check_specification(config, &spec, input_config_gen, per_trial_args_gen, program)
}

/// [`check_properties`] for an already parsed specification
pub fn check_specification<C, A, I, G, P>(
    config: &CheckConfig,
    spec: &Specification,
    input_config_gen: I,
    per_trial_args_gen: G,
    program: P,
) -> Result<VerificationReport, CheckError>
where
    C: Sync,
    I: FnOnce(&mut StdRng) -> C,
    G: Fn(&C, &mut TrialContext) -> A + Sync,
    P: Fn(&mut TrialInput<A>, &C) -> anyhow::Result<TrialResult> + Sync,
{
    config.validate().map_err(CheckError::InvalidConfig)?;
    invalid_clauses(spec)?;
    unsupported_clauses(spec)?;

    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let runner = TrialRunner::new(config.num_trials, config.cores, seed);
    tracing::info!(
        clauses = spec.clauses.len(),
        num_trials = config.num_trials,
        workers = runner.workers(),
        seed,
        "verifying specification"
    );

    let batch = runner
        .run(input_config_gen, per_trial_args_gen, program)
        .map_err(|source| CheckError::Trial {
            num_trials: config.num_trials,
            source,
        })?;

    if let Some((trial, result)) = batch
        .results
        .iter()
        .enumerate()
        .find(|(_, r)| !r.outcome.conforms_to(&spec.output))
    {
        return Err(CheckError::OutcomeType {
            trial,
            expected: spec.output.to_string(),
            found: result.outcome.type_name(),
            value: result.outcome.to_string(),
        });
    }

    let trials = batch.len() as u64;
    let mut clauses = Vec::with_capacity(spec.clauses.len());
    for clause in &spec.clauses {
        let Clause::ProbabilityOverRuns(probability) = clause;
        let decision_error = |source| CheckError::Decision {
            line: clause.line(),
            clause: clause.to_string(),
            source,
        };

        let events = count_events(probability, &batch.results)?;
        let table = clause_table(probability.target, events, trials).map_err(decision_error)?;
        let verdict = decide(
            &table,
            config.significance_level,
            config.correction,
            Some(config.divergence),
        )
        .map_err(decision_error)?;

        tracing::debug!(
            line = clause.line(),
            events,
            trials,
            p_value = verdict.p_value,
            accepted = verdict.accepted,
            "clause decided"
        );

        clauses.push(ClauseReport {
            clause: clause.to_string(),
            line: clause.line(),
            target: probability.target,
            events,
            trials,
            observed_probability: if trials == 0 {
                0.0
            } else {
                events as f64 / trials as f64
            },
            table,
            verdict,
        });
    }

    let accepted = clauses.iter().all(|c| c.verdict.accepted);
    tracing::info!(accepted, "verification complete");

    Ok(VerificationReport {
        accepted,
        clauses,
        num_trials: config.num_trials,
        cores: batch.workers,
        seed,
        significance_level: config.significance_level,
        trial_time_secs: batch.elapsed.as_secs_f64(),
        resources: ResourceSummary::from_results(&batch.results),
    })
}

/// Re-check what `parse` guarantees, for specifications built by hand
///
/// Every field must resolve to a scalar of the declared Output and every
/// target must lie in [0, 1].
fn invalid_clauses(spec: &Specification) -> Result<(), CheckError> {
    for clause in &spec.clauses {
        let Clause::ProbabilityOverRuns(probability) = clause;
        let reason = match probability.field.resolved_type(&spec.output) {
            None => Some(format!(
                "field `{}` does not resolve against output type `{}`",
                probability.field, spec.output
            )),
            Some(_) if !(0.0..=1.0).contains(&probability.target) => Some(format!(
                "probability target {} is outside [0, 1]",
                probability.target
            )),
            Some(_) => None,
        };
        if let Some(reason) = reason {
            return Err(CheckError::InvalidClause {
                line: clause.line(),
                clause: clause.to_string(),
                reason,
            });
        }
    }
    Ok(())
}

/// Reject the first clause the decision engine cannot evaluate
///
/// Only equality against a target probability has a contingency
/// formulation.
pub fn unsupported_clauses(spec: &Specification) -> Result<(), CheckError> {
    for clause in &spec.clauses {
        let Clause::ProbabilityOverRuns(probability) = clause;
        if probability.op != CmpOp::Eq {
            return Err(CheckError::UnsupportedClause {
                line: clause.line(),
                clause: clause.to_string(),
                reason: format!("unsupported operator `{}`", probability.op),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::DecisionError;
    use crate::spec::{FieldExpr, ProbabilityClause, ValueType};
    use crate::trial::{TrialError, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const COIN: &str = "Input real;\nOutput int;\nACC Probability over runs [ Output ] == 0.5";

    fn config(num_trials: usize, seed: u64) -> CheckConfig {
        CheckConfig {
            num_trials,
            seed: Some(seed),
            cores: Some(2),
            ..CheckConfig::default()
        }
    }

    fn coin(input: &mut TrialInput<()>, p: &f64) -> anyhow::Result<TrialResult> {
        Ok(TrialResult::new(input.rng().gen_bool(*p) as i64))
    }

    #[test]
    fn test_fair_coin_accepted() {
        let report = check_properties(&config(2000, 11), COIN, |_| 0.5, |_, _| (), coin).unwrap();
        assert!(report.accepted);
        assert_eq!(report.seed, 11);
        assert_eq!(report.clauses[0].trials, 2000);
        assert_eq!(report.clauses[0].table.rows()[1], vec![1000, 1000]);
    }

    #[test]
    fn test_biased_coin_rejected() {
        let report = check_properties(&config(2000, 11), COIN, |_| 0.9, |_, _| (), coin).unwrap();
        assert!(!report.accepted);
        assert!(report.clauses[0].observed_probability > 0.85);
    }

    #[test]
    fn test_unsupported_operator_runs_no_trials() {
        let spec = "Input real;\nOutput int;\nACC Probability over runs [ Output ] < 0.5";
        let calls = AtomicUsize::new(0);
        let err = check_properties(&config(100, 1), spec, |_| 0.5, |_, _| (), |input, p| {
            calls.fetch_add(1, Ordering::SeqCst);
            coin(input, p)
        })
        .unwrap_err();
        assert!(matches!(err, CheckError::UnsupportedClause { line: 3, .. }));
        assert!(err.to_string().contains("unsupported operator `<`"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_spec_error_runs_no_trials() {
        let calls = AtomicUsize::new(0);
        let err = check_properties(&config(100, 1), "Output int;", |_| (), |_, _| (), |_, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(TrialResult::new(true))
        })
        .unwrap_err();
        assert!(matches!(err, CheckError::Spec(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invalid_config() {
        let mut cfg = config(100, 1);
        cfg.significance_level = 0.0;
        let err = check_properties(&cfg, COIN, |_| 0.5, |_, _| (), coin).unwrap_err();
        assert!(matches!(err, CheckError::InvalidConfig(_)));
    }

    #[test]
    fn test_trial_failure_carries_index() {
        let err = check_properties(&config(50, 3), COIN, |_| (), |_, _| (), |input: &mut TrialInput<()>, _| {
            if input.index() == 17 {
                anyhow::bail!("simulator fault");
            }
            Ok(TrialResult::new(1i64))
        })
        .unwrap_err();
        assert_eq!(err.trial_index(), Some(17));
        assert!(matches!(
            err,
            CheckError::Trial {
                num_trials: 50,
                source: TrialError::Execution { index: 17, .. }
            }
        ));
    }

    #[test]
    fn test_outcome_type_mismatch() {
        let err = check_properties(&config(10, 3), COIN, |_| (), |_, _| (), |input: &mut TrialInput<()>, _| {
            if input.index() == 6 {
                return Ok(TrialResult::new(0.5));
            }
            Ok(TrialResult::new(1i64))
        })
        .unwrap_err();
        match err {
            CheckError::OutcomeType {
                trial,
                ref expected,
                ref found,
                ..
            } => {
                assert_eq!(trial, 6);
                assert_eq!(expected, "int");
                assert_eq!(found, "real");
            }
            other => panic!("Expected OutcomeType, got {:?}", other),
        }
    }

    #[test]
    fn test_single_category_is_degenerate() {
        let spec = "Input real;\nOutput bool;\nACC Probability over runs [ Output ] == 0.0";
        let err = check_properties(&config(200, 3), spec, |_| (), |_, _| (), |_: &mut TrialInput<()>, _| {
            Ok(TrialResult::new(false))
        })
        .unwrap_err();
        assert!(err.is_degenerate());
        match err {
            CheckError::Decision {
                line,
                source: DecisionError::DegenerateTable { rows, cols, original_cols, .. },
                ..
            } => {
                assert_eq!(line, 3);
                assert_eq!((rows, cols, original_cols), (2, 1, 2));
            }
            other => panic!("Expected DegenerateTable, got {:?}", other),
        }
    }

    #[test]
    fn test_list_output_clauses() {
        let spec = "Input real;\nOutput list of int;\n\
                    ACC Probability over runs [ Output[0] ] == 0.5\n\
                    ACC Probability over runs [ Output[1] ] == 0.9";
        let report = check_properties(&config(2000, 5), spec, |_| (), |_, _| (), |input: &mut TrialInput<()>, _| {
            let a = input.rng().gen_bool(0.5) as i64;
            let b = input.rng().gen_bool(0.5) as i64;
            Ok(TrialResult::new(Value::List(vec![Value::Int(a), Value::Int(b)])))
        })
        .unwrap();
        assert_eq!(report.clauses.len(), 2);
        assert!(report.clauses[0].verdict.accepted);
        assert!(!report.clauses[1].verdict.accepted);
        assert!(!report.accepted);
    }

    #[test]
    fn test_drawn_seed_reproduces() {
        let mut cfg = config(300, 0);
        cfg.seed = None;
        let first = check_properties(&cfg, COIN, |_| 0.5, |_, _| (), coin).unwrap();
        cfg.seed = Some(first.seed);
        let second = check_properties(&cfg, COIN, |_| 0.5, |_, _| (), coin).unwrap();
        assert_eq!(first.clauses[0].events, second.clauses[0].events);
    }

    fn hand_built(output: ValueType, field: FieldExpr, target: f64) -> Specification {
        Specification {
            inputs: vec![ValueType::Real],
            output,
            clauses: vec![Clause::ProbabilityOverRuns(ProbabilityClause {
                field,
                op: CmpOp::Eq,
                target,
                line: 3,
            })],
        }
    }

    #[test]
    fn test_hand_built_clauses_checked_before_trials() {
        let list_of_int = ValueType::List(Box::new(ValueType::Int));
        let cases = [
            (hand_built(list_of_int.clone(), FieldExpr::Output, 0.5), "does not resolve"),
            (hand_built(list_of_int, FieldExpr::OutputElement(0), 1.5), "outside [0, 1]"),
            (hand_built(ValueType::Int, FieldExpr::OutputElement(0), 0.5), "does not resolve"),
        ];

        for (spec, reason) in cases {
            let calls = AtomicUsize::new(0);
            let err = check_specification(&config(200, 1), &spec, |_| (), |_, _| (), |_: &mut TrialInput<()>, _| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(TrialResult::new(Value::List(vec![Value::Int(1)])))
            })
            .unwrap_err();
            match &err {
                CheckError::InvalidClause { line: 3, reason: r, .. } => assert!(r.contains(reason), "{}", r),
                other => panic!("Expected InvalidClause, got {:?}", other),
            }
            assert_eq!(calls.load(Ordering::SeqCst), 0);
        }
    }

    #[test]
    fn test_nan_outcome_stops_the_run() {
        let spec = "Input real;\nOutput real;\nACC Probability over runs [ Output ] == 0.5";
        let err = check_properties(&config(100, 4), spec, |_| (), |_, _| (), |input: &mut TrialInput<()>, _| {
            let value = if input.index() == 60 { f64::NAN } else { 1.0 };
            Ok(TrialResult::new(value))
        })
        .unwrap_err();
        assert!(matches!(err, CheckError::NotAnEvent { trial: 60, line: 3, .. }), "{:?}", err);
    }
}
