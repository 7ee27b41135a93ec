// Verification report: per-clause verdicts and the overall decision

use crate::decision::{ContingencyTable, Verdict};
use crate::verify::ResourceSummary;
use serde::Serialize;

/// Verdict and tallies for one acceptance clause
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClauseReport {
    /// Clause as written, e.g. `ACC Probability over runs [ Output ] == 0.5`
    pub clause: String,
    pub line: usize,
    pub target: f64,
    /// Trials in which the selected field was an event
    pub events: u64,
    pub trials: u64,
    pub observed_probability: f64,
    /// Observed-vs-expected table handed to the decision engine
    pub table: ContingencyTable,
    pub verdict: Verdict,
}

/// Outcome of a complete verification run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationReport {
    /// True iff every clause was accepted
    pub accepted: bool,
    pub clauses: Vec<ClauseReport>,
    pub num_trials: usize,
    /// Worker threads actually used
    pub cores: usize,
    /// Base seed; rerunning with it reproduces every trial
    pub seed: u64,
    pub significance_level: f64,
    /// Wall-clock time of the trial phase
    pub trial_time_secs: f64,
    pub resources: ResourceSummary,
}

impl VerificationReport {
    /// Clauses that were rejected
    pub fn rejected_clauses(&self) -> impl Iterator<Item = &ClauseReport> {
        self.clauses.iter().filter(|c| !c.verdict.accepted)
    }

    /// Generate human-readable report
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();

        if self.accepted {
            report.push_str("✅ ACCEPTED\n\n");
        } else {
            let rejected = self.rejected_clauses().count();
            report.push_str(&format!(
                "❌ REJECTED ({} of {} clauses)\n\n",
                rejected,
                self.clauses.len()
            ));
        }

        report.push_str(&format!(
            "Trials: {} on {} core(s), seed {}\n",
            self.num_trials, self.cores, self.seed
        ));
        report.push_str(&format!(
            "Significance level: {} ({:.0}% confidence)\n",
            self.significance_level,
            (1.0 - self.significance_level) * 100.0
        ));

        report.push_str("\n📊 Acceptance clauses:\n");
        for clause in &self.clauses {
            let mark = if clause.verdict.accepted { "✅" } else { "❌" };
            report.push_str(&format!("  {} line {}: {}\n", mark, clause.line, clause.clause));
            report.push_str(&format!(
                "     observed {}/{} = {:.4} (target {})\n",
                clause.events, clause.trials, clause.observed_probability, clause.target
            ));
            report.push_str(&format!("     {}\n", clause.verdict.summary()));
            if !clause.verdict.detail.removed_categories.is_empty() {
                report.push_str(&format!(
                    "     removed all-zero categories: {}\n",
                    clause.verdict.detail.removed_categories.join(", ")
                ));
            }
        }

        let time = &self.resources.time_secs;
        let space = &self.resources.space;
        report.push_str("\n⏱  Resources per trial:\n");
        report.push_str(&format!(
            "  time (s): mean={:.6} stddev={:.6} min={:.6} median={:.6} max={:.6}\n",
            time.mean, time.stddev, time.min, time.median, time.max
        ));
        report.push_str(&format!(
            "  space:    mean={:.1} stddev={:.1} min={:.1} median={:.1} max={:.1}\n",
            space.mean, space.stddev, space.min, space.median, space.max
        ));
        report.push_str(&format!("  trial phase: {:.3}s\n", self.trial_time_secs));

        report
    }
}
