//! Specification language for statistical acceptance criteria
//!
//! A specification declares the shape of a program's inputs and output and
//! one or more acceptance clauses over the outcomes of many runs:
//!
//! ```text
//! Input list of real;
//! Output real;
//! ACC Probability over runs [ Output ] == 0.5
//! ```
//!
//! Parsing is pure and total: any input either yields a validated
//! [`Specification`] or a [`SpecError`] pointing at the offending line.
//!
//! # Example
//!
//! ```
//! use stochcheck::spec::{parse, Clause};
//!
//! let spec = parse("Input real;\nOutput int;\nACC Probability over runs [ Output ] == 0.5").unwrap();
//! assert_eq!(spec.inputs.len(), 1);
//! let Clause::ProbabilityOverRuns(clause) = &spec.clauses[0];
//! assert_eq!(clause.target, 0.5);
//! ```

mod ast;
mod lexer;
mod parser;

pub use ast::{Clause, CmpOp, FieldExpr, ProbabilityClause, Specification, ValueType};
pub use parser::{parse, MAX_LIST_DEPTH};

use std::fmt;
use thiserror::Error;

/// Where in the specification text an error was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// 1-based line, 0 when the error concerns the specification as a whole
    pub line: usize,
    /// 1-based column, 0 when unknown
    pub column: usize,
    /// The offending source line
    pub text: String,
}

impl Location {
    fn new(source: &str, line: usize, column: usize) -> Self {
        let text = if line == 0 {
            String::new()
        } else {
            source
                .lines()
                .nth(line - 1)
                .map(|l| l.trim().to_string())
                .unwrap_or_default()
        };
        Self { line, column, text }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (0, _) => write!(f, "end of specification"),
            (line, 0) => write!(f, "line {} (`{}`)", line, self.text),
            (line, column) => write!(f, "line {}, column {} (`{}`)", line, column, self.text),
        }
    }
}

/// Errors produced while parsing a specification
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpecError {
    /// Malformed grammar: unknown token, missing terminator, unexpected end
    #[error("spec syntax error at {at}: {message}")]
    Syntax { at: Location, message: String },

    /// Well-formed but meaningless: wrong statement counts, unknown
    /// aggregator/scope/field, target out of range
    #[error("spec semantic error at {at}: {message}")]
    Semantic { at: Location, message: String },
}

impl SpecError {
    pub(crate) fn syntax(source: &str, line: usize, column: usize, message: impl Into<String>) -> Self {
        SpecError::Syntax {
            at: Location::new(source, line, column),
            message: message.into(),
        }
    }

    pub(crate) fn semantic(source: &str, line: usize, column: usize, message: impl Into<String>) -> Self {
        SpecError::Semantic {
            at: Location::new(source, line, column),
            message: message.into(),
        }
    }

    /// Location the error points at
    pub fn location(&self) -> &Location {
        match self {
            SpecError::Syntax { at, .. } | SpecError::Semantic { at, .. } => at,
        }
    }
}

#[cfg(test)]
mod tests;
