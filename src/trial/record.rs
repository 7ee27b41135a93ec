// Per-trial result records
//
// The program-under-test returns one `TrialResult` per trial: the outcome
// value plus the resources it consumed. Outcome values are dynamically
// typed here and checked against the specification's Output descriptor by
// the verification driver.

use crate::spec::ValueType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// An outcome value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Real(f64),
    List(Vec<Value>),
}

impl Value {
    /// Whether this value has the declared type
    ///
    /// An `int` also conforms to a declared `real`.
    pub fn conforms_to(&self, ty: &ValueType) -> bool {
        match (self, ty) {
            (Value::Bool(_), ValueType::Bool) => true,
            (Value::Int(_), ValueType::Int | ValueType::Real) => true,
            (Value::Real(_), ValueType::Real) => true,
            (Value::List(items), ValueType::List(inner)) => {
                items.iter().all(|item| item.conforms_to(inner))
            }
            _ => false,
        }
    }

    /// Short description of the runtime type, e.g. `list of int`
    pub fn type_name(&self) -> String {
        match self {
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Real(_) => "real".to_string(),
            Value::List(items) => match items.first() {
                Some(first) => format!("list of {}", first.type_name()),
                None => "empty list".to_string(),
            },
        }
    }

    /// Event indicator of a scalar: `true`, non-zero int, non-zero real
    ///
    /// Returns `None` for lists and for a NaN real, which is neither an
    /// event nor a non-event.
    pub fn is_event(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::Int(i) => Some(*i != 0),
            Value::Real(r) if r.is_nan() => None,
            Value::Real(r) => Some(*r != 0.0),
            Value::List(_) => None,
        }
    }

    /// Element `k` of a list value
    pub fn element(&self, k: usize) -> Option<&Value> {
        match self {
            Value::List(items) => items.get(k),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}

/// Record produced by one execution of the program-under-test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialResult {
    /// Correctness indicator or measured value
    pub outcome: Value,
    /// Elapsed time reported by (or measured around) the program
    pub time: Duration,
    /// Memory or other resource usage, in program-defined units
    pub space: u64,
}

impl TrialResult {
    /// Result with zero time and space
    pub fn new(outcome: impl Into<Value>) -> Self {
        Self {
            outcome: outcome.into(),
            time: Duration::ZERO,
            space: 0,
        }
    }

    pub fn with_time(mut self, time: Duration) -> Self {
        self.time = time;
        self
    }

    pub fn with_space(mut self, space: u64) -> Self {
        self.space = space;
        self
    }
}
