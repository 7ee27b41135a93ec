// Typed representation of a parsed specification
//
// Every variant here has already been validated by the parser: field
// expressions are resolved against the declared output type, aggregators
// and scopes are known, and probability targets lie in [0, 1].

use serde::Serialize;
use std::fmt;

/// Type descriptor for an input or output value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Real,
    Int,
    Bool,
    List(Box<ValueType>),
}

impl ValueType {
    /// True for `real`, `int` and `bool`
    pub fn is_scalar(&self) -> bool {
        !matches!(self, ValueType::List(_))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Real => write!(f, "real"),
            ValueType::Int => write!(f, "int"),
            ValueType::Bool => write!(f, "bool"),
            ValueType::List(inner) => write!(f, "list of {}", inner),
        }
    }
}

/// Comparison operator of an acceptance clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl CmpOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Gt => ">",
            CmpOp::Le => "<=",
            CmpOp::Ge => ">=",
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Component of a trial result selected by a clause
///
/// Resolved against the declared output type at parse time, so a clause can
/// never reach into a field the result record does not have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldExpr {
    /// The whole (scalar) outcome value
    Output,
    /// Element `k` of a `list` outcome
    OutputElement(usize),
}

impl FieldExpr {
    /// Type of the selected component under the given output type
    pub fn resolved_type<'a>(&self, output: &'a ValueType) -> Option<&'a ValueType> {
        match (self, output) {
            (FieldExpr::Output, ty) if ty.is_scalar() => Some(ty),
            (FieldExpr::OutputElement(_), ValueType::List(inner)) if inner.is_scalar() => {
                Some(inner)
            }
            _ => None,
        }
    }
}

impl fmt::Display for FieldExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldExpr::Output => write!(f, "Output"),
            FieldExpr::OutputElement(k) => write!(f, "Output[{}]", k),
        }
    }
}

/// `ACC Probability over runs [ field ] op target`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityClause {
    pub field: FieldExpr,
    pub op: CmpOp,
    pub target: f64,
    /// 1-based line the clause starts on
    pub line: usize,
}

/// An acceptance clause
///
/// One variant per aggregator/scope pair the language knows about.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Clause {
    ProbabilityOverRuns(ProbabilityClause),
}

impl Clause {
    pub fn line(&self) -> usize {
        match self {
            Clause::ProbabilityOverRuns(c) => c.line,
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::ProbabilityOverRuns(c) => write!(
                f,
                "ACC Probability over runs [ {} ] {} {}",
                c.field, c.op, c.target
            ),
        }
    }
}

/// A validated specification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Specification {
    pub inputs: Vec<ValueType>,
    pub output: ValueType,
    pub clauses: Vec<Clause>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_type_display() {
        let ty = ValueType::List(Box::new(ValueType::Real));
        assert_eq!(ty.to_string(), "list of real");
        assert!(!ty.is_scalar());
        assert!(ValueType::Bool.is_scalar());
    }

    #[test]
    fn test_field_resolution() {
        let list = ValueType::List(Box::new(ValueType::Int));
        assert_eq!(FieldExpr::Output.resolved_type(&ValueType::Real), Some(&ValueType::Real));
        assert_eq!(FieldExpr::Output.resolved_type(&list), None);
        assert_eq!(FieldExpr::OutputElement(2).resolved_type(&list), Some(&ValueType::Int));
        assert_eq!(FieldExpr::OutputElement(0).resolved_type(&ValueType::Bool), None);
    }

    #[test]
    fn test_clause_display() {
        let clause = Clause::ProbabilityOverRuns(ProbabilityClause {
            field: FieldExpr::Output,
            op: CmpOp::Eq,
            target: 0.5,
            line: 4,
        });
        assert_eq!(clause.to_string(), "ACC Probability over runs [ Output ] == 0.5");
        assert_eq!(clause.line(), 4);
    }
}
