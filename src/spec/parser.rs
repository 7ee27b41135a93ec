// Recursive-descent parser for the specification grammar
//
//   spec       := stmt+
//   stmt       := "Input" typelist ";" | "Output" type ";" | accclause
//   typelist   := type ("," type)*
//   type       := "real" | "int" | "bool" | "list" ["of"] type
//   accclause  := "ACC" aggregator "over" scope "[" fieldexpr "]" cmpop number [";"]
//   fieldexpr  := "Output" ["[" index "]"] | "time" | "space"

use crate::spec::ast::{Clause, CmpOp, FieldExpr, ProbabilityClause, Specification, ValueType};
use crate::spec::lexer::{tokenize, Token, TokenKind};
use crate::spec::SpecError;

/// Deepest `list of list of ...` nesting accepted in a type descriptor
pub const MAX_LIST_DEPTH: usize = 32;

/// Parse specification text into a validated [`Specification`]
///
/// Fails with [`SpecError::Syntax`] on malformed grammar and
/// [`SpecError::Semantic`] when statement counts are wrong, an unknown
/// aggregator/scope is used, a probability target lies outside [0, 1], or
/// a field expression does not resolve against the declared output type.
pub fn parse(text: &str) -> Result<Specification, SpecError> {
    let tokens = tokenize(text)?;
    Parser::new(text, tokens).parse_spec()
}

/// A clause whose field still needs resolving against the output type
struct PendingClause {
    field: RawField,
    op: CmpOp,
    target: f64,
    line: usize,
    target_column: usize,
}

struct RawField {
    name: String,
    index: Option<usize>,
    line: usize,
    column: usize,
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
        }
    }

    fn parse_spec(mut self) -> Result<Specification, SpecError> {
        let mut inputs: Option<(Vec<ValueType>, usize)> = None;
        let mut output: Option<(ValueType, usize)> = None;
        let mut pending = Vec::new();

        if self.tokens.is_empty() {
            return Err(SpecError::syntax(self.source, 0, 0, "empty specification"));
        }

        while let Some(token) = self.next() {
            let keyword = match &token.kind {
                TokenKind::Ident(name) => name.clone(),
                other => {
                    return Err(self.syntax_at(
                        &token,
                        format!(
                            "expected `Input`, `Output` or `ACC`, found {}",
                            other.describe()
                        ),
                    ))
                }
            };

            match keyword.as_str() {
                "Input" => {
                    if let Some((_, first_line)) = inputs {
                        return Err(self.semantic_at(
                            &token,
                            format!("duplicate Input declaration (first on line {})", first_line),
                        ));
                    }
                    let types = self.parse_typelist()?;
                    self.expect_semicolon("Input declaration")?;
                    inputs = Some((types, token.line));
                }
                "Output" => {
                    if let Some((_, first_line)) = output {
                        return Err(self.semantic_at(
                            &token,
                            format!(
                                "exactly one Output declaration allowed (first on line {})",
                                first_line
                            ),
                        ));
                    }
                    let ty = self.parse_type()?;
                    if matches!(self.peek_kind(), Some(TokenKind::Comma)) {
                        let comma = self.tokens[self.pos].clone();
                        return Err(self.semantic_at(&comma, "Output declares exactly one type"));
                    }
                    self.expect_semicolon("Output declaration")?;
                    output = Some((ty, token.line));
                }
                "ACC" => {
                    let clause = self.parse_clause(&token)?;
                    if matches!(self.peek_kind(), Some(TokenKind::Semicolon)) {
                        self.pos += 1;
                    }
                    pending.push(clause);
                }
                _ => {
                    return Err(self.syntax_at(
                        &token,
                        format!("expected `Input`, `Output` or `ACC`, found `{}`", keyword),
                    ))
                }
            }
        }

        let Some((inputs, _)) = inputs else {
            return Err(SpecError::semantic(
                self.source,
                0,
                0,
                "specification declares no Input (at least one input type required)",
            ));
        };
        let Some((output, _)) = output else {
            return Err(SpecError::semantic(
                self.source,
                0,
                0,
                "specification declares no Output (exactly one output type required)",
            ));
        };
        if pending.is_empty() {
            return Err(SpecError::semantic(
                self.source,
                0,
                0,
                "specification declares no acceptance clause (at least one ACC required)",
            ));
        }

        let clauses = pending
            .into_iter()
            .map(|p| self.resolve_clause(p, &output))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Specification {
            inputs,
            output,
            clauses,
        })
    }

    fn parse_typelist(&mut self) -> Result<Vec<ValueType>, SpecError> {
        let mut types = vec![self.parse_type()?];
        while matches!(self.peek_kind(), Some(TokenKind::Comma)) {
            self.pos += 1;
            types.push(self.parse_type()?);
        }
        Ok(types)
    }

    fn parse_type(&mut self) -> Result<ValueType, SpecError> {
        let mut depth = 0usize;
        loop {
            let token = self.expect_any("a type (`real`, `int`, `bool` or `list`)")?;
            let base = match &token.kind {
                TokenKind::Ident(name) => match name.as_str() {
                    "real" => ValueType::Real,
                    "int" => ValueType::Int,
                    "bool" => ValueType::Bool,
                    "list" => {
                        depth += 1;
                        if depth > MAX_LIST_DEPTH {
                            return Err(self.semantic_at(
                                &token,
                                format!("list nesting deeper than {}", MAX_LIST_DEPTH),
                            ));
                        }
                        if matches!(self.peek_kind(), Some(TokenKind::Ident(n)) if n == "of") {
                            self.pos += 1;
                        }
                        continue;
                    }
                    other => return Err(self.syntax_at(&token, format!("unknown type `{}`", other))),
                },
                other => {
                    return Err(self.syntax_at(
                        &token,
                        format!("expected a type, found {}", other.describe()),
                    ))
                }
            };
            return Ok((0..depth).fold(base, |inner, _| ValueType::List(Box::new(inner))));
        }
    }

    fn parse_clause(&mut self, acc: &Token) -> Result<PendingClause, SpecError> {
        let aggregator = self.expect_ident("an aggregator after `ACC`")?;
        if aggregator.0 != "Probability" {
            return Err(self.semantic_at(
                &aggregator.1,
                format!("unknown aggregator `{}` (supported: Probability)", aggregator.0),
            ));
        }

        let over = self.expect_ident("`over`")?;
        if over.0 != "over" {
            return Err(self.syntax_at(&over.1, format!("expected `over`, found `{}`", over.0)));
        }

        let scope = self.expect_ident("a scope after `over`")?;
        if scope.0 != "runs" {
            return Err(self.semantic_at(
                &scope.1,
                format!("unknown scope `{}` (supported: runs)", scope.0),
            ));
        }

        self.expect_kind(&TokenKind::LBracket, "`[` before the field expression")?;
        let field = self.parse_field()?;
        self.expect_kind(&TokenKind::RBracket, "`]` after the field expression")?;

        let op_token = self.expect_any("a comparison operator")?;
        let op = match op_token.kind {
            TokenKind::Op(op) => op,
            ref other => {
                return Err(self.syntax_at(
                    &op_token,
                    format!("expected a comparison operator, found {}", other.describe()),
                ))
            }
        };

        let target_token = self.expect_any("a numeric target")?;
        let target = match target_token.kind {
            TokenKind::Number(n) => n,
            ref other => {
                return Err(self.syntax_at(
                    &target_token,
                    format!("expected a numeric target, found {}", other.describe()),
                ))
            }
        };

        Ok(PendingClause {
            field,
            op,
            target,
            line: acc.line,
            target_column: target_token.column,
        })
    }

    fn parse_field(&mut self) -> Result<RawField, SpecError> {
        let (name, token) = self.expect_ident("a field expression")?;
        let mut index = None;

        if matches!(self.peek_kind(), Some(TokenKind::LBracket)) {
            self.pos += 1;
            let idx_token = self.expect_any("an element index")?;
            let idx = match idx_token.kind {
                TokenKind::Number(n) if n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64 => {
                    n as usize
                }
                ref other => {
                    return Err(self.syntax_at(
                        &idx_token,
                        format!("expected a non-negative integer index, found {}", other.describe()),
                    ))
                }
            };
            self.expect_kind(&TokenKind::RBracket, "`]` after the element index")?;
            index = Some(idx);
        }

        Ok(RawField {
            name,
            index,
            line: token.line,
            column: token.column,
        })
    }

    fn resolve_clause(&self, pending: PendingClause, output: &ValueType) -> Result<Clause, SpecError> {
        let raw = &pending.field;
        let field = match (raw.name.as_str(), raw.index) {
            ("Output", None) => FieldExpr::Output,
            ("Output", Some(k)) => FieldExpr::OutputElement(k),
            ("time" | "space", _) => {
                return Err(SpecError::semantic(
                    self.source,
                    raw.line,
                    raw.column,
                    format!(
                        "field `{}` is a resource measurement, not an event; Probability needs an Output field",
                        raw.name
                    ),
                ))
            }
            (other, _) => {
                return Err(SpecError::semantic(
                    self.source,
                    raw.line,
                    raw.column,
                    format!("unknown field `{}` (result records contain Output, time, space)", other),
                ))
            }
        };

        if field.resolved_type(output).is_none() {
            let message = match field {
                FieldExpr::Output => format!(
                    "field `Output` does not resolve against output type `{}`; select an element with `Output[k]`",
                    output
                ),
                FieldExpr::OutputElement(_) => format!(
                    "field `{}` does not resolve against output type `{}`",
                    field, output
                ),
            };
            return Err(SpecError::semantic(self.source, raw.line, raw.column, message));
        }

        if !(0.0..=1.0).contains(&pending.target) {
            return Err(SpecError::semantic(
                self.source,
                pending.line,
                pending.target_column,
                format!("probability target {} is outside [0, 1]", pending.target),
            ));
        }

        Ok(Clause::ProbabilityOverRuns(ProbabilityClause {
            field,
            op: pending.op,
            target: pending.target,
            line: pending.line,
        }))
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn expect_any(&mut self, what: &str) -> Result<Token, SpecError> {
        match self.next() {
            Some(token) => Ok(token),
            None => {
                let (line, column) = self.end_position();
                Err(SpecError::syntax(
                    self.source,
                    line,
                    column,
                    format!("unexpected end of specification, expected {}", what),
                ))
            }
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<(String, Token), SpecError> {
        let token = self.expect_any(what)?;
        match &token.kind {
            TokenKind::Ident(name) => Ok((name.clone(), token)),
            other => Err(self.syntax_at(
                &token,
                format!("expected {}, found {}", what, other.describe()),
            )),
        }
    }

    fn expect_kind(&mut self, kind: &TokenKind, what: &str) -> Result<Token, SpecError> {
        let token = self.expect_any(what)?;
        if &token.kind == kind {
            Ok(token)
        } else {
            Err(self.syntax_at(
                &token,
                format!("expected {}, found {}", what, token.kind.describe()),
            ))
        }
    }

    fn expect_semicolon(&mut self, statement: &str) -> Result<(), SpecError> {
        match self.tokens.get(self.pos) {
            Some(token) if token.kind == TokenKind::Semicolon => {
                self.pos += 1;
                Ok(())
            }
            Some(token) => {
                let token = token.clone();
                Err(self.syntax_at(
                    &token,
                    format!(
                        "missing `;` after {}, found {}",
                        statement,
                        token.kind.describe()
                    ),
                ))
            }
            None => {
                let (line, column) = self.end_position();
                Err(SpecError::syntax(
                    self.source,
                    line,
                    column,
                    format!("missing `;` after {}", statement),
                ))
            }
        }
    }

    /// Position just past the last token
    fn end_position(&self) -> (usize, usize) {
        self.tokens
            .last()
            .map(|t| (t.line, t.column + t.width))
            .unwrap_or((0, 0))
    }

    fn syntax_at(&self, token: &Token, message: impl Into<String>) -> SpecError {
        SpecError::syntax(self.source, token.line, token.column, message)
    }

    fn semantic_at(&self, token: &Token, message: impl Into<String>) -> SpecError {
        SpecError::semantic(self.source, token.line, token.column, message)
    }
}
