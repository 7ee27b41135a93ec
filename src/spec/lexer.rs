// Tokenizer for the specification language
//
// Line-oriented: every token remembers the 1-based line and column it
// started at so errors can point back into the specification text.

use crate::spec::ast::CmpOp;
use crate::spec::SpecError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Number(f64),
    Op(CmpOp),
    Semicolon,
    Comma,
    LBracket,
    RBracket,
}

impl TokenKind {
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("`{}`", name),
            TokenKind::Number(n) => format!("number {}", n),
            TokenKind::Op(op) => format!("`{}`", op),
            TokenKind::Semicolon => "`;`".to_string(),
            TokenKind::Comma => "`,`".to_string(),
            TokenKind::LBracket => "`[`".to_string(),
            TokenKind::RBracket => "`]`".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
    /// Length in characters
    pub width: usize,
}

/// Split specification text into tokens
///
/// `#` starts a comment that runs to the end of the line. Any character
/// that cannot start a token is a syntax error.
pub fn tokenize(text: &str) -> Result<Vec<Token>, SpecError> {
    let mut tokens = Vec::new();

    for (line_idx, line) in text.lines().enumerate() {
        let line_no = line_idx + 1;
        let chars: Vec<char> = line.chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let column = i + 1;

            if c.is_whitespace() {
                i += 1;
                continue;
            }
            if c == '#' {
                break;
            }

            let (kind, len) = match c {
                ';' => (TokenKind::Semicolon, 1),
                ',' => (TokenKind::Comma, 1),
                '[' => (TokenKind::LBracket, 1),
                ']' => (TokenKind::RBracket, 1),
                '=' | '!' | '<' | '>' => lex_operator(&chars[i..])
                    .ok_or_else(|| SpecError::syntax(text, line_no, column, format!("unknown operator starting with `{}`", c)))?,
                c if c.is_ascii_digit() || c == '.' || c == '-' || c == '+' => {
                    let len = number_len(&chars[i..]);
                    let literal: String = chars[i..i + len].iter().collect();
                    let value = literal.parse::<f64>().map_err(|_| {
                        SpecError::syntax(text, line_no, column, format!("malformed number `{}`", literal))
                    })?;
                    (TokenKind::Number(value), len)
                }
                c if c.is_ascii_alphabetic() || c == '_' => {
                    let len = chars[i..]
                        .iter()
                        .take_while(|ch| ch.is_ascii_alphanumeric() || **ch == '_')
                        .count();
                    (TokenKind::Ident(chars[i..i + len].iter().collect()), len)
                }
                other => {
                    return Err(SpecError::syntax(
                        text,
                        line_no,
                        column,
                        format!("unexpected character `{}`", other),
                    ));
                }
            };

            tokens.push(Token {
                kind,
                line: line_no,
                column,
                width: len,
            });
            i += len;
        }
    }

    Ok(tokens)
}

fn lex_operator(rest: &[char]) -> Option<(TokenKind, usize)> {
    let second = rest.get(1).copied();
    let op = match (rest[0], second) {
        ('=', Some('=')) => (CmpOp::Eq, 2),
        ('!', Some('=')) => (CmpOp::Ne, 2),
        ('<', Some('=')) => (CmpOp::Le, 2),
        ('>', Some('=')) => (CmpOp::Ge, 2),
        ('<', _) => (CmpOp::Lt, 1),
        ('>', _) => (CmpOp::Gt, 1),
        _ => return None,
    };
    Some((TokenKind::Op(op.0), op.1))
}

/// Length of the longest numeric literal prefix (sign, digits, fraction, exponent)
fn number_len(rest: &[char]) -> usize {
    let mut i = 0;
    if matches!(rest.first(), Some('-') | Some('+')) {
        i += 1;
    }
    while rest.get(i).is_some_and(|c| c.is_ascii_digit() || *c == '.') {
        i += 1;
    }
    if matches!(rest.get(i), Some('e') | Some('E')) {
        let mut j = i + 1;
        if matches!(rest.get(j), Some('-') | Some('+')) {
            j += 1;
        }
        if rest.get(j).is_some_and(|c| c.is_ascii_digit()) {
            while rest.get(j).is_some_and(|c| c.is_ascii_digit()) {
                j += 1;
            }
            i = j;
        }
    }
    i.max(1)
}
