//! Placeholder expression grammar.
//!
//! ```text
//! expr      := ternary | call | operand
//! ternary   := ['!'] path '?' operand ':' operand
//! call      := IDENT arg+
//! arg       := operand | '(' IDENT arg* ')'
//! operand   := STRING | NUMBER | 'true' | 'false' | path
//! ```
//!
//! Subexpressions nest one level only. A single bare word parses as a
//! path; the evaluator decides whether it names a zero-argument helper.

use std::fmt;
use thiserror::Error;

use crate::metadata::FieldPath;

/// Why an expression could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    #[error("empty expression")]
    Empty,

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unbalanced parentheses")]
    UnbalancedParens,

    #[error("subexpressions may only nest one level")]
    NestedTooDeep,

    #[error("'{0}' is not a valid path")]
    InvalidPath(String),

    #[error("malformed ternary, expected 'condition ? a : b'")]
    MalformedTernary,

    #[error("unexpected '{0}'")]
    Unexpected(String),
}

/// A literal or a path.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Path(FieldPath),
    Str(String),
    Number(f64),
    Bool(bool),
}

/// A helper invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub helper: String,
    pub args: Vec<Arg>,
}

/// A helper argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Operand(Operand),
    Call(Call),
}

/// A parsed placeholder expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Operand(Operand),
    Ternary {
        negated: bool,
        condition: FieldPath,
        then: Operand,
        otherwise: Operand,
    },
    Call(Call),
}

impl Expr {
    /// Name recorded in the field ledger for this expression.
    pub fn field_name(&self, source: &str) -> String {
        match self {
            Expr::Operand(Operand::Path(path)) => path.to_string(),
            Expr::Ternary {
                condition,
                ..
            } => condition.to_string(),
            _ => source.split_whitespace().collect::<Vec<_>>().join(" "),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Lexeme {
    Word(String),
    Str(String),
    Open,
    Close,
    Question,
    Colon,
    Bang,
}

impl fmt::Display for Lexeme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lexeme::Word(w) => write!(f, "{w}"),
            Lexeme::Str(s) => write!(f, "\"{s}\""),
            Lexeme::Open => write!(f, "("),
            Lexeme::Close => write!(f, ")"),
            Lexeme::Question => write!(f, "?"),
            Lexeme::Colon => write!(f, ":"),
            Lexeme::Bang => write!(f, "!"),
        }
    }
}

fn lex(src: &str) -> Result<Vec<Lexeme>, ExpressionError> {
    let mut out = Vec::new();
    let mut chars = src.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '"' | '\'' => {
                chars.next();
                let mut s = String::new();
                let mut closed = false;
                while let Some(ch) = chars.next() {
                    match ch {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                s.push(escaped);
                            }
                        }
                        ch if ch == c => {
                            closed = true;
                            break;
                        }
                        ch => s.push(ch),
                    }
                }
                if !closed {
                    return Err(ExpressionError::UnterminatedString);
                }
                out.push(Lexeme::Str(s));
            }
            '(' => {
                chars.next();
                out.push(Lexeme::Open);
            }
            ')' => {
                chars.next();
                out.push(Lexeme::Close);
            }
            '?' => {
                chars.next();
                out.push(Lexeme::Question);
            }
            ':' => {
                chars.next();
                out.push(Lexeme::Colon);
            }
            '!' if out.is_empty() => {
                chars.next();
                out.push(Lexeme::Bang);
            }
            _ => {
                let mut word = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_whitespace() || matches!(ch, '(' | ')' | '?' | ':' | '"' | '\'') {
                        break;
                    }
                    word.push(ch);
                    chars.next();
                }
                out.push(Lexeme::Word(word));
            }
        }
    }
    Ok(out)
}

fn operand(lexeme: &Lexeme) -> Result<Operand, ExpressionError> {
    match lexeme {
        Lexeme::Str(s) => Ok(Operand::Str(s.clone())),
        Lexeme::Word(w) => word_operand(w),
        other => Err(ExpressionError::Unexpected(other.to_string())),
    }
}

fn word_operand(word: &str) -> Result<Operand, ExpressionError> {
    match word {
        "true" => return Ok(Operand::Bool(true)),
        "false" => return Ok(Operand::Bool(false)),
        _ => {}
    }
    let numeric_start = word
        .strip_prefix('-')
        .unwrap_or(word)
        .starts_with(|c: char| c.is_ascii_digit());
    if numeric_start {
        if let Ok(n) = word.parse::<f64>() {
            return Ok(Operand::Number(n));
        }
    }
    FieldPath::parse(word)
        .map(Operand::Path)
        .ok_or_else(|| ExpressionError::InvalidPath(word.to_string()))
}

/// Parse placeholder text (delimiters already removed).
pub fn parse_expression(src: &str) -> Result<Expr, ExpressionError> {
    let lexemes = lex(src.trim())?;
    if lexemes.is_empty() {
        return Err(ExpressionError::Empty);
    }

    if lexemes.contains(&Lexeme::Question) {
        return parse_ternary(&lexemes);
    }

    match lexemes.as_slice() {
        [single] => Ok(Expr::Operand(operand(single)?)),
        [Lexeme::Word(helper), rest @ ..] => Ok(Expr::Call(Call {
            helper: helper.clone(),
            args: parse_args(rest, 0)?,
        })),
        [first, ..] => Err(ExpressionError::Unexpected(first.to_string())),
        [] => Err(ExpressionError::Empty),
    }
}

fn parse_ternary(lexemes: &[Lexeme]) -> Result<Expr, ExpressionError> {
    let (negated, rest) = match lexemes.split_first() {
        Some((Lexeme::Bang, rest)) => (true, rest),
        _ => (false, lexemes),
    };
    match rest {
        [Lexeme::Word(cond), Lexeme::Question, then, Lexeme::Colon, otherwise] => {
            let condition =
                FieldPath::parse(cond).ok_or_else(|| ExpressionError::InvalidPath(cond.clone()))?;
            Ok(Expr::Ternary {
                negated,
                condition,
                then: operand(then)?,
                otherwise: operand(otherwise)?,
            })
        }
        _ => Err(ExpressionError::MalformedTernary),
    }
}

/// Parse helper arguments; `depth` counts enclosing parentheses.
fn parse_args(lexemes: &[Lexeme], depth: usize) -> Result<Vec<Arg>, ExpressionError> {
    let mut args = Vec::new();
    let mut i = 0;
    while i < lexemes.len() {
        match &lexemes[i] {
            Lexeme::Open => {
                if depth > 0 {
                    return Err(ExpressionError::NestedTooDeep);
                }
                let close = matching_close(lexemes, i)?;
                let inner = &lexemes[i + 1..close];
                let (helper, inner_args) = match inner.split_first() {
                    Some((Lexeme::Word(helper), rest)) => (helper.clone(), parse_args(rest, depth + 1)?),
                    Some((other, _)) => return Err(ExpressionError::Unexpected(other.to_string())),
                    None => return Err(ExpressionError::Empty),
                };
                args.push(Arg::Call(Call {
                    helper,
                    args: inner_args,
                }));
                i = close + 1;
            }
            Lexeme::Close => return Err(ExpressionError::UnbalancedParens),
            other => {
                args.push(Arg::Operand(operand(other)?));
                i += 1;
            }
        }
    }
    Ok(args)
}

fn matching_close(lexemes: &[Lexeme], open: usize) -> Result<usize, ExpressionError> {
    let mut depth = 0usize;
    for (i, lexeme) in lexemes.iter().enumerate().skip(open) {
        match lexeme {
            Lexeme::Open => depth += 1,
            Lexeme::Close => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
    }
    Err(ExpressionError::UnbalancedParens)
}
