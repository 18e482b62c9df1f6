//! Fixed helper registry for placeholder expressions.
//!
//! Helpers are plain functions over already-resolved [`Value`] arguments.
//! A helper that receives arguments it cannot work with returns a
//! [`HelperError`]; the evaluator then leaves the placeholder unresolved.
//!
//! # Dates
//! `today`, `formatDate d "fmt"`, `addDays d n`, `addMonths d n`, `addYears d n`.
//! Format tokens: `YYYY YY MMMM MMM MM M DD D Do dddd ddd`.
//!
//! # Numbers
//! `formatCurrency n [code] [decimals]`, `formatNumber n [decimals]`,
//! `formatInteger n [sep]`, `formatPercent n [decimals]`, `numberToWords n`,
//! `round n [decimals]`.
//!
//! # Case
//! `upper`, `lower`, `capitalize`, `titleCase`, `kebabCase`, `snakeCase`,
//! `camelCase`, `pascalCase`.
//!
//! # Strings
//! `trim`, `truncate s n [suffix]`, `replaceAll s from to`, `padStart s n [ch]`,
//! `padEnd s n [ch]`, `concat a...`, `initials s`, `pluralize word count [plural]`,
//! `default v fallback`, `contains haystack needle`.
//!
//! # Arithmetic
//! `add`, `subtract`, `multiply`, `divide`, `modulo`.

use chrono::{Datelike, Duration, Local, Months, NaiveDate};
use std::collections::HashMap;
use thiserror::Error;

use crate::metadata::{Value, ValueKind};

/// Why a helper could not produce a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HelperError {
    #[error("expected {expected} argument(s), got {got}")]
    Arity {
        expected: &'static str,
        got: usize,
    },

    #[error("argument {position} must be a {expected}, got {found}")]
    ArgumentType {
        position: usize,
        expected: &'static str,
        found: ValueKind,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("{0}")]
    OutOfRange(String),
}

pub type HelperResult = Result<Value, HelperError>;

/// Signature every helper implements.
pub type HelperFn = fn(&[Value]) -> HelperResult;

/// Name → helper function.
#[derive(Clone)]
pub struct HelperRegistry {
    helpers: HashMap<&'static str, HelperFn>,
}

impl std::fmt::Debug for HelperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelperRegistry").field("helpers", &self.names()).finish()
    }
}

impl Default for HelperRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl HelperRegistry {
    /// Registry with every built-in helper.
    pub fn builtin() -> Self {
        let entries: [(&'static str, HelperFn); 38] = [
            ("today", today),
            ("formatDate", format_date),
            ("addDays", add_days),
            ("addMonths", add_months),
            ("addYears", add_years),
            ("formatCurrency", format_currency),
            ("formatNumber", format_number),
            ("formatInteger", format_integer),
            ("formatPercent", format_percent),
            ("numberToWords", number_to_words),
            ("round", round),
            ("upper", upper),
            ("lower", lower),
            ("capitalize", capitalize),
            ("titleCase", title_case),
            ("kebabCase", kebab_case),
            ("snakeCase", snake_case),
            ("camelCase", camel_case),
            ("pascalCase", pascal_case),
            ("trim", trim),
            ("truncate", truncate),
            ("replaceAll", replace_all),
            ("padStart", pad_start),
            ("padEnd", pad_end),
            ("concat", concat),
            ("initials", initials),
            ("pluralize", pluralize),
            ("default", default),
            ("contains", contains),
            ("add", add),
            ("subtract", subtract),
            ("multiply", multiply),
            ("divide", divide),
            ("modulo", modulo),
            ("abs", abs),
            ("min", min),
            ("max", max),
            ("join", join),
        ];
        Self {
            helpers: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<HelperFn> {
        self.helpers.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.helpers.contains_key(name)
    }

    /// Helpers callable with no arguments.
    pub fn is_nullary(&self, name: &str) -> bool {
        name == "today"
    }

    /// Registered helper names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.helpers.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

// ---------------------------------------------------------------------------
// argument access
// ---------------------------------------------------------------------------

fn arity(args: &[Value], min: usize, max: usize, expected: &'static str) -> Result<(), HelperError> {
    if args.len() < min || args.len() > max {
        return Err(HelperError::Arity {
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

fn type_error(args: &[Value], index: usize, expected: &'static str) -> HelperError {
    HelperError::ArgumentType {
        position: index + 1,
        expected,
        found: args.get(index).map_or(ValueKind::Null, Value::kind),
    }
}

fn number_arg(args: &[Value], index: usize) -> Result<f64, HelperError> {
    args.get(index).and_then(Value::as_f64).ok_or_else(|| type_error(args, index, "number"))
}

fn text_arg(args: &[Value], index: usize) -> Result<String, HelperError> {
    match args.get(index) {
        Some(Value::Null) | None => Err(type_error(args, index, "string")),
        Some(value) => Ok(value.to_string()),
    }
}

fn date_arg(args: &[Value], index: usize) -> Result<NaiveDate, HelperError> {
    args.get(index).and_then(Value::as_date).ok_or_else(|| type_error(args, index, "date"))
}

fn optional_decimals(args: &[Value], index: usize, fallback: usize) -> Result<usize, HelperError> {
    match args.get(index) {
        None => Ok(fallback),
        Some(_) => {
            let n = number_arg(args, index)?;
            if !(0.0..=10.0).contains(&n) {
                return Err(HelperError::OutOfRange(format!("decimals must be between 0 and 10, got {n}")));
            }
            Ok(n as usize)
        }
    }
}

fn whole_number(args: &[Value], index: usize) -> Result<i64, HelperError> {
    let n = number_arg(args, index)?;
    if n.fract() != 0.0 || n.abs() > i32::MAX as f64 {
        return Err(type_error(args, index, "whole number"));
    }
    Ok(n as i64)
}

// ---------------------------------------------------------------------------
// dates
// ---------------------------------------------------------------------------

fn today(args: &[Value]) -> HelperResult {
    arity(args, 0, 0, "0")?;
    Ok(Value::Date(Local::now().date_naive()))
}

fn format_date(args: &[Value]) -> HelperResult {
    arity(args, 1, 2, "1 or 2")?;
    let date = date_arg(args, 0)?;
    let pattern = match args.get(1) {
        Some(_) => text_arg(args, 1)?,
        None => "YYYY-MM-DD".to_string(),
    };
    Ok(Value::String(render_date(date, &pattern)))
}

/// Render a date with moment-style tokens.
pub fn render_date(date: NaiveDate, pattern: &str) -> String {
    const TOKENS: [&str; 11] = ["YYYY", "MMMM", "dddd", "MMM", "ddd", "YY", "MM", "DD", "Do", "M", "D"];

    let mut out = String::with_capacity(pattern.len() + 8);
    let mut rest = pattern;
    'scan: while !rest.is_empty() {
        for token in TOKENS {
            if let Some(after) = rest.strip_prefix(token) {
                let piece = match token {
                    "YYYY" => date.format("%Y").to_string(),
                    "YY" => date.format("%y").to_string(),
                    "MMMM" => date.format("%B").to_string(),
                    "MMM" => date.format("%b").to_string(),
                    "MM" => date.format("%m").to_string(),
                    "M" => date.month().to_string(),
                    "DD" => date.format("%d").to_string(),
                    "D" => date.day().to_string(),
                    "Do" => ordinal(date.day()),
                    "dddd" => date.format("%A").to_string(),
                    _ => date.format("%a").to_string(),
                };
                out.push_str(&piece);
                rest = after;
                continue 'scan;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }
    out
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

fn add_days(args: &[Value]) -> HelperResult {
    arity(args, 2, 2, "2")?;
    let date = date_arg(args, 0)?;
    let days = whole_number(args, 1)?;
    date.checked_add_signed(Duration::days(days))
        .map(Value::Date)
        .ok_or_else(|| HelperError::OutOfRange("date out of range".into()))
}

fn shift_months(date: NaiveDate, months: i64) -> HelperResult {
    let magnitude = u32::try_from(months.unsigned_abs())
        .map(Months::new)
        .map_err(|_| HelperError::OutOfRange(format!("cannot shift a date by {months} months")))?;
    let shifted = if months >= 0 {
        date.checked_add_months(magnitude)
    } else {
        date.checked_sub_months(magnitude)
    };
    shifted.map(Value::Date).ok_or_else(|| HelperError::OutOfRange("date out of range".into()))
}

fn add_months(args: &[Value]) -> HelperResult {
    arity(args, 2, 2, "2")?;
    shift_months(date_arg(args, 0)?, whole_number(args, 1)?)
}

fn add_years(args: &[Value]) -> HelperResult {
    arity(args, 2, 2, "2")?;
    let date = date_arg(args, 0)?;
    let years = whole_number(args, 1)?;
    let months = years
        .checked_mul(12)
        .ok_or_else(|| HelperError::OutOfRange(format!("cannot shift a date by {years} years")))?;
    shift_months(date, months)
}

// ---------------------------------------------------------------------------
// numbers
// ---------------------------------------------------------------------------

/// Insert `sep` between groups of three digits.
fn group_digits(digits: &str, sep: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * sep.len());
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(sep);
        }
        out.push(c);
    }
    out
}

/// Fixed-point formatting with `,` thousands separators.
fn grouped(n: f64, decimals: usize, sep: &str) -> String {
    let fixed = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let mut out = String::new();
    if n < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&group_digits(int_part, sep));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

fn format_currency(args: &[Value]) -> HelperResult {
    arity(args, 1, 3, "1 to 3")?;
    let amount = number_arg(args, 0)?;
    let code = match args.get(1) {
        Some(_) => text_arg(args, 1)?.to_ascii_uppercase(),
        None => "USD".to_string(),
    };
    let (symbol, default_decimals) = match code.as_str() {
        "USD" => ("$".to_string(), 2),
        "EUR" => ("€".to_string(), 2),
        "GBP" => ("£".to_string(), 2),
        "JPY" => ("¥".to_string(), 0),
        other => (format!("{other} "), 2),
    };
    let decimals = optional_decimals(args, 2, default_decimals)?;
    let body = grouped(amount, decimals, ",");
    let formatted = match body.strip_prefix('-') {
        Some(positive) => format!("-{symbol}{positive}"),
        None => format!("{symbol}{body}"),
    };
    Ok(Value::String(formatted))
}

fn format_number(args: &[Value]) -> HelperResult {
    arity(args, 1, 2, "1 or 2")?;
    let n = number_arg(args, 0)?;
    Ok(Value::String(grouped(n, optional_decimals(args, 1, 2)?, ",")))
}

fn format_integer(args: &[Value]) -> HelperResult {
    arity(args, 1, 2, "1 or 2")?;
    let n = number_arg(args, 0)?.round();
    let sep = match args.get(1) {
        Some(_) => text_arg(args, 1)?,
        None => ",".to_string(),
    };
    Ok(Value::String(grouped(n, 0, &sep)))
}

/// `n` is a fraction: `0.155` → `15.5%` with one decimal.
fn format_percent(args: &[Value]) -> HelperResult {
    arity(args, 1, 2, "1 or 2")?;
    let n = number_arg(args, 0)?;
    let decimals = optional_decimals(args, 1, 0)?;
    Ok(Value::String(format!("{:.*}%", decimals, n * 100.0)))
}

fn round(args: &[Value]) -> HelperResult {
    arity(args, 1, 2, "1 or 2")?;
    let n = number_arg(args, 0)?;
    let factor = 10f64.powi(optional_decimals(args, 1, 0)? as i32);
    Ok(Value::from_f64((n * factor).round() / factor))
}

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven",
    "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen", "nineteen",
];
const TENS: [&str; 10] = ["", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety"];
const SCALES: [(u64, &str); 4] = [
    (1_000_000_000_000, "trillion"),
    (1_000_000_000, "billion"),
    (1_000_000, "million"),
    (1_000, "thousand"),
];

fn below_thousand(n: u64) -> String {
    let mut parts = Vec::new();
    if n >= 100 {
        parts.push(format!("{} hundred", ONES[(n / 100) as usize]));
    }
    let rest = n % 100;
    if rest >= 20 {
        let tens = TENS[(rest / 10) as usize];
        parts.push(match rest % 10 {
            0 => tens.to_string(),
            unit => format!("{tens}-{}", ONES[unit as usize]),
        });
    } else if rest > 0 || parts.is_empty() {
        parts.push(ONES[rest as usize].to_string());
    }
    parts.join(" ")
}

/// English words for a whole number.
pub fn words(mut n: u64) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }
    let mut parts = Vec::new();
    for (scale, name) in SCALES {
        if n >= scale {
            parts.push(format!("{} {name}", below_thousand(n / scale)));
            n %= scale;
        }
    }
    if n > 0 {
        parts.push(below_thousand(n));
    }
    parts.join(" ")
}

/// Whole part in words; cents, when present, as `and NN/100`.
fn number_to_words(args: &[Value]) -> HelperResult {
    arity(args, 1, 1, "1")?;
    let n = number_arg(args, 0)?;
    if n.abs() >= 1e15 {
        return Err(HelperError::OutOfRange(format!("{n} is too large to spell out")));
    }
    let cents_total = (n.abs() * 100.0).round() as u64;
    let (whole, cents) = (cents_total / 100, cents_total % 100);
    let mut out = String::new();
    if n < 0.0 && cents_total > 0 {
        out.push_str("minus ");
    }
    out.push_str(&words(whole));
    if cents > 0 {
        out.push_str(&format!(" and {cents:02}/100"));
    }
    Ok(Value::String(out))
}

// ---------------------------------------------------------------------------
// case
// ---------------------------------------------------------------------------

/// Split into words on non-alphanumerics and lower→upper humps.
fn split_words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in s.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn single_text(args: &[Value]) -> Result<String, HelperError> {
    arity(args, 1, 1, "1")?;
    text_arg(args, 0)
}

fn upper(args: &[Value]) -> HelperResult {
    Ok(Value::String(single_text(args)?.to_uppercase()))
}

fn lower(args: &[Value]) -> HelperResult {
    Ok(Value::String(single_text(args)?.to_lowercase()))
}

fn capitalize(args: &[Value]) -> HelperResult {
    let s = single_text(args)?;
    let mut chars = s.chars();
    let out = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    Ok(Value::String(out))
}

fn title_case(args: &[Value]) -> HelperResult {
    let s = single_text(args)?;
    let out: Vec<String> = s.split(' ').map(capitalize_word).collect();
    Ok(Value::String(out.join(" ")))
}

fn kebab_case(args: &[Value]) -> HelperResult {
    let words = split_words(&single_text(args)?);
    Ok(Value::String(words.iter().map(|w| w.to_lowercase()).collect::<Vec<_>>().join("-")))
}

fn snake_case(args: &[Value]) -> HelperResult {
    let words = split_words(&single_text(args)?);
    Ok(Value::String(words.iter().map(|w| w.to_lowercase()).collect::<Vec<_>>().join("_")))
}

fn camel_case(args: &[Value]) -> HelperResult {
    let words = split_words(&single_text(args)?);
    let out: String = words
        .iter()
        .enumerate()
        .map(|(i, w)| if i == 0 { w.to_lowercase() } else { capitalize_word(w) })
        .collect();
    Ok(Value::String(out))
}

fn pascal_case(args: &[Value]) -> HelperResult {
    let words = split_words(&single_text(args)?);
    Ok(Value::String(words.iter().map(|w| capitalize_word(w)).collect()))
}

// ---------------------------------------------------------------------------
// strings
// ---------------------------------------------------------------------------

fn trim(args: &[Value]) -> HelperResult {
    Ok(Value::String(single_text(args)?.trim().to_string()))
}

fn truncate(args: &[Value]) -> HelperResult {
    arity(args, 2, 3, "2 or 3")?;
    let s = text_arg(args, 0)?;
    let limit = whole_number(args, 1)?.max(0) as usize;
    let suffix = match args.get(2) {
        Some(_) => text_arg(args, 2)?,
        None => "...".to_string(),
    };
    if s.chars().count() <= limit {
        return Ok(Value::String(s));
    }
    let mut out: String = s.chars().take(limit).collect();
    out.push_str(&suffix);
    Ok(Value::String(out))
}

fn replace_all(args: &[Value]) -> HelperResult {
    arity(args, 3, 3, "3")?;
    let s = text_arg(args, 0)?;
    let from = text_arg(args, 1)?;
    let to = args.get(2).map(Value::to_string).unwrap_or_default();
    if from.is_empty() {
        return Ok(Value::String(s));
    }
    Ok(Value::String(s.replace(&from, &to)))
}

fn pad(args: &[Value], at_start: bool) -> HelperResult {
    arity(args, 2, 3, "2 or 3")?;
    let s = text_arg(args, 0)?;
    let width = whole_number(args, 1)?.max(0) as usize;
    let fill = match args.get(2) {
        Some(_) => text_arg(args, 2)?.chars().next().unwrap_or(' '),
        None => ' ',
    };
    let missing = width.saturating_sub(s.chars().count());
    let padding: String = std::iter::repeat_n(fill, missing).collect();
    Ok(Value::String(if at_start { padding + &s } else { s + &padding }))
}

fn pad_start(args: &[Value]) -> HelperResult {
    pad(args, true)
}

fn pad_end(args: &[Value]) -> HelperResult {
    pad(args, false)
}

fn concat(args: &[Value]) -> HelperResult {
    Ok(Value::String(args.iter().map(Value::to_string).collect()))
}

fn initials(args: &[Value]) -> HelperResult {
    let s = single_text(args)?;
    Ok(Value::String(
        s.split_whitespace().filter_map(|w| w.chars().next()).flat_map(char::to_uppercase).collect(),
    ))
}

fn pluralize(args: &[Value]) -> HelperResult {
    arity(args, 2, 3, "2 or 3")?;
    let word = text_arg(args, 0)?;
    let count = number_arg(args, 1)?;
    if count == 1.0 {
        return Ok(Value::String(word));
    }
    if args.len() == 3 {
        return Ok(Value::String(text_arg(args, 2)?));
    }
    let lower = word.to_lowercase();
    let vowel_y = ["ay", "ey", "iy", "oy", "uy"].iter().any(|suffix| lower.ends_with(suffix));
    let plural = if lower.ends_with('y') && !vowel_y {
        format!("{}ies", &word[..word.len() - 1])
    } else if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| lower.ends_with(suffix)) {
        format!("{word}es")
    } else {
        format!("{word}s")
    };
    Ok(Value::String(plural))
}

fn default(args: &[Value]) -> HelperResult {
    arity(args, 2, 2, "2")?;
    if args[0].is_blank() {
        Ok(args[1].clone())
    } else {
        Ok(args[0].clone())
    }
}

fn contains(args: &[Value]) -> HelperResult {
    arity(args, 2, 2, "2")?;
    let needle = text_arg(args, 1)?;
    let found = match &args[0] {
        Value::Sequence(items) => items.iter().any(|item| item.to_string() == needle),
        Value::Mapping(map) => map.contains_key(&needle),
        Value::Null => false,
        other => other.to_string().contains(&needle),
    };
    Ok(Value::Bool(found))
}

fn join(args: &[Value]) -> HelperResult {
    arity(args, 1, 2, "1 or 2")?;
    let sep = match args.get(1) {
        Some(_) => text_arg(args, 1)?,
        None => ", ".to_string(),
    };
    match &args[0] {
        Value::Sequence(items) => {
            Ok(Value::String(items.iter().map(Value::to_string).collect::<Vec<_>>().join(&sep)))
        }
        Value::Null => Err(type_error(args, 0, "sequence")),
        other => Ok(Value::String(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// arithmetic
// ---------------------------------------------------------------------------

fn binary(args: &[Value]) -> Result<(f64, f64), HelperError> {
    arity(args, 2, 2, "2")?;
    Ok((number_arg(args, 0)?, number_arg(args, 1)?))
}

fn add(args: &[Value]) -> HelperResult {
    let (a, b) = binary(args)?;
    Ok(Value::from_f64(a + b))
}

fn subtract(args: &[Value]) -> HelperResult {
    let (a, b) = binary(args)?;
    Ok(Value::from_f64(a - b))
}

fn multiply(args: &[Value]) -> HelperResult {
    let (a, b) = binary(args)?;
    Ok(Value::from_f64(a * b))
}

fn divide(args: &[Value]) -> HelperResult {
    let (a, b) = binary(args)?;
    if b == 0.0 {
        return Err(HelperError::DivisionByZero);
    }
    Ok(Value::from_f64(a / b))
}

fn modulo(args: &[Value]) -> HelperResult {
    let (a, b) = binary(args)?;
    if b == 0.0 {
        return Err(HelperError::DivisionByZero);
    }
    Ok(Value::from_f64(a % b))
}

fn abs(args: &[Value]) -> HelperResult {
    arity(args, 1, 1, "1")?;
    Ok(Value::from_f64(number_arg(args, 0)?.abs()))
}

fn min(args: &[Value]) -> HelperResult {
    let (a, b) = binary(args)?;
    Ok(Value::from_f64(a.min(b)))
}

fn max(args: &[Value]) -> HelperResult {
    let (a, b) = binary(args)?;
    Ok(Value::from_f64(a.max(b)))
}
