//! Placeholder evaluation.
//!
//! Resolution order for one placeholder:
//! 1. ternary: the condition is looked up, the chosen branch is evaluated
//! 2. helper call: arguments are resolved, then the registered helper runs
//! 3. plain path: looked up in the active [`Scope`]
//!
//! Anything that does not resolve leaves the placeholder text in the output
//! and is recorded as `empty`. Helpers and ternaries that do resolve are
//! recorded as `logic`.

use strsim::levenshtein;

use super::blocks::{Node, Scope, render_block};
use super::expression::{Arg, Call, Expr, Operand, parse_expression};
use super::helpers::HelperRegistry;
use crate::core::{DiagnosticKind, RunContext};
use crate::metadata::{FieldPath, MetadataStore, Value};

/// Maximum Levenshtein distance, as a percentage of the name length, for
/// "did you mean" suggestions.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

/// Outcome of evaluating one expression.
enum Resolution {
    /// A value, and whether logic produced it.
    Resolved(Value, bool),
    /// Left unresolved; the placeholder stays in the output.
    Unresolved(Option<Value>),
}

/// Evaluates placeholders against a scope.
#[derive(Debug, Clone)]
pub struct Evaluator {
    helpers: HelperRegistry,
    known_paths: Vec<String>,
}

impl Evaluator {
    /// Evaluator with the built-in helpers.
    pub fn new(store: &MetadataStore) -> Self {
        Self::with_helpers(store, HelperRegistry::builtin())
    }

    pub fn with_helpers(store: &MetadataStore, helpers: HelperRegistry) -> Self {
        Self {
            helpers,
            known_paths: store.known_paths(),
        }
    }

    pub fn helpers(&self) -> &HelperRegistry {
        &self.helpers
    }

    /// Render nodes to text. Blocks are rendered recursively.
    pub fn render_nodes(&self, nodes: &[Node], scope: &Scope<'_>, ctx: &mut RunContext) -> String {
        let mut out = String::new();
        for node in nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Field {
                    expr,
                    raw,
                } => out.push_str(&self.evaluate_field(expr, raw, scope, ctx)),
                Node::Block(block) => out.push_str(&render_block(block, self, scope, ctx)),
            }
        }
        out
    }

    /// Evaluate one placeholder and return its replacement text.
    ///
    /// # Arguments
    /// * `source` - placeholder content without delimiters
    /// * `raw` - the placeholder exactly as written, kept when unresolved
    pub fn evaluate_field(&self, source: &str, raw: &str, scope: &Scope<'_>, ctx: &mut RunContext) -> String {
        let expr = match parse_expression(source) {
            Ok(expr) => expr,
            Err(e) => {
                ctx.warn(DiagnosticKind::InvalidExpression, format!("{raw}: {e}"));
                let name = source.trim();
                let status = ctx.tracker_mut().record(name, None, raw, false);
                return ctx.present(raw, name, status);
            }
        };

        let name = expr.field_name(source);
        match self.resolve(&expr, scope, ctx) {
            Resolution::Resolved(value, has_logic) => {
                let status = ctx.tracker_mut().record(&name, Some(&value), raw, has_logic);
                ctx.present(&value.to_string(), &name, status)
            }
            Resolution::Unresolved(value) => {
                let status = ctx.tracker_mut().record(&name, value.as_ref(), raw, false);
                ctx.present(raw, &name, status)
            }
        }
    }

    fn resolve(&self, expr: &Expr, scope: &Scope<'_>, ctx: &mut RunContext) -> Resolution {
        match expr {
            Expr::Operand(Operand::Path(path)) => self.resolve_path(path, scope, ctx),
            Expr::Operand(literal) => match literal_value(literal) {
                Some(value) => Resolution::Resolved(value, true),
                None => Resolution::Unresolved(None),
            },
            Expr::Ternary {
                negated,
                condition,
                then,
                otherwise,
            } => {
                let truthy = scope.lookup(condition).is_some_and(|v| v.is_truthy()) != *negated;
                let chosen = if truthy { then } else { otherwise };
                match chosen {
                    Operand::Path(path) => match scope.lookup(path) {
                        Some(value) if !value.is_blank() => Resolution::Resolved(value, true),
                        other => {
                            self.report_missing(path, scope, ctx);
                            Resolution::Unresolved(other)
                        }
                    },
                    literal => match literal_value(literal) {
                        Some(value) => Resolution::Resolved(value, true),
                        None => Resolution::Unresolved(None),
                    },
                }
            }
            Expr::Call(call) => match self.call(call, scope, ctx) {
                Some(value) => Resolution::Resolved(value, true),
                None => Resolution::Unresolved(None),
            },
        }
    }

    fn resolve_path(&self, path: &FieldPath, scope: &Scope<'_>, ctx: &mut RunContext) -> Resolution {
        match scope.lookup(path) {
            Some(value) if value.is_blank() => Resolution::Unresolved(Some(value)),
            Some(value) => Resolution::Resolved(value, false),
            None => {
                if let Some(value) = self.call_nullary(path, scope, ctx) {
                    return Resolution::Resolved(value, true);
                }
                self.report_missing(path, scope, ctx);
                Resolution::Unresolved(None)
            }
        }
    }

    /// A bare zero-argument helper name such as `today`, used where metadata
    /// has no value under that name.
    fn call_nullary(&self, path: &FieldPath, scope: &Scope<'_>, ctx: &mut RunContext) -> Option<Value> {
        let name = path.head().filter(|_| path.segments().len() == 1)?;
        if !self.helpers.is_nullary(name) {
            return None;
        }
        let call = Call {
            helper: name.to_string(),
            args: Vec::new(),
        };
        self.call(&call, scope, ctx)
    }

    /// Run a helper call; `None` when the helper is unknown or fails.
    fn call(&self, call: &Call, scope: &Scope<'_>, ctx: &mut RunContext) -> Option<Value> {
        let Some(helper) = self.helpers.get(&call.helper) else {
            ctx.warn(DiagnosticKind::UnknownHelper, format!("unknown helper '{}'", call.helper));
            return None;
        };

        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            let value = match arg {
                Arg::Operand(Operand::Path(path)) => match scope.lookup(path) {
                    Some(value) => value,
                    None => self.call_nullary(path, scope, ctx).unwrap_or(Value::Null),
                },
                Arg::Operand(literal) => literal_value(literal).unwrap_or(Value::Null),
                Arg::Call(inner) => self.call(inner, scope, ctx)?,
            };
            args.push(value);
        }

        match helper(&args) {
            Ok(value) => Some(value),
            Err(e) => {
                ctx.warn(DiagnosticKind::HelperFailed, format!("{}: {e}", call.helper));
                None
            }
        }
    }

    fn report_missing(&self, path: &FieldPath, scope: &Scope<'_>, ctx: &mut RunContext) {
        let name = path.to_string();
        let mut message = format!("field '{name}' is not defined");
        if scope.in_loop() {
            message.push_str(" in the current loop item or document metadata");
        }
        let suggestions = self.suggest(&name);
        if !suggestions.is_empty() {
            message.push_str(&format!("; did you mean '{}'?", suggestions.join("', '")));
        }
        ctx.info(DiagnosticKind::MissingField, message);
    }

    /// Known paths within the similarity threshold, closest first (at most 3).
    fn suggest(&self, target: &str) -> Vec<String> {
        let limit = target.len() * SIMILARITY_THRESHOLD_PERCENT / 100;
        let mut scored: Vec<(usize, &String)> = self
            .known_paths
            .iter()
            .filter(|candidate| candidate.as_str() != target)
            .map(|candidate| (levenshtein(target, candidate), candidate))
            .filter(|(distance, _)| *distance <= limit)
            .collect();
        scored.sort();
        scored.into_iter().take(3).map(|(_, candidate)| candidate.clone()).collect()
    }
}

fn literal_value(operand: &Operand) -> Option<Value> {
    match operand {
        Operand::Str(s) => Some(Value::String(s.clone())),
        Operand::Number(n) => Some(Value::from_f64(*n)),
        Operand::Bool(b) => Some(Value::Bool(*b)),
        Operand::Path(_) => None,
    }
}
