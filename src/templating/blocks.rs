//! Loop and conditional blocks.
//!
//! The token stream is folded into a [`Node`] tree. [`expand_blocks`] then
//! renders every top-level block to text, evaluating the placeholders inside
//! each block against a per-iteration [`Scope`]. Top-level placeholders are
//! left in place for the final evaluation pass.
//!
//! | Marker | Sequence | Truthy value | Falsy / absent |
//! |---|---|---|---|
//! | `{{#name}}` | body once per item | body once, `name` bound | `{{else}}` branch |
//! | `{{#each name}}` | body once per item | body once per mapping value | `{{else}}` branch |
//! | `{{#if name}}` | body | body | `{{else}}` branch |
//! | `{{#unless name}}` | `{{else}}` branch | `{{else}}` branch | body |
//!
//! Inside a loop: `this`, `@index`, `@number`, `@first`, `@last`, `@total`
//! and (for mappings) `@key`.

use super::evaluator::Evaluator;
use super::tokenizer::{BlockKind, Token};
use crate::core::{DiagnosticKind, RunContext};
use crate::metadata::{FieldPath, MetadataStore, Value};

/// A parsed template node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Field {
        expr: String,
        raw: String,
    },
    Block(Block),
}

/// A balanced block.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    pub name: String,
    pub body: Vec<Node>,
    /// Nodes after `{{else}}`.
    pub alternative: Vec<Node>,
}

#[derive(Debug)]
struct OpenFrame {
    kind: BlockKind,
    name: String,
    open_raw: String,
    body: Vec<Node>,
    else_raw: Option<String>,
    alternative: Vec<Node>,
}

impl OpenFrame {
    fn closes(&self, name: &str) -> bool {
        match self.kind.keyword() {
            None => name == self.name,
            Some(keyword) => name == keyword || name == self.name,
        }
    }

    fn target(&mut self) -> &mut Vec<Node> {
        if self.else_raw.is_some() {
            &mut self.alternative
        } else {
            &mut self.body
        }
    }

    /// Unclosed block: its markers become literal text.
    fn flatten(self) -> Vec<Node> {
        let mut nodes = vec![Node::Text(self.open_raw)];
        nodes.extend(self.body);
        if let Some(else_raw) = self.else_raw {
            nodes.push(Node::Text(else_raw));
            nodes.extend(self.alternative);
        }
        nodes
    }
}

fn target<'s>(stack: &'s mut [OpenFrame], root: &'s mut Vec<Node>) -> &'s mut Vec<Node> {
    match stack.last_mut() {
        Some(frame) => frame.target(),
        None => root,
    }
}

/// Fold tokens into a node tree.
///
/// Unbalanced markers are kept as literal text with an `UnbalancedBlock`
/// diagnostic.
pub fn build_tree(tokens: Vec<Token>, ctx: &mut RunContext) -> Vec<Node> {
    let mut root = Vec::new();
    let mut stack: Vec<OpenFrame> = Vec::new();

    for token in tokens {
        match token {
            Token::Text(text) => target(&mut stack, &mut root).push(Node::Text(text)),
            Token::Field {
                expr,
                raw,
            } => target(&mut stack, &mut root).push(Node::Field {
                expr,
                raw,
            }),
            Token::Open {
                kind,
                name,
                raw,
            } => stack.push(OpenFrame {
                kind,
                name,
                open_raw: raw,
                body: Vec::new(),
                else_raw: None,
                alternative: Vec::new(),
            }),
            Token::Else {
                raw,
            } => {
                if stack.last().is_some_and(|frame| frame.else_raw.is_none()) {
                    if let Some(frame) = stack.last_mut() {
                        frame.else_raw = Some(raw);
                    }
                } else {
                    ctx.warn(DiagnosticKind::UnbalancedBlock, format!("'{raw}' outside of a block"));
                    target(&mut stack, &mut root).push(Node::Text(raw));
                }
            }
            Token::Close {
                name,
                raw,
            } => {
                if stack.last().is_some_and(|frame| frame.closes(&name)) {
                    if let Some(frame) = stack.pop() {
                        let block = Block {
                            kind: frame.kind,
                            name: frame.name,
                            body: frame.body,
                            alternative: frame.alternative,
                        };
                        target(&mut stack, &mut root).push(Node::Block(block));
                    }
                } else {
                    ctx.warn(DiagnosticKind::UnbalancedBlock, format!("'{raw}' does not close an open block"));
                    target(&mut stack, &mut root).push(Node::Text(raw));
                }
            }
        }
    }

    while let Some(frame) = stack.pop() {
        ctx.warn(DiagnosticKind::UnbalancedBlock, format!("'{}' is never closed", frame.open_raw));
        let nodes = frame.flatten();
        target(&mut stack, &mut root).extend(nodes);
    }

    root
}

/// One level of loop (or bound-section) context.
#[derive(Debug, Clone, Copy)]
pub struct LoopContext<'a> {
    /// Name the block was opened with.
    pub variable: &'a str,
    pub item: &'a Value,
    pub key: Option<&'a str>,
    pub index: usize,
    pub total: usize,
    /// Set for a truthy non-list section, which binds its value without
    /// iterating and so carries no `@` variables of its own.
    pub bound: bool,
    pub parent: Option<&'a LoopContext<'a>>,
}

impl LoopContext<'_> {
    /// Innermost frame that is an actual iteration.
    fn nearest_loop(&self) -> Option<&Self> {
        let mut current = Some(self);
        while let Some(frame) = current {
            if !frame.bound {
                return Some(frame);
            }
            current = frame.parent;
        }
        None
    }

    fn special(&self, name: &str) -> Option<Value> {
        let value = match name {
            "@index" => Value::Integer(self.index as i64),
            "@number" => Value::Integer(self.index as i64 + 1),
            "@first" => Value::Bool(self.index == 0),
            "@last" => Value::Bool(self.index + 1 == self.total),
            "@total" => Value::Integer(self.total as i64),
            "@key" => Value::from(self.key?),
            _ => return None,
        };
        Some(value)
    }
}

/// Variable resolution scope: loop frames (innermost first), then the store.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    pub store: &'a MetadataStore,
    pub frame: Option<&'a LoopContext<'a>>,
}

impl<'a> Scope<'a> {
    pub fn root(store: &'a MetadataStore) -> Self {
        Self {
            store,
            frame: None,
        }
    }

    /// Scope for a nested frame; the frame may live shorter than `self`.
    pub fn with_frame<'b>(&self, frame: &'b LoopContext<'b>) -> Scope<'b>
    where
        'a: 'b,
    {
        Scope {
            store: self.store,
            frame: Some(frame),
        }
    }

    pub fn in_loop(&self) -> bool {
        self.frame.is_some()
    }

    /// Resolve a path: current item properties, then enclosing loops
    /// outward, then the top-level store.
    pub fn lookup(&self, path: &FieldPath) -> Option<Value> {
        let head = path.head();

        if let (Some(frame), Some(name)) = (self.frame, head) {
            if name.starts_with('@') && path.segments().len() == 1 {
                return frame.nearest_loop().and_then(|frame| frame.special(name));
            }
        }

        let mut current = self.frame;
        while let Some(frame) = current {
            match head {
                Some("this") => return frame.item.get_path(&path.tail()).cloned(),
                Some(name) if name == frame.variable => {
                    if let Some(found) = frame.item.get_path(&path.tail()) {
                        return Some(found.clone());
                    }
                }
                _ => {}
            }
            if let Value::Mapping(map) = frame.item {
                if let Some(found) = map.get_path(path) {
                    return Some(found.clone());
                }
            }
            current = frame.parent;
        }

        self.store.get_path(path).cloned()
    }
}

/// Render every top-level block; other nodes pass through.
pub fn expand_blocks(
    nodes: Vec<Node>,
    evaluator: &Evaluator,
    scope: &Scope<'_>,
    ctx: &mut RunContext,
) -> Vec<Node> {
    let mut expanded = 0usize;
    let out = nodes
        .into_iter()
        .map(|node| match node {
            Node::Block(block) => {
                expanded += 1;
                Node::Text(render_block(&block, evaluator, scope, ctx))
            }
            other => other,
        })
        .collect();
    tracing::debug!(blocks = expanded, "expanded blocks");
    out
}

/// Render one block against `scope`.
pub fn render_block(block: &Block, evaluator: &Evaluator, scope: &Scope<'_>, ctx: &mut RunContext) -> String {
    let value = FieldPath::parse(&block.name).and_then(|path| scope.lookup(&path));
    let truthy = value.as_ref().is_some_and(Value::is_truthy);

    match block.kind {
        BlockKind::If => branch(block, truthy, evaluator, scope, ctx),
        BlockKind::Unless => branch(block, !truthy, evaluator, scope, ctx),
        BlockKind::Section | BlockKind::Each => match value {
            Some(Value::Sequence(items)) if !items.is_empty() => {
                let entries: Vec<(Option<&str>, &Value)> = items.iter().map(|item| (None, item)).collect();
                iterate(block, &entries, evaluator, scope, ctx)
            }
            Some(Value::Mapping(map)) if block.kind == BlockKind::Each && !map.is_empty() => {
                let entries: Vec<(Option<&str>, &Value)> =
                    map.iter().map(|(key, item)| (Some(key.as_str()), item)).collect();
                iterate(block, &entries, evaluator, scope, ctx)
            }
            Some(item) if item.is_truthy() => bind(block, &item, evaluator, scope, ctx),
            _ => evaluator.render_nodes(&block.alternative, scope, ctx),
        },
    }
}

fn branch(block: &Block, take_body: bool, evaluator: &Evaluator, scope: &Scope<'_>, ctx: &mut RunContext) -> String {
    let nodes = if take_body { &block.body } else { &block.alternative };
    evaluator.render_nodes(nodes, scope, ctx)
}

fn iterate(
    block: &Block,
    entries: &[(Option<&str>, &Value)],
    evaluator: &Evaluator,
    scope: &Scope<'_>,
    ctx: &mut RunContext,
) -> String {
    let mut out = String::new();
    for (index, &(key, item)) in entries.iter().enumerate() {
        let frame = LoopContext {
            variable: &block.name,
            item,
            key,
            index,
            total: entries.len(),
            bound: false,
            parent: scope.frame,
        };
        let inner = scope.with_frame(&frame);
        out.push_str(&evaluator.render_nodes(&block.body, &inner, ctx));
    }
    out
}

fn bind(block: &Block, item: &Value, evaluator: &Evaluator, scope: &Scope<'_>, ctx: &mut RunContext) -> String {
    let frame = LoopContext {
        variable: &block.name,
        item,
        key: None,
        index: 0,
        total: 1,
        bound: true,
        parent: scope.frame,
    };
    evaluator.render_nodes(&block.body, &scope.with_frame(&frame), ctx)
}
