//! Placeholder templating for document bodies.
//!
//! The body is scanned once by [`tokenizer::tokenize`] and folded into a node
//! tree by [`blocks::build_tree`]. Rendering then happens in two passes:
//!
//! 1. [`blocks::expand_blocks`] renders loop and conditional blocks, so that
//!    placeholders inside a block see the per-iteration scope
//! 2. [`Evaluator::render_nodes`] substitutes the remaining top-level
//!    placeholders against the document metadata
//!
//! # Placeholder syntax
//!
//! ```text
//! {{client.name}}                         path lookup
//! {{parties[0].name}}                     indexed path
//! {{is_llc ? "LLC" : "Corporation"}}      ternary
//! {{formatCurrency fee "EUR"}}            helper call
//! {{formatDate (addDays start 30) "Do MMMM YYYY"}}
//! {{#items}} ... {{else}} ... {{/items}}  loop / conditional
//! ```
//!
//! # Example
//!
//! ```rust
//! use lexdown::core::RunContext;
//! use lexdown::markdown::frontmatter::parse_metadata;
//! use lexdown::templating::{Delimiters, render_template};
//!
//! let store = parse_metadata("name: Acme\nitems:\n  - A\n  - B\n").unwrap();
//! let mut ctx = RunContext::new(true, false);
//! let out = render_template(
//!     "Hello {{name}}! {{#items}}[{{this}}]{{/items}}",
//!     &store,
//!     &Delimiters::default(),
//!     &mut ctx,
//! );
//! assert_eq!(out, "Hello Acme! [A][B]");
//! ```

pub mod blocks;
pub mod evaluator;
pub mod expression;
pub mod helpers;
pub mod tokenizer;

pub use blocks::{Block, LoopContext, Node, Scope, build_tree, expand_blocks};
pub use evaluator::Evaluator;
pub use expression::{Expr, ExpressionError, parse_expression};
pub use helpers::{HelperError, HelperFn, HelperRegistry};
pub use tokenizer::{BlockKind, Delimiters, Token, tokenize};

use crate::core::RunContext;
use crate::metadata::MetadataStore;

/// Tokenize, expand blocks and evaluate placeholders in one call.
pub fn render_template(
    body: &str,
    store: &MetadataStore,
    delimiters: &Delimiters,
    ctx: &mut RunContext,
) -> String {
    let nodes = build_tree(tokenize(body, delimiters), ctx);
    let evaluator = Evaluator::new(store);
    let scope = Scope::root(store);
    let nodes = expand_blocks(nodes, &evaluator, &scope, ctx);
    evaluator.render_nodes(&nodes, &scope, ctx)
}
