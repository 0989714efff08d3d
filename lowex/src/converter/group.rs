//! Capture groups, atomic groups and possessive quantifiers
//!
//! The target dialect has neither atomic groups nor possessive quantifiers.
//! Both are emulated with a lookahead that captures into a synthetic group,
//! immediately consumed by a backreference:
//!
//! ```text
//! (?>P)  =>  (?=(P))\g(?:)
//! P*+    =>  (?=(P*))\g(?:)
//! ```
//!
//! A lookahead never backtracks into its match, so `\g` consumes exactly
//! what `P` matched the first time. The trailing `(?:)` keeps a following
//! digit from extending the backreference.

use super::convert_node;
use crate::ast::{Expr, Quantifier, QuantifierMode};
use crate::context::{Context, Origin};
use crate::error::Result;
use crate::node::Node;

/// Convert `( )` or `(?<name> )`; the group is emitted unnamed
pub(super) fn convert_capture(name: Option<&str>, body: &Expr, ctx: &mut Context) -> Result<Node> {
    let ordinal = ctx.open_group(name, Origin::Original);
    let body = convert_node(body, ctx)?;
    Ok(Node::capture(ordinal, body))
}

/// Convert `(?>P)`
pub(super) fn convert_atomic(body: &Expr, ctx: &mut Context) -> Result<Node> {
    let ordinal = ctx.open_group(None, Origin::Synthetic);
    let body = convert_node(body, ctx)?;
    Ok(Node::atomic(ordinal, body))
}

/// Convert a quantified node, emulating possessive quantifiers
pub(super) fn convert_quantified(
    body: &Expr,
    quantifier: Quantifier,
    ctx: &mut Context,
) -> Result<Node> {
    match quantifier.mode {
        QuantifierMode::Possessive => {
            let ordinal = ctx.open_group(None, Origin::Synthetic);
            let body = convert_node(body, ctx)?;
            let greedy = Node::Quantified {
                body: Box::new(body),
                quantifier: quantifier.to_greedy(),
            };
            Ok(Node::atomic(ordinal, greedy))
        }
        QuantifierMode::Greedy | QuantifierMode::Lazy => Ok(Node::Quantified {
            body: Box::new(convert_node(body, ctx)?),
            quantifier,
        }),
    }
}
