//! First pass: origin tree to target tree
//!
//! The tree is walked once, depth-first and left to right. Every node is
//! dispatched on its variant; converters for group-introducing constructs
//! open their group in the [`Context`] before descending, so that children
//! see an up-to-date group count.
//!
//! The result may still contain [`Node::SubexpCall`] placeholders and
//! deferred backreferences; see [`crate::second_pass`].

mod backreference;
mod group;
mod subexp_call;
mod transliterate;

use crate::ast::Expr;
use crate::context::Context;
use crate::error::Result;
use crate::node::{LookKind, Node};

/// Convert one origin node and everything below it
pub fn convert_node(expr: &Expr, ctx: &mut Context) -> Result<Node> {
    let node = match expr {
        Expr::Empty => Node::Empty,
        Expr::Literal(c) => transliterate::literal(*c),
        Expr::Any => Node::atom("."),
        Expr::Sequence(items) => Node::Sequence(convert_all(items, ctx)?),
        Expr::Alternation(branches) => Node::Alternation(convert_all(branches, ctx)?),
        Expr::CharacterClass(class) => transliterate::character_class(class),
        Expr::Quantified { expr, quantifier } => {
            group::convert_quantified(expr, *quantifier, ctx)?
        }
        Expr::Group(body) => group::convert_capture(None, body, ctx)?,
        Expr::NamedGroup { name, pattern } => {
            group::convert_capture(Some(name.as_str()), pattern, ctx)?
        }
        Expr::NonCapturingGroup(body) => Node::non_capturing(convert_node(body, ctx)?),
        Expr::AtomicGroup(body) => group::convert_atomic(body, ctx)?,
        Expr::Lookahead(body) => Node::look(LookKind::Ahead, convert_node(body, ctx)?),
        Expr::NegativeLookahead(body) => {
            Node::look(LookKind::NegativeAhead, convert_node(body, ctx)?)
        }
        Expr::Lookbehind(body) => Node::look(LookKind::Behind, convert_node(body, ctx)?),
        Expr::NegativeLookbehind(body) => {
            Node::look(LookKind::NegativeBehind, convert_node(body, ctx)?)
        }
        Expr::OptionGroup {
            flags,
            pattern,
            span,
        } => transliterate::option_group(flags, pattern.as_deref(), *span, ctx)?,
        Expr::Absent { pattern, span } => transliterate::absent(pattern, *span, ctx)?,
        Expr::StartAnchor => Node::assertion(transliterate::START_OF_LINE),
        Expr::EndAnchor => Node::assertion(transliterate::END_OF_LINE),
        Expr::StartOfInput => Node::assertion("^"),
        Expr::EndOfInput => Node::assertion("$"),
        Expr::EndOfInputOrNewline => Node::assertion(transliterate::END_OF_INPUT_OR_NEWLINE),
        Expr::WordBoundary => Node::assertion("\\b"),
        Expr::NonWordBoundary => Node::assertion("\\B"),
        Expr::MatchStart(span) => {
            ctx.warn(
                "`\\G` (start of match) has no equivalent; the anchor was dropped",
                Some(*span),
            );
            Node::Empty
        }
        Expr::Shorthand(c) => transliterate::shorthand(*c),
        Expr::Escape { letter, span } => transliterate::escape(*letter, *span, ctx),
        Expr::Backreference { reference, span } => {
            backreference::convert_backreference(reference, *span, ctx)?
        }
        Expr::SubexpCall { reference, span } => {
            subexp_call::convert_subexp_call(reference, *span, ctx)?
        }
    };
    Ok(node)
}

fn convert_all(exprs: &[Expr], ctx: &mut Context) -> Result<Vec<Node>> {
    exprs.iter().map(|expr| convert_node(expr, ctx)).collect()
}
