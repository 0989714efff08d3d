//! Subexpression calls: `\g<N>`, `\g<-N>`, `\g<+N>`, `\g<name>`
//!
//! The first pass only records the call as a placeholder; the body is
//! inlined by the second pass once every group is known.

use crate::ast::Reference;
use crate::context::{Context, Lookup};
use crate::error::{Result, Span};
use crate::node::{GroupRef, Node};

pub(super) fn convert_subexp_call(
    reference: &Reference,
    span: Span,
    ctx: &mut Context,
) -> Result<Node> {
    if *reference == Reference::Absolute(0) {
        ctx.warn(
            "whole-pattern recursion is not supported; the call was dropped",
            Some(span),
        );
        return Ok(Node::Dropped);
    }

    let target = match ctx.lookup(reference, span)? {
        Lookup::Resolved(ordinal) => GroupRef::Ordinal(ordinal),
        Lookup::Pending(reference) => GroupRef::Deferred(reference),
    };
    Ok(Node::SubexpCall { target, span })
}
