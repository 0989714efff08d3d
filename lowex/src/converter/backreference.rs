//! Backreferences: `\N`, `\k<N>`, `\k<-N>`, `\k<name>`
//!
//! Numbers and offsets count author-written groups only, so synthetic
//! groups opened earlier never change what a reference points at. The
//! output is always a plain numeric `\N`.

use crate::ast::Reference;
use crate::context::{Context, Lookup, unresolvable};
use crate::error::{Result, Span};
use crate::node::{GroupRef, Node};

pub(super) fn convert_backreference(
    reference: &Reference,
    span: Span,
    ctx: &mut Context,
) -> Result<Node> {
    if let Reference::Relative(offset) = reference {
        if *offset > 0 {
            return Err(unresolvable(reference, span));
        }
    }

    let target = match ctx.lookup(reference, span)? {
        Lookup::Resolved(ordinal) => GroupRef::Ordinal(ordinal),
        Lookup::Pending(reference) => {
            log::debug!("deferring backreference {} at {}", reference, span);
            GroupRef::Deferred(reference)
        }
    };
    Ok(Node::Backreference { target, span })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Origin;
    use crate::error::ConvertError;

    fn render(reference: Reference, ctx: &mut Context) -> Result<String> {
        convert_backreference(&reference, Span::default(), ctx).map(|node| node.to_string())
    }

    #[test]
    fn test_absolute_reference_maps_to_ordinal() {
        let mut ctx = Context::new();
        ctx.open_group(None, Origin::Synthetic);
        ctx.open_group(None, Origin::Original);
        assert_eq!(render(Reference::Absolute(1), &mut ctx).unwrap(), "\\2");
    }

    #[test]
    fn test_named_reference() {
        let mut ctx = Context::new();
        ctx.open_group(Some("word"), Origin::Original);
        ctx.open_group(None, Origin::Synthetic);
        assert_eq!(
            render(Reference::Named("word".to_string()), &mut ctx).unwrap(),
            "\\1"
        );
    }

    #[test]
    fn test_forward_reference_is_deferred() {
        let mut ctx = Context::new();
        let node =
            convert_backreference(&Reference::Absolute(1), Span::new(0, 2), &mut ctx).unwrap();
        assert_eq!(
            node,
            Node::Backreference {
                target: GroupRef::Deferred(Reference::Absolute(1)),
                span: Span::new(0, 2),
            }
        );
        assert!(!node.is_resolved());
    }

    #[test]
    fn test_forward_relative_backreference_is_rejected() {
        let mut ctx = Context::new();
        let err = render(Reference::Relative(1), &mut ctx).unwrap_err();
        assert!(matches!(err, ConvertError::UnresolvableReference { .. }));
    }

    #[test]
    fn test_relative_reference_out_of_range() {
        let mut ctx = Context::new();
        ctx.open_group(None, Origin::Original);
        assert!(render(Reference::Relative(-2), &mut ctx).is_err());
        assert_eq!(render(Reference::Relative(-1), &mut ctx).unwrap(), "\\1");
    }

    #[test]
    fn test_backreference_opens_no_group() {
        let mut ctx = Context::new();
        ctx.open_group(None, Origin::Original);
        render(Reference::Absolute(1), &mut ctx).unwrap();
        assert_eq!(ctx.group_count(), 1);
    }
}
