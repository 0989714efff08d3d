//! One-to-one mapping of constructs that never create groups
//!
//! Anchors follow origin semantics: `^` and `$` are line anchors, `\A`,
//! `\z` and `\Z` are input anchors. The emitted pattern assumes no flags.

use super::convert_node;
use crate::ast::{CharacterClass, ClassItem, Expr, Quantifier, RepeatKind};
use crate::context::Context;
use crate::error::{Result, Span};
use crate::node::{LookKind, Node};

const HEX_DIGITS: &str = "0-9A-Fa-f";
const LINEBREAK: &str = "(?:\\r\\n|[\\n\\v\\f\\r\\u0085\\u2028\\u2029])";

/// Characters that must be escaped to stand for themselves outside a class
fn is_target_meta(c: char) -> bool {
    matches!(
        c,
        '\\' | '^' | '$' | '.' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '/'
    )
}

fn push_char(out: &mut String, c: char, in_class: bool) {
    match c {
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        '\u{0C}' => out.push_str("\\f"),
        '\u{0B}' => out.push_str("\\v"),
        c if c.is_control() && (c as u32) < 0x100 => {
            out.push_str(&format!("\\x{:02X}", c as u32))
        }
        c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
        c if in_class && matches!(c, '\\' | ']' | '[' | '^' | '-' | '/') => {
            out.push('\\');
            out.push(c);
        }
        c if !in_class && is_target_meta(c) => {
            out.push('\\');
            out.push(c);
        }
        c => out.push(c),
    }
}

/// A literal character, escaped for the target
pub(super) fn literal(c: char) -> Node {
    let mut out = String::new();
    push_char(&mut out, c, false);
    Node::Atom(out)
}

/// `\d \D \w \W \s \S` pass through; `\h \H` have no target shorthand
pub(super) fn shorthand(c: char) -> Node {
    match c {
        'h' => Node::atom(format!("[{}]", HEX_DIGITS)),
        'H' => Node::atom(format!("[^{}]", HEX_DIGITS)),
        c => Node::atom(format!("\\{}", c)),
    }
}

/// Character classes
///
/// `\H` has no form inside a class. A class holding it becomes an
/// alternation with `[^0-9A-Fa-f]`, or, when negated, a hex digit that is
/// not one of the other items.
pub(super) fn character_class(class: &CharacterClass) -> Node {
    let is_non_hex = |item: &&ClassItem| matches!(item, ClassItem::Shorthand('H'));
    let has_non_hex = class.items.iter().any(|item| is_non_hex(&item));

    let mut items = String::new();
    for item in class.items.iter().filter(|item| !is_non_hex(item)) {
        match item {
            ClassItem::Char(c) => push_char(&mut items, *c, true),
            ClassItem::Range(start, end) => {
                push_char(&mut items, *start, true);
                items.push('-');
                push_char(&mut items, *end, true);
            }
            ClassItem::Shorthand('h') => items.push_str(HEX_DIGITS),
            ClassItem::Shorthand(c) => {
                items.push('\\');
                items.push(*c);
            }
        }
    }

    let negation = if class.negated { "^" } else { "" };
    let text = match (has_non_hex, class.negated, items.is_empty()) {
        (false, _, _) => format!("[{}{}]", negation, items),
        (true, false, true) => format!("[^{}]", HEX_DIGITS),
        (true, false, false) => format!("(?:[{}]|[^{}])", items, HEX_DIGITS),
        (true, true, true) => format!("[{}]", HEX_DIGITS),
        (true, true, false) => format!("(?:(?![{}])[{}])", items, HEX_DIGITS),
    };
    Node::Atom(text)
}

/// `^` and `$` are line anchors in the origin dialect
pub(super) const START_OF_LINE: &str = "(?<![^\\n])";
pub(super) const END_OF_LINE: &str = "(?![^\\n])";
pub(super) const END_OF_INPUT_OR_NEWLINE: &str = "(?=\\n?$)";

/// `\K`, `\R` and `\X`
pub(super) fn escape(letter: char, span: Span, ctx: &mut Context) -> Node {
    match letter {
        'R' => Node::atom(LINEBREAK),
        'X' => {
            ctx.warn(
                "`\\X` (extended grapheme cluster) was approximated by a single character",
                Some(span),
            );
            Node::atom("[\\s\\S]")
        }
        _ => {
            ctx.warn(
                format!("`\\{}` has no equivalent; it was dropped", letter),
                Some(span),
            );
            Node::Empty
        }
    }
}

/// Inline option groups `(?i:...)` and switches `(?i)`
pub(super) fn option_group(
    flags: &str,
    pattern: Option<&Expr>,
    span: Span,
    ctx: &mut Context,
) -> Result<Node> {
    match pattern {
        Some(pattern) => {
            ctx.warn(
                format!("inline options `(?{}:...)` were ignored", flags),
                Some(span),
            );
            Ok(Node::non_capturing(convert_node(pattern, ctx)?))
        }
        None => {
            ctx.warn(format!("inline options `(?{})` were ignored", flags), Some(span));
            Ok(Node::Empty)
        }
    }
}

/// Absent operator `(?~P)`
///
/// Groups inside `P` keep their slots through a branch that can never
/// match, so later numbering is unaffected.
pub(super) fn absent(pattern: &Expr, span: Span, ctx: &mut Context) -> Result<Node> {
    ctx.warn(
        "absent operator `(?~...)` is not supported; it was dropped",
        Some(span),
    );
    let inner = convert_node(pattern, ctx)?;
    if !inner.contains_capture() {
        return Ok(Node::Empty);
    }
    Ok(Node::Quantified {
        body: Box::new(Node::Sequence(vec![
            Node::look(LookKind::NegativeAhead, Node::Empty),
            inner,
        ])),
        quantifier: Quantifier::greedy(RepeatKind::Optional),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_escaping() {
        assert_eq!(literal('a').to_string(), "a");
        assert_eq!(literal('.').to_string(), "\\.");
        assert_eq!(literal('/').to_string(), "\\/");
        assert_eq!(literal('\n').to_string(), "\\n");
        assert_eq!(literal('\u{0B}').to_string(), "\\v");
        assert_eq!(literal('\u{1B}').to_string(), "\\x1B");
        assert_eq!(literal('-').to_string(), "-");
        assert_eq!(literal('é').to_string(), "é");
    }

    #[test]
    fn test_hex_shorthands() {
        assert_eq!(shorthand('h').to_string(), "[0-9A-Fa-f]");
        assert_eq!(shorthand('H').to_string(), "[^0-9A-Fa-f]");
        assert_eq!(shorthand('w').to_string(), "\\w");
    }

    #[test]
    fn test_character_class() {
        let class = CharacterClass {
            negated: true,
            items: vec![
                ClassItem::Range('a', 'f'),
                ClassItem::Char(']'),
                ClassItem::Shorthand('h'),
                ClassItem::Shorthand('d'),
            ],
        };
        assert_eq!(
            character_class(&class).to_string(),
            "[^a-f\\]0-9A-Fa-f\\d]"
        );
    }

    #[test]
    fn test_non_hex_inside_class() {
        let class = |negated, items| CharacterClass { negated, items };
        let non_hex = ClassItem::Shorthand('H');

        assert_eq!(
            character_class(&class(false, vec![non_hex.clone()])).to_string(),
            "[^0-9A-Fa-f]"
        );
        assert_eq!(
            character_class(&class(false, vec![ClassItem::Char('x'), non_hex.clone()])).to_string(),
            "(?:[x]|[^0-9A-Fa-f])"
        );
        assert_eq!(
            character_class(&class(true, vec![non_hex.clone()])).to_string(),
            "[0-9A-Fa-f]"
        );
        assert_eq!(
            character_class(&class(true, vec![ClassItem::Range('a', 'c'), non_hex])).to_string(),
            "(?:(?![a-c])[0-9A-Fa-f])"
        );
    }

    #[test]
    fn test_escapes() {
        let mut ctx = Context::new();
        assert_eq!(
            escape('R', Span::default(), &mut ctx).to_string(),
            "(?:\\r\\n|[\\n\\v\\f\\r\\u0085\\u2028\\u2029])"
        );
        assert!(ctx.diagnostics().is_empty());
        assert_eq!(escape('K', Span::default(), &mut ctx), Node::Empty);
        assert_eq!(escape('X', Span::default(), &mut ctx).to_string(), "[\\s\\S]");
        assert_eq!(ctx.diagnostics().len(), 2);
    }

    #[test]
    fn test_option_group_becomes_non_capturing() {
        let mut ctx = Context::new();
        let node = option_group("i", Some(&Expr::text("ab")), Span::default(), &mut ctx).unwrap();
        assert_eq!(node.to_string(), "(?:ab)");
        let node = option_group("m-x", None, Span::default(), &mut ctx).unwrap();
        assert_eq!(node, Node::Empty);
        assert_eq!(ctx.diagnostics().len(), 2);
        assert!(ctx.diagnostics()[1].message.contains("(?m-x)"));
    }

    #[test]
    fn test_absent_operator_keeps_group_slots() {
        let mut ctx = Context::new();
        let node = absent(&Expr::text("ab"), Span::default(), &mut ctx).unwrap();
        assert_eq!(node, Node::Empty);

        let node = absent(&Expr::group(Expr::literal('a')), Span::default(), &mut ctx).unwrap();
        assert_eq!(node.to_string(), "(?:(?!)(a))?");
        assert_eq!(ctx.group_count(), 1);
    }
}
