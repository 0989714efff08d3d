//! Output tree in target (ECMAScript) syntax
//!
//! The first pass produces a [`Node`] tree that may still contain
//! [`Node::SubexpCall`] placeholders and deferred backreferences. The second
//! pass replaces both, after which `Display` renders the emitted pattern.

use std::fmt;

use crate::ast::{Quantifier, Reference};
use crate::error::Span;

/// Which lookaround assertion a [`Node::Look`] is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookKind {
    /// `(?=...)`
    Ahead,
    /// `(?!...)`
    NegativeAhead,
    /// `(?<=...)`
    Behind,
    /// `(?<!...)`
    NegativeBehind,
}

impl LookKind {
    fn opener(self) -> &'static str {
        match self {
            LookKind::Ahead => "(?=",
            LookKind::NegativeAhead => "(?!",
            LookKind::Behind => "(?<=",
            LookKind::NegativeBehind => "(?<!",
        }
    }
}

/// The group a backreference or call points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupRef {
    /// Final ordinal in the emitted pattern
    Ordinal(u32),
    /// Not opened yet when the reference was converted; resolved by the second pass
    Deferred(Reference),
}

/// A node of the emitted pattern
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Matches the empty string
    Empty,
    /// One indivisible unit of target syntax: an escaped literal, a class, `.`, `\d`
    Atom(String),
    /// A zero-width unit of target syntax: `\b`, `(?<![\s\S])`
    Assertion(String),
    /// Concatenation
    Sequence(Vec<Node>),
    /// Alternation
    Alternation(Vec<Node>),
    /// Capturing group; always emitted unnamed
    Capture {
        /// Index of the group in the emitted pattern
        ordinal: u32,
        /// Group contents
        body: Box<Node>,
    },
    /// `(?:...)`
    NonCapturing(Box<Node>),
    /// Atomic-group emulation `(?=(body))\N(?:)` around a synthetic group
    Atomic {
        /// Ordinal of the synthetic group
        ordinal: u32,
        /// The atomic pattern; a greedy quantifier for possessive forms
        body: Box<Node>,
    },
    /// Lookaround assertion
    Look {
        /// Direction and polarity
        kind: LookKind,
        /// Asserted pattern
        body: Box<Node>,
    },
    /// Quantified node; never possessive
    Quantified {
        /// The repeated node
        body: Box<Node>,
        /// Greedy or lazy quantifier
        quantifier: Quantifier,
    },
    /// Numeric backreference `\N`
    Backreference {
        /// Referenced group
        target: GroupRef,
        /// Location in the source pattern
        span: Span,
    },
    /// Placeholder for a subexpression call, consumed by the second pass
    SubexpCall {
        /// Called group
        target: GroupRef,
        /// Location in the source pattern
        span: Span,
    },
    /// A subexpression call removed with a warning, together with the
    /// branch that needed it; renders as nothing
    Dropped,
}

impl Node {
    /// Create an atom
    pub fn atom(text: impl Into<String>) -> Self {
        Node::Atom(text.into())
    }

    /// Create an assertion
    pub fn assertion(text: impl Into<String>) -> Self {
        Node::Assertion(text.into())
    }

    /// Create a capturing group
    pub fn capture(ordinal: u32, body: Node) -> Self {
        Node::Capture {
            ordinal,
            body: Box::new(body),
        }
    }

    /// Create a non-capturing group
    pub fn non_capturing(body: Node) -> Self {
        Node::NonCapturing(Box::new(body))
    }

    /// Create an atomic-group emulation
    pub fn atomic(ordinal: u32, body: Node) -> Self {
        Node::Atomic {
            ordinal,
            body: Box::new(body),
        }
    }

    /// Create a lookaround
    pub fn look(kind: LookKind, body: Node) -> Self {
        Node::Look {
            kind,
            body: Box::new(body),
        }
    }

    /// Create a backreference to a known ordinal
    pub fn backreference(ordinal: u32) -> Self {
        Node::Backreference {
            target: GroupRef::Ordinal(ordinal),
            span: Span::default(),
        }
    }

    /// Build a sequence, removing dropped parts
    ///
    /// A sequence made only of dropped parts is itself dropped.
    pub fn sequence_pruned(items: Vec<Node>) -> Self {
        let had_items = !items.is_empty();
        let mut kept: Vec<Node> = items
            .into_iter()
            .filter(|item| !matches!(item, Node::Dropped))
            .collect();
        match kept.len() {
            0 if had_items => Node::Dropped,
            0 => Node::Empty,
            1 => kept.swap_remove(0),
            _ => Node::Sequence(kept),
        }
    }

    /// Build an alternation, removing dropped branches
    ///
    /// An alternation whose branches were all dropped is itself dropped.
    pub fn alternation_pruned(branches: Vec<Node>) -> Self {
        let mut kept: Vec<Node> = branches
            .into_iter()
            .filter(|branch| !matches!(branch, Node::Dropped))
            .collect();
        match kept.len() {
            0 => Node::Dropped,
            1 => kept.swap_remove(0),
            _ => Node::Alternation(kept),
        }
    }

    /// Whether this is a subexpression-call placeholder
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Node::SubexpCall { .. })
    }

    /// Iterate over direct children
    pub(crate) fn children(&self) -> Box<dyn Iterator<Item = &Node> + '_> {
        match self {
            Node::Sequence(items) | Node::Alternation(items) => Box::new(items.iter()),
            Node::Capture { body, .. }
            | Node::Atomic { body, .. }
            | Node::NonCapturing(body)
            | Node::Look { body, .. }
            | Node::Quantified { body, .. } => Box::new(std::iter::once(body.as_ref())),
            _ => Box::new(std::iter::empty()),
        }
    }

    /// Number of nodes in the tree, this one included
    pub(crate) fn node_count(&self) -> usize {
        1 + self.children().map(Node::node_count).sum::<usize>()
    }

    /// Whether no placeholders or deferred backreferences remain anywhere in the tree
    pub fn is_resolved(&self) -> bool {
        match self {
            Node::SubexpCall { .. } => false,
            Node::Backreference {
                target: GroupRef::Deferred(_),
                ..
            } => false,
            node => node.children().all(Node::is_resolved),
        }
    }

    /// Whether the tree contains a capturing group
    pub fn contains_capture(&self) -> bool {
        matches!(self, Node::Capture { .. } | Node::Atomic { .. })
            || self.children().any(Node::contains_capture)
    }

    /// Whether the rendered text ends in a backreference a digit could extend
    fn ends_with_backreference(&self) -> bool {
        match self {
            Node::Backreference { .. } => true,
            Node::Sequence(items) => items
                .iter()
                .rev()
                .find(|item| !matches!(item, Node::Empty | Node::Dropped))
                .is_some_and(Node::ends_with_backreference),
            _ => false,
        }
    }

    fn needs_parens_for_quantifier(&self) -> bool {
        matches!(
            self,
            Node::Empty
                | Node::Dropped
                | Node::Assertion(_)
                | Node::Sequence(_)
                | Node::Alternation(_)
                | Node::Atomic { .. }
                | Node::Look { .. }
                | Node::Quantified { .. }
        )
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Empty | Node::Dropped => Ok(()),
            Node::Atom(text) | Node::Assertion(text) => f.write_str(text),
            Node::Sequence(items) => {
                let mut after_backreference = false;
                for item in items {
                    let rendered = match item {
                        Node::Alternation(_) => format!("(?:{})", item),
                        _ => item.to_string(),
                    };
                    if after_backreference && rendered.starts_with(|c: char| c.is_ascii_digit()) {
                        // keep `\1` followed by `0` from reading as `\10`
                        f.write_str("(?:)")?;
                    }
                    f.write_str(&rendered)?;
                    if !rendered.is_empty() {
                        after_backreference = item.ends_with_backreference();
                    }
                }
                Ok(())
            }
            Node::Alternation(branches) => {
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{}", branch)?;
                }
                Ok(())
            }
            Node::Capture { body, .. } => write!(f, "({})", body),
            Node::NonCapturing(body) => write!(f, "(?:{})", body),
            // the empty group keeps a following digit out of the backreference
            Node::Atomic { ordinal, body } => write!(f, "(?=({}))\\{}(?:)", body, ordinal),
            Node::Look { kind, body } => write!(f, "{}{})", kind.opener(), body),
            Node::Quantified { body, quantifier } => {
                if body.needs_parens_for_quantifier() {
                    write!(f, "(?:{}){}", body, quantifier.to_target_string())
                } else {
                    write!(f, "{}{}", body, quantifier.to_target_string())
                }
            }
            Node::Backreference { target, .. } | Node::SubexpCall { target, .. } => {
                let prefix = if self.is_placeholder() { "\\g" } else { "\\k" };
                match target {
                    GroupRef::Ordinal(n) if !self.is_placeholder() => write!(f, "\\{}", n),
                    GroupRef::Ordinal(n) => write!(f, "{}<{}>", prefix, n),
                    GroupRef::Deferred(reference) => write!(f, "{}<{}>", prefix, reference),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::RepeatKind;

    #[test]
    fn test_atomic_emulation_shape() {
        let node = Node::atomic(
            1,
            Node::Alternation(vec![
                Node::Sequence(vec![Node::atom("a"), Node::atom("a")]),
                Node::atom("a"),
            ]),
        );
        assert_eq!(node.to_string(), "(?=(aa|a))\\1(?:)");
        assert!(node.contains_capture());

        let quantified = Node::Quantified {
            body: Box::new(Node::atomic(2, Node::atom("b"))),
            quantifier: Quantifier::greedy(RepeatKind::Optional),
        };
        assert_eq!(quantified.to_string(), "(?:(?=(b))\\2(?:))?");
    }

    #[test]
    fn test_digit_after_backreference_is_separated() {
        let node = Node::Sequence(vec![
            Node::capture(1, Node::atom("a")),
            Node::backreference(1),
            Node::atom("0"),
        ]);
        assert_eq!(node.to_string(), "(a)\\1(?:)0");
    }

    #[test]
    fn test_quantified_sequence_gets_parens() {
        let node = Node::Quantified {
            body: Box::new(Node::Sequence(vec![Node::atom("a"), Node::atom("b")])),
            quantifier: Quantifier::lazy(RepeatKind::ZeroOrMore),
        };
        assert_eq!(node.to_string(), "(?:ab)*?");

        let node = Node::Quantified {
            body: Box::new(Node::capture(1, Node::atom("a"))),
            quantifier: Quantifier::greedy(RepeatKind::AtMost(2)),
        };
        assert_eq!(node.to_string(), "(a){0,2}");
    }

    #[test]
    fn test_alternation_inside_sequence_gets_parens() {
        let node = Node::Sequence(vec![
            Node::atom("x"),
            Node::Alternation(vec![Node::atom("a"), Node::atom("b")]),
        ]);
        assert_eq!(node.to_string(), "x(?:a|b)");
    }

    #[test]
    fn test_pruning() {
        assert_eq!(
            Node::alternation_pruned(vec![Node::atom("b"), Node::Dropped]),
            Node::atom("b")
        );
        assert_eq!(
            Node::alternation_pruned(vec![Node::Dropped, Node::Dropped]),
            Node::Dropped
        );
        assert_eq!(
            Node::sequence_pruned(vec![Node::Dropped, Node::Dropped]),
            Node::Dropped
        );
        assert_eq!(Node::sequence_pruned(vec![]), Node::Empty);
        assert_eq!(
            Node::sequence_pruned(vec![Node::atom("x"), Node::Dropped, Node::atom("y")]),
            Node::Sequence(vec![Node::atom("x"), Node::atom("y")])
        );
    }

    #[test]
    fn test_resolution_state() {
        let call = Node::SubexpCall {
            target: GroupRef::Ordinal(1),
            span: Span::default(),
        };
        assert!(call.is_placeholder());
        let tree = Node::capture(1, Node::Sequence(vec![Node::atom("a"), call]));
        assert!(!tree.is_resolved());
        assert!(tree.contains_capture());

        let deferred = Node::Backreference {
            target: GroupRef::Deferred(Reference::Absolute(3)),
            span: Span::default(),
        };
        assert!(!deferred.is_resolved());
        assert!(Node::backreference(2).is_resolved());
    }
}
