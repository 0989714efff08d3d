//! Second pass: subexpression calls and deferred backreferences
//!
//! Runs once the first pass has opened every group, so the group table is
//! final. Each call is replaced by a non-capturing copy of the called
//! group's body; captures inside the copy are demoted to non-capturing
//! groups, which keeps every ordinal handed out in the first pass valid.
//!
//! Calls that would recurse (into the call site's own group, an enclosing
//! group, or a group currently being inlined) and calls nested deeper than
//! [`ConvertOptions::max_inline_depth`] are dropped with a warning, as are
//! calls made once the copies together exceed
//! [`ConvertOptions::max_inlined_nodes`]. Dropped alternation branches are
//! pruned.

use std::collections::{HashMap, HashSet};

use crate::ast::Reference;
use crate::context::{Context, unresolvable};
use crate::error::{Result, Span};
use crate::node::{GroupRef, Node};
use crate::options::ConvertOptions;

/// Resolve every placeholder and deferred backreference in `tree`
pub fn run(tree: &Node, ctx: &mut Context, options: &ConvertOptions) -> Result<Node> {
    let mut bodies = HashMap::new();
    collect_bodies(tree, &mut bodies);

    let mut folder = Folder {
        ctx,
        bodies: &bodies,
        max_depth: options.max_inline_depth,
        budget: options.max_inlined_nodes,
        max_nodes: options.max_inlined_nodes,
        active: Vec::new(),
        calls: Vec::new(),
        warned: HashSet::new(),
    };
    let folded = folder.fold(tree, 0, false)?;
    debug_assert!(folded.is_resolved());
    Ok(folded)
}

fn collect_bodies(node: &Node, bodies: &mut HashMap<u32, Node>) {
    if let Node::Capture { ordinal, body } = node {
        bodies.insert(*ordinal, body.as_ref().clone());
    }
    for child in node.children() {
        collect_bodies(child, bodies);
    }
}

struct Folder<'a> {
    ctx: &'a mut Context,
    bodies: &'a HashMap<u32, Node>,
    max_depth: usize,
    /// Nodes still available to inlined copies
    budget: usize,
    max_nodes: usize,
    /// Groups enclosing the current position, including those being inlined
    active: Vec<u32>,
    /// Call sites being inlined, innermost last
    calls: Vec<Span>,
    warned: HashSet<(Span, String)>,
}

impl Folder<'_> {
    fn fold(&mut self, node: &Node, depth: usize, in_copy: bool) -> Result<Node> {
        let folded = match node {
            Node::Sequence(items) => Node::sequence_pruned(self.fold_all(items, depth, in_copy)?),
            Node::Alternation(branches) => {
                Node::alternation_pruned(self.fold_all(branches, depth, in_copy)?)
            }
            Node::Capture { ordinal, body } => {
                self.active.push(*ordinal);
                let body = self.fold(body, depth, in_copy)?;
                self.active.pop();
                match (in_copy, body) {
                    (true, Node::Dropped) => Node::Dropped,
                    (true, body) => Node::non_capturing(body),
                    // the slot stays even when its contents are gone
                    (false, Node::Dropped) => Node::capture(*ordinal, Node::Empty),
                    (false, body) => Node::capture(*ordinal, body),
                }
            }
            Node::Atomic { ordinal, body } => match (in_copy, self.fold(body, depth, in_copy)?) {
                (true, Node::Dropped) => Node::Dropped,
                (true, body) => {
                    self.warn_in_copy(
                        "an atomic group or possessive quantifier copied by a subexpression call lost its atomicity",
                    );
                    Node::non_capturing(body)
                }
                (false, Node::Dropped) => Node::atomic(*ordinal, Node::Empty),
                (false, body) => Node::atomic(*ordinal, body),
            },
            Node::NonCapturing(body) => match self.fold(body, depth, in_copy)? {
                Node::Dropped => Node::Dropped,
                body @ Node::NonCapturing(_) => body,
                body => Node::non_capturing(body),
            },
            Node::Look { kind, body } => match self.fold(body, depth, in_copy)? {
                Node::Dropped => Node::Dropped,
                body => Node::look(*kind, body),
            },
            Node::Quantified { body, quantifier } => match self.fold(body, depth, in_copy)? {
                Node::Dropped => Node::Dropped,
                body => Node::Quantified {
                    body: Box::new(body),
                    quantifier: *quantifier,
                },
            },
            Node::Backreference { target, span } => Node::Backreference {
                target: GroupRef::Ordinal(self.resolve(target, *span)?),
                span: *span,
            },
            Node::SubexpCall { target, span } => self.inline(target, *span, depth)?,
            Node::Empty | Node::Atom(_) | Node::Assertion(_) | Node::Dropped => node.clone(),
        };
        Ok(folded)
    }

    fn fold_all(&mut self, nodes: &[Node], depth: usize, in_copy: bool) -> Result<Vec<Node>> {
        nodes
            .iter()
            .map(|node| self.fold(node, depth, in_copy))
            .collect()
    }

    fn inline(&mut self, target: &GroupRef, span: Span, depth: usize) -> Result<Node> {
        let ordinal = self.resolve(target, span)?;
        let number = self.source_number(ordinal);

        if self.active.contains(&ordinal) {
            self.warn_once(
                format!(
                    "recursive subexpression call to group {} is not supported; the call was dropped",
                    number
                ),
                span,
            );
            return Ok(Node::Dropped);
        }
        if depth >= self.max_depth {
            self.warn_once(
                format!(
                    "subexpression calls nested deeper than {} levels were truncated",
                    self.max_depth
                ),
                span,
            );
            return Ok(Node::Dropped);
        }

        let bodies = self.bodies;
        let Some(body) = bodies.get(&ordinal) else {
            return Err(unresolvable(&Reference::Absolute(number), span));
        };
        let cost = body.node_count();
        if cost > self.budget {
            self.warn_once(
                format!(
                    "subexpression calls expanding past {} nodes were truncated",
                    self.max_nodes
                ),
                span,
            );
            return Ok(Node::Dropped);
        }
        self.budget -= cost;

        log::debug!(
            "inlining group {} (ordinal {}) at {}, depth {}",
            number,
            ordinal,
            span,
            depth + 1
        );
        self.active.push(ordinal);
        self.calls.push(span);
        let copy = self.fold(body, depth + 1, true)?;
        self.calls.pop();
        self.active.pop();

        Ok(match copy {
            Node::Dropped => Node::Dropped,
            copy @ Node::NonCapturing(_) => copy,
            copy => Node::non_capturing(copy),
        })
    }

    fn resolve(&self, target: &GroupRef, span: Span) -> Result<u32> {
        match target {
            GroupRef::Ordinal(ordinal) => Ok(*ordinal),
            GroupRef::Deferred(reference) => self.ctx.resolve(reference, span),
        }
    }

    /// The number the pattern author uses for a group
    fn source_number(&self, ordinal: u32) -> u32 {
        self.ctx
            .group(ordinal)
            .and_then(|group| group.source_index)
            .unwrap_or(ordinal)
    }

    fn warn_in_copy(&mut self, message: &str) {
        let span = self.calls.last().copied().unwrap_or_default();
        self.warn_once(message.to_string(), span);
    }

    /// Copies of a body repeat the same call sites; report each one once
    fn warn_once(&mut self, message: String, span: Span) {
        if self.warned.insert((span, message.clone())) {
            self.ctx.warn(message, Some(span));
        }
    }
}
