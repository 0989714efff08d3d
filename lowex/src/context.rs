//! Conversion-time state for one pattern
//!
//! A [`Context`] tracks every capture group the emitted pattern will contain,
//! in the order the converter opens them. This is essential for:
//! - Keeping group ordinals stable while synthetic groups are inserted
//! - Resolving backreferences and calls by number, offset or name
//! - Collecting diagnostics for lossy conversions
//!
//! One context serves exactly one conversion and is threaded by `&mut`
//! through the whole traversal.

use std::collections::HashMap;

use crate::ast::Reference;
use crate::diagnostic::Diagnostic;
use crate::error::{ConvertError, Result, Span};

/// Where a capture group came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Written by the pattern author
    Original,
    /// Introduced by the converter to emulate an unsupported construct
    Synthetic,
}

/// Information about a capture group in the emitted pattern
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureGroup {
    /// The index of the group in the emitted pattern (1-based, as in `\1`)
    pub ordinal: u32,
    /// The name the author gave the group, if any
    pub name: Option<String>,
    /// Whether the author wrote this group
    pub origin: Origin,
    /// The number the author would use for this group (`None` for synthetic groups)
    pub source_index: Option<u32>,
}

/// Outcome of looking up a reference at the current traversal position
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The group already exists
    Resolved(u32),
    /// The group may be opened later; resolve this absolute form once the tree is done
    Pending(Reference),
}

/// Mutable state of a single conversion
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Groups in ordinal order: `groups[n - 1].ordinal == n`
    groups: Vec<CaptureGroup>,
    /// Map from group name to the most recent ordinal carrying it
    name_to_ordinal: HashMap<String, u32>,
    /// Ordinals of author-written groups, in source order
    original_ordinals: Vec<u32>,
    diagnostics: Vec<Diagnostic>,
}

impl Context {
    /// Create a context with no groups
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new capture group at the current traversal position
    ///
    /// Must be called before the group's children are converted so that
    /// groups nested inside it receive later ordinals.
    pub fn open_group(&mut self, name: Option<&str>, origin: Origin) -> u32 {
        let ordinal = self.group_count() + 1;

        let source_index = match origin {
            Origin::Original => {
                self.original_ordinals.push(ordinal);
                Some(self.original_count())
            }
            Origin::Synthetic => None,
        };
        if let Some(name) = name {
            self.name_to_ordinal.insert(name.to_string(), ordinal);
        }

        log::debug!(
            "opened group {} ({:?}, source index {:?}, name {:?})",
            ordinal,
            origin,
            source_index,
            name
        );

        self.groups.push(CaptureGroup {
            ordinal,
            name: name.map(str::to_string),
            origin,
            source_index,
        });
        ordinal
    }

    /// Number of groups opened so far, original and synthetic
    pub fn group_count(&self) -> u32 {
        self.groups.len() as u32
    }

    /// Number of author-written groups opened so far
    pub fn original_count(&self) -> u32 {
        self.original_ordinals.len() as u32
    }

    /// Get group info by ordinal
    pub fn group(&self, ordinal: u32) -> Option<&CaptureGroup> {
        let index = ordinal.checked_sub(1)?;
        self.groups.get(index as usize)
    }

    /// Get all groups in ordinal order
    pub fn groups(&self) -> &[CaptureGroup] {
        &self.groups
    }

    /// Look up a reference against the groups opened so far
    ///
    /// Numbers and offsets count author-written groups only. A backward
    /// offset that reaches past the first group fails immediately; absolute
    /// numbers, names and forward offsets that do not exist yet come back
    /// as [`Lookup::Pending`] in absolute or named form.
    pub fn lookup(&self, reference: &Reference, span: Span) -> Result<Lookup> {
        match reference {
            Reference::Absolute(0) => Err(unresolvable(reference, span)),
            Reference::Absolute(n) => Ok(match self.original_ordinals.get(*n as usize - 1) {
                Some(ordinal) => Lookup::Resolved(*ordinal),
                None => Lookup::Pending(reference.clone()),
            }),
            Reference::Relative(offset) if *offset < 0 => {
                let back = offset.unsigned_abs() as usize;
                let count = self.original_ordinals.len();
                if back > count {
                    return Err(unresolvable(reference, span));
                }
                Ok(Lookup::Resolved(self.original_ordinals[count - back]))
            }
            Reference::Relative(0) => Err(unresolvable(reference, span)),
            Reference::Relative(offset) => Ok(Lookup::Pending(Reference::Absolute(
                self.original_count().saturating_add(offset.unsigned_abs()),
            ))),
            Reference::Named(name) => Ok(match self.name_to_ordinal.get(name) {
                Some(ordinal) => Lookup::Resolved(*ordinal),
                None => Lookup::Pending(reference.clone()),
            }),
        }
    }

    /// Resolve a reference to an ordinal, failing if the group does not exist yet
    ///
    /// Once the whole tree has been converted this is the final check for
    /// deferred references.
    pub fn resolve(&self, reference: &Reference, span: Span) -> Result<u32> {
        match self.lookup(reference, span)? {
            Lookup::Resolved(ordinal) => Ok(ordinal),
            Lookup::Pending(_) => Err(unresolvable(reference, span)),
        }
    }

    /// Record a lossy conversion; never aborts
    pub fn warn(&mut self, message: impl Into<String>, span: Option<Span>) {
        let diagnostic = Diagnostic::warning(message, span);
        log::warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// Diagnostics recorded so far
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the context, returning the group table and diagnostics
    pub fn into_parts(self) -> (Vec<CaptureGroup>, Vec<Diagnostic>) {
        (self.groups, self.diagnostics)
    }
}

pub(crate) fn unresolvable(reference: &Reference, span: Span) -> ConvertError {
    ConvertError::UnresolvableReference {
        reference: reference.to_string(),
        span,
    }
}
