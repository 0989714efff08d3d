//! Abstract Syntax Tree (AST) for origin-dialect patterns
//!
//! This module defines the tree the converter consumes. It covers the
//! Onigmo-style syntax the pipeline understands:
//! - Literals, character classes, shorthands, anchors
//! - Quantifiers (greedy, lazy `?` and possessive `+` forms)
//! - Groups (capturing, named, non-capturing, atomic, lookaround, options)
//! - Backreferences and subexpression calls in absolute, relative and named form
//!
//! `Display` renders a tree back into origin-dialect syntax.

use std::fmt;

use crate::error::Span;

/// An expression in the AST
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Empty expression (matches empty string)
    Empty,

    /// A literal character
    Literal(char),

    /// Any character (dot)
    Any,

    /// A sequence of expressions (concatenation)
    Sequence(Vec<Expr>),

    /// Alternation (e.g., a|b|c)
    Alternation(Vec<Expr>),

    /// A character class [abc] or [^abc] or [a-z]
    CharacterClass(CharacterClass),

    /// Quantified expression (e.g., a*, a+?, a{3,5}, a*+)
    Quantified {
        /// The expression being quantified
        expr: Box<Expr>,
        /// The quantifier
        quantifier: Quantifier,
    },

    /// A capturing group: (...)
    Group(Box<Expr>),

    /// A non-capturing group: (?:...)
    NonCapturingGroup(Box<Expr>),

    /// A named capturing group: (?<name>...) or (?'name'...)
    NamedGroup {
        /// The name of the group
        name: String,
        /// The pattern inside the group
        pattern: Box<Expr>,
    },

    /// Atomic group (?>...)
    AtomicGroup(Box<Expr>),

    /// Positive lookahead (?=...)
    Lookahead(Box<Expr>),

    /// Negative lookahead (?!...)
    NegativeLookahead(Box<Expr>),

    /// Positive lookbehind (?<=...)
    Lookbehind(Box<Expr>),

    /// Negative lookbehind (?<!...)
    NegativeLookbehind(Box<Expr>),

    /// Inline options: `(?im-x:...)` with a pattern, `(?im-x)` without
    OptionGroup {
        /// The flag letters as written, e.g. `"i-m"`
        flags: String,
        /// The scoped pattern, `None` for a bare option switch
        pattern: Option<Box<Expr>>,
        /// Location of the group opener
        span: Span,
    },

    /// Absent operator (?~...)
    Absent {
        /// The pattern that must not occur
        pattern: Box<Expr>,
        /// Location of the group opener
        span: Span,
    },

    /// Start of line anchor (^)
    StartAnchor,

    /// End of line anchor ($)
    EndAnchor,

    /// Start of input (\A)
    StartOfInput,

    /// End of input (\z)
    EndOfInput,

    /// End of input or before a final newline (\Z)
    EndOfInputOrNewline,

    /// Start of the match attempt (\G)
    MatchStart(Span),

    /// Word boundary assertion (\b)
    WordBoundary,

    /// Non-word boundary assertion (\B)
    NonWordBoundary,

    /// Character class shorthand (\w, \d, \s, \h and their negations)
    Shorthand(char),

    /// An escape with special meaning and no one-to-one target form (\K, \R, \X)
    Escape {
        /// The escaped letter
        letter: char,
        /// Location of the escape
        span: Span,
    },

    /// Backreference (\1, \k<1>, \k<-1>, \k<name>)
    Backreference {
        /// The referenced group
        reference: Reference,
        /// Location of the backreference
        span: Span,
    },

    /// Subexpression call (\g<0>, \g<1>, \g<-1>, \g<+1>, \g<name>)
    SubexpCall {
        /// The called group
        reference: Reference,
        /// Location of the call
        span: Span,
    },
}

/// How a backreference or subexpression call names its group
///
/// Numbers count the groups the pattern author wrote, in order of their
/// opening parenthesis.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    /// Group number (`\2`, `\k<2>`); `0` means the whole pattern
    Absolute(u32),
    /// Offset from the reference position: negative counts back, positive forward
    Relative(i32),
    /// Group name
    Named(String),
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Absolute(n) => write!(f, "{}", n),
            Reference::Relative(n) if *n > 0 => write!(f, "+{}", n),
            Reference::Relative(n) => write!(f, "{}", n),
            Reference::Named(name) => f.write_str(name),
        }
    }
}

/// A character class `[abc]`, `[^abc]`, or `[a-z]`
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterClass {
    /// Whether the class is negated [^...]
    pub negated: bool,
    /// The items in the class
    pub items: Vec<ClassItem>,
}

/// An item in a character class
#[derive(Debug, Clone, PartialEq)]
pub enum ClassItem {
    /// A single character
    Char(char),
    /// A character range (e.g., a-z)
    Range(char, char),
    /// A character class shorthand (\d, \w, \s, \h, etc.)
    Shorthand(char),
}

/// How many times a quantified expression repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatKind {
    /// Zero or more (*)
    ZeroOrMore,
    /// One or more (+)
    OneOrMore,
    /// Zero or one (?)
    Optional,
    /// Exactly n times ({n})
    Exactly(u32),
    /// At least n times ({n,})
    AtLeast(u32),
    /// At most m times ({,m})
    AtMost(u32),
    /// Between n and m times ({n,m})
    Between(u32, u32),
}

/// Backtracking behaviour of a quantifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuantifierMode {
    /// Match as much as possible, give back on failure
    #[default]
    Greedy,
    /// Match as little as possible (`?` suffix)
    Lazy,
    /// Match as much as possible, never give back (`+` suffix)
    Possessive,
}

/// A quantifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantifier {
    /// Repetition bounds
    pub kind: RepeatKind,
    /// Backtracking behaviour
    pub mode: QuantifierMode,
}

impl Quantifier {
    /// A greedy quantifier
    pub fn greedy(kind: RepeatKind) -> Self {
        Quantifier {
            kind,
            mode: QuantifierMode::Greedy,
        }
    }

    /// A lazy quantifier
    pub fn lazy(kind: RepeatKind) -> Self {
        Quantifier {
            kind,
            mode: QuantifierMode::Lazy,
        }
    }

    /// A possessive quantifier
    pub fn possessive(kind: RepeatKind) -> Self {
        Quantifier {
            kind,
            mode: QuantifierMode::Possessive,
        }
    }

    /// The same bounds, backtracking normally
    pub fn to_greedy(self) -> Self {
        Quantifier::greedy(self.kind)
    }

    /// Render the bounds in ECMAScript syntax
    ///
    /// Possessive quantifiers have no target form; callers emulate them and
    /// pass the greedy version here.
    pub fn to_target_string(&self) -> String {
        let bounds = match self.kind {
            RepeatKind::AtMost(m) => format!("{{0,{}}}", m),
            kind => kind.to_string(),
        };
        match self.mode {
            QuantifierMode::Lazy => format!("{}?", bounds),
            QuantifierMode::Greedy | QuantifierMode::Possessive => bounds,
        }
    }
}

impl fmt::Display for RepeatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepeatKind::ZeroOrMore => f.write_str("*"),
            RepeatKind::OneOrMore => f.write_str("+"),
            RepeatKind::Optional => f.write_str("?"),
            RepeatKind::Exactly(n) => write!(f, "{{{}}}", n),
            RepeatKind::AtLeast(n) => write!(f, "{{{},}}", n),
            RepeatKind::AtMost(m) => write!(f, "{{,{}}}", m),
            RepeatKind::Between(n, m) => write!(f, "{{{},{}}}", n, m),
        }
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        match self.mode {
            QuantifierMode::Greedy => Ok(()),
            QuantifierMode::Lazy => f.write_str("?"),
            QuantifierMode::Possessive => f.write_str("+"),
        }
    }
}

impl Expr {
    /// Create a literal expression
    pub fn literal(c: char) -> Self {
        Expr::Literal(c)
    }

    /// Create a sequence from a vector of expressions
    pub fn sequence(mut exprs: Vec<Expr>) -> Self {
        match exprs.len() {
            0 => Expr::Empty,
            1 => exprs.swap_remove(0),
            _ => Expr::Sequence(exprs),
        }
    }

    /// Create an alternation from a vector of expressions
    pub fn alternation(mut exprs: Vec<Expr>) -> Self {
        match exprs.len() {
            0 => Expr::Empty,
            1 => exprs.swap_remove(0),
            _ => Expr::Alternation(exprs),
        }
    }

    /// Create a sequence of literals from a string
    pub fn text(s: &str) -> Self {
        Expr::sequence(s.chars().map(Expr::Literal).collect())
    }

    /// Create a quantified expression
    pub fn quantified(expr: Expr, quantifier: Quantifier) -> Self {
        Expr::Quantified {
            expr: Box::new(expr),
            quantifier,
        }
    }

    /// Create a capturing group
    pub fn group(expr: Expr) -> Self {
        Expr::Group(Box::new(expr))
    }

    /// Create a named group expression
    pub fn named_group(name: impl Into<String>, pattern: Expr) -> Self {
        Expr::NamedGroup {
            name: name.into(),
            pattern: Box::new(pattern),
        }
    }

    /// Create an atomic group
    pub fn atomic_group(expr: Expr) -> Self {
        Expr::AtomicGroup(Box::new(expr))
    }

    /// Create a backreference with no source location
    pub fn backreference(reference: Reference) -> Self {
        Expr::Backreference {
            reference,
            span: Span::default(),
        }
    }

    /// Create a subexpression call with no source location
    pub fn subexp_call(reference: Reference) -> Self {
        Expr::SubexpCall {
            reference,
            span: Span::default(),
        }
    }

    fn needs_parens_for_quantifier(&self) -> bool {
        matches!(
            self,
            Expr::Sequence(_) | Expr::Alternation(_) | Expr::Quantified { .. } | Expr::Empty
        )
    }
}

/// Characters that must be escaped to stand for themselves outside a class
fn is_origin_meta(c: char) -> bool {
    matches!(
        c,
        '\\' | '^' | '$' | '.' | '|' | '?' | '*' | '+' | '(' | ')' | '[' | ']' | '{' | '}'
    )
}

fn write_origin_char(f: &mut fmt::Formatter<'_>, c: char, in_class: bool) -> fmt::Result {
    match c {
        '\n' => f.write_str("\\n"),
        '\t' => f.write_str("\\t"),
        '\r' => f.write_str("\\r"),
        c if c.is_control() => write!(f, "\\u{:04X}", c as u32),
        c if in_class && matches!(c, '\\' | ']' | '[' | '^' | '-') => write!(f, "\\{}", c),
        c if !in_class && is_origin_meta(c) => write!(f, "\\{}", c),
        c => write!(f, "{}", c),
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        if self.negated {
            f.write_str("^")?;
        }
        for item in &self.items {
            match item {
                ClassItem::Char(c) => write_origin_char(f, *c, true)?,
                ClassItem::Range(start, end) => {
                    write_origin_char(f, *start, true)?;
                    f.write_str("-")?;
                    write_origin_char(f, *end, true)?;
                }
                ClassItem::Shorthand(c) => write!(f, "\\{}", c)?,
            }
        }
        f.write_str("]")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Empty => Ok(()),
            Expr::Literal(c) => write_origin_char(f, *c, false),
            Expr::Any => f.write_str("."),
            Expr::Sequence(exprs) => {
                for expr in exprs {
                    if matches!(expr, Expr::Alternation(_)) {
                        write!(f, "(?:{})", expr)?;
                    } else {
                        write!(f, "{}", expr)?;
                    }
                }
                Ok(())
            }
            Expr::Alternation(exprs) => {
                for (i, expr) in exprs.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{}", expr)?;
                }
                Ok(())
            }
            Expr::CharacterClass(cc) => write!(f, "{}", cc),
            Expr::Quantified { expr, quantifier } => {
                if expr.needs_parens_for_quantifier() {
                    write!(f, "(?:{}){}", expr, quantifier)
                } else {
                    write!(f, "{}{}", expr, quantifier)
                }
            }
            Expr::Group(expr) => write!(f, "({})", expr),
            Expr::NonCapturingGroup(expr) => write!(f, "(?:{})", expr),
            Expr::NamedGroup { name, pattern } => write!(f, "(?<{}>{})", name, pattern),
            Expr::AtomicGroup(expr) => write!(f, "(?>{})", expr),
            Expr::Lookahead(expr) => write!(f, "(?={})", expr),
            Expr::NegativeLookahead(expr) => write!(f, "(?!{})", expr),
            Expr::Lookbehind(expr) => write!(f, "(?<={})", expr),
            Expr::NegativeLookbehind(expr) => write!(f, "(?<!{})", expr),
            Expr::OptionGroup { flags, pattern, .. } => match pattern {
                Some(pattern) => write!(f, "(?{}:{})", flags, pattern),
                None => write!(f, "(?{})", flags),
            },
            Expr::Absent { pattern, .. } => write!(f, "(?~{})", pattern),
            Expr::StartAnchor => f.write_str("^"),
            Expr::EndAnchor => f.write_str("$"),
            Expr::StartOfInput => f.write_str("\\A"),
            Expr::EndOfInput => f.write_str("\\z"),
            Expr::EndOfInputOrNewline => f.write_str("\\Z"),
            Expr::MatchStart(_) => f.write_str("\\G"),
            Expr::WordBoundary => f.write_str("\\b"),
            Expr::NonWordBoundary => f.write_str("\\B"),
            Expr::Shorthand(c) => write!(f, "\\{}", c),
            Expr::Escape { letter, .. } => write!(f, "\\{}", letter),
            Expr::Backreference { reference, .. } => write!(f, "\\k<{}>", reference),
            Expr::SubexpCall { reference, .. } => write!(f, "\\g<{}>", reference),
        }
    }
}
