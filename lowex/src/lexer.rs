//! Lexer for tokenizing origin-dialect patterns
//!
//! This module provides a tokenizer that converts Onigmo-style pattern
//! strings into a stream of tokens for parsing. Every token carries the byte
//! span it was read from so later stages can point diagnostics at the source.

use std::fmt;

use crate::ast::{Reference, RepeatKind};
use crate::error::{LexerErrorKind, ParseError, Span};

/// A token in an origin-dialect pattern
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Left parenthesis `(` (capturing group)
    LeftParen,
    /// Right parenthesis `)`
    RightParen,
    /// Non-capturing group opener `(?:`
    NonCapturing,
    /// Named group opener `(?<name>` or `(?'name'`
    NamedGroupStart(String),
    /// Atomic group opener `(?>`
    Atomic,
    /// Lookahead opener `(?=`
    Lookahead,
    /// Negative lookahead opener `(?!`
    NegativeLookahead,
    /// Lookbehind opener `(?<=`
    Lookbehind,
    /// Negative lookbehind opener `(?<!`
    NegativeLookbehind,
    /// Scoped option group opener `(?imx-imx:`
    OptionGroupStart(String),
    /// Bare option switch `(?imx-imx)`
    OptionSwitch(String),
    /// Absent operator opener `(?~`
    Absent,
    /// Left bracket `[` (start of character class)
    LeftBracket,
    /// Right bracket `]` (end of character class)
    RightBracket,
    /// Unescaped `-` inside a character class
    ClassDash,
    /// Pipe `|` (alternation)
    Pipe,
    /// Caret `^` (line anchor, or negation right after `[`)
    Caret,
    /// Dollar `$` (line anchor)
    Dollar,
    /// Dot `.` (any character)
    Dot,
    /// Star `*`
    Star,
    /// Plus `+`
    Plus,
    /// Question `?`
    Question,
    /// Counted repetition `{n}`, `{n,}`, `{,m}`, `{n,m}`
    Repeat(RepeatKind),
    /// Character class shorthand (\d, \w, \s, \h and negations)
    Shorthand(char),
    /// Word boundary assertion (\b)
    WordBoundary,
    /// Non-word boundary assertion (\B)
    NonWordBoundary,
    /// Start of input (\A)
    StartOfInput,
    /// End of input (\z)
    EndOfInput,
    /// End of input or before a final newline (\Z)
    EndOfInputOrNewline,
    /// Start of match attempt (\G)
    MatchStart,
    /// An escape with special meaning (\K, \R, \X)
    Escape(char),
    /// A backreference (\1, \k<..>, \k'..')
    Backref(Reference),
    /// A subexpression call (\g<..>, \g'..')
    SubexpCall(Reference),
    /// A literal character (escapes already decoded)
    Literal(char),
    /// End of input
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LeftParen => write!(f, "`(`"),
            Token::RightParen => write!(f, "`)`"),
            Token::NonCapturing => write!(f, "`(?:`"),
            Token::NamedGroupStart(name) => write!(f, "named group `{}`", name),
            Token::Atomic => write!(f, "`(?>`"),
            Token::Lookahead => write!(f, "`(?=`"),
            Token::NegativeLookahead => write!(f, "`(?!`"),
            Token::Lookbehind => write!(f, "`(?<=`"),
            Token::NegativeLookbehind => write!(f, "`(?<!`"),
            Token::OptionGroupStart(flags) => write!(f, "option group `(?{}:`", flags),
            Token::OptionSwitch(flags) => write!(f, "option switch `(?{})`", flags),
            Token::Absent => write!(f, "`(?~`"),
            Token::LeftBracket => write!(f, "`[`"),
            Token::RightBracket => write!(f, "`]`"),
            Token::ClassDash => write!(f, "`-`"),
            Token::Pipe => write!(f, "`|`"),
            Token::Caret => write!(f, "`^`"),
            Token::Dollar => write!(f, "`$`"),
            Token::Dot => write!(f, "`.`"),
            Token::Star => write!(f, "`*`"),
            Token::Plus => write!(f, "`+`"),
            Token::Question => write!(f, "`?`"),
            Token::Repeat(kind) => write!(f, "repetition `{}`", kind),
            Token::Shorthand(c) => write!(f, "shorthand `\\{}`", c),
            Token::WordBoundary => write!(f, "boundary `\\b`"),
            Token::NonWordBoundary => write!(f, "boundary `\\B`"),
            Token::StartOfInput => write!(f, "anchor `\\A`"),
            Token::EndOfInput => write!(f, "anchor `\\z`"),
            Token::EndOfInputOrNewline => write!(f, "anchor `\\Z`"),
            Token::MatchStart => write!(f, "anchor `\\G`"),
            Token::Escape(c) => write!(f, "escape `\\{}`", c),
            Token::Backref(reference) => write!(f, "backref `\\k<{}>`", reference),
            Token::SubexpCall(reference) => write!(f, "call `\\g<{}>`", reference),
            Token::Literal(c) => write!(f, "literal `{}`", c),
            Token::Eof => write!(f, "EOF"),
        }
    }
}

/// Lexer for tokenizing origin-dialect patterns
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    /// Byte offset of `current_char`
    position: usize,
    current_char: Option<char>,
    /// Whether we're currently inside a character class
    in_char_class: bool,
    /// Capturing groups opened so far; decides whether `\NN` is a backreference
    groups_opened: u32,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input string
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            position: 0,
            current_char: input.chars().next(),
            in_char_class: false,
            groups_opened: 0,
        }
    }

    /// Advance to the next character
    fn advance(&mut self) {
        if let Some(c) = self.current_char {
            self.position += c.len_utf8();
        }
        self.current_char = self.input[self.position..].chars().next();
    }

    fn error(&self, kind: LexerErrorKind) -> ParseError {
        ParseError::Lexer {
            position: self.position,
            kind,
        }
    }

    /// Check if a character is valid inside a group name
    fn is_identifier_char(c: char) -> bool {
        c.is_alphanumeric() || c == '_'
    }

    fn is_valid_name(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_alphabetic() || first == '_' => {
                chars.all(Self::is_identifier_char)
            }
            _ => false,
        }
    }

    /// Move back to an earlier byte offset
    fn rewind(&mut self, position: usize) {
        self.position = position;
        self.current_char = self.input[position..].chars().next();
    }

    /// Read a decimal number, if one starts here
    fn read_number(&mut self) -> Option<u32> {
        let start = self.position;
        while matches!(self.current_char, Some(c) if c.is_ascii_digit()) {
            self.advance();
        }
        self.input[start..self.position].parse().ok()
    }

    /// Read up to `max` digits in `radix`
    fn read_digits(&mut self, radix: u32, max: usize) -> Option<u32> {
        let mut value: Option<u32> = None;
        for _ in 0..max {
            match self.current_char.and_then(|c| c.to_digit(radix)) {
                Some(d) => {
                    value = Some(value.unwrap_or(0) * radix + d);
                    self.advance();
                }
                None => break,
            }
        }
        value
    }

    /// Read a group name up to `terminator` (the opener was consumed)
    fn read_group_name(&mut self, terminator: char) -> Result<String, ParseError> {
        let start = self.position;
        while let Some(c) = self.current_char {
            if c == terminator {
                break;
            }
            self.advance();
        }
        if self.current_char.is_none() {
            return Err(ParseError::UnexpectedEof);
        }
        let name = self.input[start..self.position].to_string();
        self.advance(); // consume terminator
        if Self::is_valid_name(&name) {
            Ok(name)
        } else {
            Err(ParseError::Lexer {
                position: start,
                kind: LexerErrorKind::InvalidGroupName(name),
            })
        }
    }

    /// Read the `<...>` or `'...'` part of `\k` and `\g`
    fn read_reference(&mut self, letter: char) -> Result<Reference, ParseError> {
        let close = match self.current_char {
            Some('<') => '>',
            Some('\'') => '\'',
            _ => return Err(self.error(LexerErrorKind::InvalidEscape(letter))),
        };
        self.advance();
        let start = self.position;
        while let Some(c) = self.current_char {
            if c == close {
                break;
            }
            self.advance();
        }
        if self.current_char.is_none() {
            return Err(ParseError::UnexpectedEof);
        }
        let content = &self.input[start..self.position];
        self.advance(); // consume closing delimiter
        parse_reference(content).ok_or_else(|| ParseError::Lexer {
            position: start,
            kind: LexerErrorKind::InvalidReference(content.to_string()),
        })
    }

    /// Decode an escape that stands for a single character
    fn decode_char_escape(&mut self, c: char) -> Result<char, ParseError> {
        let decoded = match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'f' => '\u{0C}',
            'v' => '\u{0B}',
            'a' => '\u{07}',
            'e' => '\u{1B}',
            '0' => {
                let value = self.read_digits(8, 2).unwrap_or(0);
                char::from_u32(value).ok_or_else(|| self.error(LexerErrorKind::InvalidEscape('0')))?
            }
            'x' => {
                let value = self
                    .read_digits(16, 2)
                    .ok_or_else(|| self.error(LexerErrorKind::InvalidEscape('x')))?;
                char::from_u32(value).ok_or_else(|| self.error(LexerErrorKind::InvalidEscape('x')))?
            }
            'u' => {
                let value = if self.current_char == Some('{') {
                    self.advance();
                    let value = self.read_digits(16, 6);
                    if self.current_char != Some('}') {
                        return Err(self.error(LexerErrorKind::InvalidEscape('u')));
                    }
                    self.advance();
                    value
                } else {
                    self.read_digits(16, 4)
                };
                value
                    .and_then(char::from_u32)
                    .ok_or_else(|| self.error(LexerErrorKind::InvalidEscape('u')))?
            }
            'c' => {
                let target = self
                    .current_char
                    .filter(|t| t.is_ascii())
                    .ok_or_else(|| self.error(LexerErrorKind::InvalidEscape('c')))?;
                self.advance();
                char::from_u32(target as u32 & 0x1F)
                    .ok_or_else(|| self.error(LexerErrorKind::InvalidEscape('c')))?
            }
            other => other,
        };
        Ok(decoded)
    }

    /// Read an escape sequence outside a class (backslash already consumed)
    fn read_escape(&mut self) -> Result<Token, ParseError> {
        let c = self
            .current_char
            .ok_or_else(|| self.error(LexerErrorKind::TrailingBackslash))?;
        self.advance();
        let token = match c {
            '1'..='9' => self.read_numeric_escape(c)?,
            'k' => Token::Backref(self.read_reference('k')?),
            'g' => Token::SubexpCall(self.read_reference('g')?),
            'd' | 'D' | 'w' | 'W' | 's' | 'S' | 'h' | 'H' => Token::Shorthand(c),
            'b' => Token::WordBoundary,
            'B' => Token::NonWordBoundary,
            'A' => Token::StartOfInput,
            'z' => Token::EndOfInput,
            'Z' => Token::EndOfInputOrNewline,
            'G' => Token::MatchStart,
            'K' | 'R' | 'X' => Token::Escape(c),
            'p' | 'P' => {
                return Err(self.error(LexerErrorKind::UnsupportedSyntax(
                    "unicode property escape",
                )));
            }
            other => Token::Literal(self.decode_char_escape(other)?),
        };
        Ok(token)
    }

    /// Read `\N...` (backslash and first digit consumed)
    ///
    /// A single digit, or a number no larger than the count of groups opened
    /// so far, is a backreference. Otherwise the digits are an octal escape
    /// of up to three digits, or a literal `8`/`9`, and any remaining digits
    /// are lexed as literals.
    fn read_numeric_escape(&mut self, first: char) -> Result<Token, ParseError> {
        let digits_start = self.position - first.len_utf8();
        let mut num = first as u32 - '0' as u32;
        while let Some(d) = self.current_char.and_then(|d| d.to_digit(10)) {
            num = num
                .checked_mul(10)
                .and_then(|n| n.checked_add(d))
                .ok_or_else(|| self.error(LexerErrorKind::InvalidReference(num.to_string())))?;
            self.advance();
        }
        if num <= 9 || num <= self.groups_opened {
            return Ok(Token::Backref(Reference::Absolute(num)));
        }

        self.rewind(digits_start);
        let value = match first {
            '8' | '9' => {
                self.advance();
                first as u32
            }
            _ => self.read_digits(8, 3).unwrap_or(0),
        };
        char::from_u32(value)
            .map(Token::Literal)
            .ok_or_else(|| self.error(LexerErrorKind::InvalidEscape(first)))
    }

    /// Read the part of a group opener after `(`
    fn read_group_opener(&mut self) -> Result<Option<Token>, ParseError> {
        if self.current_char != Some('?') {
            return Ok(Some(Token::LeftParen));
        }
        self.advance(); // consume '?'
        let c = self.current_char.ok_or(ParseError::UnexpectedEof)?;
        let token = match c {
            ':' => {
                self.advance();
                Token::NonCapturing
            }
            '>' => {
                self.advance();
                Token::Atomic
            }
            '=' => {
                self.advance();
                Token::Lookahead
            }
            '!' => {
                self.advance();
                Token::NegativeLookahead
            }
            '~' => {
                self.advance();
                Token::Absent
            }
            '#' => {
                // comment: skip through the closing paren
                while let Some(c) = self.current_char {
                    self.advance();
                    if c == ')' {
                        return Ok(None);
                    }
                }
                return Err(ParseError::UnexpectedEof);
            }
            '(' => {
                return Err(self.error(LexerErrorKind::UnsupportedSyntax("conditional group")));
            }
            '<' => {
                self.advance();
                match self.current_char {
                    Some('=') => {
                        self.advance();
                        Token::Lookbehind
                    }
                    Some('!') => {
                        self.advance();
                        Token::NegativeLookbehind
                    }
                    _ => Token::NamedGroupStart(self.read_group_name('>')?),
                }
            }
            '\'' => {
                self.advance();
                Token::NamedGroupStart(self.read_group_name('\'')?)
            }
            'i' | 'm' | 'x' | '-' => {
                let start = self.position;
                while matches!(self.current_char, Some('i' | 'm' | 'x' | '-')) {
                    self.advance();
                }
                let flags = self.input[start..self.position].to_string();
                match self.current_char {
                    Some(':') => {
                        self.advance();
                        Token::OptionGroupStart(flags)
                    }
                    Some(')') => {
                        self.advance();
                        Token::OptionSwitch(flags)
                    }
                    Some(other) => return Err(self.error(LexerErrorKind::UnexpectedChar(other))),
                    None => return Err(ParseError::UnexpectedEof),
                }
            }
            other => return Err(self.error(LexerErrorKind::UnexpectedChar(other))),
        };
        Ok(Some(token))
    }

    /// Read a `{...}` repetition; `None` means the brace is a literal
    fn read_repeat(&mut self) -> Result<Option<Token>, ParseError> {
        let saved = (self.position, self.current_char);
        let min = self.read_number();
        let kind = if self.current_char == Some(',') {
            self.advance();
            let max = self.read_number();
            match (min, max) {
                (Some(n), Some(m)) if n > m => {
                    return Err(ParseError::InvalidQuantifier(format!("{{{},{}}}", n, m)));
                }
                (Some(n), Some(m)) => Some(RepeatKind::Between(n, m)),
                (Some(n), None) => Some(RepeatKind::AtLeast(n)),
                (None, Some(m)) => Some(RepeatKind::AtMost(m)),
                (None, None) => None,
            }
        } else {
            min.map(RepeatKind::Exactly)
        };

        match kind {
            Some(kind) if self.current_char == Some('}') => {
                self.advance();
                Ok(Some(Token::Repeat(kind)))
            }
            _ => {
                (self.position, self.current_char) = saved;
                Ok(None)
            }
        }
    }

    fn scan_pattern(&mut self) -> Result<Option<Token>, ParseError> {
        let Some(c) = self.current_char else {
            return Ok(Some(Token::Eof));
        };
        self.advance();
        let token = match c {
            '\\' => self.read_escape()?,
            '(' => {
                let opener = self.read_group_opener()?;
                if matches!(opener, Some(Token::LeftParen | Token::NamedGroupStart(_))) {
                    self.groups_opened += 1;
                }
                return Ok(opener);
            }
            ')' => Token::RightParen,
            '[' => {
                self.in_char_class = true;
                Token::LeftBracket
            }
            '|' => Token::Pipe,
            '^' => Token::Caret,
            '$' => Token::Dollar,
            '.' => Token::Dot,
            '*' => Token::Star,
            '+' => Token::Plus,
            '?' => Token::Question,
            '{' => self.read_repeat()?.unwrap_or(Token::Literal('{')),
            c => Token::Literal(c),
        };
        Ok(Some(token))
    }

    fn scan_class(&mut self) -> Result<Token, ParseError> {
        let Some(c) = self.current_char else {
            return Ok(Token::Eof);
        };
        self.advance();
        let token = match c {
            ']' => {
                self.in_char_class = false;
                Token::RightBracket
            }
            '^' => Token::Caret,
            '-' => Token::ClassDash,
            '\\' => {
                let e = self
                    .current_char
                    .ok_or_else(|| self.error(LexerErrorKind::TrailingBackslash))?;
                self.advance();
                match e {
                    'd' | 'D' | 'w' | 'W' | 's' | 'S' | 'h' | 'H' => Token::Shorthand(e),
                    // backspace inside a class
                    'b' => Token::Literal('\u{08}'),
                    'p' | 'P' => {
                        return Err(self.error(LexerErrorKind::UnsupportedSyntax(
                            "unicode property escape",
                        )));
                    }
                    other => Token::Literal(self.decode_char_escape(other)?),
                }
            }
            c => Token::Literal(c),
        };
        Ok(token)
    }

    /// Get the next token and its span
    pub fn next_token(&mut self) -> Result<(Token, Span), ParseError> {
        loop {
            let start = self.position;
            let token = if self.in_char_class {
                Some(self.scan_class()?)
            } else {
                self.scan_pattern()?
            };
            if let Some(token) = token {
                return Ok((token, Span::new(start, self.position)));
            }
        }
    }

    /// Tokenize the entire input and return a vector of tokens
    pub fn tokenize(&mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let (token, _) = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        Ok(tokens)
    }
}

/// Parse the inside of `\k<...>` / `\g<...>`
fn parse_reference(content: &str) -> Option<Reference> {
    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if let Some(rest) = content.strip_prefix('-') {
        let n: i32 = rest.parse().ok().filter(|_| all_digits(rest))?;
        return (n > 0).then_some(Reference::Relative(-n));
    }
    if let Some(rest) = content.strip_prefix('+') {
        let n: i32 = rest.parse().ok().filter(|_| all_digits(rest))?;
        return (n > 0).then_some(Reference::Relative(n));
    }
    if all_digits(content) {
        return content.parse().ok().map(Reference::Absolute);
    }
    if Lexer::is_valid_name(content) {
        return Some(Reference::Named(content.to_string()));
    }
    None
}
