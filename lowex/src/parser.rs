//! Parser for origin-dialect patterns
//!
//! This module provides a recursive descent parser that converts
//! tokens into an Abstract Syntax Tree (AST).
//!
//! Grammar (in order of precedence, lowest to highest):
//!   regex       := alternation
//!   alternation := sequence ( '|' sequence )*
//!   sequence    := quantified*
//!   quantified  := atom quantifier*
//!   quantifier  := ( '*' | '+' | '?' | '{' bounds '}' ) ( '?' | '+' )?
//!   atom        := literal | anchor | group | char_class | '.' | backref | call | escape
//!   group       := group_opener alternation ')'
//!   char_class  := '[' '^'? class_item+ ']'
//!   class_item  := char | char '-' char | shorthand

use crate::ast::{CharacterClass, ClassItem, Expr, Quantifier, QuantifierMode, RepeatKind};
use crate::error::{ParseError, Span};
use crate::lexer::{Lexer, Token};

/// Parser for origin-dialect patterns
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current_token: Token,
    current_span: Span,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given input string
    pub fn new(input: &'a str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(input);
        let (current_token, current_span) = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current_token,
            current_span,
        })
    }

    /// Advance to the next token
    fn advance(&mut self) -> Result<(), ParseError> {
        let (token, span) = self.lexer.next_token()?;
        self.current_token = token;
        self.current_span = span;
        Ok(())
    }

    /// Look at the token after the current one without consuming anything
    fn peek(&self) -> Result<Token, ParseError> {
        Ok(self.lexer.clone().next_token()?.0)
    }

    /// Expect a specific token, error if not found
    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if self.current_token == expected {
            self.advance()
        } else if self.current_token == Token::Eof {
            Err(ParseError::UnexpectedEof)
        } else {
            Err(self.unexpected(&expected.to_string()))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_string(),
            found: self.current_token.to_string(),
        }
    }

    /// Parse the entire input and return the AST
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_alternation()?;

        // Ensure we've consumed all tokens
        if self.current_token != Token::Eof {
            return Err(self.unexpected("EOF"));
        }

        Ok(expr)
    }

    /// Parse alternation (lowest precedence)
    fn parse_alternation(&mut self) -> Result<Expr, ParseError> {
        let mut alternatives = vec![self.parse_sequence()?];

        while self.current_token == Token::Pipe {
            self.advance()?; // consume '|'
            alternatives.push(self.parse_sequence()?);
        }

        Ok(Expr::alternation(alternatives))
    }

    /// Parse a sequence (concatenation)
    fn parse_sequence(&mut self) -> Result<Expr, ParseError> {
        let mut expressions = Vec::new();

        while !self.is_sequence_end() {
            expressions.push(self.parse_quantified()?);
        }

        Ok(Expr::sequence(expressions))
    }

    /// Check if we've reached the end of a sequence
    fn is_sequence_end(&self) -> bool {
        matches!(
            self.current_token,
            Token::Eof | Token::RightParen | Token::Pipe
        )
    }

    /// Parse an atom followed by any number of quantifiers
    fn parse_quantified(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_atom()?;

        while let Some(quantifier) = self.parse_quantifier()? {
            expr = Expr::quantified(expr, quantifier);
        }

        Ok(expr)
    }

    /// Parse a quantifier if present
    fn parse_quantifier(&mut self) -> Result<Option<Quantifier>, ParseError> {
        let kind = match &self.current_token {
            Token::Star => RepeatKind::ZeroOrMore,
            Token::Plus => RepeatKind::OneOrMore,
            Token::Question => RepeatKind::Optional,
            Token::Repeat(kind) => *kind,
            _ => return Ok(None),
        };
        self.advance()?;

        let mode = match self.current_token {
            Token::Question => QuantifierMode::Lazy,
            Token::Plus => QuantifierMode::Possessive,
            _ => QuantifierMode::Greedy,
        };
        if mode != QuantifierMode::Greedy {
            self.advance()?;
        }

        Ok(Some(Quantifier { kind, mode }))
    }

    /// Parse the body of a group whose opener is the current token
    fn parse_group_body(&mut self) -> Result<Expr, ParseError> {
        self.advance()?; // consume the opener
        let pattern = self.parse_alternation()?;
        self.expect(Token::RightParen)?;
        Ok(pattern)
    }

    /// Parse an atomic expression
    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        let span = self.current_span;
        let expr = match &self.current_token {
            Token::Literal(c) => Expr::Literal(*c),
            Token::Dot => Expr::Any,
            Token::Caret => Expr::StartAnchor,
            Token::Dollar => Expr::EndAnchor,
            Token::StartOfInput => Expr::StartOfInput,
            Token::EndOfInput => Expr::EndOfInput,
            Token::EndOfInputOrNewline => Expr::EndOfInputOrNewline,
            Token::MatchStart => Expr::MatchStart(span),
            Token::WordBoundary => Expr::WordBoundary,
            Token::NonWordBoundary => Expr::NonWordBoundary,
            Token::Shorthand(c) => Expr::Shorthand(*c),
            Token::Escape(c) => Expr::Escape { letter: *c, span },
            Token::Backref(reference) => Expr::Backreference {
                reference: reference.clone(),
                span,
            },
            Token::SubexpCall(reference) => Expr::SubexpCall {
                reference: reference.clone(),
                span,
            },
            Token::LeftParen => return Ok(Expr::Group(Box::new(self.parse_group_body()?))),
            Token::NonCapturing => {
                return Ok(Expr::NonCapturingGroup(Box::new(self.parse_group_body()?)));
            }
            Token::NamedGroupStart(name) => {
                let name = name.clone();
                let pattern = self.parse_group_body()?;
                return Ok(Expr::NamedGroup {
                    name,
                    pattern: Box::new(pattern),
                });
            }
            Token::Atomic => return Ok(Expr::AtomicGroup(Box::new(self.parse_group_body()?))),
            Token::Lookahead => return Ok(Expr::Lookahead(Box::new(self.parse_group_body()?))),
            Token::NegativeLookahead => {
                return Ok(Expr::NegativeLookahead(Box::new(self.parse_group_body()?)));
            }
            Token::Lookbehind => return Ok(Expr::Lookbehind(Box::new(self.parse_group_body()?))),
            Token::NegativeLookbehind => {
                return Ok(Expr::NegativeLookbehind(Box::new(self.parse_group_body()?)));
            }
            Token::OptionGroupStart(flags) => {
                let flags = flags.clone();
                let pattern = self.parse_group_body()?;
                return Ok(Expr::OptionGroup {
                    flags,
                    pattern: Some(Box::new(pattern)),
                    span,
                });
            }
            Token::OptionSwitch(flags) => Expr::OptionGroup {
                flags: flags.clone(),
                pattern: None,
                span,
            },
            Token::Absent => {
                let pattern = self.parse_group_body()?;
                return Ok(Expr::Absent {
                    pattern: Box::new(pattern),
                    span,
                });
            }
            Token::LeftBracket => return self.parse_char_class(),
            Token::Eof => return Err(ParseError::UnexpectedEof),
            Token::Star | Token::Plus | Token::Question | Token::Repeat(_) => {
                return Err(ParseError::InvalidQuantifier(format!(
                    "{} has nothing to repeat",
                    self.current_token
                )));
            }
            _ => return Err(self.unexpected("expression")),
        };
        self.advance()?;
        Ok(expr)
    }

    /// Parse a character class
    fn parse_char_class(&mut self) -> Result<Expr, ParseError> {
        self.expect(Token::LeftBracket)?;

        let negated = if self.current_token == Token::Caret {
            self.advance()?;
            true
        } else {
            false
        };

        let mut items = Vec::new();

        while self.current_token != Token::RightBracket {
            if self.current_token == Token::Eof {
                return Err(ParseError::UnclosedCharacterClass);
            }
            items.push(self.parse_class_item()?);
        }

        if items.is_empty() {
            return Err(self.unexpected("character class item"));
        }

        self.advance()?; // consume ']'

        Ok(Expr::CharacterClass(CharacterClass { negated, items }))
    }

    /// Parse an item in a character class
    fn parse_class_item(&mut self) -> Result<ClassItem, ParseError> {
        let item = match &self.current_token {
            Token::Literal(c) => {
                let start = *c;
                self.advance()?;

                // A dash followed by another literal forms a range
                if self.current_token != Token::ClassDash {
                    return Ok(ClassItem::Char(start));
                }
                let Token::Literal(end) = self.peek()? else {
                    return Ok(ClassItem::Char(start));
                };
                if start > end {
                    return Err(ParseError::InvalidClassRange(start, end));
                }
                self.advance()?; // consume '-'
                self.advance()?; // consume end
                return Ok(ClassItem::Range(start, end));
            }
            Token::ClassDash => ClassItem::Char('-'),
            Token::Caret => ClassItem::Char('^'),
            Token::Shorthand(c) => ClassItem::Shorthand(*c),
            _ => return Err(self.unexpected("character or escape")),
        };
        self.advance()?;
        Ok(item)
    }
}

/// Parse an origin-dialect pattern string into an AST
pub fn parse(input: &str) -> Result<Expr, ParseError> {
    let mut parser = Parser::new(input)?;
    parser.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Reference;

    #[test]
    fn test_parse_literal() {
        let expr = parse("abc").unwrap();
        assert_eq!(expr, Expr::text("abc"));
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse("").unwrap(), Expr::Empty);
    }

    #[test]
    fn test_parse_named_group() {
        let expr = parse("(?<name>abc)").unwrap();
        assert_eq!(expr, Expr::named_group("name", Expr::text("abc")));
        let expr = parse("(?'name'abc)").unwrap();
        assert_eq!(expr, Expr::named_group("name", Expr::text("abc")));
    }

    #[test]
    fn test_parse_nested_group() {
        let expr = parse("(a(b)a)").unwrap();
        assert_eq!(
            expr,
            Expr::group(Expr::sequence(vec![
                Expr::literal('a'),
                Expr::group(Expr::literal('b')),
                Expr::literal('a'),
            ]))
        );
    }

    #[test]
    fn test_parse_error_unclosed_group() {
        assert_eq!(parse("(abc"), Err(ParseError::UnexpectedEof));
    }

    #[test]
    fn test_parse_error_stray_paren() {
        assert!(matches!(
            parse("abc)"),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn test_parse_atomic_group() {
        let expr = parse("(?>aa|a)").unwrap();
        assert_eq!(
            expr,
            Expr::atomic_group(Expr::alternation(vec![Expr::text("aa"), Expr::literal('a')]))
        );
    }

    #[test]
    fn test_parse_quantifier_modes() {
        let expr = parse("a*").unwrap();
        assert_eq!(
            expr,
            Expr::quantified(Expr::literal('a'), Quantifier::greedy(RepeatKind::ZeroOrMore))
        );
        let expr = parse("a+?").unwrap();
        assert_eq!(
            expr,
            Expr::quantified(Expr::literal('a'), Quantifier::lazy(RepeatKind::OneOrMore))
        );
        let expr = parse("a?+").unwrap();
        assert_eq!(
            expr,
            Expr::quantified(Expr::literal('a'), Quantifier::possessive(RepeatKind::Optional))
        );
        let expr = parse("a{2,3}+").unwrap();
        assert_eq!(
            expr,
            Expr::quantified(
                Expr::literal('a'),
                Quantifier::possessive(RepeatKind::Between(2, 3))
            )
        );
    }

    #[test]
    fn test_parse_nested_quantifiers() {
        let expr = parse("a{2}*").unwrap();
        assert_eq!(
            expr,
            Expr::quantified(
                Expr::quantified(Expr::literal('a'), Quantifier::greedy(RepeatKind::Exactly(2))),
                Quantifier::greedy(RepeatKind::ZeroOrMore)
            )
        );
    }

    #[test]
    fn test_parse_nothing_to_repeat() {
        assert!(matches!(parse("*a"), Err(ParseError::InvalidQuantifier(_))));
    }

    #[test]
    fn test_parse_backreferences_keep_spans() {
        let expr = parse(r"(a)\k<-1>").unwrap();
        assert_eq!(
            expr,
            Expr::sequence(vec![
                Expr::group(Expr::literal('a')),
                Expr::Backreference {
                    reference: Reference::Relative(-1),
                    span: Span::new(3, 9),
                },
            ])
        );
    }

    #[test]
    fn test_parse_subexp_call() {
        let expr = parse(r"(a)\g<1>").unwrap();
        assert_eq!(
            expr,
            Expr::sequence(vec![
                Expr::group(Expr::literal('a')),
                Expr::SubexpCall {
                    reference: Reference::Absolute(1),
                    span: Span::new(3, 8),
                },
            ])
        );
    }

    #[test]
    fn test_parse_character_class() {
        let expr = parse("[^a-z_-]").unwrap();
        assert_eq!(
            expr,
            Expr::CharacterClass(CharacterClass {
                negated: true,
                items: vec![
                    ClassItem::Range('a', 'z'),
                    ClassItem::Char('_'),
                    ClassItem::Char('-'),
                ],
            })
        );
    }

    #[test]
    fn test_parse_character_class_escaped_dash_is_not_range() {
        let expr = parse(r"[a\-z]").unwrap();
        assert_eq!(
            expr,
            Expr::CharacterClass(CharacterClass {
                negated: false,
                items: vec![ClassItem::Char('a'), ClassItem::Char('-'), ClassItem::Char('z')],
            })
        );
    }

    #[test]
    fn test_parse_character_class_errors() {
        assert_eq!(parse("[abc"), Err(ParseError::UnclosedCharacterClass));
        assert_eq!(parse("[z-a]"), Err(ParseError::InvalidClassRange('z', 'a')));
        assert!(parse("[]").is_err());
    }

    #[test]
    fn test_parse_option_groups() {
        let expr = parse("(?i:a)").unwrap();
        assert!(matches!(
            expr,
            Expr::OptionGroup {
                ref flags,
                pattern: Some(_),
                ..
            } if flags == "i"
        ));
        let expr = parse("(?x)").unwrap();
        assert!(matches!(expr, Expr::OptionGroup { pattern: None, .. }));
    }

    #[test]
    fn test_parse_anchors() {
        let expr = parse(r"^\Aa\z\Z$").unwrap();
        assert_eq!(
            expr,
            Expr::sequence(vec![
                Expr::StartAnchor,
                Expr::StartOfInput,
                Expr::literal('a'),
                Expr::EndOfInput,
                Expr::EndOfInputOrNewline,
                Expr::EndAnchor,
            ])
        );
    }

    #[test]
    fn test_display_round_trip() {
        for pattern in [r"(?<foo>a)\k<foo>", r"(?>aa|a)+", r"(a)\g<-1>", "[^a-c]x{2,}?"] {
            let expr = parse(pattern).unwrap();
            assert_eq!(parse(&expr.to_string()).unwrap(), expr, "{}", pattern);
        }
    }
}
