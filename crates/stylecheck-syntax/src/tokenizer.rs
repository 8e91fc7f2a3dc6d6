//! Style sheet tokenizer built on the `cssparser` crate.
//!
//! `cssparser` hands out block tokens (`(`, `[`, `{`, `name(`) whose contents
//! are reached through nested parsers. This module flattens that structure
//! back into a single token list with explicit open and close grouping tokens,
//! attaches host-document positions, and turns the lexical defects the scanner
//! silently recovers from into [`ErrorToken`]s.
//!
//! Tokenizing never fails for malformed input. The returned token list always
//! ends with an EOF token.

use std::io::Read;

use cssparser::{
    ParseError as CssParseError, Parser, ParserInput, SourceLocation, SourcePosition,
    Token as Css,
};

use crate::error::{Result, SyntaxError};
use crate::token::{ErrorCode, ErrorToken, SourcePos, Token, TokenKind};

/// Grouping depth past which the flattener stops descending into blocks.
///
/// The scanner skips the contents of deeper blocks on its own, without
/// recursion.
pub const MAX_SCANNER_NESTING: usize = 256;

/// Result of tokenizing a style sheet.
#[derive(Debug, Clone, Default)]
pub struct Tokenized {
    /// Tokens in source order, terminated by EOF.
    pub tokens: Vec<Token>,
    /// Lexical diagnostics in source order.
    pub errors: Vec<ErrorToken>,
}

/// Tokenize `text`, reporting positions relative to `line` / `col`.
///
/// The first line of `text` is shifted by both offsets, later lines by `line`
/// only. This maps the tokens of an inline style attribute back to its place
/// in the host document.
pub fn tokenize(text: &str, line: u32, col: u32) -> Tokenized {
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);
    let mut scanner = Scanner::new(text, line, col);

    scanner.scan(&mut parser, 0);
    let end = scanner.pos(parser.current_source_location());
    scanner.tokens.push(Token::eof_at(end));

    Tokenized {
        tokens: scanner.tokens,
        errors: scanner.errors,
    }
}

/// Read all of `reader` and tokenize it.
///
/// Fails only when the reader itself fails or yields invalid UTF-8.
pub fn tokenize_reader<R: Read>(mut reader: R, line: u32, col: u32) -> Result<Tokenized> {
    let mut text = String::new();
    reader.read_to_string(&mut text).map_err(SyntaxError::io)?;
    Ok(tokenize(&text, line, col))
}

struct Scanner<'a> {
    text: &'a str,
    line_offset: u32,
    col_offset: u32,
    tokens: Vec<Token>,
    errors: Vec<ErrorToken>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, line_offset: u32, col_offset: u32) -> Self {
        Self {
            text,
            line_offset,
            col_offset,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Map a scanner location (0-based line, 1-based column) to a host position.
    fn pos(&self, loc: SourceLocation) -> SourcePos {
        let col = loc.column.saturating_sub(1);
        if loc.line == 0 {
            SourcePos::new(self.line_offset, self.col_offset + col)
        } else {
            SourcePos::new(self.line_offset + loc.line, col)
        }
    }

    fn error(&mut self, code: ErrorCode, pos: SourcePos) {
        tracing::debug!("Recovered lexical defect {} at {}", code, pos);
        self.errors.push(ErrorToken::at(code, pos));
    }

    fn scan<'i, 't>(&mut self, parser: &mut Parser<'i, 't>, depth: usize) {
        loop {
            let start = parser.position();
            let loc = parser.current_source_location();
            let token = match parser.next_including_whitespace_and_comments() {
                Ok(token) => token.clone(),
                Err(_) => return,
            };
            let pos = self.pos(loc);

            let kind = match token {
                Css::Ident(name) => TokenKind::Ident(name.to_string()),
                Css::AtKeyword(name) => TokenKind::AtKeyword(name.to_string()),
                Css::Hash(value) => TokenKind::Hash {
                    value: value.to_string(),
                    is_id: false,
                },
                Css::IDHash(value) => TokenKind::Hash {
                    value: value.to_string(),
                    is_id: true,
                },
                Css::QuotedString(value) => TokenKind::String(value.to_string()),
                Css::UnquotedUrl(value) => TokenKind::Url(value.to_string()),
                Css::Delim('\\') => {
                    // Only produced for a backslash right before a newline.
                    self.error(ErrorCode::CssSyntaxStrayTrailingBackslash, pos);
                    continue;
                }
                Css::Delim(c) => TokenKind::Delim(c),
                Css::Number { value, .. } => TokenKind::Number {
                    value,
                    repr: parser.slice_from(start).to_string(),
                },
                Css::Percentage { unit_value, .. } => {
                    let raw = parser.slice_from(start);
                    TokenKind::Percentage {
                        value: unit_value * 100.0,
                        repr: raw.strip_suffix('%').unwrap_or(raw).to_string(),
                    }
                }
                Css::Dimension { value, unit, .. } => {
                    let raw = parser.slice_from(start);
                    let repr = match raw.strip_suffix(&*unit) {
                        Some(number) => number.to_string(),
                        None => value.to_string(),
                    };
                    TokenKind::Dimension {
                        value,
                        repr,
                        unit: unit.to_string(),
                    }
                }
                Css::WhiteSpace(_) => TokenKind::Whitespace,
                Css::Comment(_) => {
                    let raw = parser.slice_from(start);
                    if raw.len() < 4 || !raw.ends_with("*/") {
                        // The comment ran to end of input; nothing follows it.
                        self.error(ErrorCode::CssSyntaxUnterminatedComment, pos);
                    }
                    continue;
                }
                Css::Colon => TokenKind::Colon,
                Css::Semicolon => TokenKind::Semicolon,
                Css::Comma => TokenKind::Comma,
                Css::IncludeMatch => TokenKind::IncludeMatch,
                Css::DashMatch => TokenKind::DashMatch,
                Css::PrefixMatch => TokenKind::PrefixMatch,
                Css::SuffixMatch => TokenKind::SuffixMatch,
                Css::SubstringMatch => TokenKind::SubstringMatch,
                Css::CDO => TokenKind::Cdo,
                Css::CDC => TokenKind::Cdc,
                Css::Function(name) => {
                    self.tokens.push(Token::new(TokenKind::Function(name.to_string()), pos));
                    self.enter_block(parser, depth, TokenKind::CloseParen);
                    continue;
                }
                Css::ParenthesisBlock => {
                    self.tokens.push(Token::new(TokenKind::OpenParen, pos));
                    self.enter_block(parser, depth, TokenKind::CloseParen);
                    continue;
                }
                Css::SquareBracketBlock => {
                    self.tokens.push(Token::new(TokenKind::OpenSquare, pos));
                    self.enter_block(parser, depth, TokenKind::CloseSquare);
                    continue;
                }
                Css::CurlyBracketBlock => {
                    self.tokens.push(Token::new(TokenKind::OpenCurly, pos));
                    self.enter_block(parser, depth, TokenKind::CloseCurly);
                    continue;
                }
                Css::BadUrl(_) => {
                    self.error(ErrorCode::CssSyntaxBadUrl, pos);
                    continue;
                }
                Css::BadString(_) => {
                    self.error(ErrorCode::CssSyntaxUnterminatedString, pos);
                    continue;
                }
                Css::CloseParenthesis => TokenKind::CloseParen,
                Css::CloseSquareBracket => TokenKind::CloseSquare,
                Css::CloseCurlyBracket => TokenKind::CloseCurly,
            };

            if is_escapable(&kind) {
                let raw = parser.slice_from(start);
                if self.ends_in_stray_backslash(raw, start) {
                    let before = &raw[..raw.len() - 1];
                    let at = SourcePos::new(pos.line, pos.col + utf16_len(before));
                    self.error(ErrorCode::CssSyntaxStrayTrailingBackslash, at);
                    if before.is_empty() {
                        // A lone backslash; the scanner turned it into U+FFFD.
                        continue;
                    }
                }
            }

            self.tokens.push(Token::new(kind, pos));
        }
    }

    /// Flatten the contents of the block the parser just returned, then emit
    /// `closer` if the scanner actually consumed a closing delimiter.
    fn enter_block<'i, 't>(&mut self, parser: &mut Parser<'i, 't>, depth: usize, closer: TokenKind) {
        let inner_end = parser.parse_nested_block(
            |inner| -> std::result::Result<(SourcePosition, SourceLocation), CssParseError<'i, ()>> {
                if depth < MAX_SCANNER_NESTING {
                    self.scan(inner, depth + 1);
                }
                Ok((inner.position(), inner.current_source_location()))
            },
        );

        if let Ok((end, loc)) = inner_end
            && parser.position().byte_index() == end.byte_index() + 1
        {
            let pos = self.pos(loc);
            self.tokens.push(Token::new(closer, pos));
        }
    }

    /// Whether `raw`, starting at `start`, ends the input with an unescaped
    /// backslash.
    fn ends_in_stray_backslash(&self, raw: &str, start: SourcePosition) -> bool {
        start.byte_index() + raw.len() == self.text.len()
            && raw.bytes().rev().take_while(|b| *b == b'\\').count() % 2 == 1
    }
}

/// Token kinds whose source text may end in an escape sequence.
fn is_escapable(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Ident(_)
            | TokenKind::AtKeyword(_)
            | TokenKind::Hash { .. }
            | TokenKind::Dimension { .. }
    )
}

fn utf16_len(s: &str) -> u32 {
    s.encode_utf16().count() as u32
}
