//! Cursor over an EOF-terminated token sequence.

use crate::error::{Result, SyntaxError};
use crate::token::Token;

/// A read cursor over a finite token list whose last element is EOF.
///
/// The cursor starts before the first token. Every read clamps: positions past
/// the end resolve to the final EOF token, positions before the start resolve
/// to the first token.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    pos: isize,
}

impl TokenStream {
    /// Create a stream over `tokens`.
    ///
    /// # Panics
    ///
    /// Panics if `tokens` is empty or does not end with an EOF token. Use
    /// [`TokenStream::try_new`] to get the failure as a value instead.
    pub fn new(tokens: Vec<Token>) -> Self {
        match Self::try_new(tokens) {
            Ok(stream) => stream,
            Err(err) => panic!("invalid token stream: {err}"),
        }
    }

    /// Create a stream over `tokens`, reporting a missing terminator.
    pub fn try_new(tokens: Vec<Token>) -> Result<Self> {
        match tokens.last() {
            None => Err(SyntaxError::EmptyTokenStream),
            Some(last) if !last.is_eof() => Err(SyntaxError::missing_eof(last.to_string())),
            Some(_) => Ok(Self { tokens, pos: -1 }),
        }
    }

    /// Token at an absolute index, clamped into range.
    pub fn token_at(&self, index: isize) -> &Token {
        let last = self.tokens.len() - 1;
        let index = if index < 0 {
            0
        } else {
            (index as usize).min(last)
        };
        &self.tokens[index]
    }

    /// Token under the cursor.
    pub fn current(&self) -> &Token {
        self.token_at(self.pos)
    }

    /// Token one past the cursor, without moving it.
    pub fn next(&self) -> &Token {
        self.token_at(self.pos + 1)
    }

    /// Advance the cursor by one.
    pub fn consume(&mut self) {
        self.pos += 1;
    }

    /// Move the cursor back by one.
    pub fn reconsume(&mut self) {
        self.pos -= 1;
    }

    /// Number of tokens, including the final EOF.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Always false: a stream holds at least its EOF token.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Release the underlying tokens.
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Positioned, SourcePos, TokenKind, TokenType};

    fn ident(name: &str, col: u32) -> Token {
        Token::new(TokenKind::Ident(name.into()), SourcePos::new(1, col))
    }

    fn sample() -> TokenStream {
        TokenStream::new(vec![
            ident("a", 0),
            ident("b", 2),
            Token::eof_at(SourcePos::new(1, 3)),
        ])
    }

    #[test]
    fn cursor_starts_before_first_token() {
        let mut stream = sample();
        assert_eq!(stream.current().as_ident(), Some("a"));
        assert_eq!(stream.next().as_ident(), Some("a"));

        stream.consume();
        assert_eq!(stream.current().as_ident(), Some("a"));
        assert_eq!(stream.next().as_ident(), Some("b"));
    }

    #[test]
    fn reads_clamp_to_eof() {
        let mut stream = sample();
        for _ in 0..10 {
            stream.consume();
        }
        assert!(stream.current().is_eof());
        assert!(stream.next().is_eof());
        assert_eq!(stream.token_at(1000).token_type(), TokenType::EofToken);
    }

    #[test]
    fn reconsume_steps_back() {
        let mut stream = sample();
        stream.consume();
        stream.consume();
        stream.reconsume();
        assert_eq!(stream.current().as_ident(), Some("a"));
        assert_eq!(stream.next().as_ident(), Some("b"));
    }

    #[test]
    fn try_new_rejects_bad_sequences() {
        assert!(matches!(
            TokenStream::try_new(Vec::new()),
            Err(SyntaxError::EmptyTokenStream)
        ));
        assert!(matches!(
            TokenStream::try_new(vec![ident("a", 0)]),
            Err(SyntaxError::MissingEof { .. })
        ));
    }

    #[test]
    #[should_panic(expected = "invalid token stream")]
    fn new_panics_on_empty() {
        TokenStream::new(Vec::new());
    }

    #[test]
    #[should_panic(expected = "EOF")]
    fn new_panics_without_eof() {
        TokenStream::new(vec![ident("a", 0)]);
    }
}
