//! Style sheet syntax layer for stylecheck.
//!
//! This crate turns style sheet text into a syntax tree that validation passes
//! can walk:
//!
//! - **Tokenizer**: wraps `cssparser`, recovering from stray backslashes,
//!   broken strings, unterminated comments and bad urls
//! - **Token stream**: a clamped cursor over EOF-terminated token lists
//! - **Canonicalizer**: recursive-descent parsing into rules and declarations
//!   under a fixed nesting ceiling
//! - **Visitor protocol**: enter / leave hooks over the tree
//!
//! Malformed input never fails a parse. Defects are collected as
//! [`ErrorToken`](token::ErrorToken)s next to a best-effort tree.
//!
//! # Example
//!
//! ```
//! use stylecheck_syntax::prelude::*;
//!
//! let tokenized = tokenize("a { color: red !important }", 1, 0);
//! let mut errors = tokenized.errors;
//! let sheet = parse_a_stylesheet(tokenized.tokens, &ParsingConfig::default(), &mut errors);
//!
//! assert!(errors.is_empty());
//! assert_eq!(sheet.rules.len(), 1);
//! ```

pub mod ast;
pub mod canonicalizer;
pub mod stream;
pub mod token;
pub mod tokenizer;
pub mod visitor;

mod error;

pub use error::{Result, SyntaxError};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::ast::{AtRule, Declaration, QualifiedRule, Rule, Stylesheet};
    pub use crate::canonicalizer::{
        BlockType, Canonicalizer, MAX_CSS_RECURSION, ParsingConfig, parse_a_stylesheet,
        parse_inline_style, strip_vendor_prefix,
    };
    pub use crate::stream::TokenStream;
    pub use crate::token::{
        ErrorCode, ErrorToken, ParsedCssUrl, Positioned, SourcePos, Token, TokenKind, TokenType,
    };
    pub use crate::tokenizer::{Tokenized, tokenize, tokenize_reader};
    pub use crate::visitor::RuleVisitor;
}
