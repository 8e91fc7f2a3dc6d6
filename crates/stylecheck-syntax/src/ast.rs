//! Style sheet syntax tree.
//!
//! Nodes own their children outright. Every prelude and value token list ends
//! with a synthetic EOF token, so consumers can always peek one past the last
//! real token.

use crate::token::{Positioned, SourcePos, Token, TokenKind, TokenType};

/// A parsed style sheet: its top-level rules and the terminating EOF token.
#[derive(Debug, Clone, PartialEq)]
pub struct Stylesheet {
    /// Top-level rules in source order.
    pub rules: Vec<Rule>,
    /// EOF marker of the style sheet.
    pub eof: Token,
    pos: SourcePos,
}

impl Stylesheet {
    pub fn new(rules: Vec<Rule>, eof: Token, pos: SourcePos) -> Self {
        Self { rules, eof, pos }
    }
}

impl Positioned for Stylesheet {
    fn pos(&self) -> SourcePos {
        self.pos
    }

    fn token_type(&self) -> TokenType {
        TokenType::Stylesheet
    }
}

/// A rule: either a qualified rule or an at-rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Qualified(QualifiedRule),
    At(AtRule),
}

impl Positioned for Rule {
    fn pos(&self) -> SourcePos {
        match self {
            Rule::Qualified(rule) => rule.pos(),
            Rule::At(rule) => rule.pos(),
        }
    }

    fn token_type(&self) -> TokenType {
        match self {
            Rule::Qualified(rule) => rule.token_type(),
            Rule::At(rule) => rule.token_type(),
        }
    }
}

/// An `@name prelude { ... }` or `@name prelude;` rule.
///
/// Only one of `rules` and `declarations` is populated, depending on how the
/// parsing configuration classifies the at-rule's name. Both stay empty for
/// ignored blocks and block-less at-rules.
#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    name: String,
    /// Prelude tokens, EOF-terminated.
    pub prelude: Vec<Token>,
    /// Nested rules, for rule-block at-rules such as `@media`.
    pub rules: Vec<Rule>,
    /// Nested declarations, for declaration-block at-rules such as `@font-face`.
    pub declarations: Vec<Declaration>,
    pos: SourcePos,
}

impl AtRule {
    /// Create an at-rule named `name` (without the `@`) with an empty
    /// prelude, that is one EOF token at `pos`.
    pub fn new(name: impl Into<String>, pos: SourcePos) -> Self {
        Self {
            name: name.into(),
            prelude: vec![Token::eof_at(pos)],
            rules: Vec::new(),
            declarations: Vec::new(),
            pos,
        }
    }

    /// The keyword text without the leading `@`.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Positioned for AtRule {
    fn pos(&self) -> SourcePos {
        self.pos
    }

    fn token_type(&self) -> TokenType {
        TokenType::AtRule
    }
}

/// A `selector { declarations }` rule.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedRule {
    /// Selector tokens, EOF-terminated.
    pub prelude: Vec<Token>,
    pub declarations: Vec<Declaration>,
    pos: SourcePos,
}

impl QualifiedRule {
    /// Create a rule with an empty prelude (one EOF token at `pos`).
    pub fn new(pos: SourcePos) -> Self {
        Self {
            prelude: vec![Token::eof_at(pos)],
            declarations: Vec::new(),
            pos,
        }
    }

    /// The selector text, built from the string values of the prelude.
    ///
    /// Inner whitespace collapses to a single space, leading and trailing
    /// whitespace is dropped.
    pub fn rule_name(&self) -> String {
        let name: String = self.prelude.iter().map(Token::string_value).collect();
        name.trim().to_string()
    }
}

impl Positioned for QualifiedRule {
    fn pos(&self) -> SourcePos {
        self.pos
    }

    fn token_type(&self) -> TokenType {
        TokenType::QualifiedRule
    }
}

/// A `name: value [!important]` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    name: String,
    /// Value tokens, EOF-terminated, with any trailing `!important` removed.
    pub value: Vec<Token>,
    pub important: bool,
    /// Position of the `!` of a trailing `!important`.
    pub important_pos: Option<SourcePos>,
    pos: SourcePos,
}

impl Declaration {
    /// Create a declaration with an empty value (one EOF token at `pos`).
    pub fn new(name: impl Into<String>, pos: SourcePos) -> Self {
        Self {
            name: name.into(),
            value: vec![Token::eof_at(pos)],
            important: false,
            important_pos: None,
            pos,
        }
    }

    /// The property name as written.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The first identifier (or plain number) of the value, allowing one
    /// leading whitespace token, or `""` if the value starts with anything
    /// else.
    pub fn first_ident(&self) -> &str {
        let mut tokens = self.value.iter();
        let found = match tokens.next() {
            Some(first) if first.token_type() == TokenType::Whitespace => {
                tokens.next().and_then(ident_or_number)
            }
            first => first.and_then(ident_or_number),
        };
        found.unwrap_or("")
    }
}

fn ident_or_number(token: &Token) -> Option<&str> {
    match token.kind() {
        TokenKind::Ident(name) => Some(name),
        TokenKind::Number { repr, .. } => Some(repr),
        _ => None,
    }
}

impl Positioned for Declaration {
    fn pos(&self) -> SourcePos {
        self.pos
    }

    fn token_type(&self) -> TokenType {
        TokenType::Declaration
    }
}
