//! Recursive-descent parser from tokens to the syntax tree.
//!
//! Follows the rule / declaration consumption algorithms of CSS Syntax Level 3,
//! with two deviations: at-rules inside declaration lists are parsed and then
//! reported as errors, and nesting is capped at [`MAX_CSS_RECURSION`].
//!
//! Malformed input never aborts parsing. Each defect becomes one
//! [`ErrorToken`] and parsing resumes at the next resynchronization point
//! (`;`, `}` or end of input).

use std::collections::HashMap;

use crate::ast::{AtRule, Declaration, QualifiedRule, Rule, Stylesheet};
use crate::stream::TokenStream;
use crate::token::{ErrorCode, ErrorToken, Positioned, SourcePos, Token, TokenKind, TokenType};

/// Depth at which the component value consumers give up.
pub const MAX_CSS_RECURSION: usize = 100;

/// How the `{ ... }` body of an at-rule is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockType {
    /// Parse the body as a list of rules (`@media`).
    ParseAsRules,
    /// Parse the body as a list of declarations (`@font-face`).
    ParseAsDeclarations,
    /// Skip the body.
    #[default]
    ParseAsIgnore,
}

/// At-rule block classification used by the [`Canonicalizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsingConfig {
    /// Block type by at-rule name: no vendor prefix, ASCII-lowercase.
    pub at_rule_spec: HashMap<String, BlockType>,
    /// Block type for names missing from `at_rule_spec`.
    pub default_spec: BlockType,
}

impl ParsingConfig {
    /// A configuration with no named at-rules.
    pub fn new(default_spec: BlockType) -> Self {
        Self {
            at_rule_spec: HashMap::new(),
            default_spec,
        }
    }

    /// Classify at-rule `name` as `block_type`. The name is stored
    /// ASCII-lowercased.
    pub fn with_at_rule(mut self, name: impl Into<String>, block_type: BlockType) -> Self {
        self.at_rule_spec
            .insert(name.into().to_ascii_lowercase(), block_type);
        self
    }
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self::new(BlockType::ParseAsIgnore)
            .with_at_rule("font-face", BlockType::ParseAsDeclarations)
            .with_at_rule("keyframes", BlockType::ParseAsRules)
            .with_at_rule("media", BlockType::ParseAsRules)
            .with_at_rule("page", BlockType::ParseAsDeclarations)
            .with_at_rule("supports", BlockType::ParseAsRules)
    }
}

/// Marker returned when a consumer hits [`MAX_CSS_RECURSION`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExcessiveNesting;

/// Strip one of the `-o-`, `-moz-`, `-ms-` or `-webkit-` vendor prefixes.
pub fn strip_vendor_prefix(name: &str) -> &str {
    if !name.starts_with('-') {
        return name;
    }
    ["-o-", "-moz-", "-ms-", "-webkit-"]
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name)
}

/// Parses token lists into rules and declarations.
///
/// The only state is the block classification; a canonicalizer may be reused
/// across parses.
#[derive(Debug, Clone, Default)]
pub struct Canonicalizer {
    config: ParsingConfig,
}

impl Canonicalizer {
    pub fn new(config: ParsingConfig) -> Self {
        Self { config }
    }

    /// Block type of an at-rule, looked up without its vendor prefix and
    /// ASCII-lowercased.
    pub fn block_type_for(&self, at_rule: &AtRule) -> BlockType {
        let name = strip_vendor_prefix(at_rule.name()).to_ascii_lowercase();
        self.config
            .at_rule_spec
            .get(&name)
            .copied()
            .unwrap_or(self.config.default_spec)
    }

    /// Parse `tokens` as a list of rules.
    ///
    /// At the top level `<!--` and `-->` are skipped; nested, they start a
    /// qualified rule.
    pub fn parse_a_list_of_rules(
        &self,
        tokens: Vec<Token>,
        top_level: bool,
        errors: &mut Vec<ErrorToken>,
    ) -> Vec<Rule> {
        let mut s = TokenStream::new(tokens);
        let mut rules = Vec::new();
        loop {
            s.consume();
            match s.current().token_type() {
                TokenType::Whitespace => continue,
                TokenType::EofToken => return rules,
                TokenType::Cdo | TokenType::Cdc => {
                    if top_level {
                        continue;
                    }
                    self.parse_a_qualified_rule(&mut s, &mut rules, errors);
                }
                TokenType::AtKeyword => {
                    let at_rule = self.parse_an_at_rule(&mut s, errors);
                    rules.push(Rule::At(at_rule));
                }
                _ => self.parse_a_qualified_rule(&mut s, &mut rules, errors),
            }
        }
    }

    /// Parse the at-rule starting at the current token.
    ///
    /// # Panics
    ///
    /// Panics if the current token is not an at-keyword.
    pub fn parse_an_at_rule(&self, s: &mut TokenStream, errors: &mut Vec<ErrorToken>) -> AtRule {
        let keyword = s.current();
        assert_eq!(
            keyword.token_type(),
            TokenType::AtKeyword,
            "at-rule must start at an at-keyword"
        );
        let mut rule = AtRule::new(keyword.string_value(), keyword.pos());
        let mut prelude = Vec::new();

        loop {
            s.consume();
            match s.current().token_type() {
                TokenType::Semicolon => {
                    prelude.push(Token::eof_at(s.current().pos()));
                    break;
                }
                TokenType::EofToken => {
                    prelude.push(s.current().clone());
                    break;
                }
                TokenType::OpenCurly => {
                    prelude.push(Token::eof_at(s.current().pos()));
                    let contents = extract_a_simple_block(s, errors);
                    match self.block_type_for(&rule) {
                        BlockType::ParseAsRules => {
                            rule.rules = self.parse_a_list_of_rules(contents, false, errors);
                        }
                        BlockType::ParseAsDeclarations => {
                            rule.declarations = self.parse_a_list_of_declarations(contents, errors);
                        }
                        BlockType::ParseAsIgnore => {}
                    }
                    break;
                }
                _ => {
                    if consume_a_component_value(s, &mut prelude, 0).is_err() {
                        excessively_nested(s, errors);
                    }
                }
            }
        }
        rule.prelude = prelude;
        rule
    }

    /// Parse the qualified rule starting at the current token into `rules`.
    ///
    /// A rule whose prelude runs into end of input is dropped with an error.
    pub fn parse_a_qualified_rule(
        &self,
        s: &mut TokenStream,
        rules: &mut Vec<Rule>,
        errors: &mut Vec<ErrorToken>,
    ) {
        debug_assert!(!matches!(
            s.current().token_type(),
            TokenType::EofToken | TokenType::AtKeyword
        ));

        let mut rule = QualifiedRule::new(s.current().pos());
        let mut prelude = Vec::new();
        s.reconsume();
        loop {
            s.consume();
            match s.current().token_type() {
                TokenType::EofToken => {
                    errors.push(ErrorToken::at(
                        ErrorCode::CssSyntaxEofInPreludeOfQualifiedRule,
                        rule.pos(),
                    ));
                    return;
                }
                TokenType::OpenCurly => {
                    prelude.push(Token::eof_at(s.current().pos()));
                    rule.prelude = prelude;
                    let block = extract_a_simple_block(s, errors);
                    rule.declarations = self.parse_a_list_of_declarations(block, errors);
                    rules.push(Rule::Qualified(rule));
                    return;
                }
                _ => {
                    if consume_a_component_value(s, &mut prelude, 0).is_err() {
                        excessively_nested(s, errors);
                    }
                }
            }
        }
    }

    /// Parse `tokens` as a list of declarations.
    pub fn parse_a_list_of_declarations(
        &self,
        tokens: Vec<Token>,
        errors: &mut Vec<ErrorToken>,
    ) -> Vec<Declaration> {
        let mut s = TokenStream::new(tokens);
        let mut declarations = Vec::new();
        loop {
            s.consume();
            match s.current().token_type() {
                TokenType::Whitespace | TokenType::Semicolon => continue,
                TokenType::EofToken => return declarations,
                TokenType::AtKeyword => {
                    // Parsed to keep the stream in step, then dropped.
                    let at_rule = self.parse_an_at_rule(&mut s, errors);
                    errors.push(ErrorToken::with_params(
                        ErrorCode::CssSyntaxInvalidAtRule,
                        at_rule.pos(),
                        [at_rule.name()],
                    ));
                }
                TokenType::Ident => self.parse_a_declaration(&mut s, &mut declarations, errors),
                _ => {
                    errors.push(ErrorToken::at(
                        ErrorCode::CssSyntaxInvalidDeclaration,
                        s.current().pos(),
                    ));
                    s.reconsume();
                    while !at_declaration_end(s.next()) {
                        s.consume();
                        let mut skipped = Vec::new();
                        if consume_a_component_value(&mut s, &mut skipped, 0).is_err() {
                            excessively_nested(&s, errors);
                        }
                    }
                }
            }
        }
    }

    /// Parse the declaration starting at the current identifier into
    /// `declarations`, stripping a trailing `!important` from its value.
    ///
    /// # Panics
    ///
    /// Panics if the current token is not an identifier.
    pub fn parse_a_declaration(
        &self,
        s: &mut TokenStream,
        declarations: &mut Vec<Declaration>,
        errors: &mut Vec<ErrorToken>,
    ) {
        let name = s.current();
        assert_eq!(
            name.token_type(),
            TokenType::Ident,
            "declaration must start at an identifier"
        );
        let mut decl = Declaration::new(name.string_value(), name.pos());

        while s.next().token_type() == TokenType::Whitespace {
            s.consume();
        }

        s.consume();
        if s.current().token_type() != TokenType::Colon {
            errors.push(ErrorToken::at(
                ErrorCode::CssSyntaxIncompleteDeclaration,
                decl.pos(),
            ));
            s.reconsume();
            while !at_declaration_end(s.next()) {
                s.consume();
            }
            return;
        }

        let mut value = Vec::new();
        while !at_declaration_end(s.next()) {
            s.consume();
            if consume_a_component_value(s, &mut value, 0).is_err() {
                excessively_nested(s, errors);
            }
        }
        value.push(Token::eof_at(s.next().pos()));
        decl.value = value;

        strip_important(&mut decl);
        declarations.push(decl);
    }
}

/// Detect a trailing `! important` (whitespace allowed around both tokens)
/// and move it from the value into the declaration's flag.
///
/// The identifier must be exactly `important`; other casings stay in the
/// value.
fn strip_important(decl: &mut Declaration) {
    let mut found_important = false;
    // The last token is the EOF marker.
    for i in (0..decl.value.len().saturating_sub(1)).rev() {
        let token = &decl.value[i];
        match token.kind() {
            TokenKind::Whitespace => continue,
            TokenKind::Ident(name) if name == "important" => found_important = true,
            TokenKind::Delim('!') if found_important => {
                decl.important = true;
                decl.important_pos = Some(token.pos());
                let eof = decl.value.len() - 1;
                decl.value.drain(i..eof);
                break;
            }
            _ => break,
        }
    }
}

fn at_declaration_end(token: &Token) -> bool {
    matches!(
        token.token_type(),
        TokenType::Semicolon | TokenType::EofToken
    )
}

fn excessively_nested(s: &TokenStream, errors: &mut Vec<ErrorToken>) {
    let pos = s.current().pos();
    tracing::warn!("Style sheet nesting exceeds {} levels at {}", MAX_CSS_RECURSION, pos);
    errors.push(ErrorToken::at(ErrorCode::CssExcessivelyNested, pos));
}

/// Consume one component value starting at the current token into `tokens`:
/// a whole simple block, a whole function, or a single token.
pub fn consume_a_component_value(
    s: &mut TokenStream,
    tokens: &mut Vec<Token>,
    depth: usize,
) -> Result<(), ExcessiveNesting> {
    if depth >= MAX_CSS_RECURSION {
        return Err(ExcessiveNesting);
    }
    let current = s.current();
    if current.is_open_grouping() {
        consume_a_simple_block(s, tokens, depth + 1)
    } else if current.token_type() == TokenType::FunctionToken {
        consume_a_function(s, tokens, depth + 1)
    } else {
        tokens.push(current.clone());
        Ok(())
    }
}

/// Consume the simple block opened by the current token into `tokens`,
/// including the opener and the matching closer (or EOF).
///
/// Only the mirror of the opener ends the block; other closers are consumed
/// as content.
///
/// # Panics
///
/// Panics if the current token is not `{`, `[` or `(`.
pub fn consume_a_simple_block(
    s: &mut TokenStream,
    tokens: &mut Vec<Token>,
    depth: usize,
) -> Result<(), ExcessiveNesting> {
    if depth >= MAX_CSS_RECURSION {
        return Err(ExcessiveNesting);
    }
    let opener = s.current();
    let Some(mirror) = opener.mirror() else {
        panic!("simple block must start at an open grouping token, found {opener}");
    };
    tokens.push(opener.clone());
    loop {
        s.consume();
        let current = s.current();
        if current.is_eof() || current.token_type() == mirror {
            tokens.push(current.clone());
            return Ok(());
        }
        consume_a_component_value(s, tokens, depth + 1)?;
    }
}

/// Consume the function starting at the current token into `tokens`,
/// including the function token and the closing `)` (or EOF).
///
/// # Panics
///
/// Panics if the current token is not a function token.
pub fn consume_a_function(
    s: &mut TokenStream,
    tokens: &mut Vec<Token>,
    depth: usize,
) -> Result<(), ExcessiveNesting> {
    if depth >= MAX_CSS_RECURSION {
        return Err(ExcessiveNesting);
    }
    let function = s.current();
    assert_eq!(
        function.token_type(),
        TokenType::FunctionToken,
        "function must start at a function token"
    );
    tokens.push(function.clone());
    loop {
        s.consume();
        let current = s.current();
        if matches!(
            current.token_type(),
            TokenType::EofToken | TokenType::CloseParen
        ) {
            tokens.push(current.clone());
            return Ok(());
        }
        consume_a_component_value(s, tokens, depth + 1)?;
    }
}

/// Contents of the simple block opened by the current token, without the
/// opener and with the closer replaced by an EOF token at its position.
pub fn extract_a_simple_block(s: &mut TokenStream, errors: &mut Vec<ErrorToken>) -> Vec<Token> {
    let opener = s.current().pos();
    let mut block = Vec::new();
    if consume_a_simple_block(s, &mut block, 0).is_err() {
        excessively_nested(s, errors);
    }
    if !block.is_empty() {
        block.remove(0);
    }
    terminate_with_eof(&mut block, opener);
    block
}

/// The function starting at the current token, with the closing `)` replaced
/// by an EOF token at its position.
pub fn extract_a_function(s: &mut TokenStream, errors: &mut Vec<ErrorToken>) -> Vec<Token> {
    let start = s.current().pos();
    let mut function = Vec::new();
    if consume_a_function(s, &mut function, 0).is_err() {
        excessively_nested(s, errors);
    }
    terminate_with_eof(&mut function, start);
    function
}

/// Replace the last token with EOF at its position; an empty list gets an EOF
/// at `fallback`.
fn terminate_with_eof(tokens: &mut Vec<Token>, fallback: SourcePos) {
    match tokens.pop() {
        Some(last) => tokens.push(Token::eof_at(last.pos())),
        None => tokens.push(Token::eof_at(fallback)),
    }
}

/// Parse a whole style sheet.
pub fn parse_a_stylesheet(
    tokens: Vec<Token>,
    config: &ParsingConfig,
    errors: &mut Vec<ErrorToken>,
) -> Stylesheet {
    let canonicalizer = Canonicalizer::new(config.clone());
    let (start, end) = match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => (first.pos(), last.pos()),
        _ => panic!("style sheet tokens must end with an EOF token"),
    };
    let rules = canonicalizer.parse_a_list_of_rules(tokens, true, errors);
    Stylesheet::new(rules, Token::eof_at(end), start)
}

/// Parse the body of a `style` attribute as a list of declarations.
pub fn parse_inline_style(tokens: Vec<Token>, errors: &mut Vec<ErrorToken>) -> Vec<Declaration> {
    let canonicalizer = Canonicalizer::new(ParsingConfig::new(BlockType::ParseAsDeclarations));
    canonicalizer.parse_a_list_of_declarations(tokens, errors)
}
