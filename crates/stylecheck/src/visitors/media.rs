//! Media query validation for `@media` preludes.
//!
//! Grammar, after CSS3 Media Queries:
//!
//! ```text
//! media_query_list : S* [ media_query [ ',' S* media_query ]* ]?
//! media_query      : ( expression | [ ONLY | NOT ]? S* media_type S* )
//!                    [ AND S* expression ]*
//! media_type       : IDENT
//! expression       : '(' S* media_feature S* [ ':' S* expr ]? ')' S*
//! media_feature    : IDENT
//! ```
//!
//! Keywords are matched ASCII case-insensitively. The `expr` after a colon
//! is not interpreted; any tokens up to the closing `)` are accepted, with
//! function calls skipped as a unit.

use stylecheck_syntax::ast::{AtRule, Stylesheet};
use stylecheck_syntax::canonicalizer::MAX_CSS_RECURSION;
use stylecheck_syntax::stream::TokenStream;
use stylecheck_syntax::token::{ErrorCode, ErrorToken, Positioned, Token, TokenType};
use stylecheck_syntax::visitor::RuleVisitor;

/// Validates every `@media` prelude, collecting media types and features.
pub struct MediaQueryVisitor<'a> {
    media_types: &'a mut Vec<Token>,
    media_features: &'a mut Vec<Token>,
    errors: &'a mut Vec<ErrorToken>,
}

impl<'a> MediaQueryVisitor<'a> {
    pub fn new(
        media_types: &'a mut Vec<Token>,
        media_features: &'a mut Vec<Token>,
        errors: &'a mut Vec<ErrorToken>,
    ) -> Self {
        Self {
            media_types,
            media_features,
            errors,
        }
    }

    fn maybe_consume_whitespace(s: &mut TokenStream) {
        if s.current().token_type() == TokenType::Whitespace {
            s.consume();
        }
    }

    fn is_keyword(token: &Token, keyword: &str) -> bool {
        token.token_type() == TokenType::Ident && token.ascii_match(keyword)
    }

    fn parse_a_media_query_list(&mut self, s: &mut TokenStream) -> bool {
        Self::maybe_consume_whitespace(s);
        if !s.current().is_eof() {
            if !self.parse_a_media_query(s) {
                return false;
            }
            while s.current().token_type() == TokenType::Comma {
                s.consume();
                Self::maybe_consume_whitespace(s);
                if !self.parse_a_media_query(s) {
                    return false;
                }
            }
        }
        s.current().is_eof()
    }

    fn parse_a_media_query(&mut self, s: &mut TokenStream) -> bool {
        // An expression always starts with '(', which tells the two
        // alternatives apart.
        if s.current().token_type() == TokenType::OpenParen {
            if !self.parse_a_media_expression(s) {
                return false;
            }
        } else {
            if Self::is_keyword(s.current(), "only") || Self::is_keyword(s.current(), "not") {
                s.consume();
            }
            Self::maybe_consume_whitespace(s);
            if !self.parse_a_media_type(s) {
                return false;
            }
            Self::maybe_consume_whitespace(s);
        }
        while Self::is_keyword(s.current(), "and") {
            s.consume();
            Self::maybe_consume_whitespace(s);
            if !self.parse_a_media_expression(s) {
                return false;
            }
        }
        true
    }

    fn parse_a_media_type(&mut self, s: &mut TokenStream) -> bool {
        if s.current().token_type() != TokenType::Ident {
            return false;
        }
        self.media_types.push(s.current().clone());
        s.consume();
        true
    }

    fn parse_a_media_feature(&mut self, s: &mut TokenStream) -> bool {
        if s.current().token_type() != TokenType::Ident {
            return false;
        }
        self.media_features.push(s.current().clone());
        s.consume();
        true
    }

    fn parse_a_media_expression(&mut self, s: &mut TokenStream) -> bool {
        if s.current().token_type() != TokenType::OpenParen {
            return false;
        }
        s.consume();
        Self::maybe_consume_whitespace(s);
        if !self.parse_a_media_feature(s) {
            return false;
        }
        Self::maybe_consume_whitespace(s);
        if s.current().token_type() == TokenType::Colon {
            s.consume();
            Self::maybe_consume_whitespace(s);
            while !s.current().is_eof() {
                match s.current().token_type() {
                    TokenType::CloseParen => break,
                    TokenType::FunctionToken => {
                        if !consume_a_function(s, 0) {
                            return false;
                        }
                    }
                    _ => s.consume(),
                }
            }
        }
        if s.current().token_type() != TokenType::CloseParen {
            return false;
        }
        s.consume();
        Self::maybe_consume_whitespace(s);
        true
    }
}

/// Skip a function call up to and including its `)`. False on end of input
/// or too deep a nesting of calls.
fn consume_a_function(s: &mut TokenStream, depth: usize) -> bool {
    if depth >= MAX_CSS_RECURSION || s.current().token_type() != TokenType::FunctionToken {
        return false;
    }
    s.consume();
    while !s.current().is_eof() {
        match s.current().token_type() {
            TokenType::FunctionToken => {
                if !consume_a_function(s, depth + 1) {
                    return false;
                }
            }
            TokenType::CloseParen => {
                s.consume();
                return true;
            }
            _ => s.consume(),
        }
    }
    false
}

impl<'ast> RuleVisitor<'ast> for MediaQueryVisitor<'_> {
    fn visit_at_rule(&mut self, at_rule: &'ast AtRule) {
        if !at_rule.name().eq_ignore_ascii_case("media") {
            return;
        }
        let mut s = TokenStream::new(at_rule.prelude.clone());
        s.consume();
        if !self.parse_a_media_query_list(&mut s) {
            tracing::debug!(pos = %at_rule.pos(), "malformed media query");
            self.errors.push(ErrorToken::at(
                ErrorCode::CssSyntaxMalformedMediaQuery,
                at_rule.pos(),
            ));
        }
    }
}

/// Validate the media queries of `stylesheet`, appending recognized media
/// types and features.
pub fn parse_media_queries(
    stylesheet: &Stylesheet,
    media_types: &mut Vec<Token>,
    media_features: &mut Vec<Token>,
    errors: &mut Vec<ErrorToken>,
) {
    stylesheet.accept(&mut MediaQueryVisitor::new(media_types, media_features, errors));
}

#[cfg(test)]
mod tests {
    use super::*;
    use stylecheck_syntax::prelude::*;

    struct Parsed {
        types: Vec<String>,
        features: Vec<String>,
        errors: Vec<ErrorToken>,
    }

    fn parse(css: &str) -> Parsed {
        let tokenized = tokenize(css, 1, 0);
        let mut errors = tokenized.errors;
        let sheet = parse_a_stylesheet(tokenized.tokens, &ParsingConfig::default(), &mut errors);
        let (mut types, mut features) = (Vec::new(), Vec::new());
        parse_media_queries(&sheet, &mut types, &mut features, &mut errors);
        Parsed {
            types: types.iter().map(Token::string_value).collect(),
            features: features.iter().map(Token::string_value).collect(),
            errors,
        }
    }

    fn accepts(prelude: &str) -> bool {
        parse(&format!("@media {prelude} {{ }}")).errors.is_empty()
    }

    #[test]
    fn accepted_queries() {
        for prelude in [
            "",
            "screen",
            "screen, print",
            "only screen",
            "NOT print",
            "(min-width: 500px)",
            "(color)",
            "( min-width : 500px )",
            "screen and (min-width: 500px)",
            "screen AND (orientation: landscape) and (color)",
            "(min-width: 500px) and (max-width: 600px)",
            "(min-resolution: calc(1dppx + max(1dppx, 2dppx)))",
            "(aspect-ratio: 16/9)",
        ] {
            assert!(accepts(prelude), "rejected {prelude:?}");
        }
    }

    #[test]
    fn rejected_queries() {
        for prelude in [
            "(min-width 500px)",
            "screen and",
            "screen (color)",
            "and (color)",
            "screen,",
            "(500px)",
            "(min-width: 500px",
            "(min-width: calc(1px)",
            "\"screen\"",
            "screen print",
        ] {
            assert!(!accepts(prelude), "accepted {prelude:?}");
        }
    }

    #[test]
    fn collects_types_and_features() {
        let parsed = parse("@media (min-width: 500px) and (max-width: 600px) { }");
        assert!(parsed.errors.is_empty());
        assert!(parsed.types.is_empty());
        assert_eq!(parsed.features, ["min-width", "max-width"]);

        let parsed = parse("@media only screen and (color), print { }");
        assert_eq!(parsed.types, ["screen", "print"]);
        assert_eq!(parsed.features, ["color"]);
    }

    #[test]
    fn one_error_per_at_rule() {
        let parsed = parse("a { }\n@MEDIA (min-width 500px), (x y) { }");
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].code(), ErrorCode::CssSyntaxMalformedMediaQuery);
        assert_eq!(parsed.errors[0].params(), ["style"]);
        assert_eq!(parsed.errors[0].pos(), SourcePos::new(2, 0));
    }

    #[test]
    fn hand_built_media_rule() {
        let rule = AtRule::new("media", SourcePos::new(1, 0));
        let (mut types, mut features, mut errors) = (Vec::new(), Vec::new(), Vec::new());
        MediaQueryVisitor::new(&mut types, &mut features, &mut errors).visit_at_rule(&rule);
        assert!(errors.is_empty());
        assert!(types.is_empty());
    }

    #[test]
    fn other_at_rules_are_ignored() {
        assert!(parse("@supports (display: grid) and (not x) { }").errors.is_empty());
    }
}
