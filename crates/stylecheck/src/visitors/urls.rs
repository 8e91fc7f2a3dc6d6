//! URL extraction from declaration values.
//!
//! Both unquoted `url(http://foo)` tokens and `url("http://foo")` function
//! calls are recognized. Each URL records the name of the at-rule it sits
//! in, which callers use to pick a URL policy (fonts inside `@font-face`,
//! images elsewhere).
//!
//! The scope is a single slot: entering an at-rule sets it and leaving any
//! at-rule clears it. Rules that follow a nested at-rule inside its parent
//! therefore report an empty scope.

use stylecheck_syntax::ast::{AtRule, Declaration, Stylesheet};
use stylecheck_syntax::token::{ErrorCode, ErrorToken, ParsedCssUrl, Positioned, Token, TokenKind};
use stylecheck_syntax::visitor::RuleVisitor;

/// Read the url token at `tokens[index]`.
///
/// # Panics
///
/// Panics if that token is not a url token.
pub fn parse_url_token(tokens: &[Token], index: usize, at_rule_scope: &str) -> ParsedCssUrl {
    let token = &tokens[index];
    match token.kind() {
        TokenKind::Url(url) => ParsedCssUrl::new(url.as_str(), at_rule_scope, token.pos()),
        other => panic!("expected a url token, found {other:?}"),
    }
}

/// Read a `url(` function call starting at `tokens[index]`: optional
/// whitespace, a string, optional whitespace and `)`.
///
/// Returns the URL and the index just past the `)`, or `None` if the call
/// has any other shape.
///
/// # Panics
///
/// Panics if `tokens[index]` is not a function token named `url`, or if
/// `tokens` is not EOF-terminated.
pub fn parse_url_function(
    tokens: &[Token],
    index: usize,
    at_rule_scope: &str,
) -> Option<(ParsedCssUrl, usize)> {
    let start = &tokens[index];
    assert!(
        matches!(start.kind(), TokenKind::Function(name) if name == "url"),
        "expected a url( function token, found {:?}",
        start.kind()
    );
    assert!(
        tokens.last().is_some_and(Token::is_eof),
        "url function tokens must end with an EOF token"
    );

    let skip_whitespace = |mut i: usize| {
        while matches!(tokens[i].kind(), TokenKind::Whitespace) {
            i += 1;
        }
        i
    };

    let mut i = skip_whitespace(index + 1);
    let TokenKind::String(url) = tokens[i].kind() else {
        return None;
    };
    i = skip_whitespace(i + 1);
    if !matches!(tokens[i].kind(), TokenKind::CloseParen) {
        return None;
    }
    Some((ParsedCssUrl::new(url.as_str(), at_rule_scope, start.pos()), i + 1))
}

/// Collects the URLs of every declaration it visits.
///
/// A malformed `url(` call records a `CSS_SYNTAX_BAD_URL` diagnostic and
/// stops extraction for the rest of that declaration.
pub struct UrlFunctionVisitor<'a> {
    urls: &'a mut Vec<ParsedCssUrl>,
    errors: &'a mut Vec<ErrorToken>,
    at_rule_scope: String,
}

impl<'a> UrlFunctionVisitor<'a> {
    pub fn new(urls: &'a mut Vec<ParsedCssUrl>, errors: &'a mut Vec<ErrorToken>) -> Self {
        Self {
            urls,
            errors,
            at_rule_scope: String::new(),
        }
    }
}

impl<'ast> RuleVisitor<'ast> for UrlFunctionVisitor<'_> {
    fn visit_at_rule(&mut self, at_rule: &'ast AtRule) {
        self.at_rule_scope = at_rule.name().to_string();
    }

    fn leave_at_rule(&mut self, _: &'ast AtRule) {
        self.at_rule_scope.clear();
    }

    fn visit_declaration(&mut self, declaration: &'ast Declaration) {
        let tokens = &declaration.value;
        let mut i = 0;
        while i + 1 < tokens.len() {
            let token = &tokens[i];
            match token.kind() {
                TokenKind::Url(_) => {
                    let url = parse_url_token(tokens, i, &self.at_rule_scope);
                    self.urls.push(url);
                    i += 1;
                }
                TokenKind::Function(name) if name == "url" => {
                    match parse_url_function(tokens, i, &self.at_rule_scope) {
                        Some((url, next)) => {
                            self.urls.push(url);
                            i = next;
                        }
                        None => {
                            tracing::debug!(pos = %token.pos(), "malformed url() in declaration");
                            self.errors
                                .push(ErrorToken::at(ErrorCode::CssSyntaxBadUrl, token.pos()));
                            return;
                        }
                    }
                }
                _ => i += 1,
            }
        }
    }
}

/// Append every URL in `stylesheet` to `urls`.
///
/// If this run records any diagnostic, the URLs it appended are removed
/// again; entries already in `urls` are kept.
pub fn extract_urls(stylesheet: &Stylesheet, urls: &mut Vec<ParsedCssUrl>, errors: &mut Vec<ErrorToken>) {
    let (urls_before, errors_before) = (urls.len(), errors.len());
    stylesheet.accept(&mut UrlFunctionVisitor::new(urls, errors));
    if errors.len() != errors_before {
        urls.truncate(urls_before);
    }
}

/// [`extract_urls`] for a single declaration, such as one from an inline
/// style.
pub fn extract_urls_from_declaration(
    declaration: &Declaration,
    urls: &mut Vec<ParsedCssUrl>,
    errors: &mut Vec<ErrorToken>,
) {
    let (urls_before, errors_before) = (urls.len(), errors.len());
    UrlFunctionVisitor::new(urls, errors).visit_declaration(declaration);
    if errors.len() != errors_before {
        urls.truncate(urls_before);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stylecheck_syntax::prelude::*;

    fn extract(css: &str) -> (Vec<ParsedCssUrl>, Vec<ErrorToken>) {
        let tokenized = tokenize(css, 1, 0);
        let mut errors = tokenized.errors;
        let sheet = parse_a_stylesheet(tokenized.tokens, &ParsingConfig::default(), &mut errors);
        let mut urls = Vec::new();
        extract_urls(&sheet, &mut urls, &mut errors);
        (urls, errors)
    }

    #[test]
    fn url_outside_at_rules() {
        let (urls, errors) = extract("a { background-image: url(http://x/y.jpg); }");
        assert!(errors.is_empty());
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].utf8_url, "http://x/y.jpg");
        assert_eq!(urls[0].at_rule_scope, "");
        assert_eq!(urls[0].pos(), SourcePos::new(1, 22));
    }

    #[test]
    fn url_inside_media() {
        let (urls, errors) =
            extract("@media screen { a { background-image: url(http://x/y.jpg); } }");
        assert!(errors.is_empty());
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].at_rule_scope, "media");
    }

    #[test]
    fn scope_keeps_name_as_written() {
        let (urls, errors) = extract("@MEDIA screen { a { b: url(x) } }\n@-webkit-font-face { src: url(y) }");
        assert!(errors.is_empty());
        let scopes: Vec<&str> = urls.iter().map(|u| u.at_rule_scope.as_str()).collect();
        assert_eq!(scopes, ["MEDIA", "-webkit-font-face"]);
    }

    #[test]
    fn scope_clears_when_any_at_rule_ends() {
        let css = "@font-face { src: url(a.woff) }\n\
                   @supports (x: y) { @media print { b { c: url(b) } } d { e: url(c) } }\n\
                   f { g: url(d) }";
        let (urls, errors) = extract(css);
        assert!(errors.is_empty());
        let scopes: Vec<(&str, &str)> = urls
            .iter()
            .map(|u| (u.utf8_url.as_str(), u.at_rule_scope.as_str()))
            .collect();
        assert_eq!(
            scopes,
            [("a.woff", "font-face"), ("b", "media"), ("c", ""), ("d", "")]
        );
    }

    #[test]
    fn quoted_url_function() {
        let (urls, errors) = extract("a { b: url( \"x.png\" ) url('y.png'), url(z.png) }");
        assert!(errors.is_empty());
        let found: Vec<&str> = urls.iter().map(|u| u.utf8_url.as_str()).collect();
        assert_eq!(found, ["x.png", "y.png", "z.png"]);
        assert_eq!(urls[0].pos(), SourcePos::new(1, 7));
    }

    #[test]
    fn bad_url_drops_this_runs_urls() {
        let css = "a { b: url(x.png) }\nc { d: url(\"ok\" e) url(\"never\") }";
        let (urls, errors) = extract(css);
        assert!(urls.is_empty());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), ErrorCode::CssSyntaxBadUrl);
        assert_eq!(errors[0].params(), ["style"]);
        assert_eq!(errors[0].pos(), SourcePos::new(2, 7));
    }

    #[test]
    fn earlier_urls_are_kept() {
        let tokenized = tokenize("a { b: url(1 2) }", 1, 0);
        let mut errors = tokenized.errors;
        assert_eq!(errors.len(), 1, "bad url token reported by the tokenizer");
        let sheet = parse_a_stylesheet(tokenized.tokens, &ParsingConfig::default(), &mut errors);

        let mut urls = vec![ParsedCssUrl::new("kept", "", SourcePos::new(1, 0))];
        extract_urls(&sheet, &mut urls, &mut errors);
        assert_eq!(urls.len(), 1);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn declaration_extraction() {
        let tokenized = tokenize("background: url(a.png), url(\"b.png\")", 1, 0);
        let mut errors = tokenized.errors;
        let declarations = parse_inline_style(tokenized.tokens, &mut errors);
        let mut urls = Vec::new();
        extract_urls_from_declaration(&declarations[0], &mut urls, &mut errors);
        assert!(errors.is_empty());
        assert_eq!(urls.len(), 2);
        assert!(urls.iter().all(|u| u.at_rule_scope.is_empty()));
    }

    #[test]
    fn url_function_shapes() {
        let pos = SourcePos::new(1, 0);
        let tokens = vec![
            Token::new(TokenKind::Function("url".into()), pos),
            Token::new(TokenKind::String("x".into()), pos),
            Token::new(TokenKind::CloseParen, pos),
            Token::new(TokenKind::Whitespace, pos),
            Token::eof_at(pos),
        ];
        let (url, next) = parse_url_function(&tokens, 0, "media").unwrap();
        assert_eq!(url.utf8_url, "x");
        assert_eq!(url.at_rule_scope, "media");
        assert_eq!(next, 3);

        let unclosed = vec![
            Token::new(TokenKind::Function("url".into()), pos),
            Token::new(TokenKind::String("x".into()), pos),
            Token::eof_at(pos),
        ];
        assert!(parse_url_function(&unclosed, 0, "").is_none());
    }

    #[test]
    #[should_panic(expected = "expected a url token")]
    fn url_token_precondition() {
        let pos = SourcePos::new(1, 0);
        parse_url_token(&[Token::new(TokenKind::Whitespace, pos), Token::eof_at(pos)], 0, "");
    }
}
