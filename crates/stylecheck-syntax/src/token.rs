//! Token model shared by the tokenizer, the canonicalizer and the visitors.
//!
//! A [`Token`] is immutable once produced: its kind and its [`SourcePos`] are
//! fixed at creation. Diagnostics ([`ErrorToken`]) and visitor output
//! ([`ParsedCssUrl`]) carry positions the same way, and AST nodes expose theirs
//! through [`Positioned`].

use std::fmt;

/// A line / column pair in the host document.
///
/// Lines are whatever the caller's offset makes them (usually 1-based),
/// columns are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SourcePos {
    /// Line number.
    pub line: u32,
    /// Column number.
    pub col: u32,
}

impl SourcePos {
    /// Create a position.
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// The tag of every token-like value, including AST nodes and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    EofToken,
    Whitespace,
    Cdo,
    Cdc,
    AtKeyword,
    Semicolon,
    OpenCurly,
    CloseCurly,
    OpenSquare,
    CloseSquare,
    OpenParen,
    CloseParen,
    FunctionToken,
    Ident,
    Colon,
    Comma,
    Delim,
    Url,
    String,
    Number,
    Percentage,
    Dimension,
    Hash,
    IncludeMatch,
    DashMatch,
    PrefixMatch,
    SuffixMatch,
    SubstringMatch,
    BadString,
    BadUrl,
    Error,
    ParsedCssUrl,
    Stylesheet,
    AtRule,
    QualifiedRule,
    Declaration,
}

impl TokenType {
    /// Stable upper-snake name of the tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::EofToken => "EOF_TOKEN",
            TokenType::Whitespace => "WHITESPACE",
            TokenType::Cdo => "CDO",
            TokenType::Cdc => "CDC",
            TokenType::AtKeyword => "AT_KEYWORD",
            TokenType::Semicolon => "SEMICOLON",
            TokenType::OpenCurly => "OPEN_CURLY",
            TokenType::CloseCurly => "CLOSE_CURLY",
            TokenType::OpenSquare => "OPEN_SQUARE",
            TokenType::CloseSquare => "CLOSE_SQUARE",
            TokenType::OpenParen => "OPEN_PAREN",
            TokenType::CloseParen => "CLOSE_PAREN",
            TokenType::FunctionToken => "FUNCTION_TOKEN",
            TokenType::Ident => "IDENT",
            TokenType::Colon => "COLON",
            TokenType::Comma => "COMMA",
            TokenType::Delim => "DELIM",
            TokenType::Url => "URL",
            TokenType::String => "STRING",
            TokenType::Number => "NUMBER",
            TokenType::Percentage => "PERCENTAGE",
            TokenType::Dimension => "DIMENSION",
            TokenType::Hash => "HASH",
            TokenType::IncludeMatch => "INCLUDE_MATCH",
            TokenType::DashMatch => "DASH_MATCH",
            TokenType::PrefixMatch => "PREFIX_MATCH",
            TokenType::SuffixMatch => "SUFFIX_MATCH",
            TokenType::SubstringMatch => "SUBSTRING_MATCH",
            TokenType::BadString => "BAD_STRING",
            TokenType::BadUrl => "BAD_URL",
            TokenType::Error => "ERROR",
            TokenType::ParsedCssUrl => "PARSED_CSS_URL",
            TokenType::Stylesheet => "STYLESHEET",
            TokenType::AtRule => "AT_RULE",
            TokenType::QualifiedRule => "QUALIFIED_RULE",
            TokenType::Declaration => "DECLARATION",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that sits at a source position and has a [`TokenType`] tag.
pub trait Positioned {
    /// Where this value starts in the host document.
    fn pos(&self) -> SourcePos;

    /// The tag of this value.
    fn token_type(&self) -> TokenType;
}

/// Payload of a lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Eof,
    Whitespace,
    Cdo,
    Cdc,
    /// `@name`, stored without the `@`.
    AtKeyword(String),
    Semicolon,
    OpenCurly,
    CloseCurly,
    OpenSquare,
    CloseSquare,
    OpenParen,
    CloseParen,
    /// `name(`, stored without the `(`.
    Function(String),
    Ident(String),
    Colon,
    Comma,
    Delim(char),
    /// Unquoted `url(...)` contents.
    Url(String),
    /// Quoted string contents, escapes resolved.
    String(String),
    Number {
        value: f32,
        repr: String,
    },
    Percentage {
        value: f32,
        repr: String,
    },
    Dimension {
        value: f32,
        repr: String,
        unit: String,
    },
    Hash {
        value: String,
        is_id: bool,
    },
    IncludeMatch,
    DashMatch,
    PrefixMatch,
    SuffixMatch,
    SubstringMatch,
    BadString,
    BadUrl,
}

/// A lexical token with its source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    kind: TokenKind,
    pos: SourcePos,
}

impl Token {
    /// Create a token at a position.
    pub fn new(kind: TokenKind, pos: SourcePos) -> Self {
        Self { kind, pos }
    }

    /// A synthetic end-of-file marker at `pos`.
    pub fn eof_at(pos: SourcePos) -> Self {
        Self::new(TokenKind::Eof, pos)
    }

    /// The token payload.
    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    /// Whether this is the end-of-file marker.
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Whether this is a `{`, `[` or `(` token.
    pub fn is_open_grouping(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::OpenCurly | TokenKind::OpenSquare | TokenKind::OpenParen
        )
    }

    /// Whether this is a `}`, `]` or `)` token.
    pub fn is_close_grouping(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::CloseCurly | TokenKind::CloseSquare | TokenKind::CloseParen
        )
    }

    /// The closer that ends a block opened by this token, if it is an opener.
    pub fn mirror(&self) -> Option<TokenType> {
        match self.kind {
            TokenKind::OpenCurly => Some(TokenType::CloseCurly),
            TokenKind::OpenSquare => Some(TokenType::CloseSquare),
            TokenKind::OpenParen => Some(TokenType::CloseParen),
            _ => None,
        }
    }

    /// The textual value of the token.
    ///
    /// Identifier-like tokens yield their name, strings and urls their decoded
    /// contents, numeric tokens their source representation and punctuation
    /// its literal text. The end-of-file marker yields the empty string.
    pub fn string_value(&self) -> String {
        match &self.kind {
            TokenKind::AtKeyword(v)
            | TokenKind::Function(v)
            | TokenKind::Ident(v)
            | TokenKind::Url(v)
            | TokenKind::String(v) => v.clone(),
            TokenKind::Hash { value, .. } => value.clone(),
            TokenKind::Delim(c) => c.to_string(),
            TokenKind::Number { repr, .. } => repr.clone(),
            TokenKind::Percentage { repr, .. } => format!("{repr}%"),
            TokenKind::Dimension { repr, unit, .. } => format!("{repr}{unit}"),
            TokenKind::Whitespace => " ".to_string(),
            TokenKind::Cdo => "<!--".to_string(),
            TokenKind::Cdc => "-->".to_string(),
            TokenKind::Semicolon => ";".to_string(),
            TokenKind::OpenCurly => "{".to_string(),
            TokenKind::CloseCurly => "}".to_string(),
            TokenKind::OpenSquare => "[".to_string(),
            TokenKind::CloseSquare => "]".to_string(),
            TokenKind::OpenParen => "(".to_string(),
            TokenKind::CloseParen => ")".to_string(),
            TokenKind::Colon => ":".to_string(),
            TokenKind::Comma => ",".to_string(),
            TokenKind::IncludeMatch => "~=".to_string(),
            TokenKind::DashMatch => "|=".to_string(),
            TokenKind::PrefixMatch => "^=".to_string(),
            TokenKind::SuffixMatch => "$=".to_string(),
            TokenKind::SubstringMatch => "*=".to_string(),
            TokenKind::Eof | TokenKind::BadString | TokenKind::BadUrl => String::new(),
        }
    }

    /// The identifier name, if this is an identifier token.
    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(v) => Some(v),
            _ => None,
        }
    }

    /// ASCII case-insensitive comparison of an identifier-like value.
    pub fn ascii_match(&self, other: &str) -> bool {
        match &self.kind {
            TokenKind::Ident(v) | TokenKind::AtKeyword(v) | TokenKind::Function(v) => {
                v.eq_ignore_ascii_case(other)
            }
            _ => false,
        }
    }
}

impl Positioned for Token {
    fn pos(&self) -> SourcePos {
        self.pos
    }

    fn token_type(&self) -> TokenType {
        match self.kind {
            TokenKind::Eof => TokenType::EofToken,
            TokenKind::Whitespace => TokenType::Whitespace,
            TokenKind::Cdo => TokenType::Cdo,
            TokenKind::Cdc => TokenType::Cdc,
            TokenKind::AtKeyword(_) => TokenType::AtKeyword,
            TokenKind::Semicolon => TokenType::Semicolon,
            TokenKind::OpenCurly => TokenType::OpenCurly,
            TokenKind::CloseCurly => TokenType::CloseCurly,
            TokenKind::OpenSquare => TokenType::OpenSquare,
            TokenKind::CloseSquare => TokenType::CloseSquare,
            TokenKind::OpenParen => TokenType::OpenParen,
            TokenKind::CloseParen => TokenType::CloseParen,
            TokenKind::Function(_) => TokenType::FunctionToken,
            TokenKind::Ident(_) => TokenType::Ident,
            TokenKind::Colon => TokenType::Colon,
            TokenKind::Comma => TokenType::Comma,
            TokenKind::Delim(_) => TokenType::Delim,
            TokenKind::Url(_) => TokenType::Url,
            TokenKind::String(_) => TokenType::String,
            TokenKind::Number { .. } => TokenType::Number,
            TokenKind::Percentage { .. } => TokenType::Percentage,
            TokenKind::Dimension { .. } => TokenType::Dimension,
            TokenKind::Hash { .. } => TokenType::Hash,
            TokenKind::IncludeMatch => TokenType::IncludeMatch,
            TokenKind::DashMatch => TokenType::DashMatch,
            TokenKind::PrefixMatch => TokenType::PrefixMatch,
            TokenKind::SuffixMatch => TokenType::SuffixMatch,
            TokenKind::SubstringMatch => TokenType::SubstringMatch,
            TokenKind::BadString => TokenType::BadString,
            TokenKind::BadUrl => TokenType::BadUrl,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::AtKeyword(v) => write!(f, "@{v}"),
            TokenKind::Function(v) => write!(f, "{v}("),
            TokenKind::String(v) => write!(f, "\"{v}\""),
            TokenKind::Url(v) => write!(f, "url({v})"),
            TokenKind::Hash { value, .. } => write!(f, "#{value}"),
            _ => f.write_str(&self.string_value()),
        }
    }
}

/// Diagnostic codes produced by this workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    CssSyntaxStrayTrailingBackslash,
    CssSyntaxUnterminatedComment,
    CssSyntaxUnterminatedString,
    CssSyntaxBadUrl,
    CssExcessivelyNested,
    CssSyntaxEofInPreludeOfQualifiedRule,
    CssSyntaxInvalidDeclaration,
    CssSyntaxIncompleteDeclaration,
    CssSyntaxInvalidAtRule,
    CssSyntaxMalformedMediaQuery,
    CssSyntaxInvalidProperty,
    CssSyntaxInvalidPropertyNolist,
    CssSyntaxDisallowedPropertyValue,
    CssSyntaxDisallowedPropertyValueWithHint,
    CssSyntaxPropertyDisallowedWithinAtRule,
    CssSyntaxDisallowedQualifiedRuleMustBeInsideKeyframes,
    CssSyntaxQualifiedRuleHasNoDeclarations,
    CssSyntaxDisallowedKeyframeInsideKeyframe,
    CssSyntaxDisallowedImportant,
}

impl ErrorCode {
    /// Stable name of the code, used by callers to look up message templates.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::CssSyntaxStrayTrailingBackslash => "CSS_SYNTAX_STRAY_TRAILING_BACKSLASH",
            ErrorCode::CssSyntaxUnterminatedComment => "CSS_SYNTAX_UNTERMINATED_COMMENT",
            ErrorCode::CssSyntaxUnterminatedString => "CSS_SYNTAX_UNTERMINATED_STRING",
            ErrorCode::CssSyntaxBadUrl => "CSS_SYNTAX_BAD_URL",
            ErrorCode::CssExcessivelyNested => "CSS_EXCESSIVELY_NESTED",
            ErrorCode::CssSyntaxEofInPreludeOfQualifiedRule => {
                "CSS_SYNTAX_EOF_IN_PRELUDE_OF_QUALIFIED_RULE"
            }
            ErrorCode::CssSyntaxInvalidDeclaration => "CSS_SYNTAX_INVALID_DECLARATION",
            ErrorCode::CssSyntaxIncompleteDeclaration => "CSS_SYNTAX_INCOMPLETE_DECLARATION",
            ErrorCode::CssSyntaxInvalidAtRule => "CSS_SYNTAX_INVALID_AT_RULE",
            ErrorCode::CssSyntaxMalformedMediaQuery => "CSS_SYNTAX_MALFORMED_MEDIA_QUERY",
            ErrorCode::CssSyntaxInvalidProperty => "CSS_SYNTAX_INVALID_PROPERTY",
            ErrorCode::CssSyntaxInvalidPropertyNolist => "CSS_SYNTAX_INVALID_PROPERTY_NOLIST",
            ErrorCode::CssSyntaxDisallowedPropertyValue => "CSS_SYNTAX_DISALLOWED_PROPERTY_VALUE",
            ErrorCode::CssSyntaxDisallowedPropertyValueWithHint => {
                "CSS_SYNTAX_DISALLOWED_PROPERTY_VALUE_WITH_HINT"
            }
            ErrorCode::CssSyntaxPropertyDisallowedWithinAtRule => {
                "CSS_SYNTAX_PROPERTY_DISALLOWED_WITHIN_AT_RULE"
            }
            ErrorCode::CssSyntaxDisallowedQualifiedRuleMustBeInsideKeyframes => {
                "CSS_SYNTAX_DISALLOWED_QUALIFIED_RULE_MUST_BE_INSIDE_KEYFRAMES"
            }
            ErrorCode::CssSyntaxQualifiedRuleHasNoDeclarations => {
                "CSS_SYNTAX_QUALIFIED_RULE_HAS_NO_DECLARATIONS"
            }
            ErrorCode::CssSyntaxDisallowedKeyframeInsideKeyframe => {
                "CSS_SYNTAX_DISALLOWED_KEYFRAME_INSIDE_KEYFRAME"
            }
            ErrorCode::CssSyntaxDisallowedImportant => "CSS_SYNTAX_DISALLOWED_IMPORTANT",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recoverable diagnostic: a code, positional message parameters and the
/// position it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorToken {
    code: ErrorCode,
    params: Vec<String>,
    pos: SourcePos,
}

impl ErrorToken {
    /// Placeholder first parameter, overwritten by the caller with the name
    /// of the tag that holds the style sheet.
    pub const CONTEXT_PLACEHOLDER: &'static str = "style";

    /// Create a diagnostic with explicit parameters.
    pub fn new(code: ErrorCode, params: Vec<String>, pos: SourcePos) -> Self {
        Self { code, params, pos }
    }

    /// Create a diagnostic whose only parameter is the context placeholder.
    pub fn at(code: ErrorCode, pos: SourcePos) -> Self {
        Self::new(code, vec![Self::CONTEXT_PLACEHOLDER.to_string()], pos)
    }

    /// Create a diagnostic with the context placeholder followed by `extra`.
    pub fn with_params<I, S>(code: ErrorCode, pos: SourcePos, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut params = vec![Self::CONTEXT_PLACEHOLDER.to_string()];
        params.extend(extra.into_iter().map(Into::into));
        Self::new(code, params, pos)
    }

    /// The diagnostic code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Message parameters, in template order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Replace the context placeholder (first parameter) with `name`.
    pub fn set_context_name(&mut self, name: impl Into<String>) {
        match self.params.first_mut() {
            Some(first) => *first = name.into(),
            None => self.params.push(name.into()),
        }
    }
}

impl Positioned for ErrorToken {
    fn pos(&self) -> SourcePos {
        self.pos
    }

    fn token_type(&self) -> TokenType {
        TokenType::Error
    }
}

impl fmt::Display for ErrorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {} [{}]", self.code, self.pos, self.params.join(", "))
    }
}

/// A URL found in a style sheet, such as `url(http://foo.com/)` or
/// `url("http://bar.com/")`.
///
/// The position is that of the left-most token of the URL (the url token or
/// the `url(` function token).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCssUrl {
    /// The decoded URL, without quotes or CSS escapes.
    pub utf8_url: String,
    /// Name of the enclosing at-rule, or empty outside at-rules.
    pub at_rule_scope: String,
    pos: SourcePos,
}

impl ParsedCssUrl {
    /// Create a parsed URL at a position.
    pub fn new(utf8_url: impl Into<String>, at_rule_scope: impl Into<String>, pos: SourcePos) -> Self {
        Self {
            utf8_url: utf8_url.into(),
            at_rule_scope: at_rule_scope.into(),
            pos,
        }
    }
}

impl Positioned for ParsedCssUrl {
    fn pos(&self) -> SourcePos {
        self.pos
    }

    fn token_type(&self) -> TokenType {
        TokenType::ParsedCssUrl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouping_tokens_mirror() {
        let pos = SourcePos::new(1, 0);
        let open = Token::new(TokenKind::OpenSquare, pos);
        assert!(open.is_open_grouping());
        assert_eq!(open.mirror(), Some(TokenType::CloseSquare));

        let close = Token::new(TokenKind::CloseParen, pos);
        assert!(close.is_close_grouping());
        assert_eq!(close.mirror(), None);
    }

    #[test]
    fn ascii_match_ignores_case_for_identifiers_only() {
        let pos = SourcePos::default();
        assert!(Token::new(TokenKind::Ident("MeDiA".into()), pos).ascii_match("media"));
        assert!(!Token::new(TokenKind::String("media".into()), pos).ascii_match("media"));
    }

    #[test]
    fn error_token_context_name() {
        let mut error = ErrorToken::with_params(
            ErrorCode::CssSyntaxInvalidAtRule,
            SourcePos::new(3, 4),
            ["lemur"],
        );
        assert_eq!(error.params(), ["style", "lemur"]);

        error.set_context_name("amp-custom");
        assert_eq!(error.params(), ["amp-custom", "lemur"]);
        assert_eq!(error.token_type(), TokenType::Error);
        assert_eq!(error.code().as_str(), "CSS_SYNTAX_INVALID_AT_RULE");
    }

    #[test]
    fn token_display() {
        let pos = SourcePos::default();
        assert_eq!(Token::new(TokenKind::AtKeyword("media".into()), pos).to_string(), "@media");
        assert_eq!(Token::new(TokenKind::Function("url".into()), pos).to_string(), "url(");
        assert_eq!(
            Token::new(
                TokenKind::Dimension {
                    value: 10.0,
                    repr: "10".into(),
                    unit: "px".into()
                },
                pos
            )
            .to_string(),
            "10px"
        );
    }
}
