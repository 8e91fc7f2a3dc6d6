//! Entry points that run every pass a [`CssSpec`] asks for.

use std::io::Read;

use stylecheck_syntax::ast::Declaration;
use stylecheck_syntax::canonicalizer::{parse_a_stylesheet, parse_inline_style};
use stylecheck_syntax::token::{ErrorToken, ParsedCssUrl, Token};
use stylecheck_syntax::tokenizer::{Tokenized, tokenize, tokenize_reader};
use stylecheck_syntax::visitor::RuleVisitor;

use crate::error::Result;
use crate::spec::CssSpec;
use crate::visitors::important::disallowed_important;
use crate::visitors::{
    InvalidAtRuleVisitor, InvalidDeclarationVisitor, extract_important_declarations,
    extract_urls, extract_urls_from_declaration, parse_media_queries, validate_amp4ads_css,
    validate_keyframes_css,
};

/// Outcome of validating a style sheet.
#[derive(Debug, Clone, Default)]
pub struct StylesheetReport {
    pub errors: Vec<ErrorToken>,
    pub urls: Vec<ParsedCssUrl>,
    pub media_types: Vec<Token>,
    pub media_features: Vec<Token>,
}

impl StylesheetReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Outcome of validating a `style` attribute.
#[derive(Debug, Clone, Default)]
pub struct InlineStyleReport {
    pub errors: Vec<ErrorToken>,
    pub declarations: Vec<Declaration>,
    pub urls: Vec<ParsedCssUrl>,
}

impl InlineStyleReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate a style sheet whose first character sits at `line`:`col`.
pub fn validate_stylesheet(css: &str, line: u32, col: u32, spec: &CssSpec) -> StylesheetReport {
    check_stylesheet(tokenize(css, line, col), spec)
}

/// [`validate_stylesheet`] over a reader. Fails only if the reader does, or
/// yields invalid UTF-8.
pub fn validate_stylesheet_reader<R: Read>(
    reader: R,
    line: u32,
    col: u32,
    spec: &CssSpec,
) -> Result<StylesheetReport> {
    Ok(check_stylesheet(tokenize_reader(reader, line, col)?, spec))
}

fn check_stylesheet(tokenized: Tokenized, spec: &CssSpec) -> StylesheetReport {
    let mut report = StylesheetReport {
        errors: tokenized.errors,
        ..StylesheetReport::default()
    };
    let errors = &mut report.errors;
    let sheet = parse_a_stylesheet(tokenized.tokens, &spec.parsing_config(), errors);

    extract_urls(&sheet, &mut report.urls, errors);
    parse_media_queries(
        &sheet,
        &mut report.media_types,
        &mut report.media_features,
        errors,
    );
    if spec.validate_amp4ads {
        validate_amp4ads_css(&sheet, errors);
    }
    if spec.validate_keyframes {
        validate_keyframes_css(&sheet, errors);
    }

    let allow_list = spec.allow_list();
    sheet.accept(&mut InvalidAtRuleVisitor::new(&allow_list, errors));
    sheet.accept(&mut InvalidDeclarationVisitor::new(&allow_list, errors));

    if !spec.allow_important {
        let mut important = Vec::new();
        extract_important_declarations(&sheet, &mut important);
        errors.extend(important.into_iter().map(disallowed_important));
    }

    tracing::debug!(
        rules = sheet.rules.len(),
        errors = report.errors.len(),
        urls = report.urls.len(),
        media_types = report.media_types.len(),
        "validated style sheet"
    );
    report
}

/// Validate the body of a `style` attribute starting at `line`:`col`.
///
/// Syntax errors stop validation: the report then holds only those errors
/// and whatever declarations were recovered.
pub fn validate_inline_style(css: &str, line: u32, col: u32, spec: &CssSpec) -> InlineStyleReport {
    let tokenized = tokenize(css, line, col);
    let mut errors = tokenized.errors;
    let declarations = parse_inline_style(tokenized.tokens, &mut errors);
    if !errors.is_empty() {
        tracing::debug!(errors = errors.len(), "inline style has syntax errors");
        return InlineStyleReport {
            errors,
            declarations,
            urls: Vec::new(),
        };
    }

    let allow_list = spec.allow_list();
    let mut checker = InvalidDeclarationVisitor::new(&allow_list, &mut errors);
    for declaration in &declarations {
        checker.visit_declaration(declaration);
    }

    let mut urls = Vec::new();
    for declaration in &declarations {
        if declaration.important && !spec.allow_important {
            errors.push(disallowed_important(declaration));
        }
        extract_urls_from_declaration(declaration, &mut urls, &mut errors);
    }

    tracing::debug!(
        declarations = declarations.len(),
        errors = errors.len(),
        urls = urls.len(),
        "validated inline style"
    );
    InlineStyleReport {
        errors,
        declarations,
        urls,
    }
}
