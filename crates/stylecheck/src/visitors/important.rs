//! `!important` declarations.

use stylecheck_syntax::ast::{Declaration, Stylesheet};
use stylecheck_syntax::token::{ErrorCode, ErrorToken, Positioned};
use stylecheck_syntax::visitor::RuleVisitor;

/// Collects references to declarations marked `!important`.
pub struct ImportantPropertyVisitor<'ast, 'a> {
    important: &'a mut Vec<&'ast Declaration>,
}

impl<'ast, 'a> ImportantPropertyVisitor<'ast, 'a> {
    pub fn new(important: &'a mut Vec<&'ast Declaration>) -> Self {
        Self { important }
    }
}

impl<'ast> RuleVisitor<'ast> for ImportantPropertyVisitor<'ast, '_> {
    fn visit_declaration(&mut self, declaration: &'ast Declaration) {
        if declaration.important {
            self.important.push(declaration);
        }
    }
}

/// Append every `!important` declaration of `stylesheet` to `important`.
pub fn extract_important_declarations<'ast>(
    stylesheet: &'ast Stylesheet,
    important: &mut Vec<&'ast Declaration>,
) {
    stylesheet.accept(&mut ImportantPropertyVisitor::new(important));
}

/// Diagnostic for a disallowed `!important`, at the `!` when known.
pub fn disallowed_important(declaration: &Declaration) -> ErrorToken {
    ErrorToken::at(
        ErrorCode::CssSyntaxDisallowedImportant,
        declaration.important_pos.unwrap_or_else(|| declaration.pos()),
    )
}
