//! Structure checks for style sheets that may only hold keyframes.

use stylecheck_syntax::ast::{AtRule, QualifiedRule, Stylesheet};
use stylecheck_syntax::canonicalizer::strip_vendor_prefix;
use stylecheck_syntax::token::{ErrorCode, ErrorToken, Positioned};
use stylecheck_syntax::visitor::RuleVisitor;

/// Requires every qualified rule to be a non-empty keyframe selector
/// directly inside `@keyframes`, and forbids nesting `@keyframes`.
pub struct KeyframesVisitor<'a> {
    errors: &'a mut Vec<ErrorToken>,
    // One entry per open at-rule: whether it is a keyframes rule.
    at_rules: Vec<bool>,
}

impl<'a> KeyframesVisitor<'a> {
    pub fn new(errors: &'a mut Vec<ErrorToken>) -> Self {
        Self {
            errors,
            at_rules: Vec::new(),
        }
    }
}

impl<'ast> RuleVisitor<'ast> for KeyframesVisitor<'_> {
    fn visit_at_rule(&mut self, at_rule: &'ast AtRule) {
        let is_keyframes = strip_vendor_prefix(at_rule.name()).eq_ignore_ascii_case("keyframes");
        if is_keyframes && self.at_rules.contains(&true) {
            self.errors.push(ErrorToken::at(
                ErrorCode::CssSyntaxDisallowedKeyframeInsideKeyframe,
                at_rule.pos(),
            ));
        }
        self.at_rules.push(is_keyframes);
    }

    fn leave_at_rule(&mut self, _: &'ast AtRule) {
        self.at_rules.pop();
    }

    fn visit_qualified_rule(&mut self, qualified_rule: &'ast QualifiedRule) {
        if self.at_rules.last() != Some(&true) {
            self.errors.push(ErrorToken::with_params(
                ErrorCode::CssSyntaxDisallowedQualifiedRuleMustBeInsideKeyframes,
                qualified_rule.pos(),
                [qualified_rule.rule_name()],
            ));
        } else if qualified_rule.declarations.is_empty() {
            self.errors.push(ErrorToken::with_params(
                ErrorCode::CssSyntaxQualifiedRuleHasNoDeclarations,
                qualified_rule.pos(),
                [qualified_rule.rule_name()],
            ));
        }
    }
}

/// Check that `stylesheet` holds only keyframes.
pub fn validate_keyframes_css(stylesheet: &Stylesheet, errors: &mut Vec<ErrorToken>) {
    stylesheet.accept(&mut KeyframesVisitor::new(errors));
}
