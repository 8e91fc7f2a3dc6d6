//! Property constraints for ad-format style sheets.

use stylecheck_syntax::ast::{AtRule, Declaration, QualifiedRule, Stylesheet};
use stylecheck_syntax::canonicalizer::strip_vendor_prefix;
use stylecheck_syntax::token::{ErrorCode, ErrorToken, Positioned};
use stylecheck_syntax::visitor::RuleVisitor;

/// Properties that may be animated inside `@keyframes`.
pub const KEYFRAME_PROPERTIES: [&str; 3] = ["transform", "opacity", "animation-timing-function"];

/// Properties that `transition` may name.
pub const TRANSITION_PROPERTIES: [&str; 2] = ["opacity", "transform"];

fn is_keyframes(at_rule: &AtRule) -> bool {
    strip_vendor_prefix(at_rule.name()).eq_ignore_ascii_case("keyframes")
}

/// Rejects fixed or sticky positioning, transitions of anything but
/// opacity and transform, and keyframes animating other properties.
///
/// Positions are checked in every declaration. Transitions are checked only
/// in qualified rules, so `@font-face` and `@page` bodies may use them.
pub struct Amp4AdsVisitor<'a> {
    errors: &'a mut Vec<ErrorToken>,
    keyframes: Option<String>,
}

impl<'a> Amp4AdsVisitor<'a> {
    pub fn new(errors: &'a mut Vec<ErrorToken>) -> Self {
        Self {
            errors,
            keyframes: None,
        }
    }

    fn check_position(&mut self, declaration: &Declaration) {
        let value = declaration.first_ident();
        if value.eq_ignore_ascii_case("fixed") || value.eq_ignore_ascii_case("sticky") {
            self.errors.push(ErrorToken::with_params(
                ErrorCode::CssSyntaxDisallowedPropertyValue,
                declaration.pos(),
                ["position", value],
            ));
        }
    }

    fn check_transition(&mut self, declaration: &Declaration) {
        let value = declaration.first_ident();
        let property = strip_vendor_prefix(value);
        if TRANSITION_PROPERTIES
            .iter()
            .any(|allowed| property.eq_ignore_ascii_case(allowed))
        {
            return;
        }
        let hint = format!(
            "[{}]",
            TRANSITION_PROPERTIES
                .iter()
                .map(|p| format!("'{p}'"))
                .collect::<Vec<_>>()
                .join(", ")
        );
        self.errors.push(ErrorToken::with_params(
            ErrorCode::CssSyntaxDisallowedPropertyValueWithHint,
            declaration.pos(),
            ["transition", value, hint.as_str()],
        ));
    }
}

impl<'ast> RuleVisitor<'ast> for Amp4AdsVisitor<'_> {
    fn visit_at_rule(&mut self, at_rule: &'ast AtRule) {
        self.keyframes = is_keyframes(at_rule).then(|| at_rule.name().to_string());
    }

    fn leave_at_rule(&mut self, _: &'ast AtRule) {
        self.keyframes = None;
    }

    fn visit_qualified_rule(&mut self, qualified_rule: &'ast QualifiedRule) {
        for declaration in &qualified_rule.declarations {
            if strip_vendor_prefix(declaration.name()).eq_ignore_ascii_case("transition") {
                self.check_transition(declaration);
            }
        }

        let Some(keyframes) = &self.keyframes else {
            return;
        };
        for declaration in &qualified_rule.declarations {
            let name = strip_vendor_prefix(declaration.name());
            if KEYFRAME_PROPERTIES.iter().any(|p| name.eq_ignore_ascii_case(p)) {
                continue;
            }
            self.errors.push(ErrorToken::with_params(
                ErrorCode::CssSyntaxPropertyDisallowedWithinAtRule,
                declaration.pos(),
                [declaration.name(), keyframes.as_str()],
            ));
        }
    }

    fn visit_declaration(&mut self, declaration: &'ast Declaration) {
        if strip_vendor_prefix(declaration.name()).eq_ignore_ascii_case("position") {
            self.check_position(declaration);
        }
    }
}

/// Apply the ad-format property constraints to `stylesheet`.
pub fn validate_amp4ads_css(stylesheet: &Stylesheet, errors: &mut Vec<ErrorToken>) {
    stylesheet.accept(&mut Amp4AdsVisitor::new(errors));
}
