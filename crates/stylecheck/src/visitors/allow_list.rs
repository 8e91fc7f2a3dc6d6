//! At-rule and declaration allow lists.

use std::collections::{BTreeMap, BTreeSet};

use stylecheck_syntax::ast::{AtRule, Declaration};
use stylecheck_syntax::canonicalizer::strip_vendor_prefix;
use stylecheck_syntax::token::{ErrorCode, ErrorToken, Positioned};
use stylecheck_syntax::visitor::RuleVisitor;

/// Above this many allowed declarations, diagnostics omit the list.
pub const MAX_LISTED_DECLARATIONS: usize = 5;

/// Vendor prefix stripped, ASCII-lowercased.
pub fn normalize_name(name: &str) -> String {
    strip_vendor_prefix(name).to_ascii_lowercase()
}

/// Permitted at-rules and declarations.
///
/// All names are compared after [`normalize_name`]. An allow list with no
/// declarations permits every declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    at_rules: BTreeSet<String>,
    allow_unlisted_at_rules: bool,
    declarations: BTreeMap<String, Vec<String>>,
}

impl Default for AllowList {
    fn default() -> Self {
        Self {
            at_rules: BTreeSet::new(),
            allow_unlisted_at_rules: true,
            declarations: BTreeMap::new(),
        }
    }
}

impl AllowList {
    /// Whether at-rules not named by [`with_at_rule`](Self::with_at_rule)
    /// are allowed.
    pub fn allow_unlisted_at_rules(mut self, allow: bool) -> Self {
        self.allow_unlisted_at_rules = allow;
        self
    }

    pub fn with_at_rule(mut self, name: &str) -> Self {
        self.at_rules.insert(normalize_name(name));
        self
    }

    /// Permit a declaration. An empty `values` permits any value.
    pub fn with_declaration<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declarations
            .insert(normalize_name(name), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_at_rule_allowed(&self, name: &str) -> bool {
        self.allow_unlisted_at_rules || self.at_rules.contains(&normalize_name(name))
    }

    pub fn is_declaration_allowed(&self, name: &str) -> bool {
        self.declarations.is_empty() || self.declarations.contains_key(&normalize_name(name))
    }

    /// Enumerated values for a declaration; empty when any value is allowed.
    pub fn allowed_values(&self, name: &str) -> &[String] {
        self.declarations
            .get(&normalize_name(name))
            .map_or(&[], Vec::as_slice)
    }

    /// `['a', 'b']` style listing of the allowed declarations, or `None` when
    /// there are too many to list.
    pub fn declarations_hint(&self) -> Option<String> {
        if self.declarations.len() > MAX_LISTED_DECLARATIONS {
            return None;
        }
        let names: Vec<String> = self
            .declarations
            .keys()
            .map(|name| format!("'{name}'"))
            .collect();
        Some(format!("[{}]", names.join(", ")))
    }
}

/// Flags at-rules missing from an [`AllowList`].
pub struct InvalidAtRuleVisitor<'a> {
    allow_list: &'a AllowList,
    errors: &'a mut Vec<ErrorToken>,
}

impl<'a> InvalidAtRuleVisitor<'a> {
    pub fn new(allow_list: &'a AllowList, errors: &'a mut Vec<ErrorToken>) -> Self {
        Self { allow_list, errors }
    }
}

impl<'ast> RuleVisitor<'ast> for InvalidAtRuleVisitor<'_> {
    fn visit_at_rule(&mut self, at_rule: &'ast AtRule) {
        if !self.allow_list.is_at_rule_allowed(at_rule.name()) {
            self.errors.push(ErrorToken::with_params(
                ErrorCode::CssSyntaxInvalidAtRule,
                at_rule.pos(),
                [at_rule.name()],
            ));
        }
    }
}

/// Flags declarations, and declaration values, missing from an
/// [`AllowList`].
pub struct InvalidDeclarationVisitor<'a> {
    allow_list: &'a AllowList,
    errors: &'a mut Vec<ErrorToken>,
}

impl<'a> InvalidDeclarationVisitor<'a> {
    pub fn new(allow_list: &'a AllowList, errors: &'a mut Vec<ErrorToken>) -> Self {
        Self { allow_list, errors }
    }

    /// Check a declaration outside of a tree walk, such as one from an
    /// inline style.
    pub fn check(&mut self, declaration: &Declaration) {
        let name = declaration.name();
        if !self.allow_list.is_declaration_allowed(name) {
            let error = match self.allow_list.declarations_hint() {
                Some(hint) => ErrorToken::with_params(
                    ErrorCode::CssSyntaxInvalidProperty,
                    declaration.pos(),
                    [name, hint.as_str()],
                ),
                None => ErrorToken::with_params(
                    ErrorCode::CssSyntaxInvalidPropertyNolist,
                    declaration.pos(),
                    [name],
                ),
            };
            self.errors.push(error);
            return;
        }

        let values = self.allow_list.allowed_values(name);
        let value = declaration.first_ident();
        if !values.is_empty() && !values.iter().any(|v| v.eq_ignore_ascii_case(value)) {
            self.errors.push(ErrorToken::with_params(
                ErrorCode::CssSyntaxDisallowedPropertyValue,
                declaration.pos(),
                [name, value],
            ));
        }
    }
}

impl<'ast> RuleVisitor<'ast> for InvalidDeclarationVisitor<'_> {
    fn visit_declaration(&mut self, declaration: &'ast Declaration) {
        self.check(declaration);
    }
}
