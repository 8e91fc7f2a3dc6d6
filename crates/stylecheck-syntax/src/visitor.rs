//! Visitor protocol over the syntax tree.
//!
//! A [`RuleVisitor`] implements only the hooks it cares about. Traversal is
//! driven by the nodes themselves through `accept`:
//!
//! - a [`Stylesheet`] visits its rules in source order;
//! - an [`AtRule`] visits its nested rules, then its nested declarations;
//! - a [`QualifiedRule`] visits its declarations in source order.
//!
//! Each node calls its enter hook before its children and its leave hook
//! after them. Hooks receive `&'ast` references, so a visitor may keep
//! references into the tree it walks.

use crate::ast::{AtRule, Declaration, QualifiedRule, Rule, Stylesheet};

/// Enter / leave hooks for each node kind. Every hook defaults to a no-op.
#[allow(unused_variables)]
pub trait RuleVisitor<'ast> {
    fn visit_stylesheet(&mut self, stylesheet: &'ast Stylesheet) {}
    fn leave_stylesheet(&mut self, stylesheet: &'ast Stylesheet) {}

    fn visit_at_rule(&mut self, at_rule: &'ast AtRule) {}
    fn leave_at_rule(&mut self, at_rule: &'ast AtRule) {}

    fn visit_qualified_rule(&mut self, qualified_rule: &'ast QualifiedRule) {}
    fn leave_qualified_rule(&mut self, qualified_rule: &'ast QualifiedRule) {}

    fn visit_declaration(&mut self, declaration: &'ast Declaration) {}
    fn leave_declaration(&mut self, declaration: &'ast Declaration) {}
}

impl Stylesheet {
    pub fn accept<'ast, V: RuleVisitor<'ast> + ?Sized>(&'ast self, visitor: &mut V) {
        visitor.visit_stylesheet(self);
        for rule in &self.rules {
            rule.accept(visitor);
        }
        visitor.leave_stylesheet(self);
    }
}

impl Rule {
    pub fn accept<'ast, V: RuleVisitor<'ast> + ?Sized>(&'ast self, visitor: &mut V) {
        match self {
            Rule::Qualified(rule) => rule.accept(visitor),
            Rule::At(rule) => rule.accept(visitor),
        }
    }
}

impl AtRule {
    pub fn accept<'ast, V: RuleVisitor<'ast> + ?Sized>(&'ast self, visitor: &mut V) {
        visitor.visit_at_rule(self);
        for rule in &self.rules {
            rule.accept(visitor);
        }
        for declaration in &self.declarations {
            declaration.accept(visitor);
        }
        visitor.leave_at_rule(self);
    }
}

impl QualifiedRule {
    pub fn accept<'ast, V: RuleVisitor<'ast> + ?Sized>(&'ast self, visitor: &mut V) {
        visitor.visit_qualified_rule(self);
        for declaration in &self.declarations {
            declaration.accept(visitor);
        }
        visitor.leave_qualified_rule(self);
    }
}

impl Declaration {
    pub fn accept<'ast, V: RuleVisitor<'ast> + ?Sized>(&'ast self, visitor: &mut V) {
        visitor.visit_declaration(self);
        visitor.leave_declaration(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{SourcePos, Token};

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl<'ast> RuleVisitor<'ast> for Recorder {
        fn visit_stylesheet(&mut self, _: &'ast Stylesheet) {
            self.events.push("enter sheet".into());
        }
        fn leave_stylesheet(&mut self, _: &'ast Stylesheet) {
            self.events.push("leave sheet".into());
        }
        fn visit_at_rule(&mut self, at_rule: &'ast AtRule) {
            self.events.push(format!("enter @{}", at_rule.name()));
        }
        fn leave_at_rule(&mut self, at_rule: &'ast AtRule) {
            self.events.push(format!("leave @{}", at_rule.name()));
        }
        fn visit_qualified_rule(&mut self, _: &'ast QualifiedRule) {
            self.events.push("enter rule".into());
        }
        fn leave_qualified_rule(&mut self, _: &'ast QualifiedRule) {
            self.events.push("leave rule".into());
        }
        fn visit_declaration(&mut self, declaration: &'ast Declaration) {
            self.events.push(format!("decl {}", declaration.name()));
        }
    }

    #[test]
    fn traversal_order() {
        let pos = SourcePos::new(1, 0);
        let mut inner = QualifiedRule::new(pos);
        inner.declarations.push(Declaration::new("color", pos));

        let mut media = AtRule::new("media", pos);
        media.rules.push(Rule::Qualified(inner));
        media.declarations.push(Declaration::new("stray", pos));

        let sheet = Stylesheet::new(vec![Rule::At(media)], Token::eof_at(pos), pos);
        let mut recorder = Recorder::default();
        sheet.accept(&mut recorder);

        assert_eq!(
            recorder.events,
            vec![
                "enter sheet",
                "enter @media",
                "enter rule",
                "decl color",
                "leave rule",
                "decl stray",
                "leave @media",
                "leave sheet",
            ]
        );
    }

    #[test]
    fn visitors_may_retain_references() {
        struct Names<'ast>(Vec<&'ast str>);
        impl<'ast> RuleVisitor<'ast> for Names<'ast> {
            fn visit_declaration(&mut self, declaration: &'ast Declaration) {
                self.0.push(declaration.name());
            }
        }

        let pos = SourcePos::new(1, 0);
        let mut rule = QualifiedRule::new(pos);
        rule.declarations.push(Declaration::new("a", pos));
        rule.declarations.push(Declaration::new("b", pos));
        let sheet = Stylesheet::new(vec![Rule::Qualified(rule)], Token::eof_at(pos), pos);

        let mut names = Names(Vec::new());
        sheet.accept(&mut names);
        assert_eq!(names.0, ["a", "b"]);
    }
}
