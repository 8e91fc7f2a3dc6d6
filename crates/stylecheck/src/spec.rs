//! Declarative description of what a style sheet may contain.
//!
//! A [`CssSpec`] is usually loaded from TOML:
//!
//! ```toml
//! allow_important = false
//! validate_amp4ads = true
//!
//! [[at_rules]]
//! name = "$DEFAULT"
//! block_type = "parse-as-error"
//!
//! [[at_rules]]
//! name = "media"
//! block_type = "parse-as-rules"
//!
//! [declarations]
//! color = []
//! position = ["relative", "absolute"]
//! ```
//!
//! The at-rule entries drive both the parser (how to read each at-rule's
//! block) and the at-rule allow list. Declarations map a property name to
//! its permitted values; an empty value list permits any value, and an empty
//! table permits every property.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use stylecheck_syntax::canonicalizer::{BlockType, ParsingConfig};

use crate::error::{Error, Result};
use crate::visitors::allow_list::{AllowList, normalize_name};

/// Name of the at-rule entry that applies to every unlisted at-rule.
pub const DEFAULT_AT_RULE: &str = "$DEFAULT";

/// How an at-rule's block is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AtRuleBlockType {
    ParseAsRules,
    ParseAsDeclarations,
    #[default]
    ParseAsIgnore,
    /// The at-rule is not allowed at all.
    ParseAsError,
}

impl AtRuleBlockType {
    /// The parser-level block type. Disallowed at-rules are parsed as ignored
    /// blocks; rejecting them is left to the allow list.
    pub fn block_type(self) -> BlockType {
        match self {
            AtRuleBlockType::ParseAsRules => BlockType::ParseAsRules,
            AtRuleBlockType::ParseAsDeclarations => BlockType::ParseAsDeclarations,
            AtRuleBlockType::ParseAsIgnore | AtRuleBlockType::ParseAsError => {
                BlockType::ParseAsIgnore
            }
        }
    }
}

/// One `[[at_rules]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtRuleSpec {
    pub name: String,
    #[serde(default)]
    pub block_type: AtRuleBlockType,
}

impl AtRuleSpec {
    pub fn new(name: impl Into<String>, block_type: AtRuleBlockType) -> Self {
        Self {
            name: name.into(),
            block_type,
        }
    }
}

/// Constraints for one kind of style sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CssSpec {
    pub allow_important: bool,
    pub validate_amp4ads: bool,
    pub validate_keyframes: bool,
    pub at_rules: Vec<AtRuleSpec>,
    pub declarations: BTreeMap<String, Vec<String>>,
}

impl CssSpec {
    /// Parse and check a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let spec: CssSpec = toml::from_str(source).map_err(Error::toml)?;
        spec.check()?;
        tracing::info!(
            at_rules = spec.at_rules.len(),
            declarations = spec.declarations.len(),
            "loaded CSS spec"
        );
        Ok(spec)
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        tracing::info!(path = %path.display(), "reading CSS spec");
        Self::from_toml_str(&source)
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(Error::toml_serialize)
    }

    fn check(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for at_rule in &self.at_rules {
            if at_rule.name.is_empty() {
                return Err(Error::invalid_spec("at-rule entry with an empty name"));
            }
            let key = if at_rule.name == DEFAULT_AT_RULE {
                at_rule.name.clone()
            } else {
                normalize_name(&at_rule.name)
            };
            if !seen.insert(key) {
                return Err(Error::invalid_spec(format!(
                    "duplicate at-rule entry '{}'",
                    at_rule.name
                )));
            }
        }
        if self.declarations.keys().any(String::is_empty) {
            return Err(Error::invalid_spec("declaration entry with an empty name"));
        }
        Ok(())
    }

    /// The `$DEFAULT` entry's block type, if there is one.
    pub fn default_block_type(&self) -> Option<AtRuleBlockType> {
        self.at_rules
            .iter()
            .find(|at_rule| at_rule.name == DEFAULT_AT_RULE)
            .map(|at_rule| at_rule.block_type)
    }

    /// Block classification for the parser: the built-in classification of
    /// [`ParsingConfig::default`] with this spec's entries laid over it.
    pub fn parsing_config(&self) -> ParsingConfig {
        let base = ParsingConfig::default();
        let default_spec = self
            .default_block_type()
            .map_or(base.default_spec, AtRuleBlockType::block_type);
        self.at_rules
            .iter()
            .filter(|at_rule| at_rule.name != DEFAULT_AT_RULE)
            .fold(ParsingConfig { default_spec, ..base }, |config, at_rule| {
                config.with_at_rule(normalize_name(&at_rule.name), at_rule.block_type.block_type())
            })
    }

    /// Whether an at-rule named `name` is allowed. Unlisted names follow the
    /// `$DEFAULT` entry; without one they are allowed.
    pub fn is_at_rule_valid(&self, name: &str) -> bool {
        let name = normalize_name(name);
        let listed = self
            .at_rules
            .iter()
            .filter(|at_rule| at_rule.name != DEFAULT_AT_RULE)
            .find(|at_rule| normalize_name(&at_rule.name) == name);
        match listed {
            Some(at_rule) => at_rule.block_type != AtRuleBlockType::ParseAsError,
            None => self.default_block_type() != Some(AtRuleBlockType::ParseAsError),
        }
    }

    /// The allow list checked by the at-rule and declaration visitors.
    pub fn allow_list(&self) -> AllowList {
        let mut allow_list = AllowList::default()
            .allow_unlisted_at_rules(self.default_block_type() != Some(AtRuleBlockType::ParseAsError));
        for at_rule in &self.at_rules {
            if at_rule.name != DEFAULT_AT_RULE && at_rule.block_type != AtRuleBlockType::ParseAsError {
                allow_list = allow_list.with_at_rule(&at_rule.name);
            }
        }
        for (name, values) in &self.declarations {
            allow_list = allow_list.with_declaration(name, values.iter().cloned());
        }
        allow_list
    }
}
