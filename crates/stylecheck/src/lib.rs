//! Style sheet validation for stylecheck.
//!
//! Builds on [`stylecheck_syntax`] with the passes a validator runs over a
//! parsed style sheet:
//!
//! - URL extraction, scoped by enclosing at-rule
//! - `@media` query grammar checks
//! - ad-format property constraints and keyframes-only structure
//! - at-rule and declaration allow lists, and `!important` rejection
//!
//! What a style sheet may contain is described by a [`CssSpec`], usually
//! loaded from TOML.
//!
//! # Example
//!
//! ```
//! use stylecheck::prelude::*;
//!
//! let spec = CssSpec::from_toml_str(r#"
//!     [[at_rules]]
//!     name = "$DEFAULT"
//!     block_type = "parse-as-error"
//!
//!     [[at_rules]]
//!     name = "media"
//!     block_type = "parse-as-rules"
//! "#).unwrap();
//!
//! let report = validate_stylesheet("@import 'a.css'; b { c: url(d.png) }", 1, 0, &spec);
//! assert_eq!(report.errors.len(), 1);
//! assert_eq!(report.errors[0].code(), ErrorCode::CssSyntaxInvalidAtRule);
//! assert_eq!(report.urls[0].utf8_url, "d.png");
//! ```

pub mod spec;
pub mod validate;
pub mod visitors;

mod error;

pub use error::{Error, Result};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::spec::{AtRuleBlockType, AtRuleSpec, CssSpec};
    pub use crate::validate::{
        InlineStyleReport, StylesheetReport, validate_inline_style, validate_stylesheet,
        validate_stylesheet_reader,
    };
    pub use crate::visitors::AllowList;
    pub use crate::Error;
    pub use stylecheck_syntax::token::{ErrorCode, ErrorToken, ParsedCssUrl, Positioned, SourcePos};
}
