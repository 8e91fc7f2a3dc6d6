//! Validation passes over a parsed style sheet.
//!
//! Each pass is a [`RuleVisitor`](stylecheck_syntax::visitor::RuleVisitor)
//! that reads the tree and appends to caller-owned collections. Passes are
//! independent and may run in any order.

pub mod allow_list;
pub mod amp4ads;
pub mod important;
pub mod keyframes;
pub mod media;
pub mod urls;

pub use allow_list::{AllowList, InvalidAtRuleVisitor, InvalidDeclarationVisitor};
pub use amp4ads::{Amp4AdsVisitor, validate_amp4ads_css};
pub use important::{ImportantPropertyVisitor, extract_important_declarations};
pub use keyframes::{KeyframesVisitor, validate_keyframes_css};
pub use media::{MediaQueryVisitor, parse_media_queries};
pub use urls::{UrlFunctionVisitor, extract_urls, extract_urls_from_declaration};
