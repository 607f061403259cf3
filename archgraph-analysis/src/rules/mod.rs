//! Rules: model, sources, readers, selection and export.

pub mod document;
pub mod helper;
pub mod model;
pub mod reader;
pub mod selection;
pub mod source;
pub mod writer;

pub use document::RuleDocument;
pub use helper::{CollectRulesVisitor, RuleHelper};
pub use model::{
    Concept, Constraint, ExecutableRule, Group, ReportHints, RuleKind, RuleSet, RuleSetBuilder, Verification,
};
pub use reader::{RuleParser, RuleSourceReader, TomlRuleReader, YamlRuleReader};
pub use selection::{MissingRules, ResolvedRules, RuleSelection};
pub use source::{RuleFormat, RuleSource};
pub use writer::RuleSetWriter;
