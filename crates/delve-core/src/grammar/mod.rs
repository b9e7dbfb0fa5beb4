//! The abstract layout grammar: a multi-parent node graph and the
//! weighted replacement rules that grow it from a single start node.

pub mod engine;
pub mod node;
pub mod rules;

pub use engine::generate;
pub use node::{Node, NodeArena, NodeId, NodeKind};
pub use rules::{default_rules, Precondition, RhsTemplate, Rule, RuleSet, TemplateNode};
