//! Generation error taxonomy.
//!
//! Fatal errors (malformed rule sets, unplaceable structural rooms) bubble to
//! the top-level `generate` call and abort the session before gameplay
//! starts. Everything recoverable is expressed as an `Option` or handled
//! locally: a decoration that fails to place is logged and skipped, and a
//! pathfinding miss is a normal query outcome, not an error.

use thiserror::Error;

use crate::grammar::NodeKind;

/// A malformed production rule set. Caught by validation at generation start,
/// before any room is created; never recoverable at runtime.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GrammarError {
    #[error("rule for {kind} has a cycle in its replacement graph")]
    RhsCycle { kind: NodeKind },

    #[error("rules matching {kind} have zero total weight")]
    ZeroWeight { kind: NodeKind },

    #[error("rule for {kind} has an empty replacement list (use a deletion rule instead)")]
    EmptyRhs { kind: NodeKind },

    #[error("replacing root kind {kind} did not yield exactly one root")]
    RootDeletion { kind: NodeKind },
}

/// A required structural node group could not be embedded anywhere. The
/// caller must restart generation with a new seed or abort.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("no placement found for required node group {kinds:?}")]
pub struct PlacementFailure {
    /// Kinds of the nodes in the group that failed to place
    pub kinds: Vec<NodeKind>,
}

/// Top-level generation failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerateError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Placement(#[from] PlacementFailure),
}
