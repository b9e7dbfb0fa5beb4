//! Weighted production rules for the dungeon grammar.
//!
//! A rule rewrites every node of its left-hand kind into a replacement
//! graph. Replacement templates are stored as a small arena (index lists,
//! like the node graph itself) so a template may legitimately share a
//! subtree between branches: instantiation maps each template slot to
//! exactly one fresh node, which is what keeps shared branches from blowing
//! up into duplicates when a rule is applied.
//!
//! A rule with no replacement at all is a deletion: a weighted alternative
//! to insertion, used for optional bonus branches.

use crate::errors::GrammarError;
use crate::grammar::node::{NodeArena, NodeId, NodeKind};

/// One slot of a replacement template
#[derive(Debug, Clone)]
pub struct TemplateNode {
    pub kind: NodeKind,
    pub children: Vec<usize>,
}

/// A replacement graph: slots indexed densely, with explicit root slots.
/// Shared descendants are expressed by listing a slot under more than one
/// parent.
#[derive(Debug, Clone, Default)]
pub struct RhsTemplate {
    pub nodes: Vec<TemplateNode>,
    pub roots: Vec<usize>,
}

impl RhsTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slot with the given children (already-added slot indices)
    pub fn slot(&mut self, kind: NodeKind, children: &[usize]) -> usize {
        self.nodes.push(TemplateNode {
            kind,
            children: children.to_vec(),
        });
        self.nodes.len() - 1
    }

    pub fn root(&mut self, slot: usize) {
        self.roots.push(slot);
    }

    /// Convenience: a single serial chain `kinds[0] -> kinds[1] -> ...`,
    /// rooted at the first element.
    pub fn chain(kinds: &[NodeKind]) -> Self {
        let mut t = Self::new();
        let mut below: Option<usize> = None;
        for &kind in kinds.iter().rev() {
            let children: Vec<usize> = below.into_iter().collect();
            below = Some(t.slot(kind, &children));
        }
        if let Some(r) = below {
            t.root(r);
        }
        t
    }

    /// True if the template graph has a cycle among its slots
    fn has_cycle(&self) -> bool {
        // DFS coloring over slot indices
        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            White,
            Grey,
            Black,
        }
        fn visit(nodes: &[TemplateNode], colors: &mut [Color], i: usize) -> bool {
            match colors[i] {
                Color::Grey => return true,
                Color::Black => return false,
                Color::White => {}
            }
            colors[i] = Color::Grey;
            for &c in &nodes[i].children {
                if c >= nodes.len() || visit(nodes, colors, c) {
                    return true;
                }
            }
            colors[i] = Color::Black;
            false
        }
        let mut colors = vec![Color::White; self.nodes.len()];
        (0..self.nodes.len()).any(|i| visit(&self.nodes, &mut colors, i))
    }
}

/// Precondition hook: scales a rule's weight for a particular node (0 to
/// veto). A plain function pointer keeps the rule table free of dynamic
/// dispatch.
pub type Precondition = fn(&NodeArena, NodeId) -> f32;

/// A weighted production rule `lhs -> rhs`
#[derive(Debug, Clone)]
pub struct Rule {
    pub lhs: NodeKind,
    /// `None` is a deletion rule: the node is removed and its children are
    /// pruned or re-hooked to its parents.
    pub rhs: Option<RhsTemplate>,
    pub weight: f32,
    pub precondition: Option<Precondition>,
}

impl Rule {
    pub fn new(lhs: NodeKind, rhs: RhsTemplate) -> Self {
        Self {
            lhs,
            rhs: Some(rhs),
            weight: 1.0,
            precondition: None,
        }
    }

    pub fn deletion(lhs: NodeKind) -> Self {
        Self {
            lhs,
            rhs: None,
            weight: 1.0,
            precondition: None,
        }
    }

    pub fn weighted(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_precondition(mut self, pre: Precondition) -> Self {
        self.precondition = Some(pre);
        self
    }
}

/// The full rule table, indexed by left-hand kind on demand
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// All rules whose left-hand kind matches
    pub fn matching(&self, kind: NodeKind) -> Vec<&Rule> {
        self.rules.iter().filter(|r| r.lhs == kind).collect()
    }

    /// Validate the rule set before generation starts. A malformed set
    /// (cyclic replacement graph, a matched kind whose alternatives sum to
    /// zero weight, an empty non-deletion replacement) is a fatal
    /// configuration error, not a runtime condition.
    pub fn validate(&self) -> Result<(), GrammarError> {
        for rule in &self.rules {
            if let Some(rhs) = &rule.rhs {
                if rhs.roots.is_empty() || rhs.nodes.is_empty() {
                    return Err(GrammarError::EmptyRhs { kind: rule.lhs });
                }
                if rhs.has_cycle() {
                    return Err(GrammarError::RhsCycle { kind: rule.lhs });
                }
            }
        }
        // every kind that matches at least one rule must be winnable
        for rule in &self.rules {
            let total: f32 = self
                .matching(rule.lhs)
                .iter()
                .map(|r| r.weight.max(0.0))
                .sum();
            if total <= 0.0 {
                return Err(GrammarError::ZeroWeight { kind: rule.lhs });
            }
        }
        Ok(())
    }
}

/// The built-in rule set: one zone of serial key/lock sequences ending at a
/// boss, with optional secret and bonus branches.
pub fn default_rules() -> RuleSet {
    let mut rules = Vec::new();

    // Zone -> Entrance -> Key -> GateLock -> Sequence -> GateLock ->
    //         SequenceRun -> GateLock -> Boss -> Room
    rules.push(Rule::new(
        NodeKind::Zone,
        RhsTemplate::chain(&[
            NodeKind::Entrance,
            NodeKind::Key,
            NodeKind::GateLock,
            NodeKind::Sequence,
            NodeKind::GateLock,
            NodeKind::SequenceRun,
            NodeKind::GateLock,
            NodeKind::Boss,
            NodeKind::TightCoupling,
            NodeKind::Room,
        ]),
    ));

    // SequenceRun -> Sequence, Sequence (parallel serial chains)
    let mut run = RhsTemplate::new();
    let s1 = run.slot(NodeKind::Sequence, &[]);
    let s2 = run.slot(NodeKind::Sequence, &[]);
    run.root(s1);
    run.root(s2);
    rules.push(Rule::new(NodeKind::SequenceRun, run));

    // Serial chains. The leaf Key is required by the lock that follows the
    // chain, because replaced children re-attach to every leaf.
    let mut seq = RhsTemplate::new();
    let key = seq.slot(NodeKind::Key, &[]);
    let bonus = seq.slot(NodeKind::PossibleBonus, &[]);
    let gate = seq.slot(NodeKind::Gate, &[key, bonus]);
    seq.root(gate);
    rules.push(Rule::new(NodeKind::Sequence, seq));

    // optional bonus branch: deletion twice as likely as the branch
    rules.push(Rule::deletion(NodeKind::PossibleBonus).weighted(2.0));
    rules.push(Rule::new(
        NodeKind::PossibleBonus,
        RhsTemplate::chain(&[NodeKind::Gate, NodeKind::Bonus]),
    ));

    // gate flavors
    rules.push(Rule::new(
        NodeKind::GateLock,
        RhsTemplate::chain(&[NodeKind::Lock, NodeKind::TightCoupling]),
    ));
    rules.push(
        Rule::new(
            NodeKind::Gate,
            RhsTemplate::chain(&[NodeKind::Secret, NodeKind::TightCoupling]),
        )
        .weighted(0.5),
    );
    rules.push(Rule::new(
        NodeKind::Gate,
        RhsTemplate::chain(&[NodeKind::Key, NodeKind::GateLock]),
    ));

    RuleSet::new(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_validate() {
        assert!(default_rules().validate().is_ok());
    }

    #[test]
    fn test_chain_builder_shape() {
        let t = RhsTemplate::chain(&[NodeKind::Lock, NodeKind::TightCoupling]);
        assert_eq!(t.roots.len(), 1);
        let root = &t.nodes[t.roots[0]];
        assert_eq!(root.kind, NodeKind::Lock);
        assert_eq!(root.children.len(), 1);
        assert_eq!(t.nodes[root.children[0]].kind, NodeKind::TightCoupling);
    }

    #[test]
    fn test_cyclic_rhs_rejected() {
        let mut t = RhsTemplate::new();
        let a = t.slot(NodeKind::Room, &[]);
        // self-loop
        t.nodes[a].children.push(a);
        t.root(a);
        let rules = RuleSet::new(vec![Rule::new(NodeKind::Zone, t)]);
        assert_eq!(
            rules.validate(),
            Err(GrammarError::RhsCycle {
                kind: NodeKind::Zone
            })
        );
    }

    #[test]
    fn test_zero_weight_rejected() {
        let rules = RuleSet::new(vec![
            Rule::new(NodeKind::Zone, RhsTemplate::chain(&[NodeKind::Room])).weighted(0.0),
        ]);
        assert_eq!(
            rules.validate(),
            Err(GrammarError::ZeroWeight {
                kind: NodeKind::Zone
            })
        );
    }

    #[test]
    fn test_empty_rhs_rejected() {
        let rules = RuleSet::new(vec![Rule::new(NodeKind::Zone, RhsTemplate::new())]);
        assert_eq!(
            rules.validate(),
            Err(GrammarError::EmptyRhs {
                kind: NodeKind::Zone
            })
        );
    }

    #[test]
    fn test_matching_filters_by_kind() {
        let rules = default_rules();
        assert_eq!(rules.matching(NodeKind::Gate).len(), 2);
        assert!(rules.matching(NodeKind::Boss).is_empty());
    }
}
