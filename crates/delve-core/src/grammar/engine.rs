//! Node-replacement grammar engine.
//!
//! Rewrites the abstract graph with a FIFO worklist until every live node is
//! terminal (no production rule matches its kind). Replacement templates are
//! instantiated slot-by-slot, so a template branch shared between two
//! parents is spliced in exactly once; the replaced node's children are then
//! re-attached to every leaf of the instantiation, which is what produces
//! the multi-parent edges (a chain's leaf Key becomes a parent of the lock
//! that follows it).

use std::collections::VecDeque;

use delve_rng::DungeonRng;

use crate::errors::GrammarError;
use crate::grammar::node::{NodeArena, NodeId};
use crate::grammar::rules::{Rule, RuleSet};

/// Rewrite `arena` in place until all nodes are terminal. The arena's root
/// may be replaced; read it back through `arena.root()`.
pub fn generate(
    arena: &mut NodeArena,
    rules: &RuleSet,
    rng: &mut DungeonRng,
) -> Result<(), GrammarError> {
    rules.validate()?;

    let mut queue = VecDeque::from([arena.root()]);
    while let Some(id) = queue.pop_front() {
        // a DAG node reachable through several parents is queued more than
        // once; rewrite it only the first time
        if arena.node(id).processed {
            continue;
        }
        arena.node_mut(id).processed = true;

        let kind = arena.node(id).kind;
        let options = rules.matching(kind);
        if options.is_empty() {
            // terminal: descend
            queue.extend(arena.node(id).children.iter().copied());
            continue;
        }

        let weights: Vec<f32> = options
            .iter()
            .map(|r| {
                let scale = r.precondition.map_or(1.0, |pre| pre(arena, id));
                r.weight * scale
            })
            .collect();
        // A zero weight from a precondition is a veto; if every option is
        // vetoed the node cannot be rewritten at all.
        if weights.iter().all(|w| *w <= 0.0) {
            return Err(GrammarError::ZeroWeight { kind });
        }
        let choice = rng
            .choose_weighted(&weights)
            .ok_or(GrammarError::ZeroWeight { kind })?;
        apply(arena, id, options[choice], &mut queue)?;
    }

    debug_assert!(arena.find_cycle().is_none());
    Ok(())
}

/// Replace `id` with an instantiation of `rule`, splicing the result into
/// every former parent and enqueueing the new roots.
fn apply(
    arena: &mut NodeArena,
    id: NodeId,
    rule: &Rule,
    queue: &mut VecDeque<NodeId>,
) -> Result<(), GrammarError> {
    let children = arena.node(id).children.clone();
    let parents = arena.node(id).parents.clone();

    let replacements: Vec<NodeId> = match &rule.rhs {
        None => {
            // deletion: a child already reachable as a descendant of a
            // sibling keeps its other parent and is dropped here, so shared
            // multi-parent descendants are not duplicated. Unshared children
            // are re-hooked directly to the deleted node's parents.
            for &c in &children {
                arena.node_mut(c).parents.retain(|p| *p != id);
            }
            children
                .iter()
                .copied()
                .filter(|&c| {
                    !parents
                        .iter()
                        .any(|&p| arena.has_descendant_avoiding(p, c, id))
                })
                .collect()
        }
        Some(rhs) => {
            // deep-copy the template, one fresh node per slot; a slot listed
            // under two parents becomes a single shared node
            let clone_ids: Vec<NodeId> =
                rhs.nodes.iter().map(|slot| arena.alloc(slot.kind)).collect();
            for (i, slot) in rhs.nodes.iter().enumerate() {
                for &c in &slot.children {
                    arena.add_child(clone_ids[i], clone_ids[c]);
                }
            }
            let roots: Vec<NodeId> = rhs.roots.iter().map(|&i| clone_ids[i]).collect();

            // re-parent the original children onto the clone's leaves
            for &c in &children {
                arena.node_mut(c).parents.retain(|p| *p != id);
            }
            for &r in &roots {
                arena.append_to_leaves(r, &children);
            }
            roots
        }
    };

    // hook the replacements in where the original node hung
    if parents.is_empty() {
        if replacements.len() != 1 {
            return Err(GrammarError::RootDeletion {
                kind: arena.node(id).kind,
            });
        }
        arena.set_root(replacements[0]);
    } else {
        for &p in &parents {
            arena.remove_child(p, id);
            for &r in &replacements {
                // preserve any existing multi-parent edges: a replacement
                // already under this parent is not re-added
                if !arena.node(p).children.contains(&r) {
                    arena.add_child(p, r);
                }
            }
        }
    }

    arena.node_mut(id).detached = true;
    arena.node_mut(id).children.clear();
    arena.node_mut(id).parents.clear();

    for &r in &replacements {
        debug_assert!(!arena.node(r).processed || rule.rhs.is_none());
        queue.push_back(r);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::node::NodeKind;
    use crate::grammar::rules::{default_rules, RhsTemplate};

    fn run(rules: &RuleSet, seed: u64) -> NodeArena {
        let mut arena = NodeArena::new(NodeKind::Zone);
        let mut rng = DungeonRng::new(seed);
        generate(&mut arena, rules, &mut rng).unwrap();
        arena
    }

    #[test]
    fn test_all_live_nodes_terminal() {
        let rules = default_rules();
        let arena = run(&rules, 42);
        for id in arena.live_ids() {
            assert!(
                rules.matching(arena.node(id).kind).is_empty(),
                "non-terminal {} survived rewriting",
                arena.node(id).kind
            );
        }
    }

    #[test]
    fn test_result_is_acyclic() {
        let rules = default_rules();
        for seed in 0..20 {
            let arena = run(&rules, seed);
            assert!(arena.find_cycle().is_none(), "cycle at seed {seed}");
        }
    }

    #[test]
    fn test_all_rules_vetoed_is_an_error() {
        // a zero precondition vetoes the rule; with nothing else matching
        // the node cannot be rewritten and generation must fail, not fall
        // back to a uniform pick over vetoed options
        let rules = RuleSet::new(vec![Rule::new(
            NodeKind::Zone,
            RhsTemplate::chain(&[NodeKind::Entrance]),
        )
        .with_precondition(|_, _| 0.0)]);
        let mut arena = NodeArena::new(NodeKind::Zone);
        let mut rng = DungeonRng::new(7);
        assert_eq!(
            generate(&mut arena, &rules, &mut rng),
            Err(GrammarError::ZeroWeight {
                kind: NodeKind::Zone
            })
        );
        assert_eq!(arena.node(arena.root()).kind, NodeKind::Zone, "root untouched");
    }

    #[test]
    fn test_root_is_replaced() {
        let arena = run(&default_rules(), 42);
        assert_eq!(arena.node(arena.root()).kind, NodeKind::Entrance);
    }

    #[test]
    fn test_every_lock_has_a_key_parent() {
        // the serial-chain rules guarantee each lock is fed by at least one
        // key at strictly smaller depth
        let arena = run(&default_rules(), 7);
        for id in arena.live_ids() {
            if arena.node(id).kind != NodeKind::Lock {
                continue;
            }
            let keys: Vec<NodeId> = arena
                .real_parents(id)
                .into_iter()
                .filter(|&p| arena.node(p).kind == NodeKind::Key)
                .collect();
            assert!(!keys.is_empty(), "lock without feeding key");
            for k in keys {
                assert!(arena.depth(k) < arena.depth(id));
            }
        }
    }

    #[test]
    fn test_deletion_rule_prunes_shared_children() {
        // Start -> A; A rewrites to Gate(Key, PossibleBonus); the chain tail
        // re-attaches under both leaves, then PossibleBonus deletion must
        // drop its copy without orphaning the tail.
        let mut rules_vec = default_rules().rules().to_vec();
        rules_vec.retain(|r| r.lhs != NodeKind::PossibleBonus);
        rules_vec.push(Rule::deletion(NodeKind::PossibleBonus));
        let rules = RuleSet::new(rules_vec);

        let arena = run(&rules, 11);
        for id in arena.live_ids() {
            assert_ne!(arena.node(id).kind, NodeKind::PossibleBonus);
            // every live non-root node still has a live parent
            if id != arena.root() {
                assert!(
                    arena
                        .node(id)
                        .parents
                        .iter()
                        .any(|&p| !arena.node(p).detached),
                    "orphaned {} after deletion",
                    arena.node(id).kind
                );
            }
        }
    }

    #[test]
    fn test_shared_template_slot_instantiated_once() {
        // a diamond template: two branches sharing one descendant
        let mut t = RhsTemplate::new();
        let shared = t.slot(NodeKind::Room, &[]);
        let a = t.slot(NodeKind::Key, &[shared]);
        let b = t.slot(NodeKind::Bonus, &[shared]);
        t.root(a);
        t.root(b);
        let rules = RuleSet::new(vec![
            Rule::new(
                NodeKind::Zone,
                RhsTemplate::chain(&[NodeKind::Entrance, NodeKind::Sequence]),
            ),
            Rule::new(NodeKind::Sequence, t),
        ]);

        let arena = run(&rules, 0);
        let rooms: Vec<NodeId> = arena
            .live_ids()
            .filter(|&id| arena.node(id).kind == NodeKind::Room)
            .collect();
        assert_eq!(rooms.len(), 1, "shared slot duplicated");
        assert_eq!(arena.node(rooms[0]).parents.len(), 2);
    }

    #[test]
    fn test_determinism_same_seed_same_graph() {
        let rules = default_rules();
        let a = run(&rules, 1234);
        let b = run(&rules, 1234);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.live_ids().zip(b.live_ids()) {
            assert_eq!(x, y);
            assert_eq!(a.node(x).kind, b.node(y).kind);
            assert_eq!(a.node(x).children, b.node(y).children);
        }
    }

    #[test]
    fn test_malformed_rules_rejected_before_rewriting() {
        let rules = RuleSet::new(vec![
            Rule::new(NodeKind::Zone, RhsTemplate::chain(&[NodeKind::Room])).weighted(-1.0),
        ]);
        let mut arena = NodeArena::new(NodeKind::Zone);
        let mut rng = DungeonRng::new(0);
        assert!(generate(&mut arena, &rules, &mut rng).is_err());
    }
}
