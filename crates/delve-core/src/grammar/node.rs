//! Abstract dungeon-content graph.
//!
//! Grammar vertices live in an arena and are addressed by stable `NodeId`
//! indices; `children`/`parents` are index lists into the arena. Rule
//! splicing therefore never dangles a reference, and ancestor queries
//! (depth, areas, first common ancestor, cycle checks) are plain array
//! scans. A node may have more than one parent: the structure is a DAG, not
//! a tree, because rewrite rules re-parent replaced children onto every leaf
//! of the replacement subtree.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum::{Display, EnumIter};

use crate::layout::RoomId;

/// Role of a vertex in the abstract dungeon graph
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
pub enum NodeKind {
    // terminal, materialized as room content
    Entrance,
    Room,
    RoomVertical,
    RoomHorizontal,
    Key,
    Lock,
    Secret,
    Bonus,
    Boss,

    // structural bookkeeping, never materialized
    TightCoupling,
    AreaDivider,

    // nonterminals consumed by the rewrite rules
    Zone,
    Sequence,
    SequenceRun,
    Gate,
    GateLock,
    PossibleBonus,
}

impl NodeKind {
    /// Transparent bookkeeping kinds: skipped by `real_parents`, never bound
    /// to a room.
    pub fn is_structural(self) -> bool {
        matches!(self, NodeKind::TightCoupling | NodeKind::AreaDivider)
    }

    /// Kinds that gate the doorway into their subtree
    pub fn is_gate(self) -> bool {
        matches!(self, NodeKind::Lock | NodeKind::Secret)
    }

    /// Kinds that force a fresh room when grouping nodes into rooms
    pub fn is_room_shape(self) -> bool {
        matches!(
            self,
            NodeKind::Room | NodeKind::RoomVertical | NodeKind::RoomHorizontal
        )
    }
}

/// Stable index of a node in its arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A vertex of the grammar graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    /// Ordered child edges
    pub children: Vec<NodeId>,
    /// Parent edges; more than one entry makes this a DAG node
    pub parents: Vec<NodeId>,
    /// Rewriting completion flag
    pub processed: bool,
    /// Set once the spatial embedder binds this node to a room
    pub room: Option<RoomId>,
    /// True for nodes detached by a rule application; they stay in the arena
    /// (ids are stable) but no longer participate in the graph.
    pub detached: bool,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            parents: Vec::new(),
            processed: false,
            room: None,
            detached: false,
        }
    }
}

/// Arena of grammar nodes plus the current root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeArena {
    nodes: Vec<Node>,
    root: NodeId,
}

impl NodeArena {
    /// Create an arena holding only a root of the given kind
    pub fn new(root_kind: NodeKind) -> Self {
        Self {
            nodes: vec![Node::new(root_kind)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = id;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Allocate a fresh unconnected node
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind));
        id
    }

    /// Ids of all live (non-detached) nodes
    pub fn live_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.detached)
            .map(|(i, _)| NodeId(i as u32))
    }

    /// Add a child edge, recording the back edge on the child
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(!self.nodes[parent.index()].children.contains(&child));
        self.nodes[parent.index()].children.push(child);
        if !self.nodes[child.index()].parents.contains(&parent) {
            self.nodes[child.index()].parents.push(parent);
        }
    }

    /// Remove a child edge and its back edge
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.index()].children.retain(|c| *c != child);
        self.nodes[child.index()].parents.retain(|p| *p != parent);
    }

    /// Attach `children` to every childless descendant of `id` (or to `id`
    /// itself when it is a leaf). This is how a replacement subtree inherits
    /// the replaced node's children, and the reason multi-parent edges
    /// appear: every leaf becomes a parent of every inherited child.
    pub fn append_to_leaves(&mut self, id: NodeId, children: &[NodeId]) {
        let leaves = self.leaves_of(id);
        for leaf in leaves {
            for &child in children {
                if !self.nodes[leaf.index()].children.contains(&child) {
                    self.add_child(leaf, child);
                }
            }
        }
    }

    /// Childless descendants of `id`, `id` itself when childless
    pub fn leaves_of(&self, id: NodeId) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![id];
        let mut seen = HashSet::new();
        while let Some(n) = stack.pop() {
            if !seen.insert(n) {
                continue;
            }
            if self.nodes[n.index()].children.is_empty() {
                leaves.push(n);
            } else {
                stack.extend(self.nodes[n.index()].children.iter().copied());
            }
        }
        leaves
    }

    /// Parents with structural indirection (TightCoupling/AreaDivider)
    /// skipped over: the "real" upstream content nodes.
    pub fn real_parents(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[id.index()].parents.clone();
        let mut seen = HashSet::new();
        while let Some(p) = stack.pop() {
            if !seen.insert(p) {
                continue;
            }
            if self.nodes[p.index()].kind.is_structural() {
                stack.extend(self.nodes[p.index()].parents.iter().copied());
            } else if !out.contains(&p) {
                out.push(p);
            }
        }
        out.sort_unstable();
        out
    }

    /// Grammar depth: `1 + max(depth(p))` over real parents, 0 at the root
    pub fn depth(&self, id: NodeId) -> usize {
        let parents = self.real_parents(id);
        parents
            .iter()
            .map(|&p| self.depth(p) + 1)
            .max()
            .unwrap_or(0)
    }

    /// Depth as a fraction of the deepest live node; drives difficulty
    /// scaling for gates along the critical path.
    pub fn depth_pct(&self, id: NodeId) -> f32 {
        let max_depth = self
            .live_ids()
            .filter(|&n| !self.node(n).kind.is_structural())
            .map(|n| self.depth(n))
            .max()
            .unwrap_or(0);
        if max_depth == 0 {
            0.0
        } else {
            self.depth(id) as f32 / max_depth as f32
        }
    }

    /// True when `ancestor` is reachable from `id` by following parent edges
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestry(id).contains(&ancestor)
    }

    /// All ancestors of `id`, including `id` itself
    pub fn ancestry(&self, id: NodeId) -> HashSet<NodeId> {
        let mut seen = HashSet::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            if seen.insert(n) {
                stack.extend(self.nodes[n.index()].parents.iter().copied());
            }
        }
        seen
    }

    /// True when `descendant` is reachable from `id` by following child edges
    pub fn has_descendant(&self, id: NodeId, descendant: NodeId) -> bool {
        let mut stack: Vec<NodeId> = self.nodes[id.index()].children.clone();
        let mut seen = HashSet::new();
        while let Some(n) = stack.pop() {
            if n == descendant {
                return true;
            }
            if seen.insert(n) {
                stack.extend(self.nodes[n.index()].children.iter().copied());
            }
        }
        false
    }

    /// Like `has_descendant` but refusing to walk through `via`: used by
    /// deletion rules to ask whether a child is still reachable once the
    /// deleted node is gone.
    pub fn has_descendant_avoiding(&self, id: NodeId, descendant: NodeId, via: NodeId) -> bool {
        let mut stack: Vec<NodeId> = self.nodes[id.index()]
            .children
            .iter()
            .copied()
            .filter(|&c| c != via)
            .collect();
        let mut seen = HashSet::new();
        while let Some(n) = stack.pop() {
            if n == descendant {
                return true;
            }
            if seen.insert(n) {
                stack.extend(
                    self.nodes[n.index()]
                        .children
                        .iter()
                        .copied()
                        .filter(|&c| c != via),
                );
            }
        }
        false
    }

    /// Deepest node that appears in every id's ancestry; ties broken by
    /// lowest arena index so the choice is deterministic.
    pub fn first_common_ancestor(&self, ids: &[NodeId]) -> Option<NodeId> {
        let mut iter = ids.iter();
        let mut common = self.ancestry(*iter.next()?);
        for &id in iter {
            let a = self.ancestry(id);
            common.retain(|n| a.contains(n));
        }
        common
            .into_iter()
            .max_by_key(|&n| (self.depth(n), std::cmp::Reverse(n)))
    }

    /// Area head of `id`: walk upward through real parents until an
    /// AreaDivider boundary (or the root). When parent branches converge,
    /// the first common ancestor defines the shared area.
    pub fn area_of(&self, id: NodeId) -> NodeId {
        // a direct AreaDivider parent marks a boundary: this node heads its
        // own area
        if self.nodes[id.index()]
            .parents
            .iter()
            .any(|&p| self.nodes[p.index()].kind == NodeKind::AreaDivider)
        {
            return id;
        }
        let parents = self.real_parents(id);
        let up = match parents.len() {
            0 => return id,
            1 => parents[0],
            _ => match self.first_common_ancestor(&parents) {
                Some(fca) => fca,
                None => return id,
            },
        };
        if up == id {
            return id;
        }
        self.area_of(up)
    }

    /// Tight-couple parent of `id`: the nearest real parent whose room must
    /// be directly adjacent. A TightCoupling indirection node marks the
    /// chain; without one, the first real parent serves.
    pub fn tight_couple_parent(&self, id: NodeId) -> Option<NodeId> {
        for &p in &self.nodes[id.index()].parents {
            if self.nodes[p.index()].kind == NodeKind::TightCoupling {
                return self.nodes[p.index()]
                    .parents
                    .first()
                    .map(|&pp| {
                        if self.nodes[pp.index()].kind.is_structural() {
                            self.tight_couple_parent(pp).unwrap_or(pp)
                        } else {
                            pp
                        }
                    });
            }
        }
        let parents = self.real_parents(id);
        parents.first().copied()
    }

    /// Live non-structural nodes in an order where every node follows all of
    /// its parents; the spatial embedder consumes this order.
    pub fn topo_order(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut queue = std::collections::VecDeque::new();
        let mut enqueued = HashSet::new();
        queue.push_back(self.root);
        enqueued.insert(self.root);
        // breadth-first collection; multi-parent nodes are enqueued once
        let mut collected = Vec::new();
        while let Some(id) = queue.pop_front() {
            collected.push(id);
            for &c in &self.nodes[id.index()].children {
                if enqueued.insert(c) {
                    queue.push_back(c);
                }
            }
        }
        // emit each node only after all of its live parents
        let mut emitted: HashSet<NodeId> = HashSet::new();
        let mut pending: std::collections::VecDeque<NodeId> = collected.into();
        let mut stall = 0usize;
        while let Some(id) = pending.pop_front() {
            let ready = self.nodes[id.index()]
                .parents
                .iter()
                .all(|p| emitted.contains(p) || self.nodes[p.index()].detached);
            if !ready {
                pending.push_back(id);
                stall += 1;
                if stall > pending.len() + 1 {
                    break; // cycle; validation reports it elsewhere
                }
                continue;
            }
            stall = 0;
            emitted.insert(id);
            if !self.nodes[id.index()].kind.is_structural() {
                order.push(id);
            }
        }
        order
    }

    /// Find a node reachable from `start` by child edges that is its own
    /// ancestor. `None` for a well-formed DAG.
    pub fn find_cycle(&self) -> Option<NodeId> {
        for id in self.live_ids() {
            let mut stack: Vec<NodeId> = self.nodes[id.index()].children.clone();
            let mut seen = HashSet::new();
            while let Some(n) = stack.pop() {
                if n == id {
                    return Some(id);
                }
                if seen.insert(n) {
                    stack.extend(self.nodes[n.index()].children.iter().copied());
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(arena: &mut NodeArena, kinds: &[NodeKind]) -> Vec<NodeId> {
        let mut ids = vec![arena.root()];
        for &k in kinds {
            let id = arena.alloc(k);
            let last = *ids.last().unwrap();
            arena.add_child(last, id);
            ids.push(id);
        }
        ids
    }

    #[test]
    fn test_depth_counts_real_parents_only() {
        let mut arena = NodeArena::new(NodeKind::Entrance);
        let ids = chain(
            &mut arena,
            &[NodeKind::TightCoupling, NodeKind::Room, NodeKind::Lock],
        );
        assert_eq!(arena.depth(arena.root()), 0);
        // the TightCoupling node is transparent: Room sits at depth 1
        assert_eq!(arena.depth(ids[2]), 1);
        assert_eq!(arena.depth(ids[3]), 2);
    }

    #[test]
    fn test_depth_takes_max_parent_branch() {
        let mut arena = NodeArena::new(NodeKind::Entrance);
        let short = arena.alloc(NodeKind::Key);
        let long_a = arena.alloc(NodeKind::Room);
        let long_b = arena.alloc(NodeKind::Key);
        let lock = arena.alloc(NodeKind::Lock);
        arena.add_child(arena.root(), short);
        arena.add_child(arena.root(), long_a);
        arena.add_child(long_a, long_b);
        arena.add_child(short, lock);
        arena.add_child(long_b, lock);
        assert_eq!(arena.depth(lock), 3);
    }

    #[test]
    fn test_first_common_ancestor() {
        let mut arena = NodeArena::new(NodeKind::Entrance);
        let mid = arena.alloc(NodeKind::Room);
        let a = arena.alloc(NodeKind::Key);
        let b = arena.alloc(NodeKind::Bonus);
        arena.add_child(arena.root(), mid);
        arena.add_child(mid, a);
        arena.add_child(mid, b);
        assert_eq!(arena.first_common_ancestor(&[a, b]), Some(mid));
        // a node is its own first common ancestor
        assert_eq!(arena.first_common_ancestor(&[a, a]), Some(a));
    }

    #[test]
    fn test_area_boundary() {
        let mut arena = NodeArena::new(NodeKind::Entrance);
        let divider = arena.alloc(NodeKind::AreaDivider);
        let head = arena.alloc(NodeKind::Room);
        let inner = arena.alloc(NodeKind::Key);
        arena.add_child(arena.root(), divider);
        arena.add_child(divider, head);
        arena.add_child(head, inner);
        assert_eq!(arena.area_of(inner), head);
        assert_eq!(arena.area_of(head), head);
        assert_eq!(arena.area_of(arena.root()), arena.root());
    }

    #[test]
    fn test_topo_order_respects_parents_and_skips_structural() {
        let mut arena = NodeArena::new(NodeKind::Entrance);
        let ids = chain(
            &mut arena,
            &[NodeKind::TightCoupling, NodeKind::Room, NodeKind::Key],
        );
        let order = arena.topo_order();
        assert_eq!(order, vec![arena.root(), ids[2], ids[3]]);
    }

    #[test]
    fn test_no_cycle_in_fresh_graph() {
        let mut arena = NodeArena::new(NodeKind::Entrance);
        chain(&mut arena, &[NodeKind::Room, NodeKind::Key]);
        assert!(arena.find_cycle().is_none());
    }

    #[test]
    fn test_has_descendant_avoiding() {
        let mut arena = NodeArena::new(NodeKind::Entrance);
        let key = arena.alloc(NodeKind::Key);
        let bonus = arena.alloc(NodeKind::PossibleBonus);
        let tail = arena.alloc(NodeKind::Lock);
        arena.add_child(arena.root(), key);
        arena.add_child(arena.root(), bonus);
        arena.add_child(key, tail);
        arena.add_child(bonus, tail);
        // tail is reachable from the root without going through bonus
        assert!(arena.has_descendant_avoiding(arena.root(), tail, bonus));
        // but the only path to tail avoiding key runs through bonus
        arena.remove_child(bonus, tail);
        assert!(!arena.has_descendant_avoiding(arena.root(), tail, key));
    }
}
