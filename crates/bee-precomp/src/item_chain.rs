// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Groups linked items into ordered chains.
//!
//! Used for items placed as a run between instances, such as unstationary
//! scaffolds and vactubes. [`chain`] consumes the item-to-item connections
//! between tracked nodes and records them as `prev`/`next` links; the returned
//! [`Chains`] then yields each maximal run from its start to its end.

use std::collections::BTreeSet;
use std::ops::Index;

use bee_geom::{Angle, Matrix, Vec3};
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::warn;

use crate::connections::{ConnId, ConnectionGraph, ItemId};
use crate::map::{InstId, Map};

/// Index of a node inside one [`Chains`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(pub usize);

/// Points and line segments to show the author when something is wrong.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Highlight {
    /// Positions of the offending items.
    pub points: Vec<Vec3>,
    /// Connections between offending items.
    pub lines: Vec<(Vec3, Vec3)>,
}

/// Structural problems found while linking.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChainError {
    /// An item links onward to two different tracked items.
    #[error("item {item:?} links to multiple output items")]
    MultiOutput {
        /// Name of the branching item.
        item: String,
        /// The item and both of its targets.
        highlight: Highlight,
    },
    /// Two different tracked items link into the same item.
    #[error("item {item:?} links to multiple input items")]
    MultiInput {
        /// Name of the merging item.
        item: String,
        /// The item and both of its sources.
        highlight: Highlight,
    },
    /// The links form a cycle and loops are not allowed.
    #[error("loop in linked items")]
    Loop {
        /// Every node in the cycle and every edge around it.
        highlight: Highlight,
    },
    /// An instance has no item registered under its name.
    #[error("no item for instance {0:?}")]
    MissingItem(String),
}

/// One item taking part in a chain.
#[derive(Debug, Clone)]
pub struct Node<C> {
    /// Item this node wraps.
    pub item: ItemId,
    /// Instance backing the item.
    pub inst: InstId,
    /// Item name, used in diagnostics.
    pub name: String,
    /// Per-kind configuration.
    pub conf: C,
    /// Instance origin.
    pub pos: Vec3,
    /// Instance orientation.
    pub orient: Matrix,
    /// Previous node in the chain.
    pub prev: Option<NodeIdx>,
    /// Next node in the chain.
    pub next: Option<NodeIdx>,
}

impl<C> Node<C> {
    /// Builds the node for an instance, finding its item by targetname.
    pub fn from_inst(
        graph: &ConnectionGraph,
        map: &Map,
        inst: InstId,
        conf: C,
    ) -> Result<Self, ChainError> {
        let instance = map.inst(inst);
        let item = graph
            .find(&instance.targetname)
            .ok_or_else(|| ChainError::MissingItem(instance.targetname.clone()))?;
        Ok(Self {
            item,
            inst,
            name: instance.targetname.clone(),
            conf,
            pos: instance.origin,
            orient: Matrix::from_angle(&instance.angles),
            prev: None,
            next: None,
        })
    }

    /// Returns `true` if the instance points straight up.
    pub fn is_floor(&self) -> bool {
        self.orient.up().z() > 0.99
    }
}

/// Yaw an endcap at `from` should face to point at `to`.
///
/// Returns `None` when the neighbour is directly above or below, rises more
/// than about 45 degrees, or drops more than about 8.5 degrees. Unless
/// `free_rotation` is set the result snaps to the nearest multiple of 90,
/// switching over at the diagonals.
pub fn endcap_yaw(from: Vec3, to: Vec3, free_rotation: bool) -> Option<f64> {
    let dir = to.sub(&from);
    let horiz = dir.horizontal_length();
    if horiz == 0.0 {
        return None;
    }
    let gradient = dir.z() / horiz;
    if !(-0.15..=1.0).contains(&gradient) {
        return None;
    }
    let yaw = dir.y().atan2(dir.x()).to_degrees();
    Some(if free_rotation {
        yaw
    } else {
        ((yaw + 45.0) / 90.0).floor() * 90.0
    })
}

/// Angles for an endcap facing `yaw`, rounded to whole degrees.
pub fn endcap_angles(yaw: f64) -> Angle {
    Angle::from_yaw(yaw.round())
}

/// Links `nodes` using the connections between them.
///
/// Each connection from one tracked item to another is removed from `graph`
/// and recorded as a `next`/`prev` pair. Connections to untracked items are
/// left alone. Repeated connections between the same pair are accepted.
/// Nodes repeating an item keep the first occurrence.
///
/// # Errors
/// [`ChainError::MultiOutput`] or [`ChainError::MultiInput`] if an item
/// would get two successors or two predecessors. Nothing has been yielded
/// at that point; the graph may already have lost some connections.
pub fn chain<C>(
    graph: &mut ConnectionGraph,
    nodes: impl IntoIterator<Item = Node<C>>,
    allow_loop: bool,
) -> Result<Chains<C>, ChainError> {
    let mut arena: Vec<Node<C>> = Vec::new();
    let mut by_item: FxHashMap<ItemId, NodeIdx> = FxHashMap::default();
    for node in nodes {
        if by_item.contains_key(&node.item) {
            warn!(item = %node.name, "item registered twice for linking; keeping the first");
            continue;
        }
        by_item.insert(node.item, NodeIdx(arena.len()));
        arena.push(node);
    }

    for idx in (0..arena.len()).map(NodeIdx) {
        let outputs: Vec<ConnId> = graph
            .item(arena[idx.0].item)
            .outputs()
            .iter()
            .copied()
            .collect();
        for conn in outputs {
            let Some(target) = graph
                .connection(conn)
                .and_then(|c| by_item.get(&c.to).copied())
            else {
                continue;
            };
            graph.remove_connection(conn);

            if let Some(existing) = arena[idx.0].next.filter(|n| *n != target) {
                let (node, a, b) = (&arena[idx.0], &arena[existing.0], &arena[target.0]);
                return Err(ChainError::MultiOutput {
                    item: node.name.clone(),
                    highlight: Highlight {
                        points: vec![node.pos, a.pos, b.pos],
                        lines: vec![(node.pos, a.pos), (node.pos, b.pos)],
                    },
                });
            }
            if let Some(existing) = arena[target.0].prev.filter(|p| *p != idx) {
                let (node, a, b) = (&arena[target.0], &arena[existing.0], &arena[idx.0]);
                return Err(ChainError::MultiInput {
                    item: node.name.clone(),
                    highlight: Highlight {
                        points: vec![node.pos, a.pos, b.pos],
                        lines: vec![(a.pos, node.pos), (b.pos, node.pos)],
                    },
                });
            }
            arena[idx.0].next = Some(target);
            arena[target.0].prev = Some(idx);
        }
    }

    Ok(Chains {
        todo: (0..arena.len()).map(NodeIdx).collect(),
        nodes: arena,
        allow_loop,
    })
}

/// Linked nodes, yielding one ordered chain at a time.
///
/// Chains come out start first. For a permitted loop the first node's `prev`
/// is set, pointing at the last. Nodes without any links are skipped.
#[derive(Debug)]
pub struct Chains<C> {
    nodes: Vec<Node<C>>,
    todo: BTreeSet<NodeIdx>,
    allow_loop: bool,
}

impl<C> Chains<C> {
    /// Every node, linked.
    pub fn nodes(&self) -> &[Node<C>] {
        &self.nodes
    }

    /// Returns `true` if `chain` wraps around from its last node to its first.
    pub fn is_loop(&self, chain: &[NodeIdx]) -> bool {
        chain.first().is_some_and(|first| self.nodes[first.0].prev.is_some())
    }

    fn loop_error(&self, member: NodeIdx) -> ChainError {
        let mut highlight = Highlight::default();
        let mut cur = member;
        loop {
            let node = &self.nodes[cur.0];
            highlight.points.push(node.pos);
            let Some(next) = node.next else { break };
            highlight.lines.push((node.pos, self.nodes[next.0].pos));
            if next == member {
                break;
            }
            cur = next;
        }
        ChainError::Loop { highlight }
    }
}

impl<C> Index<NodeIdx> for Chains<C> {
    type Output = Node<C>;

    fn index(&self, idx: NodeIdx) -> &Node<C> {
        &self.nodes[idx.0]
    }
}

impl<C> Iterator for Chains<C> {
    type Item = Result<Vec<NodeIdx>, ChainError>;

    fn next(&mut self) -> Option<Self::Item> {
        let picked = loop {
            let idx = self.todo.pop_first()?;
            let node = &self.nodes[idx.0];
            if node.prev.is_some() || node.next.is_some() {
                break idx;
            }
        };

        // Walk back to the start; arriving at `picked` again means a cycle.
        let mut start = picked;
        if let Some(mut cur) = self.nodes[picked.0].prev {
            loop {
                let Some(prev) = self.nodes[cur.0].prev else {
                    start = cur;
                    break;
                };
                if cur == picked {
                    if !self.allow_loop {
                        self.todo.clear();
                        return Some(Err(self.loop_error(picked)));
                    }
                    break;
                }
                cur = prev;
            }
        }

        let mut chain = Vec::new();
        let mut cur = start;
        loop {
            chain.push(cur);
            self.todo.remove(&cur);
            match self.nodes[cur.0].next {
                Some(next) if next != start => cur = next,
                _ => break,
            }
        }
        Some(Ok(chain))
    }
}
