// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Item connection graph.
//!
//! Items and connections live in arenas addressed by [`ItemId`] and
//! [`ConnId`]. Removed connections leave an empty slot so ids stay stable for
//! the lifetime of a compile.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::map::{Indicator, IndicatorKind, InstId, Link, Map};

/// Index of an item in a [`ConnectionGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub usize);

/// Index of a connection in a [`ConnectionGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnId(pub usize);

/// One instance that can send or receive signals.
#[derive(Debug, Clone)]
pub struct Item {
    /// Targetname of the instance.
    pub name: String,
    /// Instance this item wraps.
    pub inst: InstId,
    /// Antline overlays running from this item.
    pub antlines: BTreeSet<String>,
    /// Indicator panels driven by this item.
    pub ind_panels: BTreeSet<String>,
    inputs: BTreeSet<ConnId>,
    outputs: BTreeSet<ConnId>,
}

impl Item {
    /// Connections arriving at this item.
    pub fn inputs(&self) -> &BTreeSet<ConnId> {
        &self.inputs
    }

    /// Connections leaving this item.
    pub fn outputs(&self) -> &BTreeSet<ConnId> {
        &self.outputs
    }
}

/// A directed connection between two items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    /// Sending item.
    pub from: ItemId,
    /// Receiving item.
    pub to: ItemId,
}

/// All items and connections of a map.
#[derive(Debug, Default)]
pub struct ConnectionGraph {
    items: Vec<Item>,
    conns: Vec<Option<Connection>>,
    by_name: FxHashMap<String, ItemId>,
}

impl ConnectionGraph {
    /// Builds the graph from a map.
    ///
    /// Every instance with a targetname becomes an item; the first instance
    /// wins if names repeat. Links and indicators naming unknown items are
    /// dropped with a warning.
    pub fn from_map(map: &Map) -> Self {
        let mut graph = Self::default();
        for id in map.ids() {
            let name = &map.inst(id).targetname;
            if name.is_empty() || graph.by_name.contains_key(name) {
                continue;
            }
            graph.add_item(name.clone(), id);
        }
        for link in &map.connections {
            match (graph.find(&link.from), graph.find(&link.to)) {
                (Some(from), Some(to)) => {
                    graph.connect(from, to);
                }
                _ => warn!(from = %link.from, to = %link.to, "dropping link to unknown item"),
            }
        }
        for ind in &map.indicators {
            let Some(item) = graph.find(&ind.item) else {
                warn!(item = %ind.item, name = %ind.name, "dropping indicator for unknown item");
                continue;
            };
            let item = &mut graph.items[item.0];
            match ind.kind {
                IndicatorKind::Antline => item.antlines.insert(ind.name.clone()),
                IndicatorKind::Panel => item.ind_panels.insert(ind.name.clone()),
            };
        }
        debug!(items = graph.items.len(), conns = graph.conns.len(), "built connection graph");
        graph
    }

    /// Writes the current links and indicators back into `map`.
    pub fn write_back(&self, map: &mut Map) {
        map.connections = self
            .connections()
            .map(|(_, conn)| Link {
                from: self.items[conn.from.0].name.clone(),
                to: self.items[conn.to.0].name.clone(),
            })
            .collect();
        map.indicators.clear();
        for item in &self.items {
            let antlines = item.antlines.iter().map(|n| (IndicatorKind::Antline, n));
            let panels = item.ind_panels.iter().map(|n| (IndicatorKind::Panel, n));
            map.indicators.extend(antlines.chain(panels).map(|(kind, name)| Indicator {
                item: item.name.clone(),
                kind,
                name: name.clone(),
            }));
        }
    }

    /// Registers an item.
    pub fn add_item(&mut self, name: String, inst: InstId) -> ItemId {
        let id = ItemId(self.items.len());
        self.by_name.insert(name.clone(), id);
        self.items.push(Item {
            name,
            inst,
            antlines: BTreeSet::new(),
            ind_panels: BTreeSet::new(),
            inputs: BTreeSet::new(),
            outputs: BTreeSet::new(),
        });
        id
    }

    /// Looks up an item by targetname.
    pub fn find(&self, name: &str) -> Option<ItemId> {
        self.by_name.get(name).copied()
    }

    /// Borrows an item.
    pub fn item(&self, id: ItemId) -> &Item {
        &self.items[id.0]
    }

    /// Number of items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Borrows a live connection.
    pub fn connection(&self, id: ConnId) -> Option<&Connection> {
        self.conns.get(id.0).and_then(Option::as_ref)
    }

    /// Iterates live connections in creation order.
    pub fn connections(&self) -> impl Iterator<Item = (ConnId, &Connection)> {
        self.conns
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|c| (ConnId(i), c)))
    }

    /// Adds a connection `from -> to`.
    pub fn connect(&mut self, from: ItemId, to: ItemId) -> ConnId {
        let id = ConnId(self.conns.len());
        self.conns.push(Some(Connection { from, to }));
        self.items[from.0].outputs.insert(id);
        self.items[to.0].inputs.insert(id);
        id
    }

    /// Removes a connection, returning it if it was live.
    pub fn remove_connection(&mut self, id: ConnId) -> Option<Connection> {
        let conn = self.conns.get_mut(id.0)?.take()?;
        self.items[conn.from.0].outputs.remove(&id);
        self.items[conn.to.0].inputs.remove(&id);
        Some(conn)
    }

    /// Re-points the sending end of a connection.
    pub fn set_from(&mut self, id: ConnId, item: ItemId) {
        let Some(conn) = self.conns.get_mut(id.0).and_then(Option::as_mut) else {
            return;
        };
        let old = std::mem::replace(&mut conn.from, item);
        self.items[old.0].outputs.remove(&id);
        self.items[item.0].outputs.insert(id);
    }

    /// Re-points the receiving end of a connection.
    pub fn set_to(&mut self, id: ConnId, item: ItemId) {
        let Some(conn) = self.conns.get_mut(id.0).and_then(Option::as_mut) else {
            return;
        };
        let old = std::mem::replace(&mut conn.to, item);
        self.items[old.0].inputs.remove(&id);
        self.items[item.0].inputs.insert(id);
    }

    /// Deletes every antline and panel of an item.
    pub fn delete_antlines(&mut self, id: ItemId) {
        let item = &mut self.items[id.0];
        item.antlines.clear();
        item.ind_panels.clear();
    }

    /// Moves every antline and panel from `from` onto `to`.
    pub fn transfer_antlines(&mut self, from: ItemId, to: ItemId) {
        if from == to {
            return;
        }
        let source = &mut self.items[from.0];
        let antlines = std::mem::take(&mut source.antlines);
        let panels = std::mem::take(&mut source.ind_panels);
        let dest = &mut self.items[to.0];
        dest.antlines.extend(antlines);
        dest.ind_panels.extend(panels);
    }
}
