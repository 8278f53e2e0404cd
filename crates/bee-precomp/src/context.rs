// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! State owned by one compile.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::conditions::linked_items::LinkedConfig;
use crate::conditions::scaffold::ScaffoldConfig;
use crate::connections::ConnectionGraph;
use crate::item_chain::Node;
use crate::map::{InstId, Instance, Map};

/// Everything one precompile reads and mutates.
///
/// Created when the map is loaded and consumed by [`CompileContext::finish`];
/// nothing here outlives the compile.
#[derive(Debug)]
pub struct CompileContext {
    /// The map being compiled.
    pub map: Map,
    /// Item connections, detached from `map` until `finish`.
    pub graph: ConnectionGraph,
    /// `LinkedItem` nodes waiting for the link pass, by group.
    pub items_to_link: BTreeMap<String, Vec<Node<Arc<LinkedConfig>>>>,
    /// `UnstScaffold` nodes waiting for the link pass, by group.
    pub scaffold_groups: BTreeMap<String, Vec<Node<Arc<ScaffoldConfig>>>>,
    /// Lowercased path of every instance file the map uses.
    pub all_inst: BTreeSet<String>,
}

impl CompileContext {
    /// Starts a compile of `map`.
    pub fn new(map: Map) -> Self {
        let graph = ConnectionGraph::from_map(&map);
        let all_inst = map
            .instances
            .iter()
            .map(|i| i.file.to_lowercase())
            .collect();
        Self {
            map,
            graph,
            items_to_link: BTreeMap::new(),
            scaffold_groups: BTreeMap::new(),
            all_inst,
        }
    }

    /// Adds an instance to the map and records its file.
    pub fn add_inst(&mut self, inst: Instance) -> InstId {
        self.all_inst.insert(inst.file.to_lowercase());
        self.map.push(inst)
    }

    /// Writes the graph back into the map and returns it.
    pub fn finish(mut self) -> Map {
        self.graph.write_back(&mut self.map);
        self.map
    }
}
