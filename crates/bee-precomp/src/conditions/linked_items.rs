// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `LinkedItem`: link marked instances into numbered sequences.
//!
//! Every linked instance gets `$type` set to `loop`, `start`, `mid` or `end`,
//! `$group` set to the chain number within its group, `$ind` set to its
//! index along the chain (from 0), and `$next` set to the index of the
//! following item (`0` when a loop wraps around). Items are expected to name
//! themselves `@thing_$group_$ind` and connect to `@thing_$group_$next`.
//!
//! Options (case-insensitive):
//! - `Group`: results sharing a group link together. Without one, only
//!   instances marked by this exact result link.
//! - `AllowLoop`: permit a closed loop.
//! - `AllowStart` / `AllowMid` / `AllowEnd`: permit the item in that role.
//! - `TransferIO`: move all remaining inputs and outputs to the first item.
//! - `StartLogic` / `MidLogic` / `EndLogic` / `LoopLogic`: instance overlaid
//!   on the item for its role.
//! - `Antlines`: `remove`, `keep` or `move` (onto the first item). Only
//!   applies to items with no outputs left after linking.
//! - `EndcapInst`: replacement for floor-mounted chain ends, turned to face
//!   the adjacent item. `endcap_free_rotate` allows any yaw.

use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::options::{self, flex_bool, yes};
use super::{AnonGroups, ConditionError, ResultKind};
use crate::context::CompileContext;
use crate::item_chain::{self, endcap_angles, endcap_yaw, Chains, Node, NodeIdx};
use crate::map::Instance;
use crate::user_errors::{UserError, UserErrorKind};

/// What to do with antlines between linked items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AntlineHandling {
    /// Delete them.
    #[default]
    Remove,
    /// Leave them alone.
    Keep,
    /// Move them onto the first item of the chain.
    Move,
}

impl FromStr for AntlineHandling {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "remove" => Ok(Self::Remove),
            "keep" => Ok(Self::Keep),
            "move" => Ok(Self::Move),
            _ => Err(format!(
                "unknown antline behaviour {s:?} (accepted: remove, keep, move)"
            )),
        }
    }
}

/// Settings for one `LinkedItem` result.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedConfig {
    /// Case-folded group name.
    pub group: String,
    /// Overlay for the first item.
    pub logic_start: Option<String>,
    /// Overlay for middle items.
    pub logic_mid: Option<String>,
    /// Overlay for the last item.
    pub logic_end: Option<String>,
    /// Overlay for every item of a loop.
    pub logic_loop: Option<String>,
    /// Antline treatment.
    pub antline: AntlineHandling,
    /// Move IO onto the first item.
    pub transfer_io: bool,
    /// May start a chain.
    pub allow_start: bool,
    /// May sit inside a chain.
    pub allow_mid: bool,
    /// May end a chain.
    pub allow_end: bool,
    /// May be part of a loop.
    pub allow_loop: bool,
    /// Endcap replacement for floor-mounted ends.
    pub endcap: Option<String>,
    /// Endcap may face any yaw instead of the nearest 90 degrees.
    pub endcap_free_rotate: bool,
}

#[derive(Deserialize)]
struct Options {
    group: Option<String>,
    startlogic: Option<String>,
    midlogic: Option<String>,
    endlogic: Option<String>,
    looplogic: Option<String>,
    #[serde(default, deserialize_with = "flex_bool")]
    allowloop: bool,
    #[serde(default = "yes", deserialize_with = "flex_bool")]
    allowstart: bool,
    #[serde(default = "yes", deserialize_with = "flex_bool")]
    allowmid: bool,
    #[serde(default = "yes", deserialize_with = "flex_bool")]
    allowend: bool,
    #[serde(default = "yes", deserialize_with = "flex_bool")]
    transferio: bool,
    antlines: Option<String>,
    antline: Option<String>,
    endcapinst: Option<String>,
    #[serde(default, deserialize_with = "flex_bool")]
    endcap_free_rotate: bool,
}

pub(super) fn parse(raw: &Value, groups: &mut AnonGroups) -> Result<ResultKind, ConditionError> {
    let opts: Options = options::parse("LinkedItem", raw)?;
    let antline = match opts.antlines.or(opts.antline) {
        Some(s) => s.parse().map_err(|message| ConditionError::BadOptions {
            result: "LinkedItem".into(),
            message,
        })?,
        None => AntlineHandling::default(),
    };
    Ok(ResultKind::LinkedItem(Arc::new(LinkedConfig {
        group: opts.group.map_or_else(|| groups.next(), |g| g.to_lowercase()),
        logic_start: options::instance(opts.startlogic),
        logic_mid: options::instance(opts.midlogic),
        logic_end: options::instance(opts.endlogic),
        logic_loop: options::instance(opts.looplogic),
        antline,
        transfer_io: opts.transferio,
        allow_start: opts.allowstart,
        allow_mid: opts.allowmid,
        allow_end: opts.allowend,
        allow_loop: opts.allowloop,
        endcap: options::instance(opts.endcapinst),
        endcap_free_rotate: opts.endcap_free_rotate,
    })))
}

/// Links every registered group.
pub(super) fn link_items(ctx: &mut CompileContext) -> Result<(), ConditionError> {
    for (name, nodes) in std::mem::take(&mut ctx.items_to_link) {
        info!(group = %name, items = nodes.len(), "linking items");
        link_group(ctx, nodes)?;
    }
    Ok(())
}

type LinkedNode = Node<Arc<LinkedConfig>>;

fn link_group(ctx: &mut CompileContext, nodes: Vec<LinkedNode>) -> Result<(), ConditionError> {
    let mut chains = item_chain::chain(&mut ctx.graph, nodes, true)?;
    let lists = chains.by_ref().collect::<Result<Vec<_>, _>>()?;
    for (group_counter, list) in lists.iter().enumerate() {
        if list.len() <= 1 {
            continue;
        }
        let is_looped = chains.is_loop(list);
        check_roles(&chains, list, is_looped)?;
        for (index, &idx) in list.iter().enumerate() {
            apply_node(ctx, &chains, list, group_counter, index, idx, is_looped);
        }
    }
    Ok(())
}

fn check_roles(
    chains: &Chains<Arc<LinkedConfig>>,
    list: &[NodeIdx],
    is_looped: bool,
) -> Result<(), UserError> {
    let pos = |idx: &NodeIdx| chains[*idx].pos;
    if is_looped && !list.iter().all(|idx| chains[*idx].conf.allow_loop) {
        let mut err = UserError::new(UserErrorKind::ChainingLoop);
        err.points = list.iter().map(pos).collect();
        err.lines = list
            .iter()
            .zip(list.iter().cycle().skip(1))
            .map(|(a, b)| (pos(a), pos(b)))
            .collect();
        return Err(err);
    }

    let last = list.len() - 1;
    let banned: Vec<bool> = list
        .iter()
        .enumerate()
        .map(|(i, idx)| {
            let conf = &chains[*idx].conf;
            if i == 0 {
                !conf.allow_start
            } else if i == last {
                !conf.allow_end
            } else {
                !conf.allow_mid
            }
        })
        .collect();
    if banned.iter().any(|b| *b) {
        // Only the offending nodes get points; the lines show the rest.
        let mut err = UserError::new(UserErrorKind::ChainingInvalidKind);
        err.points = list
            .iter()
            .zip(&banned)
            .filter(|(_, b)| **b)
            .map(|(idx, _)| pos(idx))
            .collect();
        err.lines = list.windows(2).map(|w| (pos(&w[0]), pos(&w[1]))).collect();
        err.textlist = list
            .iter()
            .zip(&banned)
            .filter(|(_, b)| **b)
            .map(|(idx, _)| chains[*idx].name.clone())
            .collect();
        return Err(err);
    }
    Ok(())
}

fn apply_node(
    ctx: &mut CompileContext,
    chains: &Chains<Arc<LinkedConfig>>,
    list: &[NodeIdx],
    group_counter: usize,
    index: usize,
    idx: NodeIdx,
    is_looped: bool,
) {
    let node = &chains[idx];
    let conf = &node.conf;
    let first = chains[list[0]].item;

    // Antlines are only safe to touch when nothing else is driven by them.
    if ctx.graph.item(node.item).outputs().is_empty() {
        match conf.antline {
            AntlineHandling::Remove => ctx.graph.delete_antlines(node.item),
            AntlineHandling::Move if index != 0 => ctx.graph.transfer_antlines(node.item, first),
            AntlineHandling::Move | AntlineHandling::Keep => {}
        }
    }

    if index != 0 && conf.transfer_io {
        let item = ctx.graph.item(node.item);
        let outputs: Vec<_> = item.outputs().iter().copied().collect();
        let inputs: Vec<_> = item.inputs().iter().copied().collect();
        for conn in outputs {
            ctx.graph.set_from(conn, first);
        }
        for conn in inputs {
            ctx.graph.set_to(conn, first);
        }
    }

    let (kind, logic, other) = if is_looped {
        ("loop", &conf.logic_loop, None)
    } else if node.prev.is_none() {
        ("start", &conf.logic_start, node.next)
    } else if node.next.is_none() {
        ("end", &conf.logic_end, node.prev)
    } else {
        ("mid", &conf.logic_mid, None)
    };

    let inst = ctx.map.inst_mut(node.inst);
    inst.fixups.set("$type", kind);
    inst.fixups.set("$group", group_counter);
    inst.fixups.set("$ind", index);
    if let Some(next) = node.next {
        if next == list[0] {
            inst.fixups.set("$next", "0");
        } else {
            inst.fixups.set("$next", index + 1);
        }
    }
    let overlay = logic.as_ref().map(|file| Instance {
        targetname: inst.targetname.clone(),
        file: file.clone(),
        origin: node.pos,
        angles: inst.angles,
        fixups: inst.fixups.clone(),
    });
    if let Some(overlay) = overlay {
        ctx.add_inst(overlay);
    }

    if let (Some(other), Some(endcap)) = (other, &conf.endcap) {
        if !node.is_floor() {
            return;
        }
        if let Some(yaw) = endcap_yaw(node.pos, chains[other].pos, conf.endcap_free_rotate) {
            let inst = ctx.map.inst_mut(node.inst);
            inst.file.clone_from(endcap);
            inst.angles = endcap_angles(yaw);
            ctx.all_inst.insert(endcap.to_lowercase());
        }
    }
}
