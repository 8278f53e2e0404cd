// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `UnstScaffold`: unstationary scaffold tracks.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::options::{self, flex_bool};
use super::{AnonGroups, ConditionError, ResultKind};
use crate::context::CompileContext;
use crate::item_chain::{self, endcap_angles, endcap_yaw, Node};
use crate::map::Instance;

/// Position of a track within its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkType {
    /// First track.
    Start,
    /// Any track between the ends.
    Mid,
    /// Last track.
    End,
}

impl LinkType {
    /// Value written to `$type`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Mid => "mid",
            Self::End => "end",
        }
    }
}

/// Settings for one `UnstScaffold` result.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaffoldConfig {
    /// Case-folded group name.
    pub group: String,
    /// Logic overlay for the first track.
    pub logic_start: Option<String>,
    /// Logic overlay for middle tracks.
    pub logic_mid: Option<String>,
    /// Logic overlay for the last track.
    pub logic_end: Option<String>,
    /// Start overlay when the chain starts reversed.
    pub logic_start_rev: Option<String>,
    /// Middle overlay when the chain starts reversed.
    pub logic_mid_rev: Option<String>,
    /// End overlay when the chain starts reversed.
    pub logic_end_rev: Option<String>,
    /// Endcap replacing floor-mounted ends, turned toward the next track.
    pub inst_end: Option<String>,
    /// Endcap may face any yaw instead of the nearest 90 degrees.
    pub free_rotation: bool,
}

impl ScaffoldConfig {
    /// Logic overlay for a position, if any.
    pub fn logic(&self, link: LinkType, reversed: bool) -> Option<&str> {
        let file = match (link, reversed) {
            (LinkType::Start, false) => &self.logic_start,
            (LinkType::Mid, false) => &self.logic_mid,
            (LinkType::End, false) => &self.logic_end,
            (LinkType::Start, true) => &self.logic_start_rev,
            (LinkType::Mid, true) => &self.logic_mid_rev,
            (LinkType::End, true) => &self.logic_end_rev,
        };
        file.as_deref()
    }
}

#[derive(Deserialize)]
struct Options {
    group: Option<String>,
    startlogic: Option<String>,
    midlogic: Option<String>,
    endlogic: Option<String>,
    startlogicrev: Option<String>,
    midlogicrev: Option<String>,
    endlogicrev: Option<String>,
    endinst: Option<String>,
    #[serde(default, deserialize_with = "flex_bool")]
    free_rotate_end: bool,
}

pub(super) fn parse(raw: &Value, groups: &mut AnonGroups) -> Result<ResultKind, ConditionError> {
    let opts: Options = options::parse("UnstScaffold", raw)?;
    let logic_start = options::instance(opts.startlogic);
    let logic_mid = options::instance(opts.midlogic);
    let logic_end = options::instance(opts.endlogic);
    Ok(ResultKind::UnstScaffold(Arc::new(ScaffoldConfig {
        group: opts.group.map_or_else(|| groups.next(), |g| g.to_lowercase()),
        logic_start_rev: options::instance(opts.startlogicrev).or_else(|| logic_start.clone()),
        logic_mid_rev: options::instance(opts.midlogicrev).or_else(|| logic_mid.clone()),
        logic_end_rev: options::instance(opts.endlogicrev).or_else(|| logic_end.clone()),
        logic_start,
        logic_mid,
        logic_end,
        inst_end: options::instance(opts.endinst),
        free_rotation: opts.free_rotate_end,
    })))
}

/// Links every scaffold group.
pub(super) fn link_scaffolds(ctx: &mut CompileContext) -> Result<(), ConditionError> {
    if ctx.scaffold_groups.is_empty() {
        return Ok(());
    }
    for (name, nodes) in std::mem::take(&mut ctx.scaffold_groups) {
        info!(group = %name, tracks = nodes.len(), "running scaffold generator");
        link_group(ctx, nodes)?;
    }
    info!("finished scaffold generation");
    Ok(())
}

fn link_group(
    ctx: &mut CompileContext,
    nodes: Vec<Node<Arc<ScaffoldConfig>>>,
) -> Result<(), ConditionError> {
    let mut chains = item_chain::chain(&mut ctx.graph, nodes, false)?;
    let lists = chains.by_ref().collect::<Result<Vec<_>, _>>()?;
    for (group_counter, list) in lists.iter().enumerate() {
        let Some(&head) = list.first() else { continue };
        let reversed = ctx.map.inst(chains[head].inst).fixups.bool("$start_reversed");

        for (index, &idx) in list.iter().enumerate() {
            let node = &chains[idx];
            let conf = &node.conf;
            let (link, other) = match (node.prev, node.next) {
                (None, None) => continue,
                (None, Some(next)) => (LinkType::Start, Some(next)),
                (Some(prev), None) => (LinkType::End, Some(prev)),
                (Some(_), Some(_)) => (LinkType::Mid, None),
            };

            let inst = ctx.map.inst_mut(node.inst);
            inst.fixups.set("$group", group_counter);
            inst.fixups.set("$ind", index);
            if node.next.is_some() {
                inst.fixups.set("$next", index + 1);
            }
            inst.fixups.set("$type", link.as_str());

            // The endcap replaces the track model outright.
            if let (Some(other), Some(end), true) = (other, &conf.inst_end, node.is_floor()) {
                if let Some(yaw) = endcap_yaw(node.pos, chains[other].pos, conf.free_rotation) {
                    inst.file.clone_from(end);
                    inst.angles = endcap_angles(yaw);
                    ctx.all_inst.insert(end.to_lowercase());
                }
            }

            let inst = ctx.map.inst(node.inst);
            let overlay = conf.logic(link, reversed).map(|file| Instance {
                targetname: inst.targetname.clone(),
                file: file.to_owned(),
                origin: node.pos,
                angles: inst.angles,
                fixups: inst.fixups.clone(),
            });
            if let Some(overlay) = overlay {
                ctx.add_inst(overlay);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use serde_json::json;

    use super::*;

    fn conf(options: Value) -> Arc<ScaffoldConfig> {
        match parse(&options, &mut AnonGroups::default()).unwrap() {
            ResultKind::UnstScaffold(conf) => conf,
            ResultKind::LinkedItem(_) => unreachable!(),
        }
    }

    #[test]
    fn reversed_logic_falls_back_per_role() {
        let conf = conf(json!({
            "StartLogic": "start.vmf",
            "MidLogic": "mid.vmf",
            "EndLogic": "end.vmf",
            "MidLogicRev": "mid_rev.vmf",
        }));
        assert_eq!(conf.logic(LinkType::Start, true), Some("start.vmf"));
        assert_eq!(conf.logic(LinkType::Mid, true), Some("mid_rev.vmf"));
        assert_eq!(conf.logic(LinkType::Mid, false), Some("mid.vmf"));
        assert_eq!(conf.logic(LinkType::End, true), Some("end.vmf"));
    }

    #[test]
    fn blank_files_are_unset() {
        let conf = conf(json!({"group": "Scaff", "EndInst": "", "free_rotate_end": "1"}));
        assert_eq!(conf.group, "scaff");
        assert!(conf.inst_end.is_none());
        assert!(conf.free_rotation);
        assert_eq!(conf.logic(LinkType::Start, false), None);
    }
}
