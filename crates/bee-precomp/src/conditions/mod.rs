// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Condition engine.
//!
//! A condition is a list of flags tested against each instance and a list of
//! results applied to instances that pass. Conditions run in ascending
//! priority order; equal priorities keep their file order. The chain linking
//! passes run as meta-conditions at [`MetaCond::PRIORITY`], before every user
//! condition of that priority.

pub mod linked_items;
mod options;
pub mod scaffold;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::context::CompileContext;
use crate::item_chain::{ChainError, Node};
use crate::map::{InstId, Instance};
use crate::user_errors::UserError;

use self::linked_items::LinkedConfig;
use self::scaffold::ScaffoldConfig;

/// Errors raised while loading or running conditions.
#[derive(Debug, Error)]
pub enum ConditionError {
    /// A result name is not in the registry (development mode only).
    #[error("unknown result {0:?}")]
    UnknownResult(String),
    /// A result's options could not be parsed.
    #[error("invalid options for {result}: {message}")]
    BadOptions {
        /// Result name as written.
        result: String,
        /// What was wrong.
        message: String,
    },
    /// The level itself is at fault.
    #[error(transparent)]
    User(#[from] UserError),
    /// Linking failed for a reason that is not the author's fault.
    #[error(transparent)]
    Chain(ChainError),
    /// The conditions file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The conditions file is not valid JSON for its schema.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<ChainError> for ConditionError {
    fn from(err: ChainError) -> Self {
        match UserError::try_from(err) {
            Ok(user) => Self::User(user),
            Err(chain) => Self::Chain(chain),
        }
    }
}

/// Test applied to an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flag {
    /// Instance file is one of these (case-insensitive).
    Instance(Vec<String>),
    /// Fixup variable `var` equals `value`.
    InstVar {
        /// Fixup name, `$` optional.
        var: String,
        /// Expected value.
        value: String,
    },
}

impl Flag {
    fn test(&self, inst: &Instance) -> bool {
        match self {
            Self::Instance(files) => {
                let file = inst.file.to_lowercase();
                files.iter().any(|f| f.to_lowercase() == file)
            }
            Self::InstVar { var, value } => inst.fixups.get(var) == Some(value.as_str()),
        }
    }
}

/// A result as written in the conditions file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultDef {
    /// Registry name, case-insensitive.
    pub name: String,
    /// Result-specific options.
    #[serde(default)]
    pub options: Value,
}

/// A condition as written in the conditions file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionDef {
    /// Lower runs earlier.
    #[serde(default)]
    pub priority: i32,
    /// Every flag must pass.
    #[serde(default)]
    pub flags: Vec<Flag>,
    /// Applied to each passing instance.
    #[serde(default)]
    pub results: Vec<ResultDef>,
    /// Package or file the condition came from, for logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Contents of `vbsp_config.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionsFile {
    /// Global options such as the exported style id.
    #[serde(default)]
    pub options: BTreeMap<String, Value>,
    /// Every condition, in file order.
    #[serde(default)]
    pub conditions: Vec<ConditionDef>,
}

/// Parsed result, ready to apply.
#[derive(Debug, Clone)]
pub enum ResultKind {
    /// Mark the instance for linking into a chain.
    LinkedItem(Arc<LinkedConfig>),
    /// Mark the instance as an unstationary scaffold track.
    UnstScaffold(Arc<ScaffoldConfig>),
}

/// Hands out names for results without an explicit group.
#[derive(Debug, Default)]
pub(crate) struct AnonGroups(u64);

impl AnonGroups {
    pub(crate) fn next(&mut self) -> String {
        self.0 += 1;
        format!("{:016X}", self.0)
    }
}

type ParseFn = fn(&Value, &mut AnonGroups) -> Result<ResultKind, ConditionError>;

const RESULTS: &[(&str, ParseFn)] = &[
    ("LinkedItem", linked_items::parse),
    ("UnstScaffold", scaffold::parse),
];

impl ResultKind {
    fn parse(def: &ResultDef, groups: &mut AnonGroups) -> Option<Result<Self, ConditionError>> {
        RESULTS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&def.name))
            .map(|(_, parse)| parse(&def.options, groups))
    }

    fn apply(&self, ctx: &mut CompileContext, inst: InstId) -> Result<(), ConditionError> {
        match self {
            Self::LinkedItem(conf) => {
                let node = Node::from_inst(&ctx.graph, &ctx.map, inst, Arc::clone(conf))?;
                ctx.items_to_link
                    .entry(conf.group.clone())
                    .or_default()
                    .push(node);
            }
            Self::UnstScaffold(conf) => {
                let node = Node::from_inst(&ctx.graph, &ctx.map, inst, Arc::clone(conf))?;
                ctx.scaffold_groups
                    .entry(conf.group.clone())
                    .or_default()
                    .push(node);
            }
        }
        Ok(())
    }
}

/// Passes that run once over the whole map instead of per instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaCond {
    /// Link every scaffold group.
    LinkScaffolds,
    /// Link every linked-item group.
    LinkItems,
}

impl MetaCond {
    /// Priority both linking passes run at.
    pub const PRIORITY: i32 = -300;

    const ALL: [Self; 2] = [Self::LinkScaffolds, Self::LinkItems];

    fn run(self, ctx: &mut CompileContext) -> Result<(), ConditionError> {
        match self {
            Self::LinkScaffolds => scaffold::link_scaffolds(ctx),
            Self::LinkItems => linked_items::link_items(ctx),
        }
    }
}

/// A loaded condition.
#[derive(Debug, Clone)]
pub struct Condition {
    /// Lower runs earlier.
    pub priority: i32,
    /// Every flag must pass.
    pub flags: Vec<Flag>,
    /// Applied to each passing instance.
    pub results: Vec<ResultKind>,
    /// Where the condition came from.
    pub source: Option<String>,
}

/// Every condition for a compile, sorted by priority.
#[derive(Debug, Clone, Default)]
pub struct Conditions {
    conds: Vec<Condition>,
}

impl Conditions {
    /// Reads and parses `vbsp_config.json`.
    pub fn from_path(path: &Path, dev_mode: bool) -> Result<Self, ConditionError> {
        let data = std::fs::read(path)?;
        let file: ConditionsFile = serde_json::from_slice(&data)?;
        Self::load(file, dev_mode)
    }

    /// Parses every result and sorts the conditions.
    ///
    /// Unknown result names fail the load in `dev_mode`; otherwise they are
    /// logged and dropped.
    pub fn load(file: ConditionsFile, dev_mode: bool) -> Result<Self, ConditionError> {
        let mut groups = AnonGroups::default();
        let mut conds = Vec::with_capacity(file.conditions.len());
        for def in file.conditions {
            let mut results = Vec::with_capacity(def.results.len());
            for res in &def.results {
                match ResultKind::parse(res, &mut groups) {
                    Some(parsed) => results.push(parsed?),
                    None if dev_mode => return Err(ConditionError::UnknownResult(res.name.clone())),
                    None => {
                        warn!(result = %res.name, source = ?def.source, "unknown result, skipping");
                    }
                }
            }
            conds.push(Condition {
                priority: def.priority,
                flags: def.flags,
                results,
                source: def.source,
            });
        }
        conds.sort_by_key(|c| c.priority);
        Ok(Self { conds })
    }

    /// Loaded conditions in run order.
    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.conds.iter()
    }

    /// Runs every condition in order. The linking passes run just before the
    /// first condition at or above [`MetaCond::PRIORITY`], or last if none is.
    #[instrument(skip_all, fields(conditions = self.conds.len()))]
    pub fn check_all(&self, ctx: &mut CompileContext) -> Result<(), ConditionError> {
        let mut meta_done = false;
        for cond in &self.conds {
            if !meta_done && cond.priority >= MetaCond::PRIORITY {
                run_meta(ctx)?;
                meta_done = true;
            }
            check_one(cond, ctx)?;
        }
        if !meta_done {
            run_meta(ctx)?;
        }
        info!(instances = ctx.map.instances.len(), "conditions complete");
        Ok(())
    }
}

fn run_meta(ctx: &mut CompileContext) -> Result<(), ConditionError> {
    for meta in MetaCond::ALL {
        debug!(?meta, "running meta condition");
        meta.run(ctx)?;
    }
    Ok(())
}

fn check_one(cond: &Condition, ctx: &mut CompileContext) -> Result<(), ConditionError> {
    if cond.results.is_empty() {
        debug!(source = ?cond.source, "condition has no results, skipping");
        return Ok(());
    }
    // Instances added by results are not revisited by the same condition.
    let count = ctx.map.instances.len();
    let mut matched = 0usize;
    for inst in (0..count).map(InstId) {
        if !cond.flags.iter().all(|flag| flag.test(ctx.map.inst(inst))) {
            continue;
        }
        matched += 1;
        for result in &cond.results {
            result.apply(ctx, inst)?;
        }
    }
    debug!(priority = cond.priority, source = ?cond.source, matched, "condition executed");
    Ok(())
}
