// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Export steps and the state they share.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use bee_precomp::{ConditionDef, ConditionsFile};
use bee_steps::{StepError, StepOrder};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::error::ExportError;
use crate::package::{ItemDef, Package};

/// Data produced and consumed by export steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StepResource {
    /// The style has been chosen.
    Style,
    /// The list of exported items is known.
    EiItems,
    /// Editor item definitions are collected.
    EiData,
    /// `editoritems.json` is written.
    EiFile,
    /// Per-item config bundles are collected.
    ConfigData,
    /// Per-item config bundles are written.
    ConfigFile,
    /// Every condition and option for `vbsp_config.json` is collected.
    VconfData,
    /// `vbsp_config.json` is written.
    VconfFile,
    /// Package resources are copied.
    ResPackage,
}

/// Options written by the export itself; styles cannot override them.
const CORE_OPTIONS: [&str; 3] = ["style_id", "package_id", "dev_mode"];

#[derive(Debug, Default)]
struct ExportState {
    style: Option<String>,
    items: Vec<ItemDef>,
    editoritems: Vec<Value>,
    configs: BTreeMap<String, Value>,
    vbsp: ConditionsFile,
    resources: usize,
}

/// Everything one export reads and accumulates.
#[derive(Debug)]
pub struct ExportContext {
    /// Package being exported.
    pub package: Package,
    /// Directory resource paths are relative to.
    pub package_dir: PathBuf,
    /// Root of the configuration tree.
    pub out_dir: PathBuf,
    /// Style to export; `None` uses the package default.
    pub style: Option<String>,
    /// Written to the vbsp options.
    pub dev_mode: bool,
    state: Mutex<ExportState>,
}

impl ExportContext {
    /// Starts an export of `package` into `out_dir`.
    pub fn new(
        package: Package,
        package_dir: impl Into<PathBuf>,
        out_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            package,
            package_dir: package_dir.into(),
            out_dir: out_dir.into(),
            style: None,
            dev_mode: false,
            state: Mutex::new(ExportState::default()),
        }
    }

    /// Picks the style to export.
    pub fn with_style(mut self, style: Option<String>) -> Self {
        self.style = style;
        self
    }

    /// Sets the development mode flag.
    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }
}

/// What an export produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Exported style id.
    pub style: String,
    /// Items written to `editoritems.json`.
    pub items: usize,
    /// Conditions written to `vbsp_config.json`.
    pub conditions: usize,
    /// Resource files copied.
    pub resources: usize,
}

/// Builds the export step graph.
pub fn build_steps() -> Result<StepOrder<ExportContext, StepResource>, StepError<StepResource>> {
    use StepResource as R;

    let mut order = StepOrder::new();
    order.add_step("style", [], [R::Style, R::EiItems, R::EiData, R::VconfData], select_style)?;
    order.add_step("core_info", [], [R::VconfData], add_core_info)?;
    order.add_step(
        "items",
        [R::EiItems],
        [R::EiData, R::ConfigData, R::VconfData],
        collect_items,
    )?;
    order.add_step("write_editoritems", [R::EiData, R::Style], [R::EiFile], write_editoritems)?;
    order.add_step("write_configs", [R::ConfigData], [R::ConfigFile], write_configs)?;
    order.add_step("write_vbsp_config", [R::VconfData], [R::VconfFile], write_vbsp_config)?;
    order.add_step("copy_resources", [], [R::ResPackage], copy_resources)?;
    Ok(order)
}

/// Runs every export step and reports what was written.
///
/// Nothing is rolled back on failure; files already written stay in place.
#[instrument(skip_all, fields(package = %ctx.package.id, out = %ctx.out_dir.display()))]
pub async fn export(ctx: ExportContext) -> Result<ExportSummary, ExportError> {
    let order = build_steps()?;
    let ctx = Arc::new(ctx);
    order.run(Arc::clone(&ctx)).await?;

    let state = ctx.state.lock().await;
    let summary = ExportSummary {
        style: state.style.clone().unwrap_or_default(),
        items: state.editoritems.len(),
        conditions: state.vbsp.conditions.len(),
        resources: state.resources,
    };
    info!(
        style = %summary.style,
        items = summary.items,
        conditions = summary.conditions,
        resources = summary.resources,
        "export complete"
    );
    Ok(summary)
}

fn tagged<'a>(
    conds: &'a [ConditionDef],
    source: &'a str,
) -> impl Iterator<Item = ConditionDef> + 'a {
    conds.iter().cloned().map(move |mut cond| {
        cond.source.get_or_insert_with(|| source.to_owned());
        cond
    })
}

async fn select_style(ctx: Arc<ExportContext>) -> anyhow::Result<()> {
    let style = ctx.package.style(ctx.style.as_deref())?;
    let items = ctx.package.items_for(style)?;
    info!(style = %style.id, items = items.len(), "selected style");

    let mut state = ctx.state.lock().await;
    state.style = Some(style.id.clone());
    state.items = items.into_iter().cloned().collect();
    for (key, value) in &style.options {
        if CORE_OPTIONS.contains(&key.as_str()) {
            warn!(style = %style.id, option = %key, "style cannot set a reserved option");
            continue;
        }
        state.vbsp.options.insert(key.clone(), value.clone());
    }
    state.vbsp.options.insert("style_id".into(), Value::from(style.id.clone()));
    let source = format!("style:{}", style.id);
    state.vbsp.conditions.extend(tagged(&style.conditions, &source));
    Ok(())
}

async fn add_core_info(ctx: Arc<ExportContext>) -> anyhow::Result<()> {
    let mut state = ctx.state.lock().await;
    state.vbsp.options.insert("package_id".into(), Value::from(ctx.package.id.clone()));
    state.vbsp.options.insert("dev_mode".into(), Value::from(ctx.dev_mode));
    Ok(())
}

async fn collect_items(ctx: Arc<ExportContext>) -> anyhow::Result<()> {
    let mut guard = ctx.state.lock().await;
    let state = &mut *guard;
    for item in &state.items {
        state.editoritems.push(json!({"id": item.id, "editor": item.editor}));
        if !item.config.is_null() {
            state.configs.insert(item.id.clone(), item.config.clone());
        }
        let source = format!("item:{}", item.id);
        state.vbsp.conditions.extend(tagged(&item.conditions, &source));
    }
    debug!(items = state.items.len(), "collected items");
    Ok(())
}

async fn write_editoritems(ctx: Arc<ExportContext>) -> anyhow::Result<()> {
    let doc = {
        let state = ctx.state.lock().await;
        json!({"style": state.style, "items": state.editoritems})
    };
    write_json(&ctx.out_dir.join("editoritems.json"), &doc).await?;
    Ok(())
}

async fn write_configs(ctx: Arc<ExportContext>) -> anyhow::Result<()> {
    let configs = ctx.state.lock().await.configs.clone();
    for (id, config) in &configs {
        if !is_dir_name(id) {
            return Err(ExportError::BadItemId(id.clone()).into());
        }
        let path = ctx.out_dir.join("items").join(id).join("config.json");
        write_json(&path, config).await?;
    }
    Ok(())
}

async fn write_vbsp_config(ctx: Arc<ExportContext>) -> anyhow::Result<()> {
    let vbsp = ctx.state.lock().await.vbsp.clone();
    write_json(&ctx.out_dir.join("vbsp_config.json"), &vbsp).await?;
    Ok(())
}

async fn copy_resources(ctx: Arc<ExportContext>) -> anyhow::Result<()> {
    let dest_root = ctx.out_dir.join("resources");
    for rel in &ctx.package.resources {
        if !is_contained(rel) {
            return Err(ExportError::BadResourcePath(rel.clone()).into());
        }
        let src = ctx.package_dir.join(rel);
        let dest = dest_root.join(rel);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(ExportError::io(parent))?;
        }
        tokio::fs::copy(&src, &dest).await.map_err(ExportError::io(&src))?;
        debug!(file = %rel.display(), "copied resource");
    }
    ctx.state.lock().await.resources = ctx.package.resources.len();
    Ok(())
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(ExportError::io(parent))?;
    }
    let data = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(path, data).await.map_err(ExportError::io(path))?;
    debug!(path = %path.display(), "wrote file");
    Ok(())
}

fn is_dir_name(id: &str) -> bool {
    !id.is_empty() && !id.contains(['/', '\\']) && id != "." && id != ".."
}

fn is_contained(path: &Path) -> bool {
    path.components().next().is_some()
        && path.components().all(|c| matches!(c, Component::Normal(_)))
}
