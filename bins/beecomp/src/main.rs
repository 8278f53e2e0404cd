// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! beecomp
//!
//! Command-line front end for the puzzle map compiler.
//!
//! - `export` turns a package into the configuration tree.
//! - `precomp` runs the condition engine over a map, linking item chains.
//!
//! A level the author must fix produces `error.json` next to the output
//! and exit code 2.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use bee_app_core::config::ConfigService;
use bee_app_core::config_port::ConfigPort;
use bee_app_core::prefs::CompilerPrefs;
use bee_config_fs::FsConfigStore;
use bee_export::{ExportContext, Package};
use bee_precomp::{CompileContext, ConditionError, Conditions, Map};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Exit code for errors in the level itself.
const USER_ERROR: u8 = 2;

#[derive(Parser, Debug)]
#[command(author, version, about = "Puzzle map compiler")]
struct Args {
    /// Directory holding compiler prefs (defaults to the platform config dir)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,
    /// Treat unknown condition results as errors (also set by prefs)
    #[arg(long, global = true)]
    dev: bool,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run conditions over a map and link item chains
    Precomp {
        /// Input map (JSON)
        #[arg(long)]
        map: PathBuf,
        /// Conditions written by `export`
        #[arg(long)]
        conditions: PathBuf,
        /// Where to write the compiled map
        #[arg(long)]
        out: PathBuf,
    },
    /// Export a package into the configuration tree
    Export {
        /// Package definition (JSON); resources are relative to its directory
        #[arg(long)]
        package: PathBuf,
        /// Output directory (defaults to the last one used)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Style to export instead of the package default
        #[arg(long)]
        style: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let store = match &args.config_dir {
        Some(dir) => FsConfigStore::at(dir)?,
        None => FsConfigStore::new()?,
    };
    let config = ConfigService::new(store);
    let prefs = config.load_prefs().unwrap_or_default();
    let dev_mode = args.dev || prefs.dev_mode;

    match args.cmd {
        Command::Precomp { map, conditions, out } => precomp(&map, &conditions, &out, dev_mode),
        Command::Export { package, out, style } => {
            let out = out
                .or_else(|| prefs.export_dir.clone())
                .context("no --out given and no export_dir saved in prefs")?;
            export(&package, &out, style, dev_mode).await?;
            if prefs.export_dir.as_deref() != Some(out.as_path()) {
                config.save_prefs(&CompilerPrefs {
                    export_dir: Some(out),
                    ..prefs
                });
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn precomp(map: &Path, conditions: &Path, out: &Path, dev_mode: bool) -> Result<ExitCode> {
    let level = Map::load(map).with_context(|| format!("reading map {}", map.display()))?;
    let conds = Conditions::from_path(conditions, dev_mode)
        .with_context(|| format!("loading conditions from {}", conditions.display()))?;
    info!(
        instances = level.instances.len(),
        conditions = conds.iter().count(),
        "precompiling map"
    );

    let mut ctx = CompileContext::new(level);
    match conds.check_all(&mut ctx) {
        Ok(()) => {}
        Err(ConditionError::User(err)) => {
            let path = out.with_file_name("error.json");
            std::fs::write(&path, err.to_json()?)
                .with_context(|| format!("writing {}", path.display()))?;
            error!(kind = %err.kind, path = %path.display(), "the map has errors");
            return Ok(ExitCode::from(USER_ERROR));
        }
        Err(err) => return Err(err.into()),
    }

    let files = ctx.all_inst.len();
    let compiled = ctx.finish();
    compiled.save(out).with_context(|| format!("writing {}", out.display()))?;
    info!(instances = compiled.instances.len(), files, out = %out.display(), "map compiled");
    Ok(ExitCode::SUCCESS)
}

async fn export(package: &Path, out: &Path, style: Option<String>, dev_mode: bool) -> Result<()> {
    let pack = Package::load(package).await?;
    let package_dir = package.parent().map(Path::to_path_buf).unwrap_or_default();
    let ctx = ExportContext::new(pack, package_dir, out)
        .with_style(style)
        .with_dev_mode(dev_mode);
    bee_export::export(ctx).await?;
    Ok(())
}
