// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Compiler preferences shared by the precompile and export commands.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Key the preferences are stored under.
pub const PREFS_KEY: &str = "compiler";

/// Saved preferences for the compiler.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CompilerPrefs {
    /// Treat unknown condition results as hard errors instead of warnings.
    pub dev_mode: bool,
    /// Directory the export phase writes into when no `--out` is given.
    pub export_dir: Option<PathBuf>,
}
