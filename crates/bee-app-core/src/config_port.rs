// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Prefs port shared across the compiler commands.

use tracing::warn;

use crate::config::{ConfigService, ConfigStore};
use crate::prefs::{CompilerPrefs, PREFS_KEY};

/// Config-facing port for loading/saving compiler preferences.
pub trait ConfigPort {
    /// Load compiler preferences (returns None if missing or unreadable).
    fn load_prefs(&self) -> Option<CompilerPrefs>;
    /// Persist compiler preferences (best-effort; failures are logged).
    fn save_prefs(&self, prefs: &CompilerPrefs);
}

impl<S: ConfigStore> ConfigPort for ConfigService<S> {
    fn load_prefs(&self) -> Option<CompilerPrefs> {
        match self.load(PREFS_KEY) {
            Ok(prefs) => prefs,
            Err(err) => {
                warn!(error = %err, "ignoring unreadable compiler prefs");
                None
            }
        }
    }

    fn save_prefs(&self, prefs: &CompilerPrefs) {
        if let Err(err) = self.save(PREFS_KEY, prefs) {
            warn!(error = %err, "failed to save compiler prefs");
        }
    }
}
