// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Filesystem-backed `ConfigStore` for the compiler tools (uses platform config dir).

use bee_app_core::config::{ConfigError, ConfigStore};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

/// Store configs as JSON files under the platform config directory.
#[derive(Debug, Clone)]
pub struct FsConfigStore {
    base: PathBuf,
}

impl FsConfigStore {
    /// Create a store rooted at the user config directory (e.g., `~/.config/beecomp`).
    pub fn new() -> Result<Self, ConfigError> {
        let proj = ProjectDirs::from("dev", "flyingrobots", "beecomp")
            .ok_or_else(|| ConfigError::Other("could not resolve config dir".into()))?;
        Self::at(proj.config_dir())
    }

    /// Create a store rooted at `base`, creating the directory if needed.
    pub fn at(base: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let base = base.as_ref().to_path_buf();
        fs::create_dir_all(&base)?;
        Ok(Self { base })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base.join(format!("{key}.json"))
    }
}

impl ConfigStore for FsConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        let path = self.path_for(key);
        match fs::read(path) {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(ConfigError::NotFound),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let path = self.path_for(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use bee_app_core::config::ConfigService;
    use bee_app_core::config_port::ConfigPort;
    use bee_app_core::prefs::CompilerPrefs;

    #[test]
    fn prefs_land_in_a_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsConfigStore::at(dir.path().join("nested")).unwrap();
        let service = ConfigService::new(store);
        assert!(service.load_prefs().is_none());

        let prefs = CompilerPrefs {
            dev_mode: true,
            export_dir: None,
        };
        service.save_prefs(&prefs);
        assert!(dir.path().join("nested/compiler.json").is_file());
        assert_eq!(service.load_prefs(), Some(prefs));
    }

    #[test]
    fn missing_key_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsConfigStore::at(dir.path()).unwrap();
        assert!(matches!(store.load_raw("nope"), Err(ConfigError::NotFound)));
    }
}
