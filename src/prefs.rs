use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::viewstate::ViewMode;

/// Persisted view preferences. These survive across files and
/// sessions; everything else resets with the table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Prefs {
    /// Header names the user chose to show, intersected with the
    /// loaded headers on every file load.
    #[serde(default)]
    pub visible_headers: Option<Vec<String>>,
    /// "form" or "table".
    #[serde(default)]
    pub view_mode: Option<String>,
    /// Outcome of the install card, once answered ("accepted" or
    /// "dismissed").
    #[serde(default)]
    pub install_choice: Option<String>,
}

/// Typed preference store backed by a TOML file in the user's config
/// directory. When no config directory is available (or the file is
/// unreadable) the store degrades to in-memory only; reads and writes
/// keep working, nothing persists, nothing fails.
pub struct PrefStore {
    path: Option<PathBuf>,
    pub prefs: Prefs,
}

impl PrefStore {
    pub fn load() -> Self {
        let path = dirs::config_dir().map(|d| d.join("recview").join("prefs.toml"));
        Self::open(path)
    }

    pub fn open(path: Option<PathBuf>) -> Self {
        let prefs = match &path {
            Some(p) => match fs::read_to_string(p) {
                Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                    warn!(error = %e, "malformed preference file, starting fresh");
                    Prefs::default()
                }),
                Err(_) => Prefs::default(),
            },
            None => Prefs::default(),
        };
        Self { path, prefs }
    }

    /// Write preferences out. Storage failures are logged and
    /// swallowed; the in-memory copy stays authoritative.
    pub fn save(&self) {
        let Some(path) = &self.path else { return };
        let content = match toml::to_string_pretty(&self.prefs) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "failed to serialize preferences");
                return;
            }
        };
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!(error = %e, "failed to create preference directory");
                return;
            }
        }
        if let Err(e) = fs::write(path, content) {
            warn!(error = %e, "failed to write preferences");
        }
    }

    pub fn view_mode(&self) -> ViewMode {
        self.prefs
            .view_mode
            .as_deref()
            .and_then(ViewMode::from_str)
            .unwrap_or_default()
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.prefs.view_mode = Some(mode.as_str().to_string());
        self.save();
    }

    pub fn set_visible_headers(&mut self, names: Vec<String>) {
        self.prefs.visible_headers = Some(names);
        self.save();
    }

    pub fn set_install_choice(&mut self, choice: &str) {
        self.prefs.install_choice = Some(choice.to_string());
        self.save();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.toml");

        let mut store = PrefStore::open(Some(path.clone()));
        store.set_view_mode(ViewMode::Table);
        store.set_visible_headers(vec!["Name".into(), "Age".into()]);

        let store = PrefStore::open(Some(path));
        assert_eq!(store.view_mode(), ViewMode::Table);
        assert_eq!(
            store.prefs.visible_headers.as_deref(),
            Some(["Name".to_string(), "Age".to_string()].as_slice())
        );
    }

    #[test]
    fn test_missing_file_defaults() {
        let dir = TempDir::new().unwrap();
        let store = PrefStore::open(Some(dir.path().join("nope.toml")));
        assert_eq!(store.view_mode(), ViewMode::Form);
        assert!(store.prefs.visible_headers.is_none());
    }

    #[test]
    fn test_malformed_file_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prefs.toml");
        std::fs::write(&path, "not [ valid { toml").unwrap();
        let store = PrefStore::open(Some(path));
        assert!(store.prefs.view_mode.is_none());
    }

    #[test]
    fn test_in_memory_fallback() {
        let mut store = PrefStore::open(None);
        store.set_view_mode(ViewMode::Table);
        // nothing persisted, but the in-memory value holds
        assert_eq!(store.view_mode(), ViewMode::Table);
    }
}
