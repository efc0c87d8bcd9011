//! # Configuration
//!
//! Settings are loaded with [`confique`] from, in priority order:
//! 1. **Environment variables**: `PUBS_DIR`, `PUBS_DOCSDIR`, `PUBS_NOTES_EXT`, `PUBS_EDIT_CMD`.
//! 2. **Config file**: `pubs.toml` in the OS config directory (via `directories`),
//!    or the file named by `PUBS_CONFIG`. A missing file is fine.
//! 3. **Compiled defaults**: `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `pubsdir` | `~/.pubs` | Repository root |
//! | `docsdir` | `<pubsdir>/doc` | Managed documents directory |
//! | `notes_ext` | `txt` | Extension of note files |
//! | `edit_cmd` | `""` | Editor command; empty falls back to `$EDITOR`, then `vi` |
//! | `import_copy` | `true` | Copy attached documents into `docsdir` |
//! | `import_move` | `false` | Move rather than copy (only when copying) |

use crate::broker::BrokerOptions;
use crate::error::{PubsError, Result};
use crate::repo::DocImport;
use confique::Config;
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "pubs.toml";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PubsConfig {
    /// Repository root. A leading `~` is expanded.
    #[config(default = "~/.pubs", env = "PUBS_DIR")]
    pub pubsdir: String,

    /// Managed documents directory; defaults to `<pubsdir>/doc`.
    #[config(env = "PUBS_DOCSDIR")]
    pub docsdir: Option<String>,

    #[config(default = "txt", env = "PUBS_NOTES_EXT")]
    pub notes_ext: String,

    #[config(default = "", env = "PUBS_EDIT_CMD")]
    pub edit_cmd: String,

    #[config(default = true)]
    pub import_copy: bool,

    #[config(default = false)]
    pub import_move: bool,
}

impl Default for PubsConfig {
    fn default() -> Self {
        Self {
            pubsdir: "~/.pubs".to_string(),
            docsdir: None,
            notes_ext: "txt".to_string(),
            edit_cmd: String::new(),
            import_copy: true,
            import_move: false,
        }
    }
}

impl PubsConfig {
    /// Loads environment overrides on top of `path` (if it exists) and defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = PubsConfig::builder().env();
        if let Some(path) = path {
            builder = builder.file(path);
        }
        builder
            .load()
            .map_err(|e| PubsError::Config(e.to_string()))
    }

    /// `PUBS_CONFIG`, else `<config dir>/pubs.toml`.
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("PUBS_CONFIG") {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("org", "pubs", "pubs").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    pub fn root(&self) -> PathBuf {
        expand_tilde(&self.pubsdir)
    }

    pub fn docsdir(&self) -> PathBuf {
        match &self.docsdir {
            Some(dir) => expand_tilde(dir),
            None => self.root().join(crate::broker::DOC_DIR),
        }
    }

    pub fn broker_options(&self) -> BrokerOptions {
        BrokerOptions {
            docsdir: Some(self.docsdir()),
            notes_ext: self.notes_ext.clone(),
        }
    }

    pub fn editor(&self) -> String {
        if !self.edit_cmd.trim().is_empty() {
            return self.edit_cmd.clone();
        }
        std::env::var("EDITOR")
            .ok()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| "vi".to_string())
    }

    /// How attached documents are imported by default.
    pub fn doc_import(&self) -> DocImport {
        match (self.import_copy, self.import_move) {
            (false, _) => DocImport::Link,
            (true, true) => DocImport::Move,
            (true, false) => DocImport::Copy,
        }
    }
}

/// Expands a leading `~` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let home = || BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
    if path == "~" {
        if let Some(home) = home() {
            return home;
        }
    } else if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = PubsConfig::default();
        assert_eq!(config.pubsdir, "~/.pubs");
        assert_eq!(config.notes_ext, "txt");
        assert_eq!(config.doc_import(), DocImport::Copy);
    }

    #[test]
    fn test_docsdir_defaults_under_root() {
        let config = PubsConfig {
            pubsdir: "/data/pubs".to_string(),
            ..Default::default()
        };
        assert_eq!(config.root(), PathBuf::from("/data/pubs"));
        assert_eq!(config.docsdir(), PathBuf::from("/data/pubs/doc"));

        let config = PubsConfig {
            docsdir: Some("/library".to_string()),
            ..config
        };
        assert_eq!(config.docsdir(), PathBuf::from("/library"));
        assert_eq!(
            config.broker_options().docsdir,
            Some(PathBuf::from("/library"))
        );
    }

    #[test]
    fn test_doc_import_modes() {
        let mut config = PubsConfig::default();
        config.import_move = true;
        assert_eq!(config.doc_import(), DocImport::Move);
        config.import_copy = false;
        assert_eq!(config.doc_import(), DocImport::Link);
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_tilde("rel"), PathBuf::from("rel"));
        if let Some(dirs) = BaseDirs::new() {
            assert_eq!(expand_tilde("~/x"), dirs.home_dir().join("x"));
            assert_eq!(expand_tilde("~"), dirs.home_dir());
        }
    }

    #[test]
    fn test_explicit_edit_cmd_wins() {
        let config = PubsConfig {
            edit_cmd: "nano -w".to_string(),
            ..Default::default()
        };
        assert_eq!(config.editor(), "nano -w");
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "import_copy = false\n").unwrap();

        let config = PubsConfig::load(Some(&path)).unwrap();
        assert!(!config.import_copy);
        assert_eq!(config.doc_import(), DocImport::Link);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = PubsConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert!(config.import_copy);
        assert!(!config.import_move);
    }

    #[test]
    fn test_load_malformed_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "import_copy = \"maybe\"\n").unwrap();

        assert!(matches!(
            PubsConfig::load(Some(&path)),
            Err(PubsError::Config(_))
        ));
    }
}
