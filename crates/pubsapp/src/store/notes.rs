use super::{ensure_dir, NoteStore};
use crate::error::{PubsError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FsNoteStore {
    root: PathBuf,
    ext: String,
}

impl FsNoteStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ext: "txt".to_string(),
        }
    }

    /// Accepts the extension with or without its leading dot.
    pub fn with_ext(mut self, ext: &str) -> Self {
        self.ext = ext.trim_start_matches('.').to_string();
        self
    }

    pub fn ext(&self) -> &str {
        &self.ext
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl NoteStore for FsNoteStore {
    fn real_notepath(&self, citekey: &str) -> PathBuf {
        if self.ext.is_empty() {
            self.root.join(citekey)
        } else {
            self.root.join(format!("{}.{}", citekey, self.ext))
        }
    }

    fn remove_note(&self, citekey: &str, silent: bool) -> Result<()> {
        let path = self.real_notepath(citekey);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "note removed");
                Ok(())
            }
            Err(e) if silent && e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PubsError::Io(e)),
        }
    }

    fn rename_note(&self, old_citekey: &str, new_citekey: &str, overwrite: bool) -> Result<()> {
        let old_path = self.real_notepath(old_citekey);
        if !old_path.exists() {
            return Ok(());
        }
        let new_path = self.real_notepath(new_citekey);
        if new_path.exists() && !overwrite {
            return Err(PubsError::NoteCollision {
                citekey: new_citekey.to_string(),
                path: new_path,
            });
        }
        ensure_dir(&self.root)?;
        fs::rename(&old_path, &new_path).map_err(PubsError::Io)?;
        debug!(from = %old_path.display(), to = %new_path.display(), "note renamed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_notepath_uses_extension() {
        let store = FsNoteStore::new("/n").with_ext(".tex");
        assert_eq!(store.ext(), "tex");
        assert_eq!(store.real_notepath("Doe2013"), PathBuf::from("/n/Doe2013.tex"));
    }

    #[test]
    fn test_rename_moves_existing_note() {
        let dir = TempDir::new().unwrap();
        let store = FsNoteStore::new(dir.path());
        fs::write(store.real_notepath("old"), "my notes").unwrap();

        store.rename_note("old", "new", false).unwrap();

        assert!(!store.real_notepath("old").exists());
        assert_eq!(
            fs::read_to_string(store.real_notepath("new")).unwrap(),
            "my notes"
        );
    }

    #[test]
    fn test_rename_without_note_is_noop() {
        let dir = TempDir::new().unwrap();
        let store = FsNoteStore::new(dir.path());
        store.rename_note("old", "new", false).unwrap();
        assert!(!store.real_notepath("new").exists());
    }

    #[test]
    fn test_rename_onto_existing_note() {
        let dir = TempDir::new().unwrap();
        let store = FsNoteStore::new(dir.path());
        fs::write(store.real_notepath("old"), "mine").unwrap();
        fs::write(store.real_notepath("new"), "theirs").unwrap();

        match store.rename_note("old", "new", false) {
            Err(PubsError::NoteCollision { citekey, .. }) => assert_eq!(citekey, "new"),
            other => panic!("Expected NoteCollision, got {:?}", other),
        }
        assert_eq!(fs::read_to_string(store.real_notepath("old")).unwrap(), "mine");
        assert_eq!(fs::read_to_string(store.real_notepath("new")).unwrap(), "theirs");

        store.rename_note("old", "new", true).unwrap();
        assert!(!store.real_notepath("old").exists());
        assert_eq!(fs::read_to_string(store.real_notepath("new")).unwrap(), "mine");
    }

    #[test]
    fn test_remove_missing_note() {
        let dir = TempDir::new().unwrap();
        let store = FsNoteStore::new(dir.path());
        assert!(store.remove_note("k", true).is_ok());
        assert!(matches!(
            store.remove_note("k", false),
            Err(PubsError::Io(_))
        ));
    }
}
