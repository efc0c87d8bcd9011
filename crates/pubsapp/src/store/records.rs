use super::{file_stats, write_atomic, FileStats, RecordStore};
use crate::error::{PubsError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::debug;

const RECORD_EXT: &str = "yaml";

/// One YAML file per citekey inside a single directory.
pub struct FsRecordStore<T> {
    dir: PathBuf,
    _record: PhantomData<fn() -> T>,
}

impl<T> FsRecordStore<T> {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            _record: PhantomData,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, citekey: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", citekey, RECORD_EXT))
    }
}

impl<T: Serialize + DeserializeOwned> RecordStore<T> for FsRecordStore<T> {
    fn load(&self, citekey: &str) -> Result<Option<T>> {
        let path = self.record_path(citekey);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PubsError::Io(e)),
        };
        let record = serde_yaml::from_str(&content).map_err(PubsError::Yaml)?;
        Ok(Some(record))
    }

    fn save(&self, citekey: &str, record: &T) -> Result<()> {
        let path = self.record_path(citekey);
        let content = serde_yaml::to_string(record).map_err(PubsError::Yaml)?;
        write_atomic(&path, content.as_bytes())?;
        debug!(path = %path.display(), "record written");
        Ok(())
    }

    fn delete(&self, citekey: &str) -> Result<bool> {
        let path = self.record_path(citekey);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "record deleted");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(PubsError::Io(e)),
        }
    }

    fn exists(&self, citekey: &str) -> bool {
        self.record_path(citekey).is_file()
    }

    fn citekeys(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(PubsError::Io)? {
            let path = entry.map_err(PubsError::Io)?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                // Hidden files are in-flight temp writes.
                if !stem.starts_with('.') {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn stats(&self, citekey: &str) -> Result<Option<FileStats>> {
        file_stats(&self.record_path(citekey))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BibEntry, Fields, Metadata};
    use tempfile::TempDir;

    fn entry(key: &str) -> BibEntry {
        let mut fields = Fields::new();
        fields.insert("title".into(), serde_yaml::Value::String("T".into()));
        BibEntry::new(key, fields)
    }

    #[test]
    fn test_load_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let store: FsRecordStore<BibEntry> = FsRecordStore::new(dir.path().join("bib"));
        assert!(store.load("nope").unwrap().is_none());
        assert!(!store.exists("nope"));
    }

    #[test]
    fn test_save_load_delete() {
        let dir = TempDir::new().unwrap();
        let store: FsRecordStore<BibEntry> = FsRecordStore::new(dir.path().join("bib"));

        store.save("Doe2013", &entry("Doe2013")).unwrap();
        assert!(store.exists("Doe2013"));
        assert_eq!(store.load("Doe2013").unwrap(), Some(entry("Doe2013")));

        assert!(store.delete("Doe2013").unwrap());
        assert!(!store.delete("Doe2013").unwrap());
        assert!(store.load("Doe2013").unwrap().is_none());
    }

    #[test]
    fn test_citekeys_ignores_foreign_and_hidden_files() {
        let dir = TempDir::new().unwrap();
        let store: FsRecordStore<Metadata> = FsRecordStore::new(dir.path());

        store.save("b", &Metadata::default()).unwrap();
        store.save("a", &Metadata::default()).unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join(".c-123.tmp"), "x").unwrap();
        fs::write(dir.path().join(".hidden.yaml"), "x").unwrap();

        assert_eq!(store.citekeys().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_citekeys_of_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let store: FsRecordStore<Metadata> = FsRecordStore::new(dir.path().join("absent"));
        assert!(store.citekeys().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_record_is_yaml_error() {
        let dir = TempDir::new().unwrap();
        let store: FsRecordStore<BibEntry> = FsRecordStore::new(dir.path());
        fs::write(dir.path().join("bad.yaml"), "a: 1\nb: 2\n").unwrap();

        assert!(matches!(store.load("bad"), Err(PubsError::Yaml(_))));
    }
}
