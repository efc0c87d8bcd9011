//! # Storage Layer
//!
//! Four narrow stores, each addressed by citekey, composed by
//! [`crate::broker::DataBroker`]:
//!
//! - [`BibStore`]: one normalized bibliographic record per key.
//! - [`MetaStore`]: one metadata record per key. Absence is not an error.
//! - [`DocStore`]: document files under the managed documents directory.
//! - [`NoteStore`]: note paths. The core only computes, moves and deletes them;
//!   their content belongs to observers.
//!
//! ## Storage Layout
//!
//! ```text
//! <pubsdir>/
//! ├── bib/<citekey>.yaml      # BibStore
//! ├── meta/<citekey>.yaml     # MetaStore
//! ├── doc/<citekey>.<ext>     # DocStore (relocatable via `docsdir`)
//! └── notes/<citekey>.<ext>   # NoteStore
//! ```
//!
//! ## Write Discipline
//!
//! Every single-file write goes through [`write_atomic`]: the content is written
//! to a hidden `.tmp` sibling and renamed over the target, so a reader never sees
//! a half-written record. Multi-file consistency is the broker's concern.
//!
//! ## Implementations
//!
//! - [`records::FsRecordStore`]: YAML files, production.
//! - [`mem::MemRecordStore`]: in-memory, for exercising broker and repository
//!   logic, including simulated write failures.
//! - [`docs::FsDocStore`], [`notes::FsNoteStore`]: filesystem only.

use crate::error::{PubsError, Result};
use crate::model::{BibEntry, Metadata};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub mod docs;
pub mod mem;
pub mod notes;
pub mod records;

/// File statistics for listings. Gathering them costs a `stat` per record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStats {
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Keyed record persistence shared by the bibdata and metadata stores.
pub trait RecordStore<T> {
    /// Returns `Ok(None)` if no record is stored under `citekey`.
    fn load(&self, citekey: &str) -> Result<Option<T>>;

    /// Create or replace. MUST be atomic per record.
    fn save(&self, citekey: &str, record: &T) -> Result<()>;

    /// Returns whether a record was present.
    fn delete(&self, citekey: &str) -> Result<bool>;

    fn exists(&self, citekey: &str) -> bool;

    /// All stored keys, sorted.
    fn citekeys(&self) -> Result<Vec<String>>;

    fn stats(&self, citekey: &str) -> Result<Option<FileStats>>;
}

pub trait BibStore: RecordStore<BibEntry> {}
impl<S: RecordStore<BibEntry>> BibStore for S {}

pub trait MetaStore: RecordStore<Metadata> {}
impl<S: RecordStore<Metadata>> MetaStore for S {}

/// Documents attached to papers.
///
/// References are the strings kept in `Metadata::docfile`; see
/// [`docs::DocRef`] for how they are interpreted.
pub trait DocStore {
    /// The managed documents directory.
    fn root(&self) -> &Path;

    /// True if the reference points at a document owned by the repository.
    fn in_docsdir(&self, docpath: &str) -> bool;

    /// Absolute location of a reference.
    fn real_docpath(&self, docpath: &str) -> PathBuf;

    /// Copies `source` into the documents directory as `<citekey>.<ext>` and
    /// returns the new reference.
    fn add_doc(&self, citekey: &str, source: &Path, overwrite: bool) -> Result<String>;

    /// Deletes an owned document. Anything else fails with
    /// [`PubsError::ExternalDoc`] unless `silent`, in which case it is skipped.
    /// With `silent`, a missing file is not an error either.
    fn remove_doc(&self, docpath: &str, silent: bool) -> Result<()>;

    /// Renames an owned document after `new_citekey`, returning the new reference.
    /// An existing document at the target is a [`PubsError::DocCollision`]
    /// unless `overwrite`.
    fn rename_doc(&self, docpath: &str, new_citekey: &str, overwrite: bool) -> Result<String>;
}

pub trait NoteStore {
    /// Pure path computation; the file may not exist.
    fn real_notepath(&self, citekey: &str) -> PathBuf;

    fn remove_note(&self, citekey: &str, silent: bool) -> Result<()>;

    /// Moves the note if there is one. A missing note is not an error.
    /// An existing note under `new_citekey` is a [`PubsError::NoteCollision`]
    /// unless `overwrite`, in which case it is replaced.
    fn rename_note(&self, old_citekey: &str, new_citekey: &str, overwrite: bool) -> Result<()>;
}

pub(crate) fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(PubsError::Io)?;
    }
    Ok(())
}

/// Writes `content` to a temp sibling of `target`, then renames it into place.
pub(crate) fn write_atomic(target: &Path, content: &[u8]) -> Result<()> {
    let dir = target
        .parent()
        .ok_or_else(|| PubsError::Store(format!("no parent for {}", target.display())))?;
    ensure_dir(dir)?;

    let stem = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = dir.join(format!(".{}-{}.tmp", stem, Uuid::new_v4()));
    fs::write(&tmp, content).map_err(PubsError::Io)?;
    if let Err(e) = fs::rename(&tmp, target) {
        let _ = fs::remove_file(&tmp);
        return Err(PubsError::Io(e));
    }
    Ok(())
}

pub(crate) fn file_stats(path: &Path) -> Result<Option<FileStats>> {
    match fs::metadata(path) {
        Ok(meta) => Ok(Some(FileStats {
            size: meta.len(),
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
        })),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PubsError::Io(e)),
    }
}
