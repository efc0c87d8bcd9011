//! # DataBroker
//!
//! The broker is the single source of truth for per-citekey storage. It composes
//! the four stores of [`crate::store`] into one API and knows nothing about
//! uniqueness policy or events; those belong to [`crate::repo::Repository`].
//!
//! ## Responsibilities
//!
//! - Read and write bibdata and metadata by citekey.
//! - Make the combined [`DataBroker::push`] all-or-nothing from the caller's view.
//! - Validate externally supplied bibliographic text ([`DataBroker::verify`]).
//! - Forward document and note operations to their stores.
//!
//! ## Initialization
//!
//! A repository root is initialized once. The `bib/` directory is the marker:
//! [`DataBroker::create`] refuses to run over it, [`DataBroker::open`] requires it.

use crate::citekey::check_citekey;
use crate::codec::{BibDecoder, YamlCodec};
use crate::error::{PubsError, Result};
use crate::model::{BibEntry, Metadata};
use crate::store::docs::FsDocStore;
use crate::store::notes::FsNoteStore;
use crate::store::records::FsRecordStore;
use crate::store::{BibStore, DocStore, FileStats, MetaStore, NoteStore};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const BIB_DIR: &str = "bib";
pub const META_DIR: &str = "meta";
pub const DOC_DIR: &str = "doc";
pub const NOTES_DIR: &str = "notes";

/// Where documents and notes live, relative to the repository root unless set.
#[derive(Debug, Clone)]
pub struct BrokerOptions {
    pub docsdir: Option<PathBuf>,
    pub notes_ext: String,
}

impl Default for BrokerOptions {
    fn default() -> Self {
        Self {
            docsdir: None,
            notes_ext: "txt".to_string(),
        }
    }
}

/// One row of [`DataBroker::listing`].
#[derive(Debug, Clone)]
pub struct ListingEntry {
    pub citekey: String,
    pub metadata: Metadata,
    pub bibentry: BibEntry,
    pub stats: Option<FileStats>,
}

pub struct DataBroker {
    root: PathBuf,
    bib: Box<dyn BibStore>,
    meta: Box<dyn MetaStore>,
    docs: Box<dyn DocStore>,
    notes: Box<dyn NoteStore>,
    decoder: Box<dyn BibDecoder>,
}

impl DataBroker {
    /// Composes arbitrary stores. The root is informational only.
    pub fn with_stores(
        root: impl Into<PathBuf>,
        bib: Box<dyn BibStore>,
        meta: Box<dyn MetaStore>,
        docs: Box<dyn DocStore>,
        notes: Box<dyn NoteStore>,
    ) -> Self {
        Self {
            root: root.into(),
            bib,
            meta,
            docs,
            notes,
            decoder: Box::new(YamlCodec),
        }
    }

    pub fn with_decoder(mut self, decoder: Box<dyn BibDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Filesystem stores under `root`, without checking initialization.
    pub fn at(root: &Path, options: &BrokerOptions) -> Self {
        let docsdir = options
            .docsdir
            .clone()
            .unwrap_or_else(|| root.join(DOC_DIR));
        Self::with_stores(
            root,
            Box::new(FsRecordStore::<BibEntry>::new(root.join(BIB_DIR))),
            Box::new(FsRecordStore::<Metadata>::new(root.join(META_DIR))),
            Box::new(FsDocStore::new(docsdir)),
            Box::new(FsNoteStore::new(root.join(NOTES_DIR)).with_ext(&options.notes_ext)),
        )
    }

    /// Initializes an empty repository at `root`.
    pub fn create(root: &Path, options: &BrokerOptions) -> Result<Self> {
        if Self::is_initialized(root) {
            return Err(PubsError::AlreadyExists(root.to_path_buf()));
        }
        let broker = Self::at(root, options);
        for dir in [
            root.join(BIB_DIR),
            root.join(META_DIR),
            root.join(NOTES_DIR),
            broker.docs.root().to_path_buf(),
        ] {
            fs::create_dir_all(&dir).map_err(PubsError::Io)?;
        }
        info!(root = %root.display(), "repository initialized");
        Ok(broker)
    }

    /// Opens an existing repository at `root`.
    pub fn open(root: &Path, options: &BrokerOptions) -> Result<Self> {
        if !Self::is_initialized(root) {
            return Err(PubsError::NotInitialized(root.to_path_buf()));
        }
        Ok(Self::at(root, options))
    }

    pub fn is_initialized(root: &Path) -> bool {
        root.join(BIB_DIR).is_dir()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn docsdir(&self) -> &Path {
        self.docs.root()
    }

    // --- Bibdata & Metadata ---

    pub fn pull_bibentry(&self, citekey: &str) -> Result<BibEntry> {
        self.bib
            .load(citekey)?
            .ok_or_else(|| PubsError::NotFound(citekey.to_string()))
    }

    /// Missing metadata reads as the default record.
    pub fn pull_metadata(&self, citekey: &str) -> Result<Metadata> {
        Ok(self.meta.load(citekey)?.unwrap_or_default())
    }

    pub fn push_bibentry(&self, citekey: &str, bibentry: &BibEntry) -> Result<()> {
        self.bib.save(citekey, bibentry)
    }

    pub fn push_metadata(&self, citekey: &str, metadata: &Metadata) -> Result<()> {
        self.meta.save(citekey, metadata)
    }

    /// Writes bibdata then metadata. If the metadata write fails, the bibdata
    /// record is restored to what it was before the call.
    pub fn push(&self, citekey: &str, metadata: &Metadata, bibentry: &BibEntry) -> Result<()> {
        let previous = self.bib.load(citekey)?;
        self.bib.save(citekey, bibentry)?;

        if let Err(err) = self.meta.save(citekey, metadata) {
            warn!(citekey, error = %err, "metadata write failed, restoring bibdata");
            let restored = match &previous {
                Some(entry) => self.bib.save(citekey, entry),
                None => self.bib.delete(citekey).map(|_| ()),
            };
            if let Err(rollback_err) = restored {
                warn!(citekey, error = %rollback_err, "bibdata rollback failed");
            }
            return Err(err);
        }

        debug!(citekey, "bibdata and metadata pushed");
        Ok(())
    }

    /// Deletes bibdata and metadata. Documents and notes are left alone.
    pub fn remove(&self, citekey: &str) -> Result<()> {
        self.bib.delete(citekey)?;
        self.meta.delete(citekey)?;
        debug!(citekey, "bibdata and metadata removed");
        Ok(())
    }

    pub fn exists(&self, citekey: &str, meta_check: bool) -> bool {
        self.bib.exists(citekey) && (!meta_check || self.meta.exists(citekey))
    }

    /// Keys known to the bib store, sorted.
    pub fn citekeys(&self) -> Result<Vec<String>> {
        self.bib.citekeys()
    }

    /// Bulk read. With `filestats`, each bibdata file is stat'ed.
    pub fn listing(&self, filestats: bool) -> Result<Vec<ListingEntry>> {
        let mut entries = Vec::new();
        for citekey in self.citekeys()? {
            let bibentry = self.pull_bibentry(&citekey)?;
            let metadata = self.pull_metadata(&citekey)?;
            let stats = if filestats {
                self.bib.stats(&citekey)?
            } else {
                None
            };
            entries.push(ListingEntry {
                citekey,
                metadata,
                bibentry,
                stats,
            });
        }
        Ok(entries)
    }

    /// Parses and checks raw bibliographic text without touching storage.
    pub fn verify(&self, raw: &str) -> Result<BibEntry> {
        let entry = self.decoder.decode(raw)?;
        check_citekey(entry.key()).map_err(|e| PubsError::Validation(e.to_string()))?;
        if entry.fields().is_empty() {
            return Err(PubsError::Validation(format!(
                "entry {} has no fields",
                entry.key()
            )));
        }
        Ok(entry)
    }

    // --- Documents ---

    pub fn in_docsdir(&self, docpath: &str) -> bool {
        self.docs.in_docsdir(docpath)
    }

    pub fn real_docpath(&self, docpath: &str) -> PathBuf {
        self.docs.real_docpath(docpath)
    }

    pub fn add_doc(&self, citekey: &str, source: &Path, overwrite: bool) -> Result<String> {
        self.docs.add_doc(citekey, source, overwrite)
    }

    pub fn remove_doc(&self, docpath: &str, silent: bool) -> Result<()> {
        self.docs.remove_doc(docpath, silent)
    }

    pub fn rename_doc(&self, docpath: &str, new_citekey: &str, overwrite: bool) -> Result<String> {
        self.docs.rename_doc(docpath, new_citekey, overwrite)
    }

    // --- Notes ---

    pub fn real_notepath(&self, citekey: &str) -> PathBuf {
        self.notes.real_notepath(citekey)
    }

    pub fn remove_note(&self, citekey: &str, silent: bool) -> Result<()> {
        self.notes.remove_note(citekey, silent)
    }

    pub fn rename_note(&self, old_citekey: &str, new_citekey: &str, overwrite: bool) -> Result<()> {
        self.notes.rename_note(old_citekey, new_citekey, overwrite)
    }
}
