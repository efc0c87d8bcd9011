//! # Repository
//!
//! The repository is the entry point for every paper operation, whatever the UI.
//! It wraps a [`DataBroker`] and adds the policy the broker deliberately lacks:
//!
//! - **Uniqueness**: a citekey names at most one paper. Creating or renaming onto
//!   a taken key fails with [`PubsError::CiteKeyCollision`] unless `overwrite`.
//! - **Key generation**: [`Repository::unique_citekey`] appends `a`, `b`, …, `z`,
//!   `aa`, … until the key is free.
//! - **Cross-store rename**: bibdata, metadata, the owned document and the note
//!   follow a paper to its new key.
//! - **Events**: observers hear about additions, removals and renames.
//!
//! ## Rename Procedure
//!
//! ```text
//!   1. push bibdata + metadata under the new key
//!   2. rename the owned document, rewrite metadata.docfile
//!   3. rename the note
//!   4. remove bibdata + metadata under the old key
//!   5. publish Rename
//! ```
//!
//! New-key writes land before anything under the old key is deleted. A failure
//! in steps 2 to 4 is returned as is: the old entry survives, step 1 is not
//! undone, and the paper may briefly exist under both keys.
//!
//! ## Outcomes Instead of Prompts
//!
//! Operations that take user-supplied text ([`Repository::import_raw`],
//! [`Repository::edit_bibentry`], [`Repository::edit_metadata`]) report the
//! recoverable cases as [`PushOutcome`] variants so callers branch on a value.
//! Storage failures still come back as `Err`.

use crate::broker::{BrokerOptions, DataBroker, ListingEntry};
use crate::citekey::{candidates, check_citekey};
use crate::codec::YamlCodec;
use crate::error::{PubsError, Result};
use crate::events::{EventBus, RepoEvent, RepoObserver};
use crate::model::{Metadata, Paper};
use std::fs;
use std::path::Path;
use tracing::info;

/// How [`Repository::push_doc`] attaches a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocImport {
    /// Store an owned copy in the documents directory.
    Copy,
    /// Store an owned copy and delete the source.
    Move,
    /// Record the source's absolute path; the repository does not own it.
    Link,
}

/// Result of a push from user-supplied text.
#[derive(Debug, Clone, PartialEq)]
pub enum PushOutcome {
    /// The paper was written; carries it as stored.
    Stored(Paper),
    /// The citekey is taken and `overwrite` was not requested.
    Collision(String),
    /// The text did not decode, or the citekey is not valid.
    ValidationFailed(String),
}

impl PushOutcome {
    /// Folds the recoverable errors of a push into variants.
    pub fn from_result(result: Result<Paper>) -> Result<Self> {
        match result {
            Ok(paper) => Ok(PushOutcome::Stored(paper)),
            Err(PubsError::CiteKeyCollision(citekey)) => Ok(PushOutcome::Collision(citekey)),
            Err(PubsError::Validation(reason)) => Ok(PushOutcome::ValidationFailed(reason)),
            Err(err @ PubsError::InvalidCiteKey { .. }) => {
                Ok(PushOutcome::ValidationFailed(err.to_string()))
            }
            Err(err) => Err(err),
        }
    }

    pub fn paper(&self) -> Option<&Paper> {
        match self {
            PushOutcome::Stored(paper) => Some(paper),
            _ => None,
        }
    }
}

pub struct Repository {
    broker: DataBroker,
    bus: EventBus,
}

impl Repository {
    pub fn new(broker: DataBroker, observers: Vec<Box<dyn RepoObserver>>) -> Self {
        Self {
            broker,
            bus: EventBus::new(observers),
        }
    }

    /// Initializes a new repository at `root`.
    pub fn create(root: &Path, options: &BrokerOptions) -> Result<Self> {
        Ok(Self::new(DataBroker::create(root, options)?, Vec::new()))
    }

    pub fn open(root: &Path, options: &BrokerOptions) -> Result<Self> {
        Ok(Self::new(DataBroker::open(root, options)?, Vec::new()))
    }

    /// Adds an observer. Register observers before the first operation.
    pub fn register(&mut self, observer: Box<dyn RepoObserver>) {
        self.bus.register(observer);
    }

    pub fn with_observer(mut self, observer: Box<dyn RepoObserver>) -> Self {
        self.register(observer);
        self
    }

    pub fn databroker(&self) -> &DataBroker {
        &self.broker
    }

    // --- Reads ---

    /// True iff bibdata exists for `citekey`.
    pub fn contains(&self, citekey: &str) -> bool {
        self.broker.exists(citekey, false)
    }

    pub fn citekeys(&self) -> Result<Vec<String>> {
        self.broker.citekeys()
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.citekeys()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn pull_paper(&self, citekey: &str) -> Result<Paper> {
        let bibentry = match self.broker.pull_bibentry(citekey) {
            Ok(entry) => entry,
            Err(PubsError::NotFound(key)) => return Err(PubsError::InvalidReference(key)),
            Err(err) => return Err(err),
        };
        let metadata = self.broker.pull_metadata(citekey)?;
        Ok(Paper::from_bibentry(bibentry, Some(citekey.to_string())).with_metadata(metadata))
    }

    /// Same as [`Repository::pull_paper`]; the name plugins use.
    pub fn get_paper(&self, citekey: &str) -> Result<Paper> {
        self.pull_paper(citekey)
    }

    /// Every paper, in citekey order.
    pub fn papers(&self) -> Result<Vec<Paper>> {
        Ok(self
            .broker
            .listing(false)?
            .into_iter()
            .map(|row| {
                Paper::from_bibentry(row.bibentry, Some(row.citekey)).with_metadata(row.metadata)
            })
            .collect())
    }

    pub fn listing(&self, filestats: bool) -> Result<Vec<ListingEntry>> {
        self.broker.listing(filestats)
    }

    /// `base` if it is free, else the first free `base + suffix`.
    pub fn unique_citekey(&self, base: &str) -> String {
        if !self.contains(base) {
            return base.to_string();
        }
        // The candidate sequence is unbounded, so `find` only returns with a free key.
        candidates(base)
            .find(|candidate| !self.contains(candidate))
            .unwrap_or_default()
    }

    // --- Writes ---

    /// Stores `paper`. Publishes `Add` only when the citekey is new.
    pub fn push_paper(&mut self, paper: Paper, overwrite: bool) -> Result<Paper> {
        check_citekey(paper.citekey())?;
        let existed = self.contains(paper.citekey());
        if existed && !overwrite {
            return Err(PubsError::CiteKeyCollision(paper.citekey().to_string()));
        }

        self.broker
            .push(paper.citekey(), paper.metadata(), paper.bibentry())?;

        if existed {
            info!(citekey = paper.citekey(), "paper updated");
        } else {
            info!(citekey = paper.citekey(), "paper added");
            self.bus.publish(&RepoEvent::Add {
                citekey: paper.citekey().to_string(),
                paper: paper.clone(),
            })?;
        }
        Ok(paper)
    }

    /// Moves `paper` and everything attached to it to `new_citekey`.
    ///
    /// Without `overwrite`, an existing document or note under the new key is
    /// a collision; with it, both are replaced.
    pub fn rename_paper(
        &mut self,
        paper: &Paper,
        new_citekey: &str,
        overwrite: bool,
    ) -> Result<Paper> {
        let old_citekey = paper.citekey().to_string();
        if new_citekey == old_citekey {
            return Ok(paper.clone());
        }
        check_citekey(new_citekey)?;
        if !self.contains(&old_citekey) {
            return Err(PubsError::InvalidReference(old_citekey));
        }
        if self.contains(new_citekey) && !overwrite {
            return Err(PubsError::CiteKeyCollision(new_citekey.to_string()));
        }

        let mut renamed = paper.clone();
        renamed.set_citekey(new_citekey);
        self.broker
            .push(new_citekey, renamed.metadata(), renamed.bibentry())?;

        if let Some(docfile) = renamed.docfile().map(str::to_string) {
            if self.broker.in_docsdir(&docfile) {
                let new_docfile = self.broker.rename_doc(&docfile, new_citekey, overwrite)?;
                renamed.set_docfile(Some(new_docfile));
                self.broker.push_metadata(new_citekey, renamed.metadata())?;
            }
        }

        self.broker.rename_note(&old_citekey, new_citekey, overwrite)?;
        self.broker.remove(&old_citekey)?;
        info!(from = %old_citekey, to = new_citekey, "paper renamed");

        self.bus.publish(&RepoEvent::Rename {
            old_citekey,
            paper: renamed.clone(),
        })?;
        Ok(renamed)
    }

    /// Deletes the paper's records and owned document, then publishes `Remove`.
    ///
    /// Notes are left to observers such as [`crate::events::NoteJanitor`].
    pub fn remove_paper(&mut self, citekey: &str) -> Result<Paper> {
        let paper = self.pull_paper(citekey)?;
        if let Some(docfile) = paper.docfile() {
            if self.broker.in_docsdir(docfile) {
                self.broker.remove_doc(docfile, true)?;
            }
        }
        self.broker.remove(citekey)?;
        info!(citekey, "paper removed");

        self.bus.publish(&RepoEvent::Remove {
            citekey: citekey.to_string(),
            paper: paper.clone(),
        })?;
        Ok(paper)
    }

    /// Attaches `source` to an existing paper and returns the updated paper.
    ///
    /// A previously owned document with a different file name is deleted.
    pub fn push_doc(&mut self, citekey: &str, source: &Path, mode: DocImport) -> Result<Paper> {
        let mut paper = self.pull_paper(citekey)?;

        let docfile = match mode {
            DocImport::Copy => self.broker.add_doc(citekey, source, false)?,
            DocImport::Move => {
                let docfile = self.broker.add_doc(citekey, source, false)?;
                fs::remove_file(source)?;
                docfile
            }
            DocImport::Link => match source.canonicalize() {
                Ok(path) => path.display().to_string(),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(PubsError::DocNotFound(source.to_path_buf()));
                }
                Err(e) => return Err(PubsError::Io(e)),
            },
        };

        if let Some(previous) = paper.docfile() {
            let replaced = self.broker.real_docpath(previous) != self.broker.real_docpath(&docfile);
            if replaced && self.broker.in_docsdir(previous) {
                self.broker.remove_doc(previous, true)?;
            }
        }

        info!(citekey, docfile = %docfile, mode = ?mode, "document attached");
        paper.set_docfile(Some(docfile));
        self.push_paper(paper, true)
    }

    /// Verifies raw bibliographic text and stores it as a new paper.
    ///
    /// Without an explicit `citekey`, the record's own key is made unique.
    pub fn import_raw(
        &mut self,
        raw: &str,
        citekey: Option<&str>,
        metadata: Metadata,
    ) -> Result<PushOutcome> {
        let entry = match self.broker.verify(raw) {
            Ok(entry) => entry,
            Err(PubsError::Validation(reason)) => return Ok(PushOutcome::ValidationFailed(reason)),
            Err(err) => return Err(err),
        };
        let citekey = match citekey {
            Some(key) => key.to_string(),
            None => self.unique_citekey(entry.key()),
        };
        let paper = Paper::from_bibentry(entry, Some(citekey)).with_metadata(metadata);
        PushOutcome::from_result(self.push_paper(paper, false))
    }

    /// Replaces a paper's bibdata with edited text. A changed key renames the paper.
    pub fn edit_bibentry(&mut self, citekey: &str, raw: &str) -> Result<PushOutcome> {
        let current = self.pull_paper(citekey)?;
        let entry = match self.broker.verify(raw) {
            Ok(entry) => entry,
            Err(PubsError::Validation(reason)) => return Ok(PushOutcome::ValidationFailed(reason)),
            Err(err) => return Err(err),
        };

        let new_citekey = entry.key().to_string();
        let edited = Paper::from_bibentry(entry, Some(citekey.to_string()))
            .with_metadata(current.metadata().clone());

        if new_citekey == citekey {
            PushOutcome::from_result(self.push_paper(edited, true))
        } else {
            PushOutcome::from_result(self.rename_paper(&edited, &new_citekey, false))
        }
    }

    /// Replaces a paper's metadata with edited YAML text.
    pub fn edit_metadata(&mut self, citekey: &str, raw: &str) -> Result<PushOutcome> {
        let mut paper = self.pull_paper(citekey)?;
        let metadata = match YamlCodec.decode_metadata(raw) {
            Ok(metadata) => metadata,
            Err(PubsError::Validation(reason)) => return Ok(PushOutcome::ValidationFailed(reason)),
            Err(err) => return Err(err),
        };
        *paper.metadata_mut() = metadata;
        PushOutcome::from_result(self.push_paper(paper, true))
    }
}
