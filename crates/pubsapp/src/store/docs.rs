//! # Document References
//!
//! `Metadata::docfile` is a plain string. [`DocRef::parse`] gives it meaning
//! relative to the managed documents directory:
//!
//! | reference                          | kind     | owned |
//! |------------------------------------|----------|-------|
//! | `docsdir://Doe2013.pdf`            | `Owned`  | yes   |
//! | `Doe2013.pdf` (relative)           | `Owned`  | yes   |
//! | `/home/me/pubs/doc/Doe2013.pdf`    | `Owned`  | yes, when under docsdir |
//! | `/home/me/papers/doe.pdf`          | `Linked` | no    |
//! | `https://arxiv.org/pdf/1234.pdf`   | `Url`    | no    |
//! | `docsdir://../x.pdf`, `../x.pdf`   | `Linked` | no    |
//!
//! An owned name must stay inside docsdir: any `..`, root or prefix component
//! turns the reference into a `Linked` path. Only owned documents are renamed
//! or deleted along with their paper; the store refuses to delete anything else.

use super::{ensure_dir, DocStore};
use crate::error::{PubsError, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

pub const DOCSDIR_SCHEME: &str = "docsdir://";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocRef {
    /// Path relative to the documents directory.
    Owned(String),
    Linked(PathBuf),
    Url(String),
}

impl DocRef {
    pub fn parse(reference: &str, docsdir: &Path) -> DocRef {
        if let Some(name) = reference.strip_prefix(DOCSDIR_SCHEME) {
            return Self::owned_or_linked(name, docsdir);
        }
        if reference.contains("://") {
            return DocRef::Url(reference.to_string());
        }

        let path = Path::new(reference);
        if !path.is_absolute() {
            return Self::owned_or_linked(reference, docsdir);
        }
        match path.strip_prefix(docsdir) {
            Ok(rel) if !rel.as_os_str().is_empty() && stays_inside(rel) => {
                DocRef::Owned(rel.to_string_lossy().into_owned())
            }
            _ => DocRef::Linked(path.to_path_buf()),
        }
    }

    fn owned_or_linked(name: &str, docsdir: &Path) -> DocRef {
        let rel = Path::new(name);
        if !name.is_empty() && stays_inside(rel) {
            DocRef::Owned(name.to_string())
        } else {
            DocRef::Linked(docsdir.join(rel))
        }
    }

    pub fn is_owned(&self) -> bool {
        matches!(self, DocRef::Owned(_))
    }

    /// The string stored in metadata.
    pub fn to_reference(&self) -> String {
        match self {
            DocRef::Owned(name) => format!("{}{}", DOCSDIR_SCHEME, name),
            DocRef::Linked(path) => path.display().to_string(),
            DocRef::Url(url) => url.clone(),
        }
    }
}

/// True if joining `rel` onto a directory cannot leave that directory.
fn stays_inside(rel: &Path) -> bool {
    rel.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

pub struct FsDocStore {
    root: PathBuf,
}

impl FsDocStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<citekey>.<ext>`, with the extension taken from `source`.
    fn doc_filename(citekey: &str, source: &Path) -> String {
        match source.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}.{}", citekey, ext),
            None => citekey.to_string(),
        }
    }
}

impl DocStore for FsDocStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn in_docsdir(&self, docpath: &str) -> bool {
        DocRef::parse(docpath, &self.root).is_owned()
    }

    fn real_docpath(&self, docpath: &str) -> PathBuf {
        match DocRef::parse(docpath, &self.root) {
            DocRef::Owned(name) => self.root.join(name),
            DocRef::Linked(path) => path,
            DocRef::Url(url) => PathBuf::from(url),
        }
    }

    fn add_doc(&self, citekey: &str, source: &Path, overwrite: bool) -> Result<String> {
        if !source.is_file() {
            return Err(PubsError::DocNotFound(source.to_path_buf()));
        }
        ensure_dir(&self.root)?;

        let name = Self::doc_filename(citekey, source);
        let target = self.root.join(&name);
        if target.exists() && !overwrite {
            return Err(PubsError::DocCollision {
                citekey: citekey.to_string(),
                path: target,
            });
        }

        // Copy next to the target first so the final step is a rename.
        let tmp = self.root.join(format!(".{}-{}.tmp", name, Uuid::new_v4()));
        fs::copy(source, &tmp).map_err(PubsError::Io)?;
        if let Err(e) = fs::rename(&tmp, &target) {
            let _ = fs::remove_file(&tmp);
            return Err(PubsError::Io(e));
        }
        debug!(source = %source.display(), target = %target.display(), "document stored");

        Ok(DocRef::Owned(name).to_reference())
    }

    fn remove_doc(&self, docpath: &str, silent: bool) -> Result<()> {
        let path = match DocRef::parse(docpath, &self.root) {
            DocRef::Owned(name) => self.root.join(name),
            _ if silent => {
                debug!(docpath, "skipping removal of external document");
                return Ok(());
            }
            _ => return Err(PubsError::ExternalDoc(docpath.to_string())),
        };

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "document removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if silent {
                    Ok(())
                } else {
                    Err(PubsError::DocNotFound(path))
                }
            }
            Err(e) => Err(PubsError::Io(e)),
        }
    }

    fn rename_doc(&self, docpath: &str, new_citekey: &str, overwrite: bool) -> Result<String> {
        let name = match DocRef::parse(docpath, &self.root) {
            DocRef::Owned(name) => name,
            _ => return Err(PubsError::ExternalDoc(docpath.to_string())),
        };

        let old_path = self.root.join(&name);
        let new_name = Self::doc_filename(new_citekey, &old_path);
        let new_path = self.root.join(&new_name);
        if old_path == new_path {
            return Ok(DocRef::Owned(new_name).to_reference());
        }
        if !old_path.exists() {
            return Err(PubsError::DocNotFound(old_path));
        }
        if new_path.exists() && !overwrite {
            return Err(PubsError::DocCollision {
                citekey: new_citekey.to_string(),
                path: new_path,
            });
        }

        fs::rename(&old_path, &new_path).map_err(PubsError::Io)?;
        debug!(from = %old_path.display(), to = %new_path.display(), "document renamed");

        Ok(DocRef::Owned(new_name).to_reference())
    }
}
