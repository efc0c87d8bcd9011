use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PubsError {
    /// The citekey does not name a paper in the repository.
    #[error("no paper with citekey {0}")]
    InvalidReference(String),

    /// A creating or renaming operation targeted a citekey that is already taken.
    #[error("citekey {0} already exists")]
    CiteKeyCollision(String),

    /// Broker-level lookup of bibdata that is not stored.
    #[error("no bibdata stored for {0}")]
    NotFound(String),

    #[error("invalid bibliographic data: {0}")]
    Validation(String),

    #[error("invalid citekey {citekey:?}: {reason}")]
    InvalidCiteKey { citekey: String, reason: String },

    #[error("a repository already exists at {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("no repository found at {} (run `pubs init`)", .0.display())]
    NotInitialized(PathBuf),

    #[error("a document for {citekey} already exists at {}", .path.display())]
    DocCollision { citekey: String, path: PathBuf },

    #[error("a note for {citekey} already exists at {}", .path.display())]
    NoteCollision { citekey: String, path: PathBuf },

    #[error("document not found: {}", .0.display())]
    DocNotFound(PathBuf),

    #[error("{0} is not in the documents directory")]
    ExternalDoc(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl PubsError {
    /// Errors the caller can recover from by choosing another key, passing
    /// `overwrite`, or correcting the input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PubsError::CiteKeyCollision(_)
                | PubsError::Validation(_)
                | PubsError::InvalidCiteKey { .. }
                | PubsError::DocCollision { .. }
                | PubsError::NoteCollision { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PubsError>;
