//! # Lifecycle Events
//!
//! The repository announces three lifecycle changes to its observers:
//!
//! | event    | emitted by                      | carries                  |
//! |----------|---------------------------------|--------------------------|
//! | `Add`    | first `push_paper` of a citekey | citekey, stored paper    |
//! | `Remove` | `remove_paper`                  | citekey, removed paper   |
//! | `Rename` | `rename_paper`                  | old citekey, new paper   |
//!
//! ## Dispatch Rules
//!
//! - Observers are handed to the repository at construction; there is no global
//!   registry.
//! - Dispatch is synchronous, on the caller's thread, in registration order.
//! - Events are published after storage has been updated. The first observer
//!   error stops dispatch and is returned to the caller of the repository
//!   operation, whose storage effects stay applied.

use crate::error::Result;
use crate::model::Paper;
use crate::store::notes::FsNoteStore;
use crate::store::NoteStore;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Add,
    Remove,
    Rename,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RepoEvent {
    Add { citekey: String, paper: Paper },
    Remove { citekey: String, paper: Paper },
    Rename { old_citekey: String, paper: Paper },
}

impl RepoEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            RepoEvent::Add { .. } => EventKind::Add,
            RepoEvent::Remove { .. } => EventKind::Remove,
            RepoEvent::Rename { .. } => EventKind::Rename,
        }
    }

    /// The paper as it is after the operation (before it, for `Remove`).
    pub fn paper(&self) -> &Paper {
        match self {
            RepoEvent::Add { paper, .. }
            | RepoEvent::Remove { paper, .. }
            | RepoEvent::Rename { paper, .. } => paper,
        }
    }
}

/// A plugin's view of the repository lifecycle.
///
/// All hooks default to doing nothing. Observers that keep state use interior
/// mutability; the repository only ever hands out `&self`.
pub trait RepoObserver {
    fn name(&self) -> &str;

    fn on_add(&self, _citekey: &str, _paper: &Paper) -> Result<()> {
        Ok(())
    }

    fn on_remove(&self, _citekey: &str, _paper: &Paper) -> Result<()> {
        Ok(())
    }

    fn on_rename(&self, _old_citekey: &str, _paper: &Paper) -> Result<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct EventBus {
    observers: Vec<Box<dyn RepoObserver>>,
}

impl EventBus {
    pub fn new(observers: Vec<Box<dyn RepoObserver>>) -> Self {
        Self { observers }
    }

    pub fn register(&mut self, observer: Box<dyn RepoObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn publish(&self, event: &RepoEvent) -> Result<()> {
        for observer in &self.observers {
            let outcome = match event {
                RepoEvent::Add { citekey, paper } => observer.on_add(citekey, paper),
                RepoEvent::Remove { citekey, paper } => observer.on_remove(citekey, paper),
                RepoEvent::Rename { old_citekey, paper } => {
                    observer.on_rename(old_citekey, paper)
                }
            };
            if let Err(err) = outcome {
                warn!(
                    observer = observer.name(),
                    kind = ?event.kind(),
                    error = %err,
                    "observer failed"
                );
                return Err(err);
            }
        }
        debug!(kind = ?event.kind(), observers = self.observers.len(), "event published");
        Ok(())
    }
}

/// Adapts a closure into an observer for a single event kind.
pub struct Listener<F> {
    name: String,
    kind: EventKind,
    handler: F,
}

impl<F> Listener<F>
where
    F: Fn(&RepoEvent) -> Result<()>,
{
    pub fn new(name: impl Into<String>, kind: EventKind, handler: F) -> Self {
        Self {
            name: name.into(),
            kind,
            handler,
        }
    }

    fn dispatch(&self, event: RepoEvent) -> Result<()> {
        if event.kind() == self.kind {
            (self.handler)(&event)
        } else {
            Ok(())
        }
    }
}

impl<F> RepoObserver for Listener<F>
where
    F: Fn(&RepoEvent) -> Result<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_add(&self, citekey: &str, paper: &Paper) -> Result<()> {
        self.dispatch(RepoEvent::Add {
            citekey: citekey.to_string(),
            paper: paper.clone(),
        })
    }

    fn on_remove(&self, citekey: &str, paper: &Paper) -> Result<()> {
        self.dispatch(RepoEvent::Remove {
            citekey: citekey.to_string(),
            paper: paper.clone(),
        })
    }

    fn on_rename(&self, old_citekey: &str, paper: &Paper) -> Result<()> {
        self.dispatch(RepoEvent::Rename {
            old_citekey: old_citekey.to_string(),
            paper: paper.clone(),
        })
    }
}

/// Deletes a paper's note file when the paper is removed.
pub struct NoteJanitor {
    notes: FsNoteStore,
}

impl NoteJanitor {
    pub fn new(notes: FsNoteStore) -> Self {
        Self { notes }
    }
}

impl RepoObserver for NoteJanitor {
    fn name(&self) -> &str {
        "notes"
    }

    fn on_remove(&self, citekey: &str, _paper: &Paper) -> Result<()> {
        self.notes.remove_note(citekey, true)
    }
}
