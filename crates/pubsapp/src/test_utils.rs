use crate::broker::BrokerOptions;
use crate::error::Result;
use crate::events::{EventKind, RepoEvent, RepoObserver};
use crate::model::{Fields, Paper};
use crate::repo::Repository;
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;
use tempfile::TempDir;

pub const TURING_YAML: &str = "\
turing1950computing:
  type: article
  title: Computing Machinery and Intelligence
  author:
    - Turing, Alan M.
  journal: Mind
  year: '1950'
";

pub const DOE_YAML: &str = "\
Doe2013:
  type: article
  title: Nice Results
  author:
    - Doe, John
  year: '2013'
";

/// An initialized on-disk repository in a temp dir, with a [`Recorder`] attached.
pub struct TestEnv {
    // Keeps the directory alive for the duration of the test.
    pub _temp_dir: TempDir,
    pub root: PathBuf,
    pub repo: Repository,
    pub recorder: Recorder,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_options(BrokerOptions::default())
    }

    pub fn with_options(options: BrokerOptions) -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().join("pubs");
        let recorder = Recorder::default();
        let repo = Repository::create(&root, &options)
            .expect("failed to create repository")
            .with_observer(Box::new(recorder.clone()));
        Self {
            _temp_dir: temp_dir,
            root,
            repo,
            recorder,
        }
    }

    pub fn docsdir(&self) -> PathBuf {
        self.repo.databroker().docsdir().to_path_buf()
    }

    /// Writes a file outside the repository root, e.g. a document to import.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self._temp_dir.path().join(name);
        fs::write(&path, content).expect("failed to write fixture file");
        path
    }
}

/// Observer that keeps every event it sees. Clones share the same log.
#[derive(Clone, Default)]
pub struct Recorder {
    events: Rc<RefCell<Vec<RepoEvent>>>,
}

impl Recorder {
    pub fn events(&self) -> Vec<RepoEvent> {
        self.events.borrow().clone()
    }

    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.borrow().iter().map(RepoEvent::kind).collect()
    }
}

impl RepoObserver for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn on_add(&self, citekey: &str, paper: &Paper) -> Result<()> {
        self.events.borrow_mut().push(RepoEvent::Add {
            citekey: citekey.to_string(),
            paper: paper.clone(),
        });
        Ok(())
    }

    fn on_remove(&self, citekey: &str, paper: &Paper) -> Result<()> {
        self.events.borrow_mut().push(RepoEvent::Remove {
            citekey: citekey.to_string(),
            paper: paper.clone(),
        });
        Ok(())
    }

    fn on_rename(&self, old_citekey: &str, paper: &Paper) -> Result<()> {
        self.events.borrow_mut().push(RepoEvent::Rename {
            old_citekey: old_citekey.to_string(),
            paper: paper.clone(),
        });
        Ok(())
    }
}

fn from_yaml(raw: &str) -> Paper {
    let entry = serde_yaml::from_str(raw).expect("fixture yaml is valid");
    Paper::from_bibentry(entry, None)
}

pub fn turing_paper() -> Paper {
    from_yaml(TURING_YAML)
}

pub fn doe_paper() -> Paper {
    from_yaml(DOE_YAML)
}

/// A minimal paper with only a title.
pub fn paper_titled(citekey: &str, title: &str) -> Paper {
    let mut fields = Fields::new();
    fields.insert(
        "title".to_string(),
        serde_yaml::Value::String(title.to_string()),
    );
    Paper::new(citekey, fields)
}
