//! # CLI Layer
//!
//! The **only** place in the workspace that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Installs the tracing subscriber
//! - Decides which observers a repository gets
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: shell arguments become a typed [`Commands`] via clap
//! 2. **Context Setup**: config from file and environment, `--dir` override
//! 3. **Wiring**: one [`Repository`] with a [`NoteJanitor`] attached
//! 4. **Dispatch**: each command maps to one or two repository calls
//! 5. **Error Handling**: outcomes and errors become messages; `main` sets the
//!    exit code

use super::render;
use super::setup::{Cli, Commands, DocCommands, ImportArgs};
use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use pubsapp::broker::NOTES_DIR;
use pubsapp::config::PubsConfig;
use pubsapp::events::NoteJanitor;
use pubsapp::model::{parse_tag_list, Metadata};
use pubsapp::repo::{PushOutcome, Repository};
use pubsapp::store::notes::FsNoteStore;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PUBS_LOG";

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = load_config(cli.config.as_deref(), cli.dir.as_deref())?;
    tracing::debug!(root = %config.root().display(), "configuration loaded");

    if let Commands::Init = cli.command {
        return handle_init(&config);
    }

    let mut repo = open_repository(&config)?;
    match cli.command {
        Commands::Init => Ok(()),
        Commands::Add {
            bibfile,
            citekey,
            docfile,
            tags,
            import,
        } => handle_add(
            &mut repo,
            &config,
            &bibfile,
            citekey.as_deref(),
            docfile.as_deref(),
            tags.as_deref(),
            import,
        ),
        Commands::List { json } => handle_list(&repo, json),
        Commands::Rename { old, new, force } => handle_rename(&mut repo, &old, &new, force),
        Commands::Remove { citekey } => handle_remove(&mut repo, &citekey),
        Commands::Doc {
            action:
                DocCommands::Add {
                    citekey,
                    file,
                    import,
                },
        } => handle_doc_add(&mut repo, &config, &citekey, &file, import),
        Commands::Path { citekey } => handle_path(&repo, &citekey),
    }
}

/// Logs go to stderr, filtered by `PUBS_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .try_init();
}

fn load_config(path: Option<&Path>, dir: Option<&Path>) -> Result<PubsConfig> {
    let path: Option<PathBuf> = path.map(Path::to_path_buf).or_else(PubsConfig::default_path);
    let mut config = PubsConfig::load(path.as_deref()).context("failed to load configuration")?;
    if let Some(dir) = dir {
        config.pubsdir = dir.display().to_string();
    }
    Ok(config)
}

fn open_repository(config: &PubsConfig) -> Result<Repository> {
    let root = config.root();
    let notes = FsNoteStore::new(root.join(NOTES_DIR)).with_ext(&config.notes_ext);
    let repo = Repository::open(&root, &config.broker_options())?
        .with_observer(Box::new(NoteJanitor::new(notes)));
    Ok(repo)
}

fn handle_init(config: &PubsConfig) -> Result<()> {
    let root = config.root();
    Repository::create(&root, &config.broker_options())?;
    println!("Initialized pubs repository in {}", root.display());
    Ok(())
}

fn handle_add(
    repo: &mut Repository,
    config: &PubsConfig,
    bibfile: &Path,
    citekey: Option<&str>,
    docfile: Option<&Path>,
    tags: Option<&str>,
    import: ImportArgs,
) -> Result<()> {
    let raw = fs::read_to_string(bibfile)
        .with_context(|| format!("cannot read {}", bibfile.display()))?;
    let metadata = Metadata {
        tags: tags.map(parse_tag_list).unwrap_or_default(),
        added: Some(Utc::now()),
        ..Default::default()
    };

    let mut paper = match repo.import_raw(&raw, citekey, metadata)? {
        PushOutcome::Stored(paper) => paper,
        PushOutcome::Collision(key) => {
            bail!("citekey {} already exists; choose another with -k", key)
        }
        PushOutcome::ValidationFailed(reason) => {
            bail!("{} is not a valid entry: {}", bibfile.display(), reason)
        }
    };

    if let Some(docfile) = docfile {
        paper = repo.push_doc(
            paper.citekey(),
            docfile,
            import.resolve(config.doc_import()),
        )?;
    }
    println!("{}", render::added(&paper));
    Ok(())
}

fn handle_list(repo: &Repository, json: bool) -> Result<()> {
    let rows = repo.listing(true)?;
    if json {
        println!("{}", render::render_json(&rows)?);
    } else {
        print!("{}", render::render_list(&rows, Utc::now()));
    }
    Ok(())
}

fn handle_rename(repo: &mut Repository, old: &str, new: &str, force: bool) -> Result<()> {
    let paper = repo.pull_paper(old)?;
    let renamed = repo.rename_paper(&paper, new, force)?;
    println!("{}", render::renamed(old, &renamed));
    Ok(())
}

fn handle_remove(repo: &mut Repository, citekey: &str) -> Result<()> {
    let paper = repo.remove_paper(citekey)?;
    println!("{}", render::removed(&paper));
    Ok(())
}

fn handle_doc_add(
    repo: &mut Repository,
    config: &PubsConfig,
    citekey: &str,
    file: &Path,
    import: ImportArgs,
) -> Result<()> {
    let paper = repo.push_doc(citekey, file, import.resolve(config.doc_import()))?;
    println!("{}", render::doc_attached(&paper));
    Ok(())
}

fn handle_path(repo: &Repository, citekey: &str) -> Result<()> {
    let paper = repo.pull_paper(citekey)?;
    match paper.docfile() {
        Some(docfile) => {
            println!("{}", repo.databroker().real_docpath(docfile).display());
            Ok(())
        }
        None => bail!("{} has no document", citekey),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dir_override_wins() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("pubs.toml");
        let config = load_config(Some(&missing), Some(&dir.path().join("lib"))).unwrap();
        assert_eq!(config.root(), dir.path().join("lib"));
    }

    #[test]
    fn test_config_file_is_read() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("pubs.toml");
        fs::write(&file, "notes_ext = \"md\"\n").unwrap();

        let config = load_config(Some(&file), None).unwrap();
        assert_eq!(config.notes_ext, "md");
    }

    #[test]
    fn test_open_requires_init() {
        let dir = TempDir::new().unwrap();
        let config = PubsConfig {
            pubsdir: dir.path().join("lib").display().to_string(),
            ..Default::default()
        };
        assert!(open_repository(&config).is_err());

        handle_init(&config).unwrap();
        let repo = open_repository(&config).unwrap();
        assert!(repo.citekeys().unwrap().is_empty());
    }
}
