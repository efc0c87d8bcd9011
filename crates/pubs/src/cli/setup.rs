use clap::{Args, Parser, Subcommand};
use pubsapp::repo::DocImport;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "pubs",
    bin_name = "pubs",
    version,
    disable_help_subcommand = true,
    about = "Your bibliography on the command line",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to read instead of the default one
    #[arg(long, global = true, value_name = "FILE", help_heading = "Options")]
    pub config: Option<PathBuf>,

    /// Repository directory, overriding `pubsdir`
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new repository
    Init,

    /// Add a paper from a bibliographic file
    Add {
        /// YAML (or JSON) file with a single entry
        bibfile: PathBuf,

        /// Citekey to use instead of the entry's own key
        #[arg(short = 'k', long)]
        citekey: Option<String>,

        /// Document to attach
        #[arg(short, long, value_name = "FILE")]
        docfile: Option<PathBuf>,

        /// Comma-separated tags
        #[arg(short, long, value_name = "TAGS")]
        tags: Option<String>,

        #[command(flatten)]
        import: ImportArgs,
    },

    /// List papers
    #[command(alias = "ls")]
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Change a paper's citekey
    Rename {
        old: String,
        new: String,

        /// Replace a paper already using the new citekey
        #[arg(short, long)]
        force: bool,
    },

    /// Remove a paper with its owned document
    #[command(alias = "rm")]
    Remove { citekey: String },

    /// Manage attached documents
    Doc {
        #[command(subcommand)]
        action: DocCommands,
    },

    /// Print the path of a paper's document
    Path { citekey: String },
}

#[derive(Subcommand, Debug)]
pub enum DocCommands {
    /// Attach a document to a paper
    Add {
        citekey: String,
        file: PathBuf,

        #[command(flatten)]
        import: ImportArgs,
    },
}

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct ImportArgs {
    /// Link the document in place instead of copying it
    #[arg(short = 'L', long, conflicts_with = "move_doc")]
    pub link: bool,

    /// Move the document into the repository instead of copying it
    #[arg(short = 'M', long = "move")]
    pub move_doc: bool,
}

impl ImportArgs {
    /// Flags win over the configured mode.
    pub fn resolve(&self, configured: DocImport) -> DocImport {
        if self.link {
            DocImport::Link
        } else if self.move_doc {
            DocImport::Move
        } else {
            configured
        }
    }
}
