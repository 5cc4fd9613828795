use clap::{Args, Parser, Subcommand};
use jotapp::model::{Category, CategoryFilter};
use std::path::PathBuf;

/// "0.3.0" outside a git checkout, "0.3.0@abc1234" (plus "-dirty") inside one.
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("JOT_GIT_HASH");
    const GIT_DIRTY: &str = env!("JOT_GIT_DIRTY");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| match (GIT_HASH.is_empty(), GIT_DIRTY == "true") {
        (true, _) => VERSION.to_string(),
        (false, false) => format!("{}@{}", VERSION, GIT_HASH),
        (false, true) => format!("{}@{}-dirty", VERSION, GIT_HASH),
    })
}

#[derive(Parser, Debug)]
#[command(name = "jot", bin_name = "jot", version = get_version())]
#[command(about = "Categorised notes with voice memos", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding the stored notes (overrides JOT_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a note
    #[command(alias = "new")]
    Add {
        /// Title words (joined with spaces)
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,

        /// Note body
        #[arg(long)]
        content: Option<String>,

        /// personal, work, ideas or uncategorised
        #[arg(long)]
        category: Option<Category>,

        #[command(flatten)]
        audio: AudioArgs,
    },

    /// List notes, newest last
    #[command(alias = "ls")]
    List {
        /// Only notes in this category ("all" for every category)
        #[arg(long)]
        category: Option<CategoryFilter>,

        /// Only notes whose title or content contains this text
        #[arg(long)]
        search: Option<String>,

        /// Print the stored records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search titles and content (case-insensitive)
    Search {
        query: String,

        #[arg(long)]
        category: Option<CategoryFilter>,

        #[arg(long)]
        json: bool,
    },

    /// Show one note in full
    #[command(alias = "view")]
    Show {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Change a note's title, content, category or voice memo
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        content: Option<String>,

        #[arg(long)]
        category: Option<Category>,

        #[command(flatten)]
        audio: AudioArgs,

        /// Drop the note's voice memo
        #[arg(long, conflicts_with = "audio")]
        remove_audio: bool,
    },

    /// Delete a note
    #[command(alias = "rm")]
    Delete { id: String },

    /// Write a note's voice memo to a file
    ExportAudio {
        id: String,

        /// Destination file
        file: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct AudioArgs {
    /// Recording to attach as a voice memo
    #[arg(long, value_name = "FILE", requires = "duration")]
    pub audio: Option<PathBuf>,

    /// Length of the recording in seconds
    #[arg(long, value_name = "SECS", requires = "audio")]
    pub duration: Option<u32>,
}
