use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Capture and triage notes from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quick capture: quill "my note here"
    #[arg(trailing_var_arg = true)]
    pub note: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session credential
    Login {
        /// Account username
        #[arg(long, value_name = "USERNAME")]
        username: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Sign out and clear the stored session
    Logout,
    /// Show whether a session credential is stored
    Status,
    /// Create a new note
    #[command(alias = "new")]
    Add {
        /// Note content
        content: Vec<String>,
        /// Mark the note important
        #[arg(long)]
        important: bool,
    },
    /// List notes from the service
    List {
        /// Show only important notes
        #[arg(long)]
        important: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Maximum number of notes to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Flip a note's importance flag
    Toggle {
        /// Note id
        id: String,
    },
    /// Configure the service endpoints
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update the config file
    Init {
        /// Notes service base URL (e.g. <http://localhost:3001>)
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
    },
    /// Print the resolved configuration
    Show,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
