use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "civic",
    about = "Civic Track: issue lifecycle and moderation store over JSONL fixtures",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Where the volatile store gets its starting state.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Path to an issues JSONL fixture
    #[arg(long, conflicts_with = "seed")]
    pub issues: Option<String>,

    /// Start from the demo dataset
    #[arg(long)]
    pub seed: bool,

    /// Path to a store config (TOML)
    #[arg(long)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the demo dataset as JSONL
    Seed {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List issues, newest first
    List {
        #[command(flatten)]
        source: SourceArgs,

        /// Include hidden issues
        #[arg(long)]
        all: bool,

        /// Only issues filed by this username
        #[arg(long)]
        reporter: Option<String>,

        /// Category filter (e.g. roads, "Water Supply")
        #[arg(long)]
        category: Option<String>,

        /// Status filter (e.g. reported, "In Progress")
        #[arg(long)]
        status: Option<String>,

        /// Case-insensitive text search over title and description
        #[arg(long)]
        search: Option<String>,

        /// Distance band: 1km, 3km or 5km
        #[arg(long)]
        within: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one issue
    Show {
        /// Issue ID
        id: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Aggregate statistics over every issue
    Analytics {
        #[command(flatten)]
        source: SourceArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Moderator queues: flagged and hidden issues
    Queue {
        #[command(flatten)]
        source: SourceArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay a session script against a fresh store
    Replay {
        /// Path to the session script (JSONL)
        #[arg(long)]
        session: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
