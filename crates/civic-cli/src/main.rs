//! Civic Track CLI: the `civic` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    // Logs go to stderr; stdout is reserved for command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "civic_store=warn,civic_cli=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Seed { json } => commands::seed::run(json),

        Commands::List {
            source,
            all,
            reporter,
            category,
            status,
            search,
            within,
            json,
        } => commands::list::run(commands::list::Args {
            source,
            all,
            reporter,
            category,
            status,
            search,
            within,
            json,
        }),

        Commands::Show { id, source, json } => commands::show::run(id, source, json),

        Commands::Analytics { source, json } => commands::analytics::run(source, json),

        Commands::Queue { source, json } => commands::queue::run(source, json),

        Commands::Replay {
            session,
            source,
            json,
        } => commands::replay::run(session, source, json),
    }
}
