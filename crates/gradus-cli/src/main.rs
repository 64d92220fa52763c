//! Gradus CLI: the `gradus` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use gradus_store::StoreLayout;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli);

    let layout = StoreLayout::new(&cli.store);
    tracing::debug!(store = %layout.root().display(), "using store");

    match cli.command {
        Commands::Init { path, json } => {
            let layout = path.map_or(layout, StoreLayout::new);
            commands::init::run(&layout, json)
        }

        Commands::Levels { json } => commands::levels::run(json),

        Commands::Knowledge { command } => commands::knowledge::run(&layout, command),

        Commands::Recipe { command } => commands::recipe::run(&layout, command),

        Commands::Resolve { id, level, json } => commands::resolve::run(&layout, id, level, json),

        Commands::Validate { level, ids, json } => {
            commands::validate::run(&layout, level, ids, json)
        }

        Commands::Audit { json } => commands::audit::run(&layout, json),
    }
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn",
        1 => "warn,gradus_store=info,gradus_cli=info",
        2 => "info,gradus_store=debug,gradus_cli=debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
