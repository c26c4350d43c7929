//! CLI entry point.
//!
//! Parses arguments, composes the context via bootstrap and routes to the
//! command handlers. No infrastructure is constructed anywhere else.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use podcaster_cli::{bootstrap, handlers, shutdown_token, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Catalog commands need no context.
    match &cli.command {
        Commands::Voices { provider } => return handlers::handle_voices(provider),
        Commands::Options => return handlers::handle_options(),
        Commands::Doctor => return handlers::handle_doctor().await,
        _ => {}
    }

    let context = bootstrap::bootstrap(cli.output_dir.clone()).await?;
    let cancel = shutdown_token();

    match cli.command {
        Commands::Generate(args) => handlers::handle_generate(&context, args, &cancel).await,
        Commands::Resume(args) => handlers::handle_resume(&context, args, &cancel).await,
        Commands::Jobs { command } => handlers::handle_jobs(&context, command).await,
        Commands::Voices { .. } | Commands::Options | Commands::Doctor => unreachable!(),
    }
}
