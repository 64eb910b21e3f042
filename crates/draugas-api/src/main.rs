//! Draugas CLI and REST API entry point.
//!
//! Binary name: `draugas`
//!
//! Parses CLI arguments, initializes database and services, then dispatches
//! to the appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands, DebugCommand, UserCommand};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,draugas=debug,draugas_core=debug,draugas_infra=debug",
        _ => "trace",
    };
    draugas_observe::tracing_setup::init_tracing(filter, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    draugas_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Commands that don't need app state
    match &cli.command {
        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            generate(*shell, &mut cmd, "draugas", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Debug {
            action: DebugCommand::Patterns { utterance },
        } => return cli::debug::patterns(utterance, cli.json),
        _ => {}
    }

    // Initialize application state (config, DB, services)
    let state = AppState::init().await?;

    match cli.command {
        Commands::User { action } => match action {
            UserCommand::Create { username, email } => {
                cli::user::create_user(&state, &username, email, cli.json).await?;
            }
            UserCommand::Show { username } => {
                cli::user::show_user(&state, &username, cli.json).await?;
            }
        },

        Commands::Chat {
            username,
            message,
            mood,
        } => {
            cli::chat::chat(&state, &username, message, &mood, cli.json).await?;
        }

        Commands::Greet { username, mood } => {
            cli::chat::greet(&state, &username, &mood, cli.json).await?;
        }

        Commands::Serve { port, host } => {
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!(
                    "  {} Draugas API listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }
            tracing::info!(
                %addr,
                data_dir = %state.data_dir.display(),
                model = %state.config.generation.model,
                "Server started"
            );

            let db_pool = state.db_pool.clone();
            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            db_pool.close().await;

            println!("\n  Server stopped.");
        }

        Commands::Completions { .. } | Commands::Debug { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
