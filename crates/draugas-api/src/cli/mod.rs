//! CLI command definitions and dispatch for the `draugas` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod debug;
pub mod user;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// A Lithuanian-speaking companion that remembers what you tell it.
#[derive(Parser)]
#[command(name = "draugas", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "DRAUGAS_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Manage users.
    User {
        #[command(subcommand)]
        action: UserCommand,
    },

    /// Chat with the agent. Reads lines interactively unless --message is given.
    Chat {
        /// Username to chat as.
        username: String,

        /// Send a single message and exit.
        #[arg(short, long)]
        message: Option<String>,

        /// Reply tone: happy, sad, normal or roast.
        #[arg(long, default_value = "normal")]
        mood: String,
    },

    /// Generate a conversation-opening greeting for a mood.
    Greet {
        /// Username to greet.
        username: String,

        /// Greeting tone: happy, sad, normal or roast.
        #[arg(long)]
        mood: String,
    },

    /// Developer diagnostics.
    Debug {
        #[command(subcommand)]
        action: DebugCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// Register a new user with empty memory.
    Create {
        /// Unique username.
        username: String,

        /// Unique email address (prompted for if omitted).
        #[arg(long)]
        email: Option<String>,
    },

    /// Show a user's short-term window and long-term memory.
    Show {
        /// Username to display.
        username: String,
    },
}

#[derive(Subcommand)]
pub enum DebugCommand {
    /// Show which extraction rules fire on an utterance and what they capture.
    Patterns {
        /// Utterance to analyse.
        utterance: String,
    },
}
