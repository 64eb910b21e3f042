//! Conversation CLI commands: chat, greet.

use std::time::Duration;

use anyhow::Result;
use console::style;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};

use draugas_types::chat::{Mood, SendMessageOutcome};

use crate::state::AppState;

const EXIT_COMMANDS: &[&str] = &["/exit", "/quit"];

fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Chat as `username`, either one message or an interactive session.
///
/// ```bash
/// draugas chat ona --message "Man patinka kava"
/// draugas chat ona --mood roast
/// ```
pub async fn chat(
    state: &AppState,
    username: &str,
    message: Option<String>,
    mood: &str,
    json: bool,
) -> Result<()> {
    let mood: Mood = mood.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    if let Some(message) = message {
        return send_one(state, username, &message, mood, json).await;
    }

    // Fail before the first prompt if the user does not exist.
    state.chat_service.get_user(username).await?;

    println!();
    println!(
        "  {} Chatting as {} ({} mood). Type {} to leave.",
        style("💬").bold(),
        style(username).cyan().bold(),
        style(mood).yellow(),
        style("/exit").yellow()
    );
    println!();

    loop {
        let line = Input::<String>::new()
            .with_prompt("Tu")
            .allow_empty(true)
            .interact_text()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if EXIT_COMMANDS.contains(&line) {
            break;
        }

        // A failed turn is reported but does not end the session.
        if let Err(e) = send_one(state, username, line, mood, json).await {
            eprintln!("  {} {e}", style("✗").red().bold());
        }
    }

    Ok(())
}

async fn send_one(state: &AppState, username: &str, message: &str, mood: Mood, json: bool) -> Result<()> {
    let progress = (!json).then(|| spinner("Galvoju..."));
    let result = state
        .chat_service
        .send_message(Some(username), Some(message), Some(&mood.to_string()))
        .await;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }
    let outcome = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(())
}

fn print_outcome(outcome: &SendMessageOutcome) {
    println!("  {} {}", style("AI:").magenta().bold(), outcome.response);

    let learned: Vec<String> = outcome
        .extracted_memories
        .iter()
        .flat_map(|(category, items)| {
            items
                .iter()
                .map(move |item| format!("{category}: {}", item.content))
        })
        .collect();
    if !learned.is_empty() {
        println!(
            "  {} {}",
            style("remembered").dim(),
            style(learned.join(", ")).dim()
        );
    }
    println!();
}

/// Open a conversation with a mood-specific greeting.
pub async fn greet(state: &AppState, username: &str, mood: &str, json: bool) -> Result<()> {
    let progress = (!json).then(|| spinner("Sveikinuosi..."));
    let result = state
        .chat_service
        .start_conversation(Some(username), Some(mood))
        .await;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }
    let start = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&start)?);
        return Ok(());
    }

    println!();
    println!("  {} {}", style("AI:").magenta().bold(), start.initial_message);
    println!();
    Ok(())
}
