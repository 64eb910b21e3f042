//! User CLI commands: create, show.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Input;

use draugas_types::memory::StoredEntry;
use draugas_types::user::{Sender, User};

use crate::state::AppState;

/// Register a user, prompting for the email when not given.
///
/// ```bash
/// draugas user create ona --email ona@example.com
/// ```
pub async fn create_user(
    state: &AppState,
    username: &str,
    email: Option<String>,
    json: bool,
) -> Result<()> {
    let email = match email {
        Some(e) => e,
        None => Input::<String>::new()
            .with_prompt("Email")
            .interact_text()?,
    };

    let user = state.chat_service.register_user(username, &email).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Created user {} ({})",
        style("✓").green().bold(),
        style(&user.username).cyan().bold(),
        style(&user.email).dim()
    );
    println!(
        "  {} Say hello with: {}",
        style("→").dim(),
        style(format!("draugas greet {} --mood happy", user.username)).yellow()
    );
    println!();

    Ok(())
}

/// Show both memory tiers for a user.
pub async fn show_user(state: &AppState, username: &str, json: bool) -> Result<()> {
    let user = state.chat_service.get_user(username).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&user)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {}",
        style(&user.username).cyan().bold(),
        style(format!("<{}>", user.email)).dim()
    );
    println!(
        "  {} {}   {} {}",
        style("id").dim(),
        user.id,
        style("revision").dim(),
        user.revision
    );
    println!();

    print_window(&user);
    print_long_term(&user);

    Ok(())
}

fn print_window(user: &User) {
    println!("  {}", style("Recent conversation").bold());
    if user.short_term_memory.is_empty() {
        println!("    {}", style("(empty)").dim());
    }
    for turn in user.short_term_memory.turns() {
        let who = match turn.sender {
            Sender::User => style("Vartotojas").blue(),
            Sender::Agent => style("AI").magenta(),
        };
        println!("    {who}: {}", turn.text);
    }
    println!();
}

fn print_long_term(user: &User) {
    let memory = &user.long_term_memory;
    if memory.is_empty() {
        println!("  {} No long-term memories yet.", style("i").blue().bold());
        println!();
        return;
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Category").fg(Color::White),
        Cell::new("Content").fg(Color::White),
        Cell::new("Sentiment").fg(Color::White),
        Cell::new("Stored").fg(Color::White),
    ]);

    for (category, entries) in memory.iter() {
        for entry in entries {
            let (sentiment, stored) = match entry {
                StoredEntry::Structured(item) => (
                    match item.is_positive {
                        Some(true) => Cell::new("+ likes").fg(Color::Green),
                        Some(false) => Cell::new("- dislikes").fg(Color::Red),
                        None => Cell::new(""),
                    },
                    Cell::new(item.context.timestamp.format("%Y-%m-%d %H:%M").to_string())
                        .fg(Color::DarkGrey),
                ),
                StoredEntry::Legacy(_) => (Cell::new(""), Cell::new("legacy").fg(Color::DarkGrey)),
            };
            table.add_row(vec![
                Cell::new(category.to_string()).fg(Color::Cyan),
                Cell::new(entry.content()),
                sentiment,
                stored,
            ]);
        }
    }

    println!("{table}");
    println!();
    println!(
        "  {} memor{}",
        style(memory.len()).bold(),
        if memory.len() == 1 { "y" } else { "ies" }
    );
    println!();
}
