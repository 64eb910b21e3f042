//! Developer diagnostics for the extraction rule table.

use anyhow::Result;
use chrono::Utc;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use draugas_core::memory::extractor::PatternExtractor;

/// Print every rule that fires on `utterance` and the resulting memories.
pub fn patterns(utterance: &str, json: bool) -> Result<()> {
    let extractor = PatternExtractor::new();
    let matches = extractor.explain(utterance);
    let extracted = extractor.extract(utterance, Utc::now());
    let negative = extractor.is_negative(utterance);

    if json {
        let report = serde_json::json!({
            "utterance": utterance,
            "negative": negative,
            "matches": matches,
            "extracted": extracted,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    if matches.is_empty() {
        println!("  {} No extraction rule matched.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Category").fg(Color::White),
        Cell::new("Pattern").fg(Color::White),
        Cell::new("Matched").fg(Color::White),
        Cell::new("Captured").fg(Color::White),
    ]);
    for m in &matches {
        table.add_row(vec![
            Cell::new(m.category.to_string()).fg(Color::Cyan),
            Cell::new(&m.pattern).fg(Color::DarkGrey),
            Cell::new(&m.matched),
            Cell::new(&m.captured).fg(Color::Green),
        ]);
    }

    println!("{table}");
    println!();
    println!(
        "  {} {} memor{} extracted, negation {}",
        style("→").dim(),
        style(extracted.len()).bold(),
        if extracted.len() == 1 { "y" } else { "ies" },
        if negative {
            style("present").red()
        } else {
            style("absent").green()
        }
    );
    println!();
    Ok(())
}
