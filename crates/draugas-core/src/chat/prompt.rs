//! Prompt assembly for replies and greetings.
//!
//! Layout of a reply prompt:
//! ```text
//! {GLOBAL_RULES}
//! VARTOTOJO KONTEKSTAS:
//! PREFERENCES: Patinka: kava, Nepatinka: arbata
//! FACTS: Vilniuje
//!
//! POKALBIO ISTORIJA:
//! Vartotojas: ...
//! AI: ...
//!
//! {personalized template}
//! ```
//! The whole prompt is trimmed before it is sent.

use draugas_types::chat::Mood;
use draugas_types::memory::{MemoryCategory, RelevantMemories};
use draugas_types::user::{Sender, ShortTermWindow};

/// Behavioral rules prepended to every prompt.
pub const GLOBAL_RULES: &str = "
  Speak Lithuanian language only, refuse to speak any other language.
  Answer short and simple like a friend.
  Keep conversation alive and interesting, but don't push it too much.
";

pub const STANDARD_TEMPLATES: &[&str] = &[
    r#"Username: {username}, asking: "{message}". Answer short and in a funny style. Keep conversation alive."#,
    r#"User {username} says: "{message}". Reply humorously, keep it light and fun."#,
    r#"{username} has a question: "{message}". Make the answer funny, keep it brief and entertaining."#,
    r#"Here's what {username} asked: "{message}". Give a funny and witty reply, don't make it too long."#,
];

pub const ROAST_TEMPLATES: &[&str] = &[
    r#"{username} just said: "{message}". Roast them with a sarcastic, friendly jab, then answer in one or two sentences."#,
    r#"Oh great, {username} wants to know: "{message}". Reply with heavy sarcasm, but keep it good-natured and short."#,
    r#"{username} wrote: "{message}". Pretend you are a tired stand-up comedian and tease them before answering briefly."#,
    r#"Brace yourself, {username} asks: "{message}". Give a cheeky, eye-rolling answer without being mean."#,
    r#"{username} thinks this is a good question: "{message}". Playfully mock the question, then actually help, briefly."#,
    r#"Message from {username}: "{message}". Answer like a sarcastic best friend who secretly cares. Keep it short."#,
];

/// Template set for a mood. Only `Roast` has its own set.
pub fn templates_for(mood: Mood) -> &'static [&'static str] {
    match mood {
        Mood::Roast => ROAST_TEMPLATES,
        Mood::Happy | Mood::Sad | Mood::Normal => STANDARD_TEMPLATES,
    }
}

/// Fixed greeting sentence for a mood, with a `{username}` placeholder.
pub fn greeting_template(mood: Mood) -> &'static str {
    match mood {
        Mood::Happy => {
            "{username} is feeling really good today. Greet them with positivity and ask how you can contribute to their great day!"
        }
        Mood::Sad => {
            "{username} is feeling a bit sad today. Greet them warmly and offer friendly support to lift their spirits."
        }
        Mood::Normal => "{username} is feeling normal today. Greet them and ask how you can assist!",
        Mood::Roast => {
            "{username} came here to get roasted. Greet them with a playful, sarcastic jab and ask what they want this time."
        }
    }
}

/// Builds reply and greeting prompts.
pub struct PromptBuilder;

impl PromptBuilder {
    /// Render retrieved memories, one line per non-empty category.
    ///
    /// The `Patinka`/`Nepatinka` polarity label is only rendered for
    /// preferences.
    pub fn memory_context(relevant: &RelevantMemories) -> String {
        MemoryCategory::ALL
            .into_iter()
            .filter_map(|category| {
                let items = relevant.get(category);
                if items.is_empty() {
                    return None;
                }
                let rendered: Vec<String> = items
                    .iter()
                    .map(|item| match category {
                        MemoryCategory::Preferences => {
                            let label = match item.is_positive {
                                Some(false) => "Nepatinka",
                                _ => "Patinka",
                            };
                            format!("{label}: {}", item.content)
                        }
                        MemoryCategory::Facts | MemoryCategory::Relationships => item.content.clone(),
                    })
                    .collect();
                Some(format!(
                    "{}: {}",
                    category.to_string().to_uppercase(),
                    rendered.join(", ")
                ))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render the short-term window in FIFO order.
    pub fn history(window: &ShortTermWindow) -> String {
        window
            .turns()
            .iter()
            .map(|turn| {
                let speaker = match turn.sender {
                    Sender::User => "Vartotojas",
                    Sender::Agent => "AI",
                };
                format!("{speaker}: {}", turn.text)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Substitute the first occurrence of each placeholder.
    pub fn personalize(template: &str, username: &str, message: &str) -> String {
        template
            .replacen("{username}", username, 1)
            .replacen("{message}", message, 1)
    }

    /// Compose the full reply prompt.
    pub fn reply(relevant: &RelevantMemories, window: &ShortTermWindow, personalized: &str) -> String {
        format!(
            "{GLOBAL_RULES}\nVARTOTOJO KONTEKSTAS:\n{}\n\nPOKALBIO ISTORIJA:\n{}\n\n{personalized}",
            Self::memory_context(relevant),
            Self::history(window),
        )
        .trim()
        .to_string()
    }

    /// Compose the greeting prompt for a mood.
    pub fn greeting(mood: Mood, username: &str) -> String {
        let sentence = greeting_template(mood).replacen("{username}", username, 1);
        format!("{GLOBAL_RULES} {sentence}")
    }
}
