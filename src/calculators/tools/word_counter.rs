use crate::core::{Calculator, Card, Env};
use crate::domain::model::Form;
use crate::utils::error::Result;
use crate::utils::format::format_fixed;
use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

pub const DEFAULT_READING_WPM: f64 = 200.0;
pub const DEFAULT_SPEAKING_WPM: f64 = 130.0;

static PARAGRAPH_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{2,}").expect("valid regex"));
static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").expect("valid regex"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TextStats {
    pub words: usize,
    pub characters: usize,
    pub characters_no_spaces: usize,
    pub sentences: usize,
    pub paragraphs: usize,
}

pub fn analyze(text: &str) -> TextStats {
    let normalized = text.replace("\r\n", "\n");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return TextStats {
            characters: text.chars().count(),
            ..TextStats::default()
        };
    }
    let collapsed = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
    TextStats {
        words: trimmed.split_whitespace().count(),
        characters: text.chars().count(),
        characters_no_spaces: text.chars().filter(|c| !c.is_whitespace()).count(),
        sentences: SENTENCE_END
            .split(&collapsed)
            .filter(|s| !s.trim().is_empty())
            .count(),
        paragraphs: PARAGRAPH_BREAK
            .split(trimmed)
            .filter(|p| !p.trim().is_empty())
            .count(),
    }
}

/// `"2 min 30 sec"`; zero words or speed reads `"0 min"`.
pub fn duration_label(words: usize, wpm: f64) -> String {
    if words == 0 || wpm <= 0.0 {
        return "0 min".to_string();
    }
    let total = words as f64 / wpm;
    let mut minutes = total.floor() as u64;
    let mut seconds = ((total - total.floor()) * 60.0).round() as u64;
    if seconds == 60 {
        minutes += 1;
        seconds = 0;
    }
    let parts: Vec<String> = [(minutes, "min"), (seconds, "sec")]
        .into_iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| format!("{} {}", n, unit))
        .collect();
    if parts.is_empty() {
        "0 min".to_string()
    } else {
        parts.join(" ")
    }
}

pub fn goal_progress(words: usize, target: f64) -> Option<String> {
    if !target.is_finite() || target <= 0.0 {
        return None;
    }
    let progress = (words as f64 / target * 100.0).min(100.0);
    let remaining = (target - words as f64).max(0.0);
    Some(if remaining > 0.0 {
        format!(
            "{:.1}% of {} words · {} to go",
            progress,
            format_fixed(target, 0),
            format_fixed(remaining, 0)
        )
    } else {
        format!("Target met! {} words", format_fixed(words as f64, 0))
    })
}

pub struct WordCounter;

#[async_trait]
impl Calculator for WordCounter {
    fn key(&self) -> &'static str {
        "word-counter"
    }

    async fn run(&self, form: &Form, _env: &Env) -> Result<Card> {
        let text = form.raw("text").unwrap_or_default();
        let stats = analyze(text);
        let reading = form.value_or("reading_wpm", DEFAULT_READING_WPM).max(1.0);
        let speaking = form.value_or("speaking_wpm", DEFAULT_SPEAKING_WPM).max(1.0);
        let count = |n: usize| format_fixed(n as f64, 0);

        let mut card = Card::untitled()
            .stat("Words", count(stats.words))
            .stat("Characters", count(stats.characters))
            .stat("Characters (no spaces)", count(stats.characters_no_spaces))
            .stat("Sentences", count(stats.sentences))
            .stat("Paragraphs", count(stats.paragraphs))
            .stat("Reading time", duration_label(stats.words, reading))
            .stat("Speaking time", duration_label(stats.words, speaking));
        if let Some(progress) = goal_progress(stats.words, form.value_or("target", 0.0)) {
            card = card.note(format!("Word goal progress: {}", progress));
        }
        card.data(&stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let stats = analyze("Hello there. How are you?\n\nFine!  Thanks...");
        assert_eq!(stats.words, 7);
        assert_eq!(stats.sentences, 4);
        assert_eq!(stats.paragraphs, 2);
        assert_eq!(stats.characters_no_spaces, 35);
    }

    #[test]
    fn test_blank_input() {
        let stats = analyze("   \n ");
        assert_eq!(stats.words, 0);
        assert_eq!(stats.characters, 5);
        assert_eq!(duration_label(0, 200.0), "0 min");
    }

    #[test]
    fn test_durations() {
        assert_eq!(duration_label(500, 200.0), "2 min 30 sec");
        assert_eq!(duration_label(50, 200.0), "15 sec");
        assert_eq!(duration_label(399, 200.0), "2 min");
    }

    #[test]
    fn test_goal() {
        assert_eq!(goal_progress(250, 1000.0).unwrap(), "25.0% of 1,000 words · 750 to go");
        assert_eq!(goal_progress(1200, 1000.0).unwrap(), "Target met! 1,200 words");
        assert!(goal_progress(10, 0.0).is_none());
    }
}
