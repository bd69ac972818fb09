//! Text pieces of the playing screen: the gallows figure, the masked word and
//! the on-screen keyboard.

use gallows::round::{KeyState, Round, MAX_STAGES};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use unicode_width::UnicodeWidthStr;

pub const KEYBOARD_ROWS: [&str; 3] = ["qwertyuiop", "asdfghjkl", "zxcvbnm"];

/// Figure after `stage` wrong guesses, every line padded to the same width
/// so the block stays put when centered.
pub fn gallows_lines(stage: u8) -> Vec<String> {
    let stage = stage.min(MAX_STAGES);
    let part = |min: u8, c: char| if stage >= min { c } else { ' ' };

    let lines = vec![
        "  +---+".to_string(),
        "  |   |".to_string(),
        format!("  {}   |", part(1, 'O')),
        format!(" {}{}{}  |", part(3, '/'), part(2, '|'), part(4, '\\')),
        format!(" {} {}  |", part(5, '/'), part(6, '\\')),
        "      |".to_string(),
        "=========".to_string(),
    ];
    pad_block(lines)
}

pub fn pad_block(lines: Vec<String>) -> Vec<String> {
    let width = lines.iter().map(|l| l.width()).max().unwrap_or(0);
    lines
        .into_iter()
        .map(|l| {
            let pad = width - l.width();
            format!("{l}{}", " ".repeat(pad))
        })
        .collect()
}

/// `_ G _ _ _`; with `reveal` the whole word is shown.
pub fn masked_word(round: &Round, reveal: bool) -> String {
    round
        .masked_word()
        .iter()
        .zip(round.target_word().chars())
        .map(|(slot, actual)| match slot {
            Some(c) => c.to_ascii_uppercase(),
            None if reveal => actual.to_ascii_uppercase(),
            None => '_',
        })
        .map(String::from)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn key_style(state: KeyState) -> Style {
    match state {
        KeyState::Unused => Style::default().add_modifier(Modifier::BOLD),
        KeyState::Correct => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        KeyState::Wrong => Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::DIM | Modifier::CROSSED_OUT),
    }
}

pub fn keyboard_lines(round: &Round) -> Vec<Line<'static>> {
    KEYBOARD_ROWS
        .iter()
        .map(|row| {
            let spans = row
                .chars()
                .map(|c| {
                    Span::styled(
                        format!(" {} ", c.to_ascii_uppercase()),
                        key_style(round.key_state(c)),
                    )
                })
                .collect::<Vec<_>>();
            Line::from(spans)
        })
        .collect()
}
