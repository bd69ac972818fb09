pub mod figure;

use chrono::Local;
use figure::{gallows_lines, keyboard_lines, masked_word};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use webbrowser::Browser;
use unicode_width::UnicodeWidthStr;

use gallows::{
    catalog::Difficulty,
    daily,
    profile::{ProfileStore, Theme},
    rng::RandomSource,
    round::MAX_STAGES,
    session::GameMode,
};

use crate::{App, MenuItem, Modal, Screen};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

const TUTORIAL: [&str; 5] = [
    "Guess the hidden word one letter at a time.",
    "Type letters on your keyboard to guess.",
    "Each incorrect guess draws a part of the hangman. Don't let him be completed!",
    "The difficulty level affects the time limit and whether hints are available.",
    "Good luck!",
];

fn base_style(theme: Theme) -> Style {
    match theme {
        Theme::Dark => Style::default().fg(Color::White).bg(Color::Black),
        Theme::Light => Style::default().fg(Color::Black).bg(Color::White),
    }
}

fn accent(theme: Theme) -> Color {
    match theme {
        Theme::Dark => Color::Cyan,
        Theme::Light => Color::Blue,
    }
}

/// Rect of `width` x `height` in the middle of `area`, clipped to it.
fn centered(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Popup sized to its widest line plus borders.
fn popup_area(lines: &[Line], area: Rect) -> Rect {
    let widest = lines.iter().map(|l| l.width()).max().unwrap_or(0) as u16;
    centered(widest.max(30) + 4, lines.len() as u16 + 2, area)
}

impl<S: ProfileStore, R: RandomSource> Widget for &App<S, R> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let theme = self.session.profile().theme;
        buf.set_style(area, base_style(theme));

        match self.screen {
            Screen::Menu => self.render_menu(area, buf),
            Screen::Category => self.render_categories(area, buf),
            Screen::Difficulty => self.render_difficulties(area, buf),
            Screen::Playing => self.render_round(area, buf),
        }

        if let Some(modal) = self.modal {
            self.render_modal(modal, area, buf);
        }
    }
}

impl<S: ProfileStore, R: RandomSource> App<S, R> {
    fn title_style(&self) -> Style {
        let theme = self.session.profile().theme;
        Style::default()
            .fg(accent(theme))
            .add_modifier(Modifier::BOLD)
    }

    fn render_list(
        &self,
        title: &str,
        items: Vec<String>,
        cursor: usize,
        area: Rect,
        buf: &mut Buffer,
    ) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let mut lines = vec![
            Line::from(Span::styled(title.to_string(), self.title_style())),
            Line::from(""),
        ];
        lines.extend(items.into_iter().enumerate().map(|(i, item)| {
            if i == cursor {
                Line::from(Span::styled(
                    format!("> {item} <"),
                    bold.add_modifier(Modifier::REVERSED),
                ))
            } else {
                Line::from(Span::styled(item, bold))
            }
        }));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "↑/↓ move   (enter) select   (esc) back",
            Style::default().add_modifier(Modifier::ITALIC),
        )));

        let height = lines.len() as u16;
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(centered(area.width, height, area), buf);
    }

    fn render_menu(&self, area: Rect, buf: &mut Buffer) {
        let profile = self.session.profile();
        let items = MenuItem::ALL.iter().map(|m| m.label().to_string()).collect();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_list("HANGMAN", items, self.menu_cursor, chunks[0], buf);

        Paragraph::new(format!(
            "High score: {}   Daily streak: {}   Best streak: {}",
            profile.high_score, profile.daily_streak, profile.best_streak
        ))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

        if let Some(status) = &self.status {
            Paragraph::new(Span::styled(
                status.as_str(),
                Style::default().fg(Color::Yellow),
            ))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
        }
    }

    fn render_categories(&self, area: Rect, buf: &mut Buffer) {
        let items = self
            .session
            .catalog()
            .categories()
            .iter()
            .map(|c| format!("{} {}", c.icon, c.display_name()))
            .collect();
        self.render_list("Choose a category", items, self.category_cursor, area, buf);
    }

    fn render_difficulties(&self, area: Rect, buf: &mut Buffer) {
        let catalog = self.session.catalog();
        let items = Difficulty::ALL
            .iter()
            .map(|d| {
                let profile = catalog.difficulty_profile(*d);
                format!(
                    "{} {}  {}s  {}",
                    profile.icon,
                    d,
                    profile.time_limit_secs,
                    if profile.hints_enabled { "hints" } else { "no hints" }
                )
            })
            .collect();
        self.render_list("Choose a difficulty", items, self.difficulty_cursor, area, buf);
    }

    fn render_round(&self, area: Rect, buf: &mut Buffer) {
        let Some(round) = self.session.round() else {
            return;
        };
        let state = self.session.state();
        let profile = self.session.profile();
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let dim = Style::default().add_modifier(Modifier::DIM);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // header
                Constraint::Length(1), // clock
                Constraint::Min(7),    // gallows
                Constraint::Length(2), // word
                Constraint::Length(1), // wrong count
                Constraint::Length(4), // keyboard
                Constraint::Length(1), // legend
            ])
            .split(area);

        let mode = match state.mode {
            GameMode::Classic => {
                let category = state
                    .category
                    .as_deref()
                    .and_then(|id| self.session.catalog().category(id).ok())
                    .map(|c| format!("{} {}", c.icon, c.display_name()))
                    .unwrap_or_default();
                let difficulty = state.difficulty.map(|d| d.to_string()).unwrap_or_default();
                format!("Classic  {category}  {difficulty}")
            }
            GameMode::DailyChallenge => format!("Daily challenge  streak {}", profile.daily_streak),
            GameMode::TimedRush => format!("Timed rush  streak {}", state.timed_rush_streak),
        };
        Paragraph::new(Line::from(vec![
            Span::styled(mode, self.title_style()),
            Span::raw(format!(
                "   Score: {}   High score: {}",
                state.current_score, profile.high_score
            )),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        let clock = match (state.rush_remaining_secs, round.remaining_secs()) {
            (Some(secs), _) => Some(format!("Rush: {secs}s")),
            (None, Some(secs)) => Some(format!("Time: {secs}s")),
            (None, None) => None,
        };
        if let Some(clock) = clock {
            let warn = state.rush_remaining_secs.unwrap_or(u32::MAX) <= 5
                || round.remaining_secs().unwrap_or(u32::MAX) <= 10;
            let style = if warn { bold.fg(Color::Red) } else { bold };
            Paragraph::new(Span::styled(clock, style))
                .alignment(Alignment::Center)
                .render(chunks[1], buf);
        }

        let figure = gallows_lines(round.wrong_guess_count());
        let figure_width = figure.iter().map(|l| l.width()).max().unwrap_or(0) as u16;
        let figure_height = figure.len() as u16;
        Paragraph::new(figure.into_iter().map(Line::from).collect::<Vec<_>>())
            .style(bold)
            .render(centered(figure_width, figure_height, chunks[2]), buf);

        Paragraph::new(Span::styled(
            masked_word(round, round.is_finished()),
            bold.fg(accent(profile.theme)),
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

        Paragraph::new(Span::styled(
            format!("Wrong: {}/{}", round.wrong_guess_count(), MAX_STAGES),
            dim,
        ))
        .alignment(Alignment::Center)
        .render(chunks[4], buf);

        Paragraph::new(keyboard_lines(round))
            .alignment(Alignment::Center)
            .render(chunks[5], buf);

        let hint = if round.hint_available() { "(1) hint   " } else { "" };
        let sound = if profile.is_muted { "unmute" } else { "mute" };
        Paragraph::new(Span::styled(
            format!("type to guess   {hint}(2) reveal   (3) {sound}   (esc) quit"),
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[6], buf);
    }

    fn modal_lines(&self, modal: Modal) -> (&'static str, Vec<Line<'static>>) {
        let profile = self.session.profile();
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let italic = Style::default().add_modifier(Modifier::ITALIC);

        match modal {
            Modal::Outcome => {
                let mut lines = Vec::new();
                if let Some(summary) = &self.session.state().last_summary {
                    let colour = if summary.outcome.is_win() {
                        Color::Green
                    } else {
                        Color::Red
                    };
                    lines.push(Line::from(Span::styled(summary.headline(), bold.fg(colour))));
                    lines.push(Line::from(""));
                    if !summary.word.is_empty() {
                        lines.push(Line::from(vec![
                            Span::raw("The word was: "),
                            Span::styled(summary.word.to_uppercase(), bold),
                        ]));
                    }
                    match &self.definition {
                        Some(text) if text.is_empty() => {}
                        Some(text) => lines.push(Line::from(Span::styled(text.clone(), italic))),
                        None => lines.push(Line::from(Span::styled(
                            "Looking up definition...",
                            italic,
                        ))),
                    }
                    lines.push(Line::from(""));
                    lines.push(Line::from(format!(
                        "Score: {}   High score: {}",
                        summary.score, summary.high_score
                    )));
                    if summary.mode == GameMode::DailyChallenge {
                        lines.push(Line::from(format!("Daily streak: {}", summary.daily_streak)));
                    }
                    if summary.new_high_score {
                        lines.push(Line::from(Span::styled("New high score!", bold.fg(Color::Yellow))));
                    }
                    lines.push(Line::from(""));
                    let again = if summary.mode == GameMode::DailyChallenge {
                        "(m)enu"
                    } else {
                        "(p)lay again   (m)enu"
                    };
                    let share = if summary.new_high_score && Browser::is_available() {
                        "   (s)hare"
                    } else {
                        ""
                    };
                    lines.push(Line::from(Span::styled(format!("{again}{share}"), italic)));
                }
                ("Round over", lines)
            }
            Modal::ConfirmQuit => (
                "Quit?",
                vec![
                    Line::from(Span::styled("Are you sure you want to quit?", bold)),
                    Line::from("You will lose your progress for this round."),
                    Line::from(""),
                    Line::from(Span::styled("(y)es   (n)o", italic)),
                ],
            ),
            Modal::Stats => (
                "Statistics",
                vec![
                    Line::from(format!("Games played: {}", profile.stats.played)),
                    Line::from(format!("Wins: {}", profile.stats.wins)),
                    Line::from(format!("Win ratio: {}%", profile.stats.win_ratio())),
                    Line::from(format!("High score: {}", profile.high_score)),
                    Line::from(format!("Daily streak: {}", profile.daily_streak)),
                    Line::from(format!("Best daily streak: {}", profile.best_streak)),
                    Line::from(""),
                    Line::from(Span::styled("(r)eset stats   any key to close", italic)),
                ],
            ),
            Modal::Settings => (
                "Settings",
                vec![
                    Line::from(format!(
                        "Sound: {}",
                        if profile.is_muted { "off" } else { "on" }
                    )),
                    Line::from(format!("Volume: {}%", (profile.volume * 100.0).round() as u32)),
                    Line::from(format!(
                        "Theme: {}",
                        match profile.theme {
                            Theme::Dark => "dark",
                            Theme::Light => "light",
                        }
                    )),
                    Line::from(""),
                    Line::from(Span::styled(
                        "(m)ute   (+/-) volume   (t)heme   (esc) close",
                        italic,
                    )),
                ],
            ),
            Modal::Tutorial => {
                let mut lines: Vec<Line> = TUTORIAL.iter().map(|l| Line::from(*l)).collect();
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled("Got it! (any key)", italic)));
                ("How to play", lines)
            }
            Modal::DailyPlayed => (
                "Daily challenge",
                vec![
                    Line::from("You've already played the daily challenge today."),
                    Line::from("Come back tomorrow for a new word!"),
                    Line::from(""),
                    Line::from(Span::styled(
                        daily::countdown_label(Local::now().naive_local()),
                        bold,
                    )),
                ],
            ),
        }
    }

    fn render_modal(&self, modal: Modal, area: Rect, buf: &mut Buffer) {
        let (title, lines) = self.modal_lines(modal);
        let popup = popup_area(&lines, area);
        let theme = self.session.profile().theme;

        Clear.render(popup, buf);
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(Style::default().fg(accent(theme))),
            )
            .style(base_style(theme))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(popup, buf);
    }
}
