pub mod ui;

use chrono::{Local, NaiveDate};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use gallows::{
    app_dirs::AppDirs,
    catalog::{Difficulty, WordCatalog},
    config::{Config, ConfigStore, FileConfigStore},
    definition::{self, DictionaryApi},
    error::GameError,
    profile::ProfileStore,
    rng::{RandomSource, ThreadRandom},
    runtime::{Countdown, CrosstermEventSource, FixedTicker, GameEvent, Runner},
    session::{share_text, Effect, GameMode, GameSession, Sound},
    store::SqliteProfileStore,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Write},
    path::PathBuf,
    sync::mpsc::Receiver,
    time::{Duration, Instant},
};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use webbrowser::Browser;

const TICK_RATE_MS: u64 = 100;
const VOLUME_STEP: f32 = 0.1;
const LOG_ENV: &str = "GALLOWS_LOG";

/// hangman in the terminal: classic rounds, a daily word, and a timed rush
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// difficulty for classic rounds (overrides the config file)
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// jump straight into a classic round from this category
    #[clap(short = 'c', long)]
    category: Option<String>,

    /// start today's daily challenge
    #[clap(long, conflicts_with_all = ["rush", "category"])]
    daily: bool,

    /// start a timed rush
    #[clap(long, conflicts_with = "category")]
    rush: bool,

    /// don't look up word definitions after a round
    #[clap(long)]
    no_definitions: bool,

    /// profile database to use instead of the default one
    #[clap(long, value_name = "PATH")]
    profile: Option<PathBuf>,
}

impl Cli {
    /// CLI flags win over the config file.
    fn merge(&self, mut config: Config) -> Config {
        if let Some(difficulty) = self.difficulty {
            config.default_difficulty = difficulty;
        }
        if let Some(category) = &self.category {
            config.default_category = Some(category.clone());
        }
        if self.no_definitions {
            config.lookup_definitions = false;
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Category,
    Difficulty,
    Playing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    Outcome,
    ConfirmQuit,
    Stats,
    Settings,
    Tutorial,
    DailyPlayed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Classic,
    Daily,
    Rush,
    Stats,
    Settings,
    Tutorial,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 7] = [
        MenuItem::Classic,
        MenuItem::Daily,
        MenuItem::Rush,
        MenuItem::Stats,
        MenuItem::Settings,
        MenuItem::Tutorial,
        MenuItem::Quit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::Classic => "(c)lassic",
            MenuItem::Daily => "(d)aily challenge",
            MenuItem::Rush => "(r)ush",
            MenuItem::Stats => "(s)tats",
            MenuItem::Settings => "(o)ptions",
            MenuItem::Tutorial => "(h)ow to play",
            MenuItem::Quit => "(q)uit",
        }
    }
}

pub struct App<S: ProfileStore = SqliteProfileStore, R: RandomSource = ThreadRandom> {
    pub session: GameSession<S, R>,
    pub config: Config,
    pub screen: Screen,
    pub modal: Option<Modal>,
    pub menu_cursor: usize,
    pub category_cursor: usize,
    pub difficulty_cursor: usize,
    pub selected_category: Option<String>,
    /// Text shown under the outcome headline; `None` while loading
    pub definition: Option<String>,
    pub status: Option<String>,
    pub should_quit: bool,
    countdown: Countdown,
    definition_rx: Option<Receiver<(String, String)>>,
    pending_sounds: Vec<Sound>,
}

impl<S: ProfileStore, R: RandomSource> App<S, R> {
    pub fn new(session: GameSession<S, R>, config: Config) -> Self {
        let difficulty_cursor = Difficulty::ALL
            .iter()
            .position(|d| *d == config.default_difficulty)
            .unwrap_or(0);
        Self {
            session,
            config,
            screen: Screen::Menu,
            modal: None,
            menu_cursor: 0,
            category_cursor: 0,
            difficulty_cursor,
            selected_category: None,
            definition: None,
            status: None,
            should_quit: false,
            countdown: Countdown::new(),
            definition_rx: None,
            pending_sounds: Vec::new(),
        }
    }

    pub fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn difficulty(&self) -> Difficulty {
        Difficulty::ALL[self.difficulty_cursor.min(Difficulty::ALL.len() - 1)]
    }

    /// Applies the startup mode requested on the command line.
    pub fn start_from_cli(&mut self, cli: &Cli) {
        if cli.daily {
            self.start_daily(Self::today());
        } else if cli.rush {
            self.start_rush();
        } else if let Some(category) = &cli.category {
            self.start_classic(category.clone(), self.config.default_difficulty);
        }
    }

    pub fn start_classic(&mut self, category: String, difficulty: Difficulty) {
        let result = self.session.start_classic(&category, difficulty);
        if self.run(result) {
            self.selected_category = Some(category);
            self.enter_round();
        }
    }

    pub fn start_daily(&mut self, today: NaiveDate) {
        let result = self.session.start_daily_challenge(today);
        if self.run(result) {
            self.enter_round();
        }
    }

    pub fn start_rush(&mut self) {
        let result = self.session.start_timed_rush();
        if self.run(result) {
            self.enter_round();
        }
    }

    fn enter_round(&mut self) {
        self.screen = Screen::Playing;
        self.modal = None;
        self.status = None;
        self.definition = None;
        self.definition_rx = None;
    }

    /// Runs the effects of a successful command. Returns false on error.
    fn run(&mut self, result: gallows::Result<Vec<Effect>>) -> bool {
        match result {
            Ok(effects) => {
                self.apply(effects);
                true
            }
            Err(GameError::AlreadyPlayedToday(_)) => {
                self.modal = Some(Modal::DailyPlayed);
                false
            }
            Err(GameError::NoActiveRound) => false,
            Err(e) => {
                self.status = Some(e.to_string());
                false
            }
        }
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        self.countdown.apply(&effects);
        for effect in effects {
            match effect {
                Effect::PlaySound(sound) => {
                    let profile = self.session.profile();
                    if !profile.is_muted && profile.volume > 0.0 {
                        self.pending_sounds.push(sound);
                    }
                }
                Effect::RoundOver(summary) => {
                    self.modal = Some(Modal::Outcome);
                    self.definition = None;
                    self.definition_rx = None;
                    if self.config.lookup_definitions && !summary.word.is_empty() {
                        self.lookup_definition(summary.word);
                    } else {
                        self.definition = Some(String::new());
                    }
                }
                Effect::Render | Effect::StartTimer(_) | Effect::CancelTimer => {}
                Effect::Persist(_) => {}
            }
        }
    }

    fn lookup_definition(&mut self, word: String) {
        let timeout = Duration::from_secs(self.config.definition_timeout_secs);
        match DictionaryApi::new(timeout) {
            Ok(api) => self.definition_rx = Some(definition::spawn_lookup(api, word)),
            Err(e) => {
                warn!(error = %e, "dictionary client unavailable");
                self.definition = Some(definition::UNAVAILABLE.to_string());
            }
        }
    }

    /// Advances wall-clock time: fires due timer ticks and collects any
    /// finished definition lookup.
    pub fn on_tick(&mut self, elapsed: Duration) {
        for token in self.countdown.advance(elapsed) {
            let result = self.session.tick(token);
            self.run(result);
        }

        let received = self
            .definition_rx
            .as_ref()
            .and_then(|rx| rx.try_recv().ok());
        if let Some((word, text)) = received {
            let current = self
                .session
                .state()
                .last_summary
                .as_ref()
                .map(|s| s.word.as_str());
            if current == Some(word.as_str()) {
                self.definition = Some(text);
            }
            self.definition_rx = None;
        }
    }

    pub fn take_sounds(&mut self) -> Vec<Sound> {
        std::mem::take(&mut self.pending_sounds)
    }

    pub fn timer_running(&self) -> bool {
        self.countdown.is_armed()
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if let Some(modal) = self.modal {
            self.on_modal_key(modal, key.code);
            return;
        }

        match self.screen {
            Screen::Menu => self.on_menu_key(key.code),
            Screen::Category => self.on_category_key(key.code),
            Screen::Difficulty => self.on_difficulty_key(key.code),
            Screen::Playing => self.on_game_key(key.code),
        }
    }

    fn on_menu_key(&mut self, code: KeyCode) {
        let item = match code {
            KeyCode::Up => {
                self.menu_cursor = self.menu_cursor.saturating_sub(1);
                return;
            }
            KeyCode::Down => {
                self.menu_cursor = (self.menu_cursor + 1).min(MenuItem::ALL.len() - 1);
                return;
            }
            KeyCode::Enter => MenuItem::ALL[self.menu_cursor],
            KeyCode::Char('c') => MenuItem::Classic,
            KeyCode::Char('d') => MenuItem::Daily,
            KeyCode::Char('r') => MenuItem::Rush,
            KeyCode::Char('s') => MenuItem::Stats,
            KeyCode::Char('o') => MenuItem::Settings,
            KeyCode::Char('h') | KeyCode::Char('?') => MenuItem::Tutorial,
            KeyCode::Char('q') | KeyCode::Esc => MenuItem::Quit,
            _ => return,
        };

        self.status = None;
        match item {
            MenuItem::Classic => {
                self.category_cursor = self
                    .config
                    .default_category
                    .as_deref()
                    .and_then(|id| {
                        self.session
                            .catalog()
                            .categories()
                            .iter()
                            .position(|c| c.id == id)
                    })
                    .unwrap_or(0);
                self.screen = Screen::Category;
            }
            MenuItem::Daily => self.start_daily(Self::today()),
            MenuItem::Rush => self.start_rush(),
            MenuItem::Stats => self.modal = Some(Modal::Stats),
            MenuItem::Settings => self.modal = Some(Modal::Settings),
            MenuItem::Tutorial => self.modal = Some(Modal::Tutorial),
            MenuItem::Quit => self.should_quit = true,
        }
    }

    fn on_category_key(&mut self, code: KeyCode) {
        let count = self.session.catalog().categories().len();
        match code {
            KeyCode::Up => self.category_cursor = self.category_cursor.saturating_sub(1),
            KeyCode::Down => {
                self.category_cursor = (self.category_cursor + 1).min(count.saturating_sub(1))
            }
            KeyCode::Enter => {
                if let Some(category) = self.session.catalog().categories().get(self.category_cursor)
                {
                    self.selected_category = Some(category.id.clone());
                    self.screen = Screen::Difficulty;
                }
            }
            KeyCode::Esc => self.screen = Screen::Menu,
            _ => {}
        }
    }

    fn on_difficulty_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.difficulty_cursor = self.difficulty_cursor.saturating_sub(1),
            KeyCode::Down => {
                self.difficulty_cursor = (self.difficulty_cursor + 1).min(Difficulty::ALL.len() - 1)
            }
            KeyCode::Enter => {
                if let Some(category) = self.selected_category.clone() {
                    self.start_classic(category, self.difficulty());
                }
            }
            KeyCode::Esc => self.screen = Screen::Category,
            _ => {}
        }
    }

    fn on_game_key(&mut self, code: KeyCode) {
        let result = match code {
            KeyCode::Char(c) if c.is_ascii_alphabetic() => self.session.submit_guess(c),
            KeyCode::Char('1') | KeyCode::Tab => self.session.consume_hint(),
            KeyCode::Char('2') => self.session.reveal_word(),
            KeyCode::Char('3') => self.session.toggle_mute(),
            KeyCode::Esc => {
                if self.session.state().is_playing() {
                    self.modal = Some(Modal::ConfirmQuit);
                } else {
                    self.leave_round();
                }
                return;
            }
            _ => return,
        };
        self.run(result);
    }

    fn on_modal_key(&mut self, modal: Modal, code: KeyCode) {
        match modal {
            Modal::Outcome => match code {
                KeyCode::Enter | KeyCode::Char('p') => self.play_again(),
                KeyCode::Char('s') => self.share(),
                KeyCode::Esc | KeyCode::Char('m') => self.leave_round(),
                _ => {}
            },
            Modal::ConfirmQuit => match code {
                KeyCode::Char('y') | KeyCode::Enter => self.leave_round(),
                KeyCode::Char('n') | KeyCode::Esc => self.modal = None,
                _ => {}
            },
            Modal::Stats => match code {
                KeyCode::Char('r') => {
                    let result = self.session.reset_stats();
                    self.run(result);
                }
                _ => self.modal = None,
            },
            Modal::Settings => {
                let result = match code {
                    KeyCode::Char('m') => self.session.toggle_mute(),
                    KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => {
                        let volume = self.session.profile().volume + VOLUME_STEP;
                        self.session.set_volume(volume)
                    }
                    KeyCode::Char('-') | KeyCode::Left => {
                        let volume = self.session.profile().volume - VOLUME_STEP;
                        self.session.set_volume(volume)
                    }
                    KeyCode::Char('t') => {
                        let theme = self.session.profile().theme.toggled();
                        self.session.set_theme(theme)
                    }
                    KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
                        self.modal = None;
                        return;
                    }
                    _ => return,
                };
                self.run(result);
            }
            Modal::Tutorial | Modal::DailyPlayed => self.modal = None,
        }
    }

    fn play_again(&mut self) {
        match self.session.state().mode {
            GameMode::Classic => {
                let Some(category) = self.selected_category.clone() else {
                    self.leave_round();
                    return;
                };
                let difficulty = self
                    .session
                    .state()
                    .difficulty
                    .unwrap_or_else(|| self.difficulty());
                let result = self.session.continue_classic(&category, difficulty);
                if self.run(result) {
                    self.enter_round();
                }
            }
            GameMode::TimedRush => self.start_rush(),
            GameMode::DailyChallenge => self.leave_round(),
        }
    }

    fn leave_round(&mut self) {
        let result = self.session.quit_round();
        self.run(result);
        self.modal = None;
        self.definition_rx = None;
        self.screen = Screen::Menu;
    }

    fn share(&mut self) {
        let high_score = self.session.profile().high_score;
        let text = share_text(high_score);
        let opened = Browser::is_available()
            && reqwest::Url::parse_with_params("https://twitter.com/intent/tweet", &[("text", &text)])
                .map(|url| webbrowser::open(url.as_str()).is_ok())
                .unwrap_or(false);
        if !opened {
            self.status = Some(text);
        }
    }
}

fn init_logging() -> Option<WorkerGuard> {
    let dir = AppDirs::log_dir()?;
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("logging disabled: {e}");
        return None;
    }
    let appender = tracing_appender::rolling::daily(dir, "gallows.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let _guard = init_logging();
    let config_store = FileConfigStore::new();
    if !config_store.path().exists() {
        if let Err(e) = config_store.save(&Config::default()) {
            warn!(error = %e, "could not write default config");
        }
    }
    let config = cli.merge(config_store.load());
    let store = match &cli.profile {
        Some(path) => SqliteProfileStore::open(path)?,
        None => SqliteProfileStore::new()?,
    };
    let session = GameSession::new(WordCatalog::builtin(), store, ThreadRandom);
    let mut app = App::new(session, config);
    info!("gallows started");
    app.start_from_cli(&cli);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, S: ProfileStore, R: RandomSource>(
    terminal: &mut Terminal<B>,
    app: &mut App<S, R>,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let mut last = Instant::now();

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    while !app.should_quit {
        let event = runner.step();

        let now = Instant::now();
        app.on_tick(now - last);
        last = now;

        if let GameEvent::Key(key) = event {
            app.on_key(key);
        }

        ring(app.take_sounds());
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }

    info!("gallows exiting");
    Ok(())
}

/// The terminal bell stands in for every sound.
fn ring(sounds: Vec<Sound>) {
    if sounds.is_empty() {
        return;
    }
    let mut stdout = io::stdout();
    let _ = stdout.write_all(b"\x07");
    let _ = stdout.flush();
}
