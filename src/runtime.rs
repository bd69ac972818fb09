//! Event plumbing between the terminal and the game loop, kept apart from
//! the UI so the loop can be driven headless in tests.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

use crate::session::{Effect, TimerToken};

#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    Resize,
    /// Nothing arrived within one loop interval
    Tick,
}

pub trait EventSource: Send + 'static {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError>;
}

/// Reads the terminal on a background thread. Key releases are dropped so a
/// guess is only counted once on platforms that report them.
pub struct CrosstermEventSource {
    rx: Receiver<GameEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => GameEvent::Key(key),
                Ok(Event::Resize(_, _)) => GameEvent::Resize,
                Ok(_) => continue,
                Err(_) => break,
            };
            if tx.send(forwarded).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Scripted events fed through a channel, for headless tests
pub struct TestEventSource {
    rx: Receiver<GameEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<GameEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

pub struct Runner<E: EventSource, T: Ticker> {
    events: E,
    ticker: T,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(events: E, ticker: T) -> Self {
        Self { events, ticker }
    }

    /// Waits one interval for input; a quiet interval, or a closed source,
    /// yields `Tick`.
    pub fn step(&self) -> GameEvent {
        self.events
            .recv_timeout(self.ticker.interval())
            .unwrap_or(GameEvent::Tick)
    }
}

const SECOND: Duration = Duration::from_secs(1);

/// Turns loop time into whole-second ticks for the armed timer token.
#[derive(Debug, Default, Clone)]
pub struct Countdown {
    token: Option<TimerToken>,
    accumulated: Duration,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any armed timer; the next tick is a full second away.
    pub fn arm(&mut self, token: TimerToken) {
        self.token = Some(token);
        self.accumulated = Duration::ZERO;
    }

    pub fn disarm(&mut self) {
        self.token = None;
        self.accumulated = Duration::ZERO;
    }

    pub fn is_armed(&self) -> bool {
        self.token.is_some()
    }

    /// Applies timer effects from a session transition.
    pub fn apply(&mut self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::StartTimer(token) => self.arm(*token),
                Effect::CancelTimer => self.disarm(),
                _ => {}
            }
        }
    }

    /// One token per elapsed whole second.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<TimerToken> {
        let Some(token) = self.token else {
            return Vec::new();
        };
        self.accumulated += elapsed;
        let mut due = Vec::new();
        while self.accumulated >= SECOND {
            self.accumulated -= SECOND;
            due.push(token);
        }
        due
    }
}
