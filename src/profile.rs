//! Cross-session player data and the key-value store it lives in.
//!
//! Every field maps to one fixed key. Reads never fail: a missing or
//! unparsable value falls back to its default so a damaged store can't
//! block startup.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKey {
    HighScore,
    DailyStreak,
    BestStreak,
    Stats,
    Volume,
    Muted,
    Theme,
    DailyLastPlayed,
    DailyLastWin,
}

impl ProfileKey {
    pub const ALL: [ProfileKey; 9] = [
        ProfileKey::HighScore,
        ProfileKey::DailyStreak,
        ProfileKey::BestStreak,
        ProfileKey::Stats,
        ProfileKey::Volume,
        ProfileKey::Muted,
        ProfileKey::Theme,
        ProfileKey::DailyLastPlayed,
        ProfileKey::DailyLastWin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKey::HighScore => "highScore",
            ProfileKey::DailyStreak => "dailyChallengeStreak",
            ProfileKey::BestStreak => "bestStreak",
            ProfileKey::Stats => "stats",
            ProfileKey::Volume => "volume",
            ProfileKey::Muted => "muted",
            ProfileKey::Theme => "theme",
            ProfileKey::DailyLastPlayed => "dailyChallengeLastPlayed",
            ProfileKey::DailyLastWin => "dailyChallengeLastWinDate",
        }
    }
}

impl fmt::Display for ProfileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primitive key-value persistence.
pub trait ProfileStore {
    type Error: std::error::Error;

    fn get(&self, key: ProfileKey) -> Result<Option<String>, Self::Error>;
    fn set(&mut self, key: ProfileKey, value: &str) -> Result<(), Self::Error>;
    fn remove(&mut self, key: ProfileKey) -> Result<(), Self::Error>;
}

/// Volatile store for tests and `--no-save` style runs
#[derive(Debug, Default, Clone)]
pub struct MemoryProfileStore {
    values: HashMap<&'static str, String>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: ProfileKey) -> Option<&str> {
        self.values.get(key.as_str()).map(String::as_str)
    }
}

impl ProfileStore for MemoryProfileStore {
    type Error = std::convert::Infallible;

    fn get(&self, key: ProfileKey) -> Result<Option<String>, Self::Error> {
        Ok(self.values.get(key.as_str()).cloned())
    }

    fn set(&mut self, key: ProfileKey, value: &str) -> Result<(), Self::Error> {
        self.values.insert(key.as_str(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: ProfileKey) -> Result<(), Self::Error> {
        self.values.remove(key.as_str());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    pub played: u32,
    pub wins: u32,
}

impl GameStats {
    /// Win percentage rounded to the nearest integer, 0 with no games.
    pub fn win_ratio(&self) -> u32 {
        if self.played == 0 {
            return 0;
        }
        ((self.wins as f64 / self.played as f64) * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DailyRecord {
    pub last_played: Option<NaiveDate>,
    pub last_win: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub high_score: u32,
    pub best_streak: u32,
    pub daily_streak: u32,
    pub stats: GameStats,
    pub is_muted: bool,
    pub volume: f32,
    pub theme: Theme,
    pub daily: DailyRecord,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            high_score: 0,
            best_streak: 0,
            daily_streak: 0,
            stats: GameStats::default(),
            is_muted: false,
            volume: 1.0,
            theme: Theme::Dark,
            daily: DailyRecord::default(),
        }
    }
}

impl Profile {
    pub fn load<S: ProfileStore>(store: &S) -> Self {
        let mut profile = Profile::default();
        for key in ProfileKey::ALL {
            let raw = match store.get(key) {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => {
                    warn!(%key, error = %e, "failed to read profile value, using default");
                    continue;
                }
            };
            if !profile.apply_raw(key, &raw) {
                warn!(%key, value = %raw, "corrupt profile value, using default");
            }
        }
        profile
    }

    /// Writes the given keys. Failures are logged and skipped.
    pub fn save<S: ProfileStore>(&self, store: &mut S, keys: &[ProfileKey]) {
        for &key in keys {
            let result = match self.encode(key) {
                Some(value) => store.set(key, &value),
                None => store.remove(key),
            };
            if let Err(e) = result {
                warn!(%key, error = %e, "failed to persist profile value");
            }
        }
    }

    pub fn save_all<S: ProfileStore>(&self, store: &mut S) {
        self.save(store, &ProfileKey::ALL);
    }

    fn apply_raw(&mut self, key: ProfileKey, raw: &str) -> bool {
        match key {
            ProfileKey::HighScore => parse_into(raw, &mut self.high_score),
            ProfileKey::DailyStreak => parse_into(raw, &mut self.daily_streak),
            ProfileKey::BestStreak => parse_into(raw, &mut self.best_streak),
            ProfileKey::Stats => match serde_json::from_str(raw) {
                Ok(stats) => {
                    self.stats = stats;
                    true
                }
                Err(_) => false,
            },
            ProfileKey::Volume => match raw.parse::<f32>() {
                Ok(v) if v.is_finite() => {
                    self.volume = v.clamp(0.0, 1.0);
                    true
                }
                _ => false,
            },
            ProfileKey::Muted => parse_into(raw, &mut self.is_muted),
            ProfileKey::Theme => match Theme::parse(raw) {
                Some(theme) => {
                    self.theme = theme;
                    true
                }
                None => false,
            },
            ProfileKey::DailyLastPlayed => parse_date_into(raw, &mut self.daily.last_played),
            ProfileKey::DailyLastWin => parse_date_into(raw, &mut self.daily.last_win),
        }
    }

    fn encode(&self, key: ProfileKey) -> Option<String> {
        match key {
            ProfileKey::HighScore => Some(self.high_score.to_string()),
            ProfileKey::DailyStreak => Some(self.daily_streak.to_string()),
            ProfileKey::BestStreak => Some(self.best_streak.to_string()),
            ProfileKey::Stats => {
                Some(serde_json::to_string(&self.stats).unwrap_or_else(|_| "{}".to_string()))
            }
            ProfileKey::Volume => Some(self.volume.to_string()),
            ProfileKey::Muted => Some(self.is_muted.to_string()),
            ProfileKey::Theme => Some(self.theme.as_str().to_string()),
            ProfileKey::DailyLastPlayed => self
                .daily
                .last_played
                .map(|d| d.format(DATE_FORMAT).to_string()),
            ProfileKey::DailyLastWin => self
                .daily
                .last_win
                .map(|d| d.format(DATE_FORMAT).to_string()),
        }
    }
}

fn parse_into<T: std::str::FromStr>(raw: &str, slot: &mut T) -> bool {
    match raw.trim().parse() {
        Ok(v) => {
            *slot = v;
            true
        }
        Err(_) => false,
    }
}

fn parse_date_into(raw: &str, slot: &mut Option<NaiveDate>) -> bool {
    match NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT) {
        Ok(date) => {
            *slot = Some(date);
            true
        }
        Err(_) => false,
    }
}
