use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{GameError, Result};

static CATALOG_DIR: Dir = include_dir!("src/catalog");

const BUILTIN_FILE: &str = "words.json";

/// Difficulty levels offered for classic rounds
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(GameError::InvalidDifficulty(s.to_string())),
        }
    }
}

/// Time limit and hint policy attached to a difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyProfile {
    pub level: Difficulty,
    /// Seconds per round, 0 means unlimited
    pub time_limit_secs: u32,
    pub hints_enabled: bool,
    pub icon: &'static str,
}

impl DifficultyProfile {
    /// Per-round clock budget, `None` when the round is untimed.
    pub fn clock(&self) -> Option<u32> {
        (self.time_limit_secs > 0).then_some(self.time_limit_secs)
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Category {
    pub id: String,
    pub icon: String,
    pub words: Vec<String>,
}

impl Category {
    /// Capitalized name for menus, e.g. `animals` -> `Animals`
    pub fn display_name(&self) -> String {
        let mut chars = self.id.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

/// Static registry of categories, difficulty profiles and the daily word list.
#[derive(Deserialize, Clone, Debug)]
pub struct WordCatalog {
    categories: Vec<Category>,
    daily: Vec<String>,
}

impl WordCatalog {
    /// The catalog bundled with the binary.
    pub fn builtin() -> Self {
        let file = CATALOG_DIR
            .get_file(BUILTIN_FILE)
            .expect("Catalog file not found");

        let contents = file
            .contents_utf8()
            .expect("Unable to interpret catalog as a string");

        Self::from_json(contents).expect("Bundled catalog is invalid")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: WordCatalog =
            serde_json::from_str(json).map_err(|e| GameError::InvalidCatalog(e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(GameError::InvalidCatalog("no categories".into()));
        }
        for category in &self.categories {
            if category.words.is_empty() {
                return Err(GameError::InvalidCatalog(format!(
                    "category `{}` has no words",
                    category.id
                )));
            }
            validate_words(&category.words)?;
        }
        if self.daily.is_empty() {
            return Err(GameError::InvalidCatalog("daily word list is empty".into()));
        }
        validate_words(&self.daily)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Result<&Category> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| GameError::InvalidCategory(id.to_string()))
    }

    pub fn words_for(&self, id: &str) -> Result<&[String]> {
        self.category(id).map(|c| c.words.as_slice())
    }

    pub fn difficulty_profile(&self, level: Difficulty) -> DifficultyProfile {
        match level {
            Difficulty::Easy => DifficultyProfile {
                level,
                time_limit_secs: 120,
                hints_enabled: true,
                icon: "😊",
            },
            Difficulty::Medium => DifficultyProfile {
                level,
                time_limit_secs: 90,
                hints_enabled: true,
                icon: "🤔",
            },
            Difficulty::Hard => DifficultyProfile {
                level,
                time_limit_secs: 60,
                hints_enabled: false,
                icon: "💀",
            },
        }
    }

    /// Every word of every category, in catalog order.
    pub fn all_words(&self) -> Vec<&str> {
        self.categories
            .iter()
            .flat_map(|c| c.words.iter().map(String::as_str))
            .collect()
    }

    pub fn daily_words(&self) -> &[String] {
        &self.daily
    }

    /// Word of the day: `daily[(y * 10000 + m * 100 + d) % len]`.
    pub fn daily_word_for(&self, date: NaiveDate) -> &str {
        let seed = date.year() as i64 * 10_000 + date.month() as i64 * 100 + date.day() as i64;
        let index = seed.rem_euclid(self.daily.len() as i64) as usize;
        &self.daily[index]
    }
}

impl Default for WordCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate_words(words: &[String]) -> Result<()> {
    match words
        .iter()
        .find(|w| w.is_empty() || !w.chars().all(|c| c.is_ascii_lowercase()))
    {
        Some(bad) => Err(GameError::InvalidCatalog(format!(
            "`{bad}` is not a lowercase alphabetic word"
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = WordCatalog::builtin();

        assert_eq!(catalog.categories().len(), 6);
        assert!(catalog
            .words_for("animals")
            .unwrap()
            .contains(&"elephant".to_string()));
        assert_eq!(catalog.daily_words().len(), 13);
    }

    #[test]
    fn test_unknown_category() {
        let catalog = WordCatalog::builtin();

        assert_eq!(
            catalog.words_for("dinosaurs"),
            Err(GameError::InvalidCategory("dinosaurs".into()))
        );
    }

    #[test]
    fn test_difficulty_profiles() {
        let catalog = WordCatalog::builtin();

        let easy = catalog.difficulty_profile(Difficulty::Easy);
        assert_eq!(easy.time_limit_secs, 120);
        assert!(easy.hints_enabled);
        assert_eq!(easy.clock(), Some(120));

        let medium = catalog.difficulty_profile(Difficulty::Medium);
        assert_eq!(medium.time_limit_secs, 90);
        assert!(medium.hints_enabled);

        let hard = catalog.difficulty_profile(Difficulty::Hard);
        assert_eq!(hard.time_limit_secs, 60);
        assert!(!hard.hints_enabled);
    }

    #[test]
    fn test_difficulty_parse_and_display() {
        assert_eq!("Easy".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert_eq!(" hard ".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!(
            "nightmare".parse::<Difficulty>(),
            Err(GameError::InvalidDifficulty("nightmare".into()))
        );
        assert_eq!(Difficulty::Medium.to_string(), "medium");
    }

    #[test]
    fn test_daily_word_is_deterministic() {
        let catalog = WordCatalog::builtin();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        // 20240101 % 13 == 11
        assert_eq!(catalog.daily_word_for(date), "conscientious");
        assert_eq!(catalog.daily_word_for(date), catalog.daily_word_for(date));

        let next = date.succ_opt().unwrap();
        assert_eq!(catalog.daily_word_for(next), "dichotomy");
    }

    #[test]
    fn test_all_words_pools_categories() {
        let catalog = WordCatalog::builtin();
        let all = catalog.all_words();

        assert_eq!(all.len(), 42);
        assert!(all.contains(&"javascript"));
        assert!(all.contains(&"cricket"));
    }

    #[test]
    fn test_display_name() {
        let catalog = WordCatalog::builtin();
        assert_eq!(catalog.category("food").unwrap().display_name(), "Food");
    }

    #[test]
    fn test_from_json_rejects_bad_words() {
        let json = r#"{ "categories": [{ "id": "x", "icon": "?", "words": ["Hello"] }], "daily": ["ok"] }"#;
        assert!(matches!(
            WordCatalog::from_json(json),
            Err(GameError::InvalidCatalog(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_empty_category() {
        let json = r#"{ "categories": [{ "id": "x", "icon": "?", "words": [] }], "daily": ["ok"] }"#;
        assert!(matches!(
            WordCatalog::from_json(json),
            Err(GameError::InvalidCatalog(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_empty_daily() {
        let json = r#"{ "categories": [{ "id": "x", "icon": "?", "words": ["abc"] }], "daily": [] }"#;
        assert!(matches!(
            WordCatalog::from_json(json),
            Err(GameError::InvalidCatalog(_))
        ));
    }
}
