//! Word definitions from the public dictionary API, looked up off the UI
//! thread once a round is over.

use serde::Deserialize;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

const DICTIONARY_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";

pub const NO_DEFINITION: &str = "No definition found for this word.";
pub const UNAVAILABLE: &str = "Could not retrieve definition at this time.";

#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("no definition for `{0}`")]
    NotFound(String),
    #[error("definition request failed: {0}")]
    Unavailable(String),
}

pub trait DefinitionSource: Send + 'static {
    fn lookup(&self, word: &str) -> Result<String, DefinitionError>;
}

#[derive(Deserialize)]
struct Entry {
    #[serde(default)]
    meanings: Vec<Meaning>,
}

#[derive(Deserialize)]
struct Meaning {
    #[serde(default)]
    definitions: Vec<Sense>,
}

#[derive(Deserialize)]
struct Sense {
    definition: Option<String>,
}

/// First definition of the first meaning of the first entry.
pub fn parse_definition(word: &str, body: &str) -> Result<String, DefinitionError> {
    let entries: Vec<Entry> =
        serde_json::from_str(body).map_err(|e| DefinitionError::Unavailable(e.to_string()))?;

    entries
        .first()
        .and_then(|entry| entry.meanings.first())
        .and_then(|meaning| meaning.definitions.first())
        .and_then(|sense| sense.definition.clone())
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| DefinitionError::NotFound(word.to_string()))
}

pub struct DictionaryApi {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl DictionaryApi {
    pub fn new(timeout: Duration) -> Result<Self, DefinitionError> {
        Self::with_base_url(DICTIONARY_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, DefinitionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DefinitionError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl DefinitionSource for DictionaryApi {
    fn lookup(&self, word: &str) -> Result<String, DefinitionError> {
        let url = format!("{}/{}", self.base_url, word);
        debug!(%url, "looking up definition");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| DefinitionError::Unavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(DefinitionError::NotFound(word.to_string()));
        }
        let body = response
            .text()
            .map_err(|e| DefinitionError::Unavailable(e.to_string()))?;
        parse_definition(word, &body)
    }
}

/// Always yields display text, falling back to a fixed message.
pub fn fetch_definition(source: &dyn DefinitionSource, word: &str) -> String {
    match source.lookup(word) {
        Ok(definition) => definition,
        Err(DefinitionError::NotFound(_)) => NO_DEFINITION.to_string(),
        Err(e) => {
            warn!(%word, error = %e, "definition lookup failed");
            UNAVAILABLE.to_string()
        }
    }
}

/// Runs the lookup on a worker thread; the receiver gets exactly one message.
pub fn spawn_lookup<D: DefinitionSource>(source: D, word: String) -> Receiver<(String, String)> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let text = fetch_definition(&source, &word);
        let _ = tx.send((word, text));
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Canned(Result<&'static str, &'static str>);

    impl DefinitionSource for Canned {
        fn lookup(&self, word: &str) -> Result<String, DefinitionError> {
            match self.0 {
                Ok(body) => parse_definition(word, body),
                Err(reason) => Err(DefinitionError::Unavailable(reason.to_string())),
            }
        }
    }

    const GRAVITY: &str = r#"[{
        "word": "gravity",
        "phonetics": [],
        "meanings": [
            {"partOfSpeech": "noun", "definitions": [
                {"definition": "Resultant force on Earth's surface.", "synonyms": []},
                {"definition": "Seriousness."}
            ]},
            {"partOfSpeech": "adjective", "definitions": [{"definition": "Unused."}]}
        ]
    }]"#;

    #[test]
    fn test_parse_takes_first_definition() {
        assert_eq!(
            parse_definition("gravity", GRAVITY).unwrap(),
            "Resultant force on Earth's surface."
        );
    }

    #[test]
    fn test_parse_empty_entry_is_not_found() {
        assert!(matches!(
            parse_definition("zzz", r#"[{"meanings": []}]"#),
            Err(DefinitionError::NotFound(w)) if w == "zzz"
        ));
        assert!(matches!(
            parse_definition("zzz", "[]"),
            Err(DefinitionError::NotFound(_))
        ));
    }

    #[test]
    fn test_parse_garbage_is_unavailable() {
        assert!(matches!(
            parse_definition("gravity", "<html>"),
            Err(DefinitionError::Unavailable(_))
        ));
    }

    #[test]
    fn test_fetch_fallbacks() {
        assert_eq!(
            fetch_definition(&Canned(Ok(GRAVITY)), "gravity"),
            "Resultant force on Earth's surface."
        );
        assert_eq!(fetch_definition(&Canned(Ok("[]")), "gravity"), NO_DEFINITION);
        assert_eq!(
            fetch_definition(&Canned(Err("offline")), "gravity"),
            UNAVAILABLE
        );
    }

    #[test]
    fn test_spawn_lookup_delivers_once() {
        let rx = spawn_lookup(Canned(Ok(GRAVITY)), "gravity".to_string());
        let (word, text) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(word, "gravity");
        assert_eq!(text, "Resultant force on Earth's surface.");
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }
}
