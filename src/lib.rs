// Library surface for the binary and for headless/integration tests.
pub mod app_dirs;
pub mod catalog;
pub mod config;
pub mod daily;
pub mod definition;
pub mod error;
pub mod profile;
pub mod rng;
pub mod round;
pub mod runtime;
pub mod session;
pub mod store;

pub use catalog::{Difficulty, WordCatalog};
pub use error::{GameError, Result};
pub use profile::{Profile, ProfileStore};
pub use session::{GameSession, share_text};
