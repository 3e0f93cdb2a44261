//! Achievement tracking for Tetrion.
//!
//! A fixed catalog of [`AchievementDefinition`]s is evaluated against
//! [`StatsSnapshot`]s. The [`AchievementEngine`] owns the unlock state,
//! persists it through a [`tetrion_store::KeyValueStore`], and reports save
//! failures as observable state instead of errors.
//!
//! ```
//! use tetrion_achievements::{AchievementEngine, GameEvent};
//! use tetrion_store::MemoryStore;
//!
//! let mut engine = AchievementEngine::new(MemoryStore::new());
//! engine.handle_event(GameEvent::GameStarted);
//! engine.handle_event(GameEvent::LinesCleared(1));
//!
//! assert!(engine.is_unlocked("first_line"));
//! assert_eq!(engine.take_notifications().len(), 1);
//! ```

pub use self::{catalog::*, condition::*, engine::*, stats::*};

mod catalog;
mod condition;
mod engine;
mod stats;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("unknown stat name `{name}`")]
pub struct UnknownStatError {
    name: String,
}
