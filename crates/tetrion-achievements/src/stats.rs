use std::{collections::BTreeMap, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

use crate::UnknownStatError;

/// Game statistics that achievement conditions can refer to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "camelCase")]
pub enum StatKey {
    #[display("score")]
    Score,
    #[display("level")]
    Level,
    #[display("lines")]
    Lines,
    #[display("combo")]
    Combo,
    /// Seconds of play.
    #[display("timePlayed")]
    TimePlayed,
    /// Four-line clears.
    #[display("tetrises")]
    Tetrises,
}

impl StatKey {
    pub const ALL: [Self; 6] = [
        Self::Score,
        Self::Level,
        Self::Lines,
        Self::Combo,
        Self::TimePlayed,
        Self::Tetrises,
    ];
}

impl FromStr for StatKey {
    type Err = UnknownStatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.to_string() == s)
            .ok_or_else(|| UnknownStatError { name: s.to_owned() })
    }
}

/// A partial mapping of stats to values.
///
/// Stats that are absent never satisfy a condition.
///
/// Deserialization is lenient: unknown stat names and values that are not
/// non-negative integers are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatsSnapshot {
    values: BTreeMap<StatKey, u64>,
}

impl StatsSnapshot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot holding every stat at zero.
    #[must_use]
    pub fn zeroed() -> Self {
        StatKey::ALL.into_iter().map(|key| (key, 0)).collect()
    }

    #[must_use]
    pub fn with(mut self, key: StatKey, value: u64) -> Self {
        self.set(key, value);
        self
    }

    #[must_use]
    pub fn get(&self, key: StatKey) -> Option<u64> {
        self.values.get(&key).copied()
    }

    pub fn set(&mut self, key: StatKey, value: u64) {
        self.values.insert(key, value);
    }

    /// Adds `delta` to the stat, treating an absent stat as zero.
    pub fn add(&mut self, key: StatKey, delta: u64) {
        let value = self.values.entry(key).or_insert(0);
        *value = value.saturating_add(delta);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatKey, u64)> + '_ {
        self.values.iter().map(|(key, value)| (*key, *value))
    }
}

impl FromIterator<(StatKey, u64)> for StatsSnapshot {
    fn from_iter<T: IntoIterator<Item = (StatKey, u64)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<'de> Deserialize<'de> for StatsSnapshot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(name, value)| Some((name.parse().ok()?, value.as_u64()?)))
            .collect())
    }
}

/// Gameplay event fed to [`AchievementEngine::handle_event`].
///
/// [`AchievementEngine::handle_event`]: crate::AchievementEngine::handle_event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A new game began; every tracked stat returns to zero.
    GameStarted,
    /// Rows were cleared by one lock.
    LinesCleared(u64),
    ScoreUpdated { score: u64, level: u64 },
    ComboUpdated(u64),
    /// One second of play elapsed.
    TimeTick,
}

impl StatsSnapshot {
    /// Folds `event` into these running stats.
    pub fn apply(&mut self, event: GameEvent) {
        match event {
            GameEvent::GameStarted => *self = Self::zeroed(),
            GameEvent::LinesCleared(lines) => {
                self.add(StatKey::Lines, lines);
                if lines >= 4 {
                    self.add(StatKey::Tetrises, 1);
                }
            }
            GameEvent::ScoreUpdated { score, level } => {
                self.set(StatKey::Score, score);
                self.set(StatKey::Level, level);
            }
            GameEvent::ComboUpdated(combo) => self.set(StatKey::Combo, combo),
            GameEvent::TimeTick => self.add(StatKey::TimePlayed, 1),
        }
    }
}
