use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tetrion_store::{KeyValueStore, Observable, StoreError};

use crate::{ACHIEVEMENTS, AchievementDefinition, GameEvent, Rarity, StatsSnapshot, find_definition};

/// Store key of the persisted unlock map.
pub const ACHIEVEMENTS_KEY: &str = "tetrion.achievements";

const QUOTA_MESSAGE: &str =
    "Storage quota exceeded: achievement progress could not be saved. Free up storage space to keep new unlocks.";

/// Persisted proof of an unlocked achievement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockRecord {
    pub id: String,
    pub unlocked_at: DateTime<Utc>,
    /// Stats that were passed in when the achievement unlocked.
    pub game_stats: StatsSnapshot,
}

/// Unlock waiting to be shown to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: &'static str,
    pub name: &'static str,
    pub rarity: Rarity,
    pub timestamp: DateTime<Utc>,
}

/// Unlock broadcast to subscribers as it happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockEvent {
    pub id: &'static str,
    pub rarity: Rarity,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of the latest write of the unlock map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveStatus {
    /// Human-readable description of the last failure, if any.
    pub error: Option<String>,
    /// The last failure was the store running out of space.
    pub quota_exceeded: bool,
}

impl SaveStatus {
    fn from_result(result: &Result<(), StoreError>) -> Self {
        match result {
            Ok(()) => Self::default(),
            Err(e) if e.is_quota_exceeded() => Self {
                error: Some(QUOTA_MESSAGE.to_owned()),
                quota_exceeded: true,
            },
            Err(e) => Self {
                error: Some(format!("Failed to save achievements: {e}")),
                quota_exceeded: false,
            },
        }
    }
}

/// Unlocked and total achievement counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub unlocked: usize,
    pub total: usize,
}

impl Progress {
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.unlocked as f64 * 100.0 / self.total as f64
    }
}

type Clock = Box<dyn Fn() -> DateTime<Utc>>;
type UnlockListener = Box<dyn FnMut(&UnlockEvent)>;

/// Holds unlock state for the achievement catalog.
///
/// Unlocks are loaded from the store once at construction and written back
/// after every unlock. A failed write never undoes the unlock; it is
/// reported through [`AchievementEngine::save_status`] until the next
/// successful write or [`AchievementEngine::clear_save_error`].
pub struct AchievementEngine<S> {
    store: S,
    clock: Clock,
    unlocked: BTreeMap<String, UnlockRecord>,
    notifications: Vec<Notification>,
    listeners: Vec<UnlockListener>,
    save_status: Observable<SaveStatus>,
    tracked_stats: StatsSnapshot,
}

impl<S> fmt::Debug for AchievementEngine<S>
where
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AchievementEngine")
            .field("store", &self.store)
            .field("unlocked", &self.unlocked)
            .field("notifications", &self.notifications)
            .field("listeners", &self.listeners.len())
            .field("save_status", &self.save_status)
            .field("tracked_stats", &self.tracked_stats)
            .finish_non_exhaustive()
    }
}

fn load_unlocked<S>(store: &S) -> BTreeMap<String, UnlockRecord>
where
    S: KeyValueStore,
{
    let Some(raw) = store.get(ACHIEVEMENTS_KEY) else {
        return BTreeMap::new();
    };
    let entries: BTreeMap<String, serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("ignoring unreadable achievement data: {e}");
            return BTreeMap::new();
        }
    };
    entries
        .into_iter()
        .filter_map(|(id, value)| match serde_json::from_value(value) {
            Ok(record) => Some((id, record)),
            Err(e) => {
                warn!("ignoring unreadable unlock record `{id}`: {e}");
                None
            }
        })
        .collect()
}

impl<S> AchievementEngine<S>
where
    S: KeyValueStore,
{
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Utc::now)
    }

    /// Like [`Self::new`], but timestamps unlocks with `clock`.
    pub fn with_clock<C>(store: S, clock: C) -> Self
    where
        C: Fn() -> DateTime<Utc> + 'static,
    {
        let unlocked = load_unlocked(&store);
        debug!("loaded {} unlocked achievements", unlocked.len());
        Self {
            store,
            clock: Box::new(clock),
            unlocked,
            notifications: Vec::new(),
            listeners: Vec::new(),
            save_status: Observable::default(),
            tracked_stats: StatsSnapshot::zeroed(),
        }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains_key(id)
    }

    #[must_use]
    pub fn unlock_record(&self, id: &str) -> Option<&UnlockRecord> {
        self.unlocked.get(id)
    }

    /// Unlock records ordered by id.
    pub fn unlocked(&self) -> impl Iterator<Item = &UnlockRecord> + '_ {
        self.unlocked.values()
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress {
            unlocked: ACHIEVEMENTS
                .iter()
                .filter(|def| self.is_unlocked(def.id))
                .count(),
            total: ACHIEVEMENTS.len(),
        }
    }

    /// Running stats accumulated from [`Self::handle_event`].
    #[must_use]
    pub fn tracked_stats(&self) -> &StatsSnapshot {
        &self.tracked_stats
    }

    #[must_use]
    pub fn save_status(&self) -> &SaveStatus {
        self.save_status.get()
    }

    #[must_use]
    pub fn last_save_error(&self) -> Option<&str> {
        self.save_status().error.as_deref()
    }

    #[must_use]
    pub fn is_quota_error(&self) -> bool {
        self.save_status().quota_exceeded
    }

    /// Registers a listener called with every save status change.
    pub fn subscribe_save_status<F>(&mut self, listener: F)
    where
        F: FnMut(&SaveStatus) + 'static,
    {
        self.save_status.subscribe(listener);
    }

    /// Registers a listener called for every unlock.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&UnlockEvent) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Drains the notifications not yet shown.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    #[must_use]
    pub fn pending_notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Unlocks every locked achievement whose conditions all hold for `stats`.
    pub fn check_achievements(&mut self, stats: &StatsSnapshot) {
        let satisfied: Vec<_> = ACHIEVEMENTS
            .iter()
            .filter(|def| !self.is_unlocked(def.id) && def.is_satisfied(stats))
            .collect();
        debug!("{} achievements newly satisfied", satisfied.len());
        for def in satisfied {
            self.unlock(def, stats);
        }
    }

    /// Unlocks `id` with `stats` attached. Already unlocked and unknown ids
    /// are ignored.
    pub fn unlock_achievement(&mut self, id: &str, stats: &StatsSnapshot) {
        let Some(def) = find_definition(id) else {
            warn!("ignoring unlock of unknown achievement `{id}`");
            return;
        };
        if self.is_unlocked(def.id) {
            return;
        }
        self.unlock(def, stats);
    }

    /// Folds `event` into the tracked stats and evaluates them.
    pub fn handle_event(&mut self, event: GameEvent) {
        self.tracked_stats.apply(event);
        let stats = self.tracked_stats.clone();
        self.check_achievements(&stats);
    }

    /// Forgets every unlock, both in memory and in the store.
    pub fn reset_achievements(&mut self) {
        self.unlocked.clear();
        self.notifications.clear();
        let result = self.store.remove(ACHIEVEMENTS_KEY);
        if let Err(e) = &result {
            warn!("failed to remove saved achievements: {e}");
        }
        self.save_status.set(SaveStatus::from_result(&result));
        info!("achievements reset");
    }

    pub fn clear_save_error(&mut self) {
        self.save_status.set(SaveStatus::default());
    }

    fn unlock(&mut self, def: &'static AchievementDefinition, stats: &StatsSnapshot) {
        let timestamp = (self.clock)();
        self.unlocked.insert(
            def.id.to_owned(),
            UnlockRecord {
                id: def.id.to_owned(),
                unlocked_at: timestamp,
                game_stats: stats.clone(),
            },
        );
        info!("achievement unlocked: {} ({})", def.name, def.rarity);

        self.notifications.push(Notification {
            id: def.id,
            name: def.name,
            rarity: def.rarity,
            timestamp,
        });
        let event = UnlockEvent {
            id: def.id,
            rarity: def.rarity,
            timestamp,
        };
        for listener in &mut self.listeners {
            listener(&event);
        }

        self.save();
    }

    fn save(&mut self) {
        let result = serde_json::to_string(&self.unlocked)
            .map_err(|source| StoreError::Encode { source })
            .and_then(|json| self.store.set(ACHIEVEMENTS_KEY, &json));
        if let Err(e) = &result {
            warn!("failed to save achievements: {e}");
        }
        self.save_status.set(SaveStatus::from_result(&result));
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use chrono::TimeZone as _;
    use tetrion_store::{MemoryStore, SharedStore};

    use super::*;
    use crate::StatKey;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn engine() -> AchievementEngine<MemoryStore> {
        AchievementEngine::with_clock(MemoryStore::new(), fixed_time)
    }

    fn lines_and_time(lines: u64, time: u64) -> StatsSnapshot {
        StatsSnapshot::new()
            .with(StatKey::Lines, lines)
            .with(StatKey::TimePlayed, time)
    }

    /// Store whose writes fail with a configurable error.
    #[derive(Debug, Default)]
    struct FailingStore {
        inner: MemoryStore,
        fail_with: Option<fn() -> StoreError>,
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            match self.fail_with {
                Some(error) => Err(error()),
                None => self.inner.set(key, value),
            }
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    fn quota_error() -> StoreError {
        StoreError::QuotaExceeded {
            key: ACHIEVEMENTS_KEY.to_owned(),
        }
    }

    fn other_error() -> StoreError {
        StoreError::Unavailable {
            reason: "disk on fire".to_owned(),
        }
    }

    #[test]
    fn test_check_is_idempotent() {
        let mut engine = engine();
        let stats = lines_and_time(1, 10);
        engine.check_achievements(&stats);
        engine.check_achievements(&stats);

        assert!(engine.is_unlocked("first_line"));
        assert_eq!(engine.unlocked().count(), 1);
        assert_eq!(engine.take_notifications().len(), 1);

        engine.check_achievements(&stats);
        assert!(engine.take_notifications().is_empty());
    }

    #[test]
    fn test_empty_snapshot_unlocks_nothing() {
        let mut engine = engine();
        engine.check_achievements(&StatsSnapshot::new());
        assert_eq!(engine.progress().unlocked, 0);
        assert!(engine.pending_notifications().is_empty());
        assert_eq!(engine.store().get(ACHIEVEMENTS_KEY), None);
    }

    #[test]
    fn test_compound_and_law() {
        for (lines, time, expected) in [
            (50, 180, true),
            (50, 240, false),
            (49, 179, false),
            (60, 60, true),
        ] {
            let mut engine = engine();
            engine.check_achievements(&lines_and_time(lines, time));
            assert_eq!(
                engine.is_unlocked("speed_demon"),
                expected,
                "lines={lines} time={time}"
            );
        }
    }

    #[test]
    fn test_conditions_do_not_combine_across_calls() {
        let mut engine = engine();
        engine.check_achievements(&StatsSnapshot::new().with(StatKey::Lines, 50));
        engine.check_achievements(&StatsSnapshot::new().with(StatKey::TimePlayed, 100));
        assert!(!engine.is_unlocked("speed_demon"));
        assert!(engine.is_unlocked("line_apprentice"));
    }

    #[test]
    fn test_unlock_records_metadata() {
        let mut engine = engine();
        let stats = StatsSnapshot::new().with(StatKey::Score, 12);
        engine.unlock_achievement("marathon", &stats);

        let record = engine.unlock_record("marathon").unwrap();
        assert_eq!(record.unlocked_at, fixed_time());
        assert_eq!(record.game_stats, stats);

        let notifications = engine.take_notifications();
        assert_eq!(
            notifications,
            [Notification {
                id: "marathon",
                name: "Marathon",
                rarity: Rarity::Rare,
                timestamp: fixed_time(),
            }]
        );
    }

    #[test]
    fn test_unknown_and_repeated_unlocks_are_ignored() {
        let mut engine = engine();
        engine.unlock_achievement("not_in_catalog", &StatsSnapshot::new());
        assert!(!engine.is_unlocked("not_in_catalog"));

        engine.unlock_achievement("first_line", &StatsSnapshot::new());
        engine.unlock_achievement("first_line", &lines_and_time(3, 3));
        assert_eq!(engine.pending_notifications().len(), 1);
        assert!(
            engine
                .unlock_record("first_line")
                .unwrap()
                .game_stats
                .is_empty()
        );
    }

    #[test]
    fn test_listeners_receive_unlock_events() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut engine = engine();
        engine.subscribe({
            let events = Rc::clone(&events);
            move |event| events.borrow_mut().push(*event)
        });

        engine.check_achievements(&lines_and_time(50, 100));

        let ids: Vec<_> = events.borrow().iter().map(|e| e.id).collect();
        assert_eq!(ids, ["first_line", "line_apprentice", "speed_demon"]);
        assert!(events.borrow().iter().all(|e| e.timestamp == fixed_time()));
    }

    #[test]
    fn test_unlocks_persist_and_reload() {
        let store = SharedStore::new(MemoryStore::new());
        let mut engine = AchievementEngine::with_clock(store.clone(), fixed_time);
        engine.check_achievements(&lines_and_time(1, 1));

        let raw = store.get(ACHIEVEMENTS_KEY).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["first_line"]["id"], "first_line");
        assert_eq!(json["first_line"]["gameStats"]["lines"], 1);
        assert!(json["first_line"]["unlockedAt"].is_string());

        let reloaded = AchievementEngine::new(store);
        assert!(reloaded.is_unlocked("first_line"));
        assert_eq!(
            reloaded.unlock_record("first_line"),
            engine.unlock_record("first_line")
        );
        assert!(reloaded.pending_notifications().is_empty());
    }

    #[test]
    fn test_missing_or_garbage_data_loads_empty() {
        for raw in [None, Some(""), Some("{not json"), Some("[1,2,3]")] {
            let mut store = MemoryStore::new();
            if let Some(raw) = raw {
                store.set(ACHIEVEMENTS_KEY, raw).unwrap();
            }
            let engine = AchievementEngine::new(store);
            assert_eq!(engine.unlocked().count(), 0, "stored {raw:?}");
        }
    }

    #[test]
    fn test_malformed_record_does_not_drop_the_others() {
        let store = SharedStore::new(MemoryStore::new());
        let mut engine = AchievementEngine::with_clock(store.clone(), fixed_time);
        engine.unlock_achievement("first_line", &StatsSnapshot::new());
        engine.unlock_achievement("marathon", &StatsSnapshot::new());

        let mut json: serde_json::Value =
            serde_json::from_str(&store.get(ACHIEVEMENTS_KEY).unwrap()).unwrap();
        json["marathon"]["unlockedAt"] = serde_json::json!(1_714_564_800_000_u64);
        json["combo_4"] = serde_json::json!({ "id": "combo_4" });
        let mut writer = store.clone();
        writer.set(ACHIEVEMENTS_KEY, &json.to_string()).unwrap();

        let mut reloaded = AchievementEngine::with_clock(store.clone(), fixed_time);
        assert!(reloaded.is_unlocked("first_line"));
        assert!(!reloaded.is_unlocked("marathon"));
        assert!(!reloaded.is_unlocked("combo_4"));

        reloaded.unlock_achievement("level_5", &StatsSnapshot::new());
        let saved: serde_json::Value =
            serde_json::from_str(&store.get(ACHIEVEMENTS_KEY).unwrap()).unwrap();
        assert!(saved.get("first_line").is_some());
        assert!(saved.get("level_5").is_some());
    }

    #[test]
    fn test_quota_failure_keeps_unlock_and_sets_flag() {
        let mut engine = AchievementEngine::with_clock(
            FailingStore {
                fail_with: Some(quota_error),
                ..FailingStore::default()
            },
            fixed_time,
        );
        engine.unlock_achievement("first_line", &StatsSnapshot::new());

        assert!(engine.is_unlocked("first_line"));
        assert!(engine.is_quota_error());
        assert!(engine.last_save_error().unwrap().contains("quota exceeded"));
    }

    #[test]
    fn test_other_failure_reports_underlying_text() {
        let mut engine = AchievementEngine::with_clock(
            FailingStore {
                fail_with: Some(other_error),
                ..FailingStore::default()
            },
            fixed_time,
        );
        engine.unlock_achievement("first_line", &StatsSnapshot::new());

        assert!(engine.is_unlocked("first_line"));
        assert!(!engine.is_quota_error());
        assert!(engine.last_save_error().unwrap().contains("disk on fire"));
    }

    #[test]
    fn test_successful_save_clears_error() {
        let mut engine = AchievementEngine::with_clock(
            FailingStore {
                fail_with: Some(quota_error),
                ..FailingStore::default()
            },
            fixed_time,
        );
        let statuses = Rc::new(RefCell::new(Vec::new()));
        engine.subscribe_save_status({
            let statuses = Rc::clone(&statuses);
            move |status| statuses.borrow_mut().push(status.clone())
        });

        engine.unlock_achievement("first_line", &StatsSnapshot::new());
        assert!(engine.is_quota_error());

        engine.store.fail_with = None;
        engine.unlock_achievement("marathon", &StatsSnapshot::new());
        assert_eq!(engine.save_status(), &SaveStatus::default());
        assert!(engine.store().inner.get(ACHIEVEMENTS_KEY).is_some());
        assert_eq!(statuses.borrow().len(), 2);
    }

    #[test]
    fn test_clear_save_error_keeps_unlocks() {
        let mut engine = AchievementEngine::with_clock(
            FailingStore {
                fail_with: Some(other_error),
                ..FailingStore::default()
            },
            fixed_time,
        );
        engine.unlock_achievement("first_line", &StatsSnapshot::new());
        assert!(engine.last_save_error().is_some());

        engine.clear_save_error();
        assert_eq!(engine.last_save_error(), None);
        assert!(!engine.is_quota_error());
        assert!(engine.is_unlocked("first_line"));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut engine = AchievementEngine::with_clock(
            FailingStore {
                fail_with: Some(other_error),
                ..FailingStore::default()
            },
            fixed_time,
        );
        engine.unlock_achievement("first_line", &StatsSnapshot::new());
        engine.store.fail_with = None;
        engine.unlock_achievement("marathon", &StatsSnapshot::new());
        assert!(engine.store().get(ACHIEVEMENTS_KEY).is_some());
        engine.store.fail_with = Some(other_error);
        engine.unlock_achievement("combo_4", &StatsSnapshot::new());
        assert!(engine.last_save_error().is_some());

        engine.reset_achievements();

        assert_eq!(engine.progress().unlocked, 0);
        assert!(engine.pending_notifications().is_empty());
        assert_eq!(engine.last_save_error(), None);
        assert_eq!(engine.store().get(ACHIEVEMENTS_KEY), None);
    }

    #[test]
    fn test_events_accumulate_until_game_restarts() {
        let mut engine = engine();
        engine.handle_event(GameEvent::GameStarted);
        for _ in 0..13 {
            engine.handle_event(GameEvent::LinesCleared(4));
            engine.handle_event(GameEvent::TimeTick);
        }
        assert_eq!(engine.tracked_stats().get(StatKey::Lines), Some(52));
        assert!(engine.is_unlocked("speed_demon"));
        assert!(engine.is_unlocked("first_tetris"));
        assert!(engine.is_unlocked("tetris_expert"));

        engine.handle_event(GameEvent::GameStarted);
        assert_eq!(engine.tracked_stats(), &StatsSnapshot::zeroed());
        assert!(engine.is_unlocked("speed_demon"));
    }

    #[test]
    fn test_score_and_combo_events() {
        let mut engine = engine();
        engine.handle_event(GameEvent::ScoreUpdated {
            score: 55_000,
            level: 4,
        });
        assert!(engine.is_unlocked("high_roller"));
        assert!(engine.is_unlocked("score_10k"));
        assert!(!engine.is_unlocked("score_100k"));

        engine.handle_event(GameEvent::ComboUpdated(4));
        assert!(engine.is_unlocked("combo_4"));
        assert_eq!(
            engine.progress(),
            Progress {
                unlocked: 4,
                total: ACHIEVEMENTS.len(),
            }
        );
    }
}
