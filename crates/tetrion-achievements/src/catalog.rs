use serde::{Deserialize, Serialize};

use crate::{Condition, StatKey, StatsSnapshot};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[display("common")]
    Common,
    #[display("uncommon")]
    Uncommon,
    #[display("rare")]
    Rare,
    #[display("epic")]
    Epic,
    #[display("legendary")]
    Legendary,
}

/// One entry of the achievement catalog.
///
/// An achievement is earned when its primary condition and every additional
/// condition hold for the same stats snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub rarity: Rarity,
    pub condition: Condition,
    pub additional_conditions: &'static [Condition],
}

impl AchievementDefinition {
    #[must_use]
    pub fn is_satisfied(&self, stats: &StatsSnapshot) -> bool {
        self.condition.holds(stats) && self.additional_conditions.iter().all(|c| c.holds(stats))
    }

    pub fn conditions(&self) -> impl Iterator<Item = &Condition> + '_ {
        std::iter::once(&self.condition).chain(self.additional_conditions)
    }
}

const fn simple(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    rarity: Rarity,
    condition: Condition,
) -> AchievementDefinition {
    AchievementDefinition {
        id,
        name,
        description,
        rarity,
        condition,
        additional_conditions: &[],
    }
}

/// The achievement catalog, in evaluation order.
pub const ACHIEVEMENTS: &[AchievementDefinition] = &[
    simple(
        "first_line",
        "First Line",
        "Clear your first line",
        Rarity::Common,
        Condition::at_least(StatKey::Lines, 1),
    ),
    simple(
        "line_apprentice",
        "Line Apprentice",
        "Clear 40 lines in one game",
        Rarity::Common,
        Condition::at_least(StatKey::Lines, 40),
    ),
    simple(
        "line_master",
        "Line Master",
        "Clear 150 lines in one game",
        Rarity::Rare,
        Condition::at_least(StatKey::Lines, 150),
    ),
    simple(
        "first_tetris",
        "Tetris!",
        "Clear four lines at once",
        Rarity::Uncommon,
        Condition::at_least(StatKey::Tetrises, 1),
    ),
    simple(
        "tetris_expert",
        "Tetris Expert",
        "Clear four lines at once ten times in one game",
        Rarity::Epic,
        Condition::at_least(StatKey::Tetrises, 10),
    ),
    simple(
        "score_1k",
        "Warming Up",
        "Reach 1,000 points",
        Rarity::Common,
        Condition::at_least(StatKey::Score, 1_000),
    ),
    simple(
        "score_10k",
        "High Scorer",
        "Reach 10,000 points",
        Rarity::Uncommon,
        Condition::at_least(StatKey::Score, 10_000),
    ),
    simple(
        "score_100k",
        "Point Tycoon",
        "Reach 100,000 points",
        Rarity::Epic,
        Condition::at_least(StatKey::Score, 100_000),
    ),
    simple(
        "level_5",
        "Picking Up Pace",
        "Reach level 5",
        Rarity::Uncommon,
        Condition::at_least(StatKey::Level, 5),
    ),
    simple(
        "level_10",
        "Double Digits",
        "Reach level 10",
        Rarity::Rare,
        Condition::at_least(StatKey::Level, 10),
    ),
    simple(
        "combo_4",
        "Chain Reaction",
        "Clear lines with four consecutive pieces",
        Rarity::Rare,
        Condition::at_least(StatKey::Combo, 4),
    ),
    simple(
        "marathon",
        "Marathon",
        "Play a single game for 30 minutes",
        Rarity::Rare,
        Condition::at_least(StatKey::TimePlayed, 1_800),
    ),
    AchievementDefinition {
        id: "speed_demon",
        name: "Speed Demon",
        description: "Clear 50 lines within 3 minutes",
        rarity: Rarity::Epic,
        condition: Condition::at_least(StatKey::Lines, 50),
        additional_conditions: &[Condition::at_most(StatKey::TimePlayed, 180)],
    },
    AchievementDefinition {
        id: "high_roller",
        name: "High Roller",
        description: "Reach 50,000 points by level 5",
        rarity: Rarity::Legendary,
        condition: Condition::at_least(StatKey::Score, 50_000),
        additional_conditions: &[Condition::at_most(StatKey::Level, 5)],
    },
];

#[must_use]
pub fn find_definition(id: &str) -> Option<&'static AchievementDefinition> {
    ACHIEVEMENTS.iter().find(|def| def.id == id)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_catalog_ids_are_unique() {
        let ids: HashSet<_> = ACHIEVEMENTS.iter().map(|def| def.id).collect();
        assert_eq!(ids.len(), ACHIEVEMENTS.len());
    }

    #[test]
    fn test_find_definition() {
        let def = find_definition("speed_demon").unwrap();
        assert_eq!(def.rarity, Rarity::Epic);
        assert_eq!(def.conditions().count(), 2);
        assert!(find_definition("no_such_thing").is_none());
    }

    #[test]
    fn test_compound_conditions_use_one_snapshot() {
        let def = find_definition("speed_demon").unwrap();
        let snapshot = |lines, time| {
            StatsSnapshot::new()
                .with(StatKey::Lines, lines)
                .with(StatKey::TimePlayed, time)
        };
        assert!(def.is_satisfied(&snapshot(50, 180)));
        assert!(!def.is_satisfied(&snapshot(50, 240)));
        assert!(!def.is_satisfied(&snapshot(49, 179)));
        assert!(def.is_satisfied(&snapshot(60, 60)));
        assert!(!def.is_satisfied(&StatsSnapshot::new().with(StatKey::Lines, 60)));
    }

    #[test]
    fn test_rarity_serde_names() {
        assert_eq!(serde_json::to_string(&Rarity::Legendary).unwrap(), "\"legendary\"");
        assert_eq!(Rarity::Uncommon.to_string(), "uncommon");
    }
}
