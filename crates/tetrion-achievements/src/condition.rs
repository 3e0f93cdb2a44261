use crate::{StatKey, StatsSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Comparator {
    #[display(">=")]
    Gte,
    #[display(">")]
    Gt,
    #[display("<=")]
    Lte,
    #[display("<")]
    Lt,
    #[display("==")]
    Eq,
}

impl Comparator {
    #[must_use]
    pub const fn compare(self, value: u64, threshold: u64) -> bool {
        match self {
            Self::Gte => value >= threshold,
            Self::Gt => value > threshold,
            Self::Lte => value <= threshold,
            Self::Lt => value < threshold,
            Self::Eq => value == threshold,
        }
    }
}

/// A requirement on one stat, such as `lines >= 50`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[display("{stat} {comparator} {threshold}")]
pub struct Condition {
    pub stat: StatKey,
    pub comparator: Comparator,
    pub threshold: u64,
}

impl Condition {
    #[must_use]
    pub const fn new(stat: StatKey, comparator: Comparator, threshold: u64) -> Self {
        Self {
            stat,
            comparator,
            threshold,
        }
    }

    #[must_use]
    pub const fn at_least(stat: StatKey, threshold: u64) -> Self {
        Self::new(stat, Comparator::Gte, threshold)
    }

    #[must_use]
    pub const fn at_most(stat: StatKey, threshold: u64) -> Self {
        Self::new(stat, Comparator::Lte, threshold)
    }

    /// Whether `stats` satisfies the condition. An absent stat never does.
    #[must_use]
    pub fn holds(&self, stats: &StatsSnapshot) -> bool {
        stats
            .get(self.stat)
            .is_some_and(|value| self.comparator.compare(value, self.threshold))
    }
}
