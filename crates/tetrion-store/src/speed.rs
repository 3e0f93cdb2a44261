use log::{debug, warn};

use crate::{KeyValueStore, Observable, StoreError};

/// Store key of the persisted speed multiplier.
pub const SPEED_KEY: &str = "tetrion.speed-multiplier";

pub const MIN_SPEED: f64 = 0.5;
pub const MAX_SPEED: f64 = 3.0;
pub const DEFAULT_SPEED: f64 = 1.0;

/// Clamps `value` into `[MIN_SPEED, MAX_SPEED]`. NaN becomes
/// [`DEFAULT_SPEED`].
#[must_use]
pub fn clamp_speed(value: f64) -> f64 {
    if value.is_nan() {
        DEFAULT_SPEED
    } else {
        value.clamp(MIN_SPEED, MAX_SPEED)
    }
}

/// Parses a stored multiplier. Anything but a finite decimal inside the
/// allowed range is rejected.
#[must_use]
pub fn parse_speed(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    (value.is_finite() && (MIN_SPEED..=MAX_SPEED).contains(&value)).then_some(value)
}

/// Persisted game speed multiplier.
///
/// Loading never fails: a missing or invalid stored value yields
/// [`DEFAULT_SPEED`], and the default is not written back until
/// [`SpeedSetting::set`] is called.
#[derive(Debug)]
pub struct SpeedSetting<S> {
    store: S,
    multiplier: Observable<f64>,
}

impl<S> SpeedSetting<S>
where
    S: KeyValueStore,
{
    pub fn load(store: S) -> Self {
        let multiplier = match store.get(SPEED_KEY) {
            None => DEFAULT_SPEED,
            Some(raw) => parse_speed(&raw).unwrap_or_else(|| {
                warn!("ignoring invalid stored speed multiplier {raw:?}");
                DEFAULT_SPEED
            }),
        };
        debug!("loaded speed multiplier {multiplier}");
        Self {
            store,
            multiplier: Observable::new(multiplier),
        }
    }

    #[must_use]
    pub fn multiplier(&self) -> f64 {
        *self.multiplier.get()
    }

    /// Registers a listener called with the new multiplier on every change.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&f64) + 'static,
    {
        self.multiplier.subscribe(listener);
    }

    /// Clamps and applies `value`, then persists it.
    ///
    /// Returns the applied multiplier. When the store rejects the write the
    /// new multiplier stays in effect and the store error is returned.
    pub fn set(&mut self, value: f64) -> Result<f64, StoreError> {
        let applied = clamp_speed(value);
        self.multiplier.set(applied);
        self.store.set(SPEED_KEY, &applied.to_string())?;
        Ok(applied)
    }

    /// Returns to the default multiplier and forgets the stored value.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.multiplier.set(DEFAULT_SPEED);
        self.store.remove(SPEED_KEY)
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
