use std::fmt;

type Listener<T> = Box<dyn FnMut(&T)>;

/// A value that notifies subscribers whenever it changes.
///
/// Setting an equal value is not a change and notifies nobody.
///
/// ```
/// use std::{cell::Cell, rc::Rc};
/// use tetrion_store::Observable;
///
/// let seen = Rc::new(Cell::new(0));
/// let mut value = Observable::new(1);
/// value.subscribe({
///     let seen = Rc::clone(&seen);
///     move |v| seen.set(*v)
/// });
///
/// value.set(1);
/// assert_eq!(seen.get(), 0);
/// value.set(2);
/// assert_eq!(seen.get(), 2);
/// ```
pub struct Observable<T> {
    value: T,
    listeners: Vec<Listener<T>>,
}

impl<T> fmt::Debug for Observable<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<T> Default for Observable<T>
where
    T: Default,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Observable<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            value,
            listeners: Vec::new(),
        }
    }

    #[must_use]
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Registers `listener`, called with the new value after every change.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&T) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self) {
        for listener in &mut self.listeners {
            listener(&self.value);
        }
    }
}

impl<T> Observable<T>
where
    T: PartialEq,
{
    /// Replaces the value, notifying subscribers if it differs from the
    /// current one. Returns whether it changed.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        self.notify();
        true
    }
}
