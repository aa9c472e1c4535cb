use std::{cell::Cell, rc::Rc};

pub const THEME_KEY: &str = "portfolio-theme";
pub const VISITED_KEY: &str = "portfolio-visited";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

pub trait MediaPreferences {
    fn prefers_dark(&self) -> bool;
    fn prefers_reduced_motion(&self) -> bool;
}

/// Reads and records the "has visited before" flag. Returns `true` only for
/// the first-ever visit.
pub fn record_visit(store: &impl KeyValueStore) -> bool {
    let first = store.get(VISITED_KEY).as_deref() != Some("true");
    if first {
        store.set(VISITED_KEY, "true");
    }
    first
}

/// Marks its token cancelled when dropped, so a spawned future that outlives
/// its owner can skip its final effect.
#[derive(Default)]
pub struct CancelOnDrop(Rc<Cell<bool>>);

impl CancelOnDrop {
    pub fn token(&self) -> CancelToken {
        CancelToken(self.0.clone())
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.set(true);
    }
}

#[derive(Clone)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}


#[cfg(test)]
mod tests {
    use super::memory::MemoryStore;
    use super::*;

    #[test]
    fn first_visit_is_recorded_once() {
        let store = MemoryStore::default();

        assert!(record_visit(&store));
        assert!(!record_visit(&store));
        assert_eq!(store.get(VISITED_KEY).as_deref(), Some("true"));
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn dropping_the_guard_cancels_every_token() {
        let guard = CancelOnDrop::default();
        let first = guard.token();
        let second = first.clone();
        assert!(!first.is_cancelled());

        drop(guard);

        assert!(first.is_cancelled());
        assert!(second.is_cancelled());
    }

    #[test]
    fn returning_visitor_is_not_first() {
        let store = MemoryStore::with(VISITED_KEY, "true");
        assert!(!record_visit(&store));
        assert_eq!(store.writes(), 0);
    }
}
