use std::collections::HashSet;

/// Items that can be recorded as "asked" exactly once.
pub trait Tracked {
    /// Stable identity used for de-duplication.
    fn identity(&self) -> String;
}

/// Asked set plus newest-first history of the items behind it.
///
/// Every identity in the set has exactly one history entry, so marking the
/// same item twice is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskedLog<T> {
    asked: HashSet<String>,
    history: Vec<T>,
}

impl<T> Default for AskedLog<T> {
    fn default() -> Self {
        Self {
            asked: HashSet::new(),
            history: Vec::new(),
        }
    }
}

impl<T: Tracked + Clone> AskedLog<T> {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from a persisted newest-first history, dropping duplicates.
    pub fn restore(history: impl IntoIterator<Item = T>) -> Self {
        let mut log = Self::new();
        for item in history {
            if log.asked.insert(item.identity()) {
                log.history.push(item);
            }
        }
        log
    }

    /// Record `item` as asked. Returns `false` when it was already recorded.
    pub fn mark(&mut self, item: &T) -> bool {
        if !self.asked.insert(item.identity()) {
            return false;
        }
        self.history.insert(0, item.clone());
        true
    }

    /// Append an item at the oldest end of the history (used when restoring).
    pub fn mark_oldest(&mut self, item: &T) -> bool {
        if !self.asked.insert(item.identity()) {
            return false;
        }
        self.history.push(item.clone());
        true
    }

    /// Whether the identity was already asked.
    pub fn contains(&self, identity: &str) -> bool {
        self.asked.contains(identity)
    }

    /// Revealed items, newest first.
    pub fn history(&self) -> &[T] {
        &self.history
    }

    /// Asked identities in history order (newest first).
    pub fn asked_keys(&self) -> Vec<String> {
        self.history.iter().map(Tracked::identity).collect()
    }

    /// Number of asked items.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether nothing was asked yet.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.asked.clear();
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Item(&'static str, u32);

    impl Tracked for Item {
        fn identity(&self) -> String {
            format!("{}-{}", self.0, self.1)
        }
    }

    #[test]
    fn mark_is_idempotent() {
        let mut log = AskedLog::new();
        let item = Item("Prophets", 100);

        assert!(log.mark(&item));
        assert!(!log.mark(&item));
        assert!(!log.mark(&item.clone()));

        assert_eq!(log.len(), 1);
        assert_eq!(log.asked_keys(), vec!["Prophets-100"]);
    }

    #[test]
    fn history_is_newest_first() {
        let mut log = AskedLog::new();
        log.mark(&Item("A", 100));
        log.mark(&Item("B", 200));
        log.mark(&Item("A", 100));
        log.mark(&Item("C", 300));

        assert_eq!(log.asked_keys(), vec!["C-300", "B-200", "A-100"]);
        assert!(log.contains("B-200"));
        assert!(!log.contains("B-300"));
    }

    #[test]
    fn restore_drops_duplicates() {
        let log = AskedLog::restore([Item("A", 100), Item("B", 100), Item("A", 100)]);
        assert_eq!(log.history(), &[Item("A", 100), Item("B", 100)]);

        let mut log = log;
        assert!(log.mark_oldest(&Item("Z", 500)));
        assert!(!log.mark_oldest(&Item("A", 100)));
        assert_eq!(log.asked_keys(), vec!["A-100", "B-100", "Z-500"]);

        log.clear();
        assert!(log.is_empty());
    }
}
