use std::collections::HashMap;
use std::sync::Mutex;

/// Per-test counters for automatic baseline discriminators.
///
/// The first unnamed verification inside a test is `1`, the next `2`, and
/// so on. Counters are scoped to the owning suite.
#[derive(Debug, Default)]
pub struct NameCounter {
    counts: Mutex<HashMap<String, usize>>,
}

impl NameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next discriminator for `test`, starting at 1.
    pub fn next(&self, test: &str) -> usize {
        let mut counts = self.counts.lock().expect("name counter lock poisoned");
        let count = counts.entry(test.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Forget the counter for `test` so its numbering starts again at 1.
    pub fn reset(&self, test: &str) {
        self.counts
            .lock()
            .expect("name counter lock poisoned")
            .remove(test);
    }

    /// Number of verifications counted for `test` so far.
    pub fn current(&self, test: &str) -> usize {
        self.counts
            .lock()
            .expect("name counter lock poisoned")
            .get(test)
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_per_test() {
        let counter = NameCounter::new();
        assert_eq!(counter.next("a"), 1);
        assert_eq!(counter.next("a"), 2);
        assert_eq!(counter.next("b"), 1);
        assert_eq!(counter.current("a"), 2);
        assert_eq!(counter.current("c"), 0);
    }

    #[test]
    fn reset_restarts_numbering() {
        let counter = NameCounter::new();
        counter.next("a");
        counter.next("a");
        counter.reset("a");
        assert_eq!(counter.next("a"), 1);
    }
}
