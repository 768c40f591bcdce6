use crate::Slot;
use std::collections::BTreeSet;

/// Tally for the barrier of the current stage.
/// Reset on every stage entry; a participant counts at most once per occurrence.
#[derive(Debug, Default)]
pub struct Readiness {
    ready: BTreeSet<Slot>,
}

impl Readiness {
    pub fn reset(&mut self) {
        self.ready.clear();
    }
    /// Marks `slot` ready. Returns false if it already was.
    pub fn mark(&mut self, slot: Slot) -> bool {
        self.ready.insert(slot)
    }
    pub fn count(&self) -> usize {
        self.ready.len()
    }
    /// Ready participants among those `counts` accepts.
    pub fn count_where<F>(&self, counts: F) -> usize
    where
        F: Fn(Slot) -> bool,
    {
        self.ready.iter().filter(|s| counts(**s)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn marks_are_idempotent() {
        let mut readiness = Readiness::default();
        assert!(readiness.mark(1));
        assert!(!readiness.mark(1));
        assert_eq!(readiness.count(), 1);
    }
    #[test]
    fn reset_clears() {
        let mut readiness = Readiness::default();
        readiness.mark(0);
        readiness.reset();
        assert_eq!(readiness.count(), 0);
        assert!(readiness.mark(0));
    }
    #[test]
    fn counts_filtered() {
        let mut readiness = Readiness::default();
        readiness.mark(0);
        readiness.mark(2);
        assert_eq!(readiness.count_where(|s| s != 2), 1);
    }
}
