use crate::individual::Individual;
use fnv::FnvHashMap;
use log::debug;

/// Thread-safe staging map of pending migrants, keyed by island.
/// Always reached through the archipelago's single migration mutex;
/// no sub-map ever escapes under a reader's ownership.
#[derive(Clone, Debug, Default)]
pub struct MigrationStore {
    outer: FnvHashMap<usize, FnvHashMap<usize, Vec<Individual>>>,
}

impl MigrationStore {
    pub fn new() -> MigrationStore {
        MigrationStore::default()
    }

    /// Inserts or replaces `outer[owner][from]`. If the slot already held
    /// a batch, it is replaced outright (most-recent-wins) and the
    /// displaced individuals are discarded.
    pub fn publish(&mut self, owner: usize, from: usize, individuals: Vec<Individual>) {
        debug!("migration store: publish {} individual(s) owner={owner} from={from}", individuals.len());
        self.outer.entry(owner).or_default().insert(from, individuals);
    }

    /// Atomically extracts and returns `outer[owner]`, leaving it empty.
    pub fn consume(&mut self, owner: usize) -> FnvHashMap<usize, Vec<Individual>> {
        let batch = self.outer.remove(&owner).unwrap_or_default();
        debug!("migration store: consume owner={owner} origins={}", batch.len());
        batch
    }

    /// Non-destructive read used in destination-initiated pulls from
    /// neighbors. Returns `None` if there is nothing published at
    /// `outer[owner][from]`.
    pub fn peek(&self, owner: usize, from: usize) -> Option<&Vec<Individual>> {
        self.outer.get(&owner).and_then(|inner| inner.get(&from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ind() -> Individual {
        Individual::new(vec![0.0], vec![0.0], vec![])
    }

    #[test]
    fn publish_then_peek_is_non_destructive() {
        let mut store = MigrationStore::new();
        store.publish(1, 1, vec![ind()]);
        assert_eq!(store.peek(1, 1).unwrap().len(), 1);
        assert_eq!(store.peek(1, 1).unwrap().len(), 1);
    }

    #[test]
    fn consume_empties_the_owners_slot() {
        let mut store = MigrationStore::new();
        store.publish(2, 0, vec![ind()]);
        store.publish(2, 1, vec![ind(), ind()]);
        let batch = store.consume(2);
        assert_eq!(batch.len(), 2);
        assert!(store.consume(2).is_empty());
    }

    #[test]
    fn publish_replaces_most_recent_wins() {
        let mut store = MigrationStore::new();
        store.publish(0, 3, vec![ind(), ind()]);
        store.publish(0, 3, vec![ind()]);
        assert_eq!(store.peek(0, 3).unwrap().len(), 1);
    }

    #[test]
    fn peek_missing_entry_is_none() {
        let store = MigrationStore::new();
        assert!(store.peek(9, 9).is_none());
    }
}
