//! Ordered live-sets of organism handles.

use crate::organism::OrganismId;
use slotmap::SecondaryMap;

/// Dense handle list with O(1) insert and removal.
///
/// Removal swaps the last handle into the vacated slot, so iteration order
/// depends only on the sequence of inserts and removals.
#[derive(Debug, Clone, Default)]
pub struct LiveSet {
    slots: SecondaryMap<OrganismId, usize>,
    handles: Vec<OrganismId>,
}

impl LiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn contains(&self, id: OrganismId) -> bool {
        self.slots.contains_key(id)
    }

    /// Returns false if the handle was already present
    pub fn insert(&mut self, id: OrganismId) -> bool {
        if self.slots.contains_key(id) {
            return false;
        }
        self.slots.insert(id, self.handles.len());
        self.handles.push(id);
        true
    }

    /// Returns false if the handle was not present
    pub fn remove(&mut self, id: OrganismId) -> bool {
        let Some(index) = self.slots.remove(id) else {
            return false;
        };
        let removed = self.handles.swap_remove(index);
        debug_assert_eq!(removed, id);
        if let Some(&moved) = self.handles.get(index) {
            if let Some(slot) = self.slots.get_mut(moved) {
                *slot = index;
            }
        }
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = OrganismId> + '_ {
        self.handles.iter().copied()
    }

    /// Copy of the current membership, used to freeze a pass
    pub fn snapshot(&self) -> Vec<OrganismId> {
        self.handles.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn handles(n: usize) -> Vec<OrganismId> {
        let mut keys: SlotMap<OrganismId, ()> = SlotMap::with_key();
        (0..n).map(|_| keys.insert(())).collect()
    }

    #[test]
    fn test_insert_and_remove() {
        let ids = handles(4);
        let mut set = LiveSet::new();
        for id in &ids {
            assert!(set.insert(*id));
        }
        assert!(!set.insert(ids[0]));
        assert_eq!(set.len(), 4);

        assert!(set.remove(ids[1]));
        assert!(!set.remove(ids[1]));
        assert_eq!(set.len(), 3);
        assert!(!set.contains(ids[1]));

        // Last handle moved into the vacated slot
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![ids[0], ids[3], ids[2]]);
    }

    #[test]
    fn test_remove_after_swap_keeps_index_consistent() {
        let ids = handles(3);
        let mut set = LiveSet::new();
        for id in &ids {
            set.insert(*id);
        }
        set.remove(ids[0]);
        assert!(set.remove(ids[2]));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![ids[1]]);
        assert!(set.remove(ids[1]));
        assert!(set.is_empty());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let ids = handles(3);
        let mut set = LiveSet::new();
        set.insert(ids[0]);
        set.insert(ids[1]);

        let frozen = set.snapshot();
        set.insert(ids[2]);
        set.remove(ids[0]);

        assert_eq!(frozen, vec![ids[0], ids[1]]);
        assert_eq!(set.len(), 2);
    }
}
