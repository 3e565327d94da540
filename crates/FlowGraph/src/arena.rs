use slotmap::{Key, SlotMap};
use std::collections::HashMap;
use std::hash::Hash;

/// Flat arena with an id index and a stable insertion order.
///
/// Keys stay valid across unrelated removals, so the index only changes for
/// the entry being removed.
#[derive(Clone, Debug)]
pub(crate) struct Table<K: Key, I, V> {
    items: SlotMap<K, V>,
    index: HashMap<I, K>,
    order: Vec<K>,
}

impl<K: Key, I, V> Default for Table<K, I, V> {
    fn default() -> Self {
        Self {
            items: SlotMap::with_key(),
            index: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<K: Key, I: Hash + Eq + Clone, V> Table<K, I, V> {
    /// Inserts `value`, replacing any entry with the same id in place.
    ///
    /// Returns true when an existing entry was replaced.
    pub fn upsert(&mut self, id: I, value: V) -> bool {
        if let Some(&key) = self.index.get(&id) {
            if let Some(slot) = self.items.get_mut(key) {
                *slot = value;
                return true;
            }
        }
        let key = self.items.insert(value);
        self.index.insert(id, key);
        self.order.push(key);
        false
    }

    pub fn get(&self, id: &I) -> Option<&V> {
        self.index.get(id).and_then(|&key| self.items.get(key))
    }

    pub fn get_mut(&mut self, id: &I) -> Option<&mut V> {
        let key = *self.index.get(id)?;
        self.items.get_mut(key)
    }

    pub fn contains(&self, id: &I) -> bool {
        self.index.contains_key(id)
    }

    pub fn remove(&mut self, id: &I) -> Option<V> {
        let key = self.index.remove(id)?;
        self.order.retain(|k| *k != key);
        self.items.remove(key)
    }

    /// Values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &V> {
        self.order.iter().filter_map(|key| self.items.get(*key))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.items.values_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
        self.order.clear();
    }
}
