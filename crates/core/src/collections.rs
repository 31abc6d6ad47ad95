//! Container helpers shared by the AST: an insertion-ordered map, a set
//! with structural membership, and a bidirectional cursor that every
//! sequence in the model can be walked with.

use serde::Serialize;

/// A position between items of a slice. Slot 0 is before the first item
/// and slot `len` is after the last one.
#[derive(Debug, Clone)]
pub struct Cursor<'a, T> {
    items: &'a [T],
    slot: usize,
}

impl<'a, T> Cursor<'a, T> {
    pub fn new(items: &'a [T]) -> Self {
        Cursor { items, slot: 0 }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn to_start(&mut self) {
        self.slot = 0;
    }

    pub fn to_end(&mut self) {
        self.slot = self.items.len();
    }

    /// Move to `slot`, clamped to the end.
    pub fn to_slot(&mut self, slot: usize) {
        self.slot = slot.min(self.items.len());
    }

    pub fn has_next(&self) -> bool {
        self.slot < self.items.len()
    }

    pub fn has_previous(&self) -> bool {
        self.slot > 0
    }

    pub fn get_next(&mut self) -> Option<&'a T> {
        let item = self.items.get(self.slot)?;
        self.slot += 1;
        Some(item)
    }

    pub fn get_previous(&mut self) -> Option<&'a T> {
        if self.slot == 0 {
            return None;
        }
        self.slot -= 1;
        self.items.get(self.slot)
    }
}

impl<'a, T> Iterator for Cursor<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.get_next()
    }
}

/// Map that remembers insertion order. Re-inserting a key keeps its
/// original position and replaces the value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OrderedMap<K, V> {
    entries: Vec<(K, V)>,
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        OrderedMap {
            entries: Vec::new(),
        }
    }
}

impl<K: PartialEq, V> OrderedMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, returning the value previously stored under `key`.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(K, V)] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn cursor(&self) -> Cursor<'_, (K, V)> {
        Cursor::new(&self.entries)
    }
}

impl<K: PartialEq, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// Insertion-ordered set using structural equality for membership.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Set<T> {
    members: Vec<T>,
}

impl<T> Default for Set<T> {
    fn default() -> Self {
        Set {
            members: Vec::new(),
        }
    }
}

impl<T: PartialEq> Set<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member; returns false when an equal member is already present.
    pub fn insert(&mut self, member: T) -> bool {
        if self.contains(&member) {
            return false;
        }
        self.members.push(member);
        true
    }

    pub fn contains(&self, member: &T) -> bool {
        self.members.contains(member)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[T] {
        &self.members
    }
}

impl<T: PartialEq> FromIterator<T> for Set<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Set::new();
        for member in iter {
            set.insert(member);
        }
        set
    }
}
