//! Keyed Entity Store
//!
//! Maps monotonically increasing ids to values and can be mutated while it is
//! being walked. While any cursor is active, removals only hide their entry
//! and insertions go to a side table; both are applied when the last cursor
//! finishes ("late add, early remove").
//!
//! Iteration order is id order, which is insertion order because ids are
//! never reused. BTreeMap keeps that order deterministic.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;
use serde::{Deserialize, Serialize};

/// Identifier handed out by a [`Store`]. Unique per store instance.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Raw numeric value.
    pub const fn raw(self) -> u64 {
        self.0
    }

    #[cfg(test)]
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Position of an in-progress walk over a [`Store`].
///
/// Obtained from [`Store::cursor`], advanced with [`Store::advance`]. A walk
/// that stops early must hand its cursor back through [`Store::release`],
/// otherwise deferred changes are never applied.
#[must_use = "a cursor keeps the store in iteration mode until it is exhausted or released"]
#[derive(Debug)]
pub struct Cursor {
    after: Option<EntityId>,
    done: bool,
}

impl Drop for Cursor {
    fn drop(&mut self) {
        debug_assert!(
            self.done || std::thread::panicking(),
            "store cursor dropped while still active"
        );
    }
}

/// Mutable-while-iterating keyed container.
pub struct Store<T> {
    /// Primary table. `None` marks an entry removed during iteration.
    entries: BTreeMap<EntityId, Option<T>>,
    /// Insertions made while iterating.
    pending_insert: BTreeMap<EntityId, T>,
    /// Number of `None` slots awaiting compaction.
    pending_delete: usize,
    /// Active cursors.
    iterating: usize,
    next_id: u64,
}

impl<T> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            pending_insert: BTreeMap::new(),
            pending_delete: 0,
            iterating: 0,
            next_id: 0,
        }
    }

    fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    fn place(&mut self, id: EntityId, value: T) {
        if self.iterating == 0 {
            self.entries.insert(id, Some(value));
        } else {
            self.pending_insert.insert(id, value);
        }
    }

    /// Look up a live value. Removed entries read as absent, pending
    /// insertions are visible.
    pub fn get(&self, id: EntityId) -> Option<&T> {
        match self.entries.get(&id) {
            Some(slot) => slot.as_ref(),
            None => self.pending_insert.get(&id),
        }
    }

    /// Mutable lookup with the same visibility as [`Store::get`].
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        match self.entries.get_mut(&id) {
            Some(slot) => slot.as_mut(),
            None => self.pending_insert.get_mut(&id),
        }
    }

    /// True if `id` refers to a live value.
    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Insert a value and return its fresh id.
    pub fn insert(&mut self, value: T) -> EntityId {
        let id = self.allocate_id();
        self.place(id, value);
        id
    }

    /// Insert a value built from its own id.
    pub fn insert_with(&mut self, build: impl FnOnce(EntityId) -> T) -> EntityId {
        let id = self.allocate_id();
        let value = build(id);
        self.place(id, value);
        id
    }

    /// Remove a value. Returns `None` if it was already gone.
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        if let Some(value) = self.pending_insert.remove(&id) {
            return Some(value);
        }
        if self.iterating == 0 {
            return self.entries.remove(&id).flatten();
        }
        let value = self.entries.get_mut(&id)?.take()?;
        self.pending_delete += 1;
        Some(value)
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.entries.len() - self.pending_delete + self.pending_insert.len()
    }

    /// True if no values are live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub(crate) fn is_iterating(&self) -> bool {
        self.iterating > 0
    }

    /// Start a walk. Entries inserted after this call are not visited by it.
    pub fn cursor(&mut self) -> Cursor {
        self.iterating += 1;
        Cursor { after: None, done: false }
    }

    /// Next live id of the walk, or `None` once it is exhausted. Exhausting a
    /// cursor finishes it.
    pub fn advance(&mut self, cursor: &mut Cursor) -> Option<EntityId> {
        if cursor.done {
            return None;
        }
        let lower = match cursor.after {
            Some(id) => Bound::Excluded(id),
            None => Bound::Unbounded,
        };
        let next = self
            .entries
            .range((lower, Bound::Unbounded))
            .find(|(_, slot)| slot.is_some())
            .map(|(id, _)| *id);
        match next {
            Some(id) => {
                cursor.after = Some(id);
                Some(id)
            }
            None => {
                self.finish(cursor);
                None
            }
        }
    }

    /// End a walk early.
    pub fn release(&mut self, mut cursor: Cursor) {
        self.finish(&mut cursor);
    }

    fn finish(&mut self, cursor: &mut Cursor) {
        if cursor.done {
            return;
        }
        cursor.done = true;
        self.iterating -= 1;
        if self.iterating == 0 {
            self.compact();
        }
    }

    fn compact(&mut self) {
        if self.pending_delete > 0 {
            self.entries.retain(|_, slot| slot.is_some());
            self.pending_delete = 0;
        }
        let inserted = std::mem::take(&mut self.pending_insert);
        for (id, value) in inserted {
            self.entries.insert(id, Some(value));
        }
    }

    /// Snapshot of live ids in iteration order, including pending insertions.
    #[cfg(test)]
    pub(crate) fn ids(&self) -> Vec<EntityId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Borrowing walk over live values in id order. Pending insertions come
    /// last, which is still id order since they carry the newest ids.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.entries
            .iter()
            .filter_map(|(id, slot)| slot.as_ref().map(|v| (*id, v)))
            .chain(self.pending_insert.iter().map(|(id, v)| (*id, v)))
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
