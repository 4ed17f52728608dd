// SPDX-License-Identifier: MIT OR Apache-2.0
//! Stable-identity object pool.
//!
//! Records are stored in dense, reusable slots and looked up by the caller's
//! integer id. Liveness is tracked with a mark-and-sweep pass once per frame:
//! every declaration marks its slot, and [`ObjectPool::reconcile`] frees the
//! slots nobody marked since the previous pass.

use std::collections::HashMap;
use std::ops::{Index, IndexMut};

/// A record that can live in an [`ObjectPool`]
pub trait PoolRecord: Default {
    /// External id of the record
    fn id(&self) -> i32;

    /// Store the external id on a freshly created record
    fn set_id(&mut self, id: i32);
}

/// Growable arena of records keyed by external id
#[derive(Debug, Clone)]
pub struct ObjectPool<T> {
    records: Vec<T>,
    in_use: Vec<bool>,
    free_list: Vec<usize>,
    id_map: HashMap<i32, usize>,
}

impl<T: PoolRecord> ObjectPool<T> {
    /// Create an empty pool
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            in_use: Vec::new(),
            free_list: Vec::new(),
            id_map: HashMap::new(),
        }
    }

    /// Free every slot that was not touched since the last call, then clear
    /// all liveness marks.
    ///
    /// Runs in time proportional to the slot count, not the number of live
    /// records.
    pub fn reconcile(&mut self) {
        self.free_list.clear();
        for (index, record) in self.records.iter().enumerate() {
            if self.in_use[index] {
                continue;
            }
            let id = record.id();
            // The id may already have moved to another slot
            if self.id_map.get(&id) == Some(&index) {
                self.id_map.remove(&id);
            }
            self.free_list.push(index);
        }
        tracing::trace!("Pool reconciled: {} free of {} slots", self.free_list.len(), self.records.len());
        self.in_use.fill(false);
    }

    /// Look up `id`, creating a record for it if it is not present, and
    /// mark its slot live for this frame.
    pub fn find_or_create(&mut self, id: i32) -> &mut T {
        let index = self.find_or_create_index(id);
        &mut self.records[index]
    }

    /// Same as [`Self::find_or_create`], returning the slot index
    pub fn find_or_create_index(&mut self, id: i32) -> usize {
        let index = match self.id_map.get(&id) {
            Some(&index) => index,
            None => {
                let index = match self.free_list.pop() {
                    Some(index) => {
                        self.records[index] = T::default();
                        index
                    }
                    None => {
                        self.records.push(T::default());
                        self.in_use.push(false);
                        self.records.len() - 1
                    }
                };
                self.records[index].set_id(id);
                self.id_map.insert(id, index);
                index
            }
        };
        self.in_use[index] = true;
        index
    }

    /// Slot index of `id`, if the pool holds it
    pub fn index_of(&self, id: i32) -> Option<usize> {
        self.id_map.get(&id).copied()
    }

    /// Check whether the pool holds a record for `id`
    pub fn contains(&self, id: i32) -> bool {
        self.id_map.contains_key(&id)
    }

    /// Get a record by id
    pub fn get(&self, id: i32) -> Option<&T> {
        self.index_of(id).map(|index| &self.records[index])
    }

    /// Get a mutable record by id
    pub fn get_mut(&mut self, id: i32) -> Option<&mut T> {
        self.index_of(id).map(|index| &mut self.records[index])
    }

    /// Get a record by slot index
    pub fn slot(&self, index: usize) -> Option<&T> {
        self.records.get(index)
    }

    /// Whether the slot was marked live since the last reconciliation
    pub fn is_live(&self, index: usize) -> bool {
        self.in_use.get(index).copied().unwrap_or(false)
    }

    /// Live records with their slot indices, in slot order
    pub fn live(&self) -> impl Iterator<Item = (usize, &T)> {
        self.records
            .iter()
            .enumerate()
            .filter(move |(index, _)| self.in_use[*index])
    }

    /// Mutable access to every slot, live or not
    pub fn slots_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.records.iter_mut()
    }

    /// Total number of slots, including freed ones
    pub fn slot_count(&self) -> usize {
        self.records.len()
    }

    /// Number of ids currently mapped to a slot
    pub fn len(&self) -> usize {
        self.id_map.len()
    }

    /// Check if the pool maps no ids
    pub fn is_empty(&self) -> bool {
        self.id_map.is_empty()
    }
}

impl<T: PoolRecord> Default for ObjectPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for ObjectPool<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.records[index]
    }
}

impl<T> IndexMut<usize> for ObjectPool<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.records[index]
    }
}
