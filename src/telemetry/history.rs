// src/telemetry/history.rs
//! Fixed-capacity sliding windows for aggregation
//!
//! Each window is a slot array written at `counter % capacity`, so a slot
//! keeps its value until the window wraps back around to it. Until the first
//! wrap some slots are still empty; iteration yields only populated slots.

/// Sliding window over the last `capacity` recorded values
#[derive(Debug, Clone)]
pub struct HistoryWindow<T> {
    slots: Vec<Option<T>>,
}

impl<T: Copy> HistoryWindow<T> {
    /// Create an empty window with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity.max(1)],
        }
    }

    /// Record a value at the slot selected by the wake counter
    pub fn record_at(&mut self, counter: u64, value: T) {
        let index = (counter % self.slots.len() as u64) as usize;
        self.slots[index] = Some(value);
    }

    /// Number of populated slots
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether no value has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_none())
    }

    /// Window capacity
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Iterate over populated slots in slot order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().flatten()
    }

    /// Drop every recorded value
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }
}
