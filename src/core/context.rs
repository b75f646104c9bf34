// Logrep - core/context.rs
//
// Fixed-capacity circular buffer of the most recent parsed lines.
//
// Slots are filled in order until the buffer is full; after that each push
// overwrites the oldest slot. The occupied count is `slots.len()`, so there
// are never placeholder entries to filter out of a snapshot.

use crate::core::model::LogLine;
use std::num::NonZeroUsize;

#[derive(Debug, Clone)]
pub struct ContextRingBuffer {
    slots: Vec<LogLine>,
    capacity: NonZeroUsize,
    /// Slot the next push writes to once the buffer is full (the oldest line).
    cursor: usize,
}

impl ContextRingBuffer {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity.get()),
            capacity,
            cursor: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Append `line`, evicting the oldest line when full.
    pub fn push(&mut self, line: LogLine) {
        if self.slots.len() < self.capacity.get() {
            self.slots.push(line);
        } else {
            self.slots[self.cursor] = line;
        }
        self.cursor = (self.cursor + 1) % self.capacity.get();
    }

    /// The most recently pushed line.
    pub fn last(&self) -> Option<&LogLine> {
        if self.slots.is_empty() {
            return None;
        }
        let idx = (self.cursor + self.capacity.get() - 1) % self.capacity.get();
        self.slots.get(idx)
    }

    /// Occupied slots, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogLine> {
        let split = if self.slots.len() < self.capacity.get() {
            0
        } else {
            self.cursor
        };
        let (newer, older) = self.slots.split_at(split);
        older.iter().chain(newer.iter())
    }

    /// Copy of the occupied slots in insertion order. Does not mutate the buffer.
    pub fn snapshot(&self) -> Vec<LogLine> {
        self.iter().cloned().collect()
    }

    /// Drop all lines; the capacity is kept.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.cursor = 0;
    }
}
