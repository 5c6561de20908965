use std::collections::VecDeque;

/// Frequencies selected during a session, most recent last.
///
/// Only the newest `capacity` entries are kept: a pattern can never look
/// further back than its own length, so older entries are dead weight.
#[derive(Debug, Clone)]
pub struct SelectionHistory {
    entries: VecDeque<String>,
    capacity: usize,
}

impl SelectionHistory {
    /// A capacity of zero still keeps the latest entry.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, value: impl Into<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(value.into());
    }

    /// Entries oldest first, as one contiguous slice.
    pub fn as_slice(&mut self) -> &[String] {
        self.entries.make_contiguous()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
