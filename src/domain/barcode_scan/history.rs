use std::collections::VecDeque;

use super::entity::BarcodeScanResult;

pub const DEFAULT_HISTORY_CAPACITY: usize = 20;

/// Bounded, newest-first list of completed scans.
///
/// Owned by a single orchestrator; never shared process-wide.
#[derive(Debug, Clone)]
pub struct ScanHistory {
    entries: VecDeque<BarcodeScanResult>,
    capacity: usize,
}

impl ScanHistory {
    /// A capacity of zero is raised to one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert at the head, evicting from the tail past the bound
    pub fn push(&mut self, result: BarcodeScanResult) {
        self.entries.push_front(result);
        self.entries.truncate(self.capacity);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
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

    pub fn latest(&self) -> Option<&BarcodeScanResult> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BarcodeScanResult> {
        self.entries.iter()
    }

    /// Snapshot, newest first
    pub fn to_vec(&self) -> Vec<BarcodeScanResult> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for ScanHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
