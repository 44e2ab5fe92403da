//! Ready Queue simulation.
//!
//! An ordered sequence of process handles in arrival order. Policies may
//! select any entry, not just the head, but selection never reorders the
//! remaining entries. All keyed selections break ties toward the entry
//! that was enqueued earliest, so runs are deterministic for a given input.

use std::cmp::Reverse;
use std::collections::VecDeque;

use crate::types::Pid;

#[derive(Debug, Clone, Default)]
pub struct ReadyQueue {
    entries: VecDeque<Pid>,
}

impl ReadyQueue {
    pub fn new() -> Self {
        ReadyQueue {
            entries: VecDeque::new(),
        }
    }

    /// Append a process at the tail.
    ///
    /// # Panics
    /// Panics if the process is already queued; a process is never in a
    /// queue twice.
    pub fn push_back(&mut self, pid: Pid) {
        assert!(
            !self.contains(pid),
            "pid {pid} enqueued twice on the ready queue"
        );
        self.entries.push_back(pid);
    }

    /// Pop the head of the queue.
    pub fn pop_front(&mut self) -> Option<Pid> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.entries.contains(&pid)
    }

    /// Iterate in queue order without consuming.
    pub fn iter(&self) -> impl Iterator<Item = Pid> + '_ {
        self.entries.iter().copied()
    }

    /// Return all PIDs in queue order without consuming.
    pub fn ordered_pids(&self) -> Vec<Pid> {
        self.entries.iter().copied().collect()
    }

    /// Position of the earliest entry with the smallest key.
    pub fn position_min_by_key<K: Ord>(&self, mut key: impl FnMut(Pid) -> K) -> Option<usize> {
        // `min_by_key` keeps the first of several equal minima.
        self.entries
            .iter()
            .enumerate()
            .min_by_key(|(_, &pid)| key(pid))
            .map(|(pos, _)| pos)
    }

    /// Position of the earliest entry with the largest key.
    pub fn position_max_by_key<K: Ord>(&self, mut key: impl FnMut(Pid) -> K) -> Option<usize> {
        self.position_min_by_key(|pid| Reverse(key(pid)))
    }

    /// Remove and return the entry at `pos`.
    pub fn remove_at(&mut self, pos: usize) -> Option<Pid> {
        self.entries.remove(pos)
    }

    /// Remove a specific PID from the queue. Returns true if found.
    pub fn remove_pid(&mut self, pid: Pid) -> bool {
        if let Some(pos) = self.entries.iter().position(|&p| p == pid) {
            self.entries.remove(pos);
            true
        } else {
            false
        }
    }
}
