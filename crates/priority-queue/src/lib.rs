//! FIFO backlog of pending cross-layer transactions.
//!
//! L1-submitted priority operations must be consumed by L2 execution in
//! submission order; this queue is the sequencing backbone that makes the
//! ordering checkable.  Operations enter at the back when a request is
//! submitted and leave from the front once the corresponding L2 execution
//! is finalized.  There is no random access and no removal except from the
//! front.
//!
//! The head and tail counters are absolute: `first_unprocessed()` is the
//! total number of operations ever popped and `total()` the total ever
//! pushed, so `total() - first_unprocessed()` is always the live size.

use std::collections::VecDeque;

use cairn_upgrade_types::PriorityOperation;
use serde::{Deserialize, Serialize};

/// Errors from queue access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// Front access on an empty queue.
    #[error("priority queue is empty")]
    QueueIsEmpty,
}

/// Strictly ordered priority-operation backlog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityQueue {
    data: VecDeque<PriorityOperation>,
    /// Index of the first operation not yet popped.
    head: u64,
    /// Index one past the last pushed operation.
    tail: u64,
}

impl PriorityQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an operation at the back of the queue.
    pub fn push_back(&mut self, op: PriorityOperation) {
        self.data.push_back(op);
        self.tail += 1;
    }

    /// The operation at the front, without removing it.
    pub fn front(&self) -> Result<&PriorityOperation, QueueError> {
        self.data.front().ok_or(QueueError::QueueIsEmpty)
    }

    /// Removes and returns the operation at the front.
    pub fn pop_front(&mut self) -> Result<PriorityOperation, QueueError> {
        let op = self.data.pop_front().ok_or(QueueError::QueueIsEmpty)?;
        self.head += 1;
        Ok(op)
    }

    /// Number of operations currently pending.
    pub fn size(&self) -> u64 {
        self.tail - self.head
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Index of the first operation not yet processed, i.e. the number of
    /// operations popped so far.
    pub fn first_unprocessed(&self) -> u64 {
        self.head
    }

    /// Total number of operations ever pushed.
    pub fn total(&self) -> u64 {
        self.tail
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::B256;

    use super::*;

    fn op(n: u8) -> PriorityOperation {
        PriorityOperation {
            canonical_tx_hash: B256::repeat_byte(n),
            expiration_timestamp: 1000 + n as u64,
        }
    }

    #[test]
    fn empty_queue_behavior() {
        let mut q = PriorityQueue::new();
        assert_eq!(q.size(), 0);
        assert!(q.is_empty());
        assert_eq!(q.front(), Err(QueueError::QueueIsEmpty));
        assert_eq!(q.pop_front(), Err(QueueError::QueueIsEmpty));
    }

    #[test]
    fn push_pop_counts() {
        let mut q = PriorityQueue::new();
        q.push_back(op(1));
        q.push_back(op(2));
        q.push_back(op(3));

        assert_eq!(q.total(), 3);
        assert_eq!(q.first_unprocessed(), 0);
        assert_eq!(q.size(), 3);

        let popped = q.pop_front().unwrap();
        assert_eq!(popped, op(1));
        assert_eq!(q.first_unprocessed(), 1);
        assert_eq!(q.size(), 2);
        assert_eq!(q.total(), 3);
    }

    #[test]
    fn fifo_order() {
        let mut q = PriorityQueue::new();
        for n in 0..10 {
            q.push_back(op(n));
        }
        for n in 0..10 {
            assert_eq!(q.front().unwrap(), &op(n));
            assert_eq!(q.pop_front().unwrap(), op(n));
        }
        assert!(q.is_empty());
        assert_eq!(q.first_unprocessed(), 10);
    }

    #[test]
    fn counters_survive_drain_and_refill() {
        let mut q = PriorityQueue::new();
        q.push_back(op(1));
        q.pop_front().unwrap();
        q.push_back(op(2));
        assert_eq!(q.total(), 2);
        assert_eq!(q.first_unprocessed(), 1);
        assert_eq!(q.size(), 1);
    }
}
