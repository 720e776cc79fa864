use std::iter::Rev;
use std::ops::Deref;
use std::vec::Drain;

use crate::gourd_assert_simple;

/// An append-only log of undo records, partitioned by checkpoints.
///
/// Records pushed after the `i`-th call to [`Trail::new_checkpoint`] belong to checkpoint `i`.
/// [`Trail::synchronise`] hands back every record newer than the requested checkpoint, newest
/// first, so that the caller can revert them in strict reverse chronological order.
#[derive(Clone, Debug)]
pub(crate) struct Trail<T> {
    current_checkpoint: usize,
    /// At index `i` is the length of the trail when checkpoint `i + 1` was created.
    delimiters: Vec<usize>,
    records: Vec<T>,
}

// Implemented by hand so that `T` is not required to be `Default`.
impl<T> Default for Trail<T> {
    fn default() -> Self {
        Trail {
            current_checkpoint: 0,
            delimiters: Vec::new(),
            records: Vec::new(),
        }
    }
}

impl<T> Trail<T> {
    pub(crate) fn new_checkpoint(&mut self) {
        self.current_checkpoint += 1;
        self.delimiters.push(self.records.len());
    }

    pub(crate) fn get_checkpoint(&self) -> usize {
        self.current_checkpoint
    }

    /// The records which were pushed while `checkpoint` was the current checkpoint.
    pub(crate) fn records_at_checkpoint(&self, checkpoint: usize) -> &[T] {
        gourd_assert_simple!(checkpoint <= self.current_checkpoint);

        let start = if checkpoint == 0 {
            0
        } else {
            self.delimiters[checkpoint - 1]
        };
        let end = if checkpoint == self.current_checkpoint {
            self.records.len()
        } else {
            self.delimiters[checkpoint]
        };

        &self.records[start..end]
    }

    /// Drops back to `checkpoint`, returning the removed records newest first.
    pub(crate) fn synchronise(&mut self, checkpoint: usize) -> Rev<Drain<'_, T>> {
        gourd_assert_simple!(checkpoint < self.current_checkpoint);

        let new_len = self.delimiters[checkpoint];

        self.current_checkpoint = checkpoint;
        self.delimiters.truncate(checkpoint);
        self.records.drain(new_len..).rev()
    }

    pub(crate) fn push(&mut self, record: T) {
        self.records.push(record)
    }
}

impl<T> Deref for Trail<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}
