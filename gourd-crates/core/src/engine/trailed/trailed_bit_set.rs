use super::TrailedInteger;
use super::TrailedValues;

const WORD_SIZE: usize = 64;

/// A set over `0..capacity` whose membership bits are versioned cells.
///
/// Each word of 64 membership bits is one cell, and the cardinality is a cell of its own. Both
/// insertions and removals are undone when restoring an earlier checkpoint.
#[derive(Debug, Clone)]
pub(crate) struct TrailedBitSet {
    words: Vec<TrailedInteger>,
    size: TrailedInteger,
    capacity: usize,
}

impl TrailedBitSet {
    pub(crate) fn new(
        capacity: usize,
        elements: impl IntoIterator<Item = usize>,
        trailed_values: &mut TrailedValues,
    ) -> TrailedBitSet {
        let num_words = capacity.div_ceil(WORD_SIZE).max(1);
        let mut bits = vec![0_u64; num_words];
        let mut size = 0;
        for element in elements {
            assert!(element < capacity, "element {element} exceeds capacity {capacity}");
            let mask = 1_u64 << (element % WORD_SIZE);
            if bits[element / WORD_SIZE] & mask == 0 {
                bits[element / WORD_SIZE] |= mask;
                size += 1;
            }
        }

        TrailedBitSet {
            words: bits
                .into_iter()
                .map(|word| trailed_values.grow(word as i64))
                .collect(),
            size: trailed_values.grow(size),
            capacity,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn len(&self, trailed_values: &TrailedValues) -> usize {
        trailed_values.read(self.size) as usize
    }

    pub(crate) fn is_empty(&self, trailed_values: &TrailedValues) -> bool {
        self.len(trailed_values) == 0
    }

    fn word(&self, index: usize, trailed_values: &TrailedValues) -> u64 {
        trailed_values.read(self.words[index]) as u64
    }

    pub(crate) fn contains(&self, element: usize, trailed_values: &TrailedValues) -> bool {
        element < self.capacity
            && self.word(element / WORD_SIZE, trailed_values) & (1 << (element % WORD_SIZE)) != 0
    }

    /// Returns whether the element was absent before.
    pub(crate) fn insert(&self, element: usize, trailed_values: &mut TrailedValues) -> bool {
        if element >= self.capacity || self.contains(element, trailed_values) {
            return false;
        }
        let word = self.word(element / WORD_SIZE, trailed_values) | (1 << (element % WORD_SIZE));
        trailed_values.assign(self.words[element / WORD_SIZE], word as i64);
        trailed_values.add_assign(self.size, 1);
        true
    }

    /// Returns whether the element was present before.
    pub(crate) fn remove(&self, element: usize, trailed_values: &mut TrailedValues) -> bool {
        if !self.contains(element, trailed_values) {
            return false;
        }
        let word = self.word(element / WORD_SIZE, trailed_values) & !(1 << (element % WORD_SIZE));
        trailed_values.assign(self.words[element / WORD_SIZE], word as i64);
        trailed_values.add_assign(self.size, -1);
        true
    }

    /// Removes every member in `from..=to`, reporting each removed member in increasing order.
    pub(crate) fn remove_range(
        &self,
        from: usize,
        to: usize,
        trailed_values: &mut TrailedValues,
        mut on_removal: impl FnMut(usize),
    ) {
        if from > to || from >= self.capacity {
            return;
        }
        let to = to.min(self.capacity - 1);
        let mut removed = 0;
        for word_index in from / WORD_SIZE..=to / WORD_SIZE {
            let low = if word_index == from / WORD_SIZE {
                from % WORD_SIZE
            } else {
                0
            };
            let high = if word_index == to / WORD_SIZE {
                to % WORD_SIZE
            } else {
                WORD_SIZE - 1
            };
            let mask = (u64::MAX >> (WORD_SIZE - 1 - high)) & (u64::MAX << low);

            let word = self.word(word_index, trailed_values);
            let mut cleared = word & mask;
            if cleared == 0 {
                continue;
            }
            trailed_values.assign(self.words[word_index], (word & !mask) as i64);

            while cleared != 0 {
                let bit = cleared.trailing_zeros() as usize;
                on_removal(word_index * WORD_SIZE + bit);
                cleared &= cleared - 1;
                removed += 1;
            }
        }
        trailed_values.add_assign(self.size, -removed);
    }

    /// The smallest member which is at least `from`.
    pub(crate) fn next_member(&self, from: usize, trailed_values: &TrailedValues) -> Option<usize> {
        if from >= self.capacity {
            return None;
        }
        let mut word_index = from / WORD_SIZE;
        let mut bits = self.word(word_index, trailed_values) & (u64::MAX << (from % WORD_SIZE));
        loop {
            if bits != 0 {
                return Some(word_index * WORD_SIZE + bits.trailing_zeros() as usize);
            }
            word_index += 1;
            if word_index >= self.words.len() {
                return None;
            }
            bits = self.word(word_index, trailed_values);
        }
    }

    /// The largest member which is at most `from`.
    pub(crate) fn previous_member(
        &self,
        from: usize,
        trailed_values: &TrailedValues,
    ) -> Option<usize> {
        let from = from.min(self.capacity.checked_sub(1)?);
        let mut word_index = from / WORD_SIZE;
        let mut bits = self.word(word_index, trailed_values)
            & (u64::MAX >> (WORD_SIZE - 1 - from % WORD_SIZE));
        loop {
            if bits != 0 {
                return Some(word_index * WORD_SIZE + WORD_SIZE - 1 - bits.leading_zeros() as usize);
            }
            if word_index == 0 {
                return None;
            }
            word_index -= 1;
            bits = self.word(word_index, trailed_values);
        }
    }

    pub(crate) fn iter<'a>(
        &'a self,
        trailed_values: &'a TrailedValues,
    ) -> impl Iterator<Item = usize> + 'a {
        let mut next = self.next_member(0, trailed_values);
        std::iter::from_fn(move || {
            let current = next?;
            next = self.next_member(current + 1, trailed_values);
            Some(current)
        })
    }
}
