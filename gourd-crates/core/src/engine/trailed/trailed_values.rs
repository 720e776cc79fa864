use super::TrailedChange;
use super::TrailedInteger;
use crate::basic_types::Trail;
use crate::containers::KeyedVec;

/// The arena of versioned cells together with the trail that makes them restorable.
///
/// Every piece of state that has to survive backtracking (domain bounds, bitset words, counters
/// kept by propagators) is a cell in this arena. A write first records the previous value on the
/// trail; [`TrailedValues::synchronise`] replays those records in reverse.
#[derive(Default, Debug, Clone)]
pub struct TrailedValues {
    trail: Trail<TrailedChange>,
    values: KeyedVec<TrailedInteger, i64>,
}

impl TrailedValues {
    pub(crate) fn grow(&mut self, initial_value: i64) -> TrailedInteger {
        self.values.push(initial_value)
    }

    pub(crate) fn num_cells(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn num_trail_entries(&self) -> usize {
        self.trail.len()
    }

    pub(crate) fn new_checkpoint(&mut self) {
        self.trail.new_checkpoint()
    }

    pub(crate) fn get_checkpoint(&self) -> usize {
        self.trail.get_checkpoint()
    }

    pub(crate) fn read(&self, trailed_integer: TrailedInteger) -> i64 {
        self.values[trailed_integer]
    }

    pub(crate) fn synchronise(&mut self, checkpoint: usize) {
        self.trail
            .synchronise(checkpoint)
            .for_each(|change| self.values[change.reference] = change.old_value)
    }

    pub(crate) fn assign(&mut self, trailed_integer: TrailedInteger, value: i64) {
        let old_value = self.values[trailed_integer];
        if old_value == value {
            return;
        }
        self.trail.push(TrailedChange {
            old_value,
            reference: trailed_integer,
        });
        self.values[trailed_integer] = value;
    }

    pub(crate) fn add_assign(&mut self, trailed_integer: TrailedInteger, addition: i64) {
        self.assign(trailed_integer, self.values[trailed_integer] + addition);
    }
}

#[cfg(test)]
mod tests {
    use super::TrailedValues;

    #[test]
    fn synchronise_restores_values_per_checkpoint() {
        let mut trailed_values = TrailedValues::default();
        let cell = trailed_values.grow(0);

        trailed_values.new_checkpoint();
        trailed_values.add_assign(cell, 5);
        trailed_values.add_assign(cell, 5);
        assert_eq!(trailed_values.read(cell), 10);

        trailed_values.new_checkpoint();
        trailed_values.add_assign(cell, 1);
        assert_eq!(trailed_values.read(cell), 11);

        trailed_values.synchronise(1);
        assert_eq!(trailed_values.read(cell), 10);

        trailed_values.synchronise(0);
        assert_eq!(trailed_values.read(cell), 0);
    }

    #[test]
    fn writing_the_same_value_is_not_recorded() {
        let mut trailed_values = TrailedValues::default();
        let cell = trailed_values.grow(3);

        trailed_values.new_checkpoint();
        trailed_values.assign(cell, 3);

        assert_eq!(trailed_values.num_trail_entries(), 0);
    }

    #[test]
    fn cells_created_after_a_checkpoint_keep_their_initial_value() {
        let mut trailed_values = TrailedValues::default();
        trailed_values.new_checkpoint();
        let cell = trailed_values.grow(4);
        trailed_values.assign(cell, 9);

        trailed_values.synchronise(0);

        assert_eq!(trailed_values.read(cell), 4);
    }
}
