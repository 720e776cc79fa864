use crate::engine::variables::DomainId;
use crate::engine::Assignments;
use crate::engine::TrailedInteger;
use crate::engine::TrailedValues;
#[cfg(doc)]
use crate::propagation::PropagatorConstructorContext;

/// The read position of one propagator in the removal log of one domain.
///
/// Created with [`PropagatorConstructorContext::new_delta_monitor`]. The position is a trailed
/// cell, so after restoring a checkpoint the monitor again points at the log entry it pointed at
/// back then, and the removals undone by the restore are never reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeltaMonitor {
    domain: DomainId,
    position: TrailedInteger,
}

impl DeltaMonitor {
    pub(crate) fn new(
        domain: DomainId,
        assignments: &Assignments,
        trailed_values: &mut TrailedValues,
    ) -> DeltaMonitor {
        let position =
            trailed_values.grow(assignments.removal_log_len(domain, trailed_values) as i64);
        DeltaMonitor { domain, position }
    }

    pub fn domain(&self) -> DomainId {
        self.domain
    }

    /// Returns the removals since the previous drain and moves the read position to the end of
    /// the log.
    pub(crate) fn drain(
        &self,
        assignments: &Assignments,
        trailed_values: &mut TrailedValues,
    ) -> DomainDelta {
        let from = trailed_values.read(self.position) as usize;
        let ranges = assignments
            .removals_since(self.domain, from, trailed_values)
            .to_vec();
        let len = assignments.removal_log_len(self.domain, trailed_values);
        trailed_values.assign(self.position, len as i64);

        DomainDelta { ranges }
    }
}

/// The values removed from a domain between two observations, in the order they were removed.
///
/// Removals are stored as inclusive ranges; a bound update on an interval domain is a single
/// range no matter how many values it removes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DomainDelta {
    ranges: Vec<(i32, i32)>,
}

impl DomainDelta {
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn ranges(&self) -> &[(i32, i32)] {
        &self.ranges
    }

    pub fn values(&self) -> impl Iterator<Item = i32> + '_ {
        self.ranges.iter().flat_map(|&(from, to)| from..=to)
    }

    pub fn num_values(&self) -> u64 {
        self.ranges
            .iter()
            .map(|&(from, to)| (to as i64 - from as i64 + 1) as u64)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::State;

    #[test]
    fn drained_delta_contains_removals_in_order() {
        let mut state = State::default();
        let x = state.new_sparse_variable(vec![1, 2, 3, 4, 5, 6], None);
        let monitor = state.new_delta_monitor(x);

        let _ = state.remove(x, 3).expect("non-empty");
        let _ = state.set_upper_bound(x, 4).expect("non-empty");

        let delta = state.drain_delta(&monitor);
        assert_eq!(&[(3, 3), (5, 6)], delta.ranges());
        assert_eq!(vec![3, 5, 6], delta.values().collect::<Vec<_>>());
        assert!(state.drain_delta(&monitor).is_empty());
        assert_eq!(4, state.upper_bound(x));
    }

    #[test]
    fn restored_removals_are_not_reported() {
        let mut state = State::default();
        let x = state.new_interval_variable(0, 100, None);
        let monitor = state.new_delta_monitor(x);

        let _ = state.set_lower_bound(x, 10).expect("non-empty");
        state.new_checkpoint();
        let _ = state.set_lower_bound(x, 50).expect("non-empty");
        assert_eq!(&[(0, 9), (10, 49)], state.drain_delta(&monitor).ranges());

        state.restore_to(0);
        let _ = state.set_upper_bound(x, 90).expect("non-empty");
        let delta = state.drain_delta(&monitor);
        assert_eq!(&[(0, 9), (91, 100)], delta.ranges());
        assert_eq!(20, delta.num_values());
    }
}
