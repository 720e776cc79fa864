use thiserror::Error;

use super::integer_domain::IntegerDomain;
use super::notifications::DomainEvent;
use super::notifications::EventSink;
use super::TrailedInteger;
use super::TrailedValues;
use crate::containers::KeyedVec;
use crate::engine::variables::DomainId;
use crate::gourd_assert_moderate;

/// The error returned by a narrowing operation which would leave a domain without values.
///
/// The domain itself is left untouched; the state is nevertheless conflicting and should be
/// restored to an earlier checkpoint.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("the domain became empty")]
pub struct EmptyDomain;

/// The store of all integer domains.
///
/// Every narrowing goes through this store: it writes the versioned cells of the domain, appends
/// the removed values to the removal log of the domain, and records the resulting
/// [`DomainEvent`]s in the event sink.
#[derive(Debug, Clone, Default)]
pub struct Assignments {
    domains: KeyedVec<DomainId, IntegerDomain>,
    removal_logs: KeyedVec<DomainId, RemovalLog>,
    events: EventSink,
}

/// The ordered record of the values removed from one domain.
///
/// Only the first `len` entries are valid; `len` is a versioned cell, so restoring a checkpoint
/// forgets the removals made after it. Stale entries are overwritten by the next removal.
#[derive(Debug, Clone)]
struct RemovalLog {
    ranges: Vec<(i32, i32)>,
    len: TrailedInteger,
}

impl RemovalLog {
    fn push(&mut self, from: i32, to: i32, trailed_values: &mut TrailedValues) {
        let len = trailed_values.read(self.len) as usize;
        self.ranges.truncate(len);
        self.ranges.push((from, to));
        trailed_values.assign(self.len, len as i64 + 1);
    }
}

impl Assignments {
    pub(crate) fn grow(
        &mut self,
        domain: IntegerDomain,
        trailed_values: &mut TrailedValues,
    ) -> DomainId {
        self.events.grow();
        let _ = self.removal_logs.push(RemovalLog {
            ranges: vec![],
            len: trailed_values.grow(0),
        });
        self.domains.push(domain)
    }

    pub(crate) fn num_domains(&self) -> usize {
        self.domains.len()
    }

    pub(crate) fn domain_ids(&self) -> impl Iterator<Item = DomainId> {
        self.domains.keys()
    }

    pub(crate) fn domain(&self, domain_id: DomainId) -> &IntegerDomain {
        &self.domains[domain_id]
    }

    pub(crate) fn drain_events(&mut self) -> impl Iterator<Item = (DomainEvent, DomainId)> + '_ {
        self.events.drain()
    }

    pub(crate) fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    pub(crate) fn clear_events(&mut self) {
        self.events.clear()
    }

    /// The number of entries in the removal log of the domain.
    pub(crate) fn removal_log_len(
        &self,
        domain_id: DomainId,
        trailed_values: &TrailedValues,
    ) -> usize {
        trailed_values.read(self.removal_logs[domain_id].len) as usize
    }

    /// The removed ranges with a log position in `from..`.
    pub(crate) fn removals_since(
        &self,
        domain_id: DomainId,
        from: usize,
        trailed_values: &TrailedValues,
    ) -> &[(i32, i32)] {
        let len = self.removal_log_len(domain_id, trailed_values);
        &self.removal_logs[domain_id].ranges[from.min(len)..len]
    }
}

/// The narrowing operations.
///
/// Each returns `Ok(true)` if the domain changed, `Ok(false)` if the operation did not narrow the
/// domain, and [`EmptyDomain`] if it would have emptied it.
impl Assignments {
    pub(crate) fn tighten_lower_bound(
        &mut self,
        domain_id: DomainId,
        value: i32,
        trailed_values: &mut TrailedValues,
    ) -> Result<bool, EmptyDomain> {
        let domain = &self.domains[domain_id];
        let lower_bound = domain.lower_bound(trailed_values);
        let upper_bound = domain.upper_bound(trailed_values);

        if value <= lower_bound {
            return Ok(false);
        }
        if value > upper_bound {
            return Err(EmptyDomain);
        }

        let log = &mut self.removal_logs[domain_id];
        let mut removed = vec![];
        let new_lower_bound =
            domain.raise_lower_bound(value, trailed_values, &mut |from: i32, to: i32| {
                removed.push((from, to))
            });
        for (from, to) in removed {
            log.push(from, to, trailed_values);
        }

        self.events
            .event_occurred(DomainEvent::LowerBound, domain_id);
        if new_lower_bound == upper_bound {
            self.events.event_occurred(DomainEvent::Assign, domain_id);
        }

        Ok(true)
    }

    pub(crate) fn tighten_upper_bound(
        &mut self,
        domain_id: DomainId,
        value: i32,
        trailed_values: &mut TrailedValues,
    ) -> Result<bool, EmptyDomain> {
        let domain = &self.domains[domain_id];
        let lower_bound = domain.lower_bound(trailed_values);
        let upper_bound = domain.upper_bound(trailed_values);

        if value >= upper_bound {
            return Ok(false);
        }
        if value < lower_bound {
            return Err(EmptyDomain);
        }

        let log = &mut self.removal_logs[domain_id];
        let mut removed = vec![];
        let new_upper_bound =
            domain.lower_upper_bound(value, trailed_values, &mut |from: i32, to: i32| {
                removed.push((from, to))
            });
        for (from, to) in removed {
            log.push(from, to, trailed_values);
        }

        self.events
            .event_occurred(DomainEvent::UpperBound, domain_id);
        if new_upper_bound == lower_bound {
            self.events.event_occurred(DomainEvent::Assign, domain_id);
        }

        Ok(true)
    }

    pub(crate) fn make_assignment(
        &mut self,
        domain_id: DomainId,
        value: i32,
        trailed_values: &mut TrailedValues,
    ) -> Result<bool, EmptyDomain> {
        let domain = &self.domains[domain_id];
        if !domain.contains(value, trailed_values) {
            return Err(EmptyDomain);
        }
        if domain.lower_bound(trailed_values) == domain.upper_bound(trailed_values) {
            return Ok(false);
        }

        let _ = self.tighten_lower_bound(domain_id, value, trailed_values)?;
        let _ = self.tighten_upper_bound(domain_id, value, trailed_values)?;
        gourd_assert_moderate!(self.is_fixed(domain_id, trailed_values));

        Ok(true)
    }

    /// Removing a bound value is performed as a bound update, so that it is reported with a bound
    /// event. Interval domains ignore the removal of an interior value.
    pub(crate) fn remove_value(
        &mut self,
        domain_id: DomainId,
        value: i32,
        trailed_values: &mut TrailedValues,
    ) -> Result<bool, EmptyDomain> {
        let domain = &self.domains[domain_id];
        if !domain.contains(value, trailed_values) {
            return Ok(false);
        }

        let lower_bound = domain.lower_bound(trailed_values);
        let upper_bound = domain.upper_bound(trailed_values);
        if lower_bound == upper_bound {
            return Err(EmptyDomain);
        }
        if value == lower_bound {
            return self.tighten_lower_bound(domain_id, value + 1, trailed_values);
        }
        if value == upper_bound {
            return self.tighten_upper_bound(domain_id, value - 1, trailed_values);
        }

        if !domain.remove_interior(value, trailed_values) {
            return Ok(false);
        }
        self.removal_logs[domain_id].push(value, value, trailed_values);
        self.events.event_occurred(DomainEvent::Removal, domain_id);

        Ok(true)
    }

    fn is_fixed(&self, domain_id: DomainId, trailed_values: &TrailedValues) -> bool {
        let domain = &self.domains[domain_id];
        domain.lower_bound(trailed_values) == domain.upper_bound(trailed_values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(
        domain: impl FnOnce(&mut TrailedValues) -> IntegerDomain,
    ) -> (Assignments, TrailedValues, DomainId) {
        let mut trailed_values = TrailedValues::default();
        let mut assignments = Assignments::default();
        let domain = domain(&mut trailed_values);
        let domain_id = assignments.grow(domain, &mut trailed_values);
        (assignments, trailed_values, domain_id)
    }

    fn events(assignments: &mut Assignments) -> Vec<DomainEvent> {
        assignments.drain_events().map(|(event, _)| event).collect()
    }

    #[test]
    fn bound_that_does_not_move_inward_is_no_change() {
        let (mut assignments, mut trailed_values, x) =
            setup(|trailed_values| IntegerDomain::interval(0, 5, trailed_values));

        assert_eq!(Ok(false), assignments.tighten_lower_bound(x, 0, &mut trailed_values));
        assert_eq!(Ok(false), assignments.tighten_upper_bound(x, 7, &mut trailed_values));
        assert!(events(&mut assignments).is_empty());
    }

    #[test]
    fn crossing_bounds_is_empty_domain() {
        let (mut assignments, mut trailed_values, x) =
            setup(|trailed_values| IntegerDomain::interval(0, 5, trailed_values));

        assert_eq!(
            Err(EmptyDomain),
            assignments.tighten_lower_bound(x, 6, &mut trailed_values)
        );
        assert_eq!(
            Err(EmptyDomain),
            assignments.tighten_upper_bound(x, -1, &mut trailed_values)
        );
        assert_eq!(6, assignments.domain(x).size(&trailed_values));
    }

    #[test]
    fn bound_reaching_the_opposite_bound_is_promoted_to_assign() {
        let (mut assignments, mut trailed_values, x) =
            setup(|trailed_values| IntegerDomain::interval(0, 5, trailed_values));

        assert_eq!(Ok(true), assignments.tighten_lower_bound(x, 5, &mut trailed_values));
        assert_eq!(
            vec![DomainEvent::LowerBound, DomainEvent::Assign],
            events(&mut assignments)
        );
    }

    #[test]
    fn removing_a_bound_value_is_a_bound_update() {
        let (mut assignments, mut trailed_values, x) =
            setup(|trailed_values| IntegerDomain::enumerated(&[1, 2, 4, 6], trailed_values));

        assert_eq!(Ok(true), assignments.remove_value(x, 1, &mut trailed_values));
        assert_eq!(vec![DomainEvent::LowerBound], events(&mut assignments));
        assert_eq!(2, assignments.domain(x).lower_bound(&trailed_values));

        assert_eq!(Ok(true), assignments.remove_value(x, 4, &mut trailed_values));
        assert_eq!(vec![DomainEvent::Removal], events(&mut assignments));

        assert_eq!(Ok(false), assignments.remove_value(x, 4, &mut trailed_values));
        assert_eq!(Ok(false), assignments.remove_value(x, 3, &mut trailed_values));
    }

    #[test]
    fn removing_the_last_value_is_empty_domain() {
        let (mut assignments, mut trailed_values, x) =
            setup(|trailed_values| IntegerDomain::enumerated(&[3], trailed_values));

        assert_eq!(
            Err(EmptyDomain),
            assignments.remove_value(x, 3, &mut trailed_values)
        );
    }

    #[test]
    fn instantiating_to_an_absent_value_is_empty_domain() {
        let (mut assignments, mut trailed_values, x) =
            setup(|trailed_values| IntegerDomain::enumerated(&[1, 3, 5], trailed_values));

        assert_eq!(
            Err(EmptyDomain),
            assignments.make_assignment(x, 2, &mut trailed_values)
        );
        assert_eq!(Ok(true), assignments.make_assignment(x, 3, &mut trailed_values));
        assert_eq!(Ok(false), assignments.make_assignment(x, 3, &mut trailed_values));
        assert_eq!(
            Err(EmptyDomain),
            assignments.make_assignment(x, 5, &mut trailed_values)
        );
    }

    #[test]
    fn removal_log_is_restored_with_the_trail() {
        let (mut assignments, mut trailed_values, x) =
            setup(|trailed_values| IntegerDomain::enumerated(&[1, 2, 3, 4, 5], trailed_values));

        let _ = assignments.remove_value(x, 3, &mut trailed_values);
        trailed_values.new_checkpoint();
        let _ = assignments.tighten_upper_bound(x, 2, &mut trailed_values);
        assert_eq!(
            &[(3, 3), (4, 5)],
            assignments.removals_since(x, 0, &trailed_values)
        );

        trailed_values.synchronise(0);
        assert_eq!(&[(3, 3)], assignments.removals_since(x, 0, &trailed_values));

        let _ = assignments.remove_value(x, 2, &mut trailed_values);
        assert_eq!(
            &[(3, 3), (2, 2)],
            assignments.removals_since(x, 0, &trailed_values)
        );
    }
}
