use super::DeltaMonitor;
use super::DomainDelta;
use super::Domains;
use super::HasAssignments;
use super::PropagatorId;
#[cfg(doc)]
use super::ReadDomains;
use crate::engine::variables::DomainId;
use crate::engine::Assignments;
use crate::engine::EmptyDomain;
use crate::engine::TrailedInteger;
use crate::engine::TrailedValues;

/// Provides information about the state of the engine to a propagator, and is the only way for a
/// propagator to change it.
///
/// Domains can be read through the implementation of [`ReadDomains`]. Every narrowing operation
/// returns `Ok(true)` if the domain changed, `Ok(false)` if it did not, and [`EmptyDomain`] if it
/// would have become empty; in the latter case the domain is untouched.
#[derive(Debug)]
pub struct PropagationContext<'a> {
    pub(crate) trailed_values: &'a mut TrailedValues,
    pub(crate) assignments: &'a mut Assignments,
    pub(crate) propagator_id: PropagatorId,
    reenqueue: &'a mut bool,
}

impl<'a> PropagationContext<'a> {
    pub(crate) fn new(
        trailed_values: &'a mut TrailedValues,
        assignments: &'a mut Assignments,
        propagator_id: PropagatorId,
        reenqueue: &'a mut bool,
    ) -> Self {
        PropagationContext {
            trailed_values,
            assignments,
            propagator_id,
            reenqueue,
        }
    }

    pub fn propagator_id(&self) -> PropagatorId {
        self.propagator_id
    }

    /// Get the current domain information.
    pub fn domains(&self) -> Domains<'_> {
        Domains::new(self.assignments, self.trailed_values)
    }

    pub fn reborrow(&mut self) -> PropagationContext<'_> {
        PropagationContext {
            trailed_values: self.trailed_values,
            assignments: self.assignments,
            propagator_id: self.propagator_id,
            reenqueue: self.reenqueue,
        }
    }

    pub fn set_lower_bound(&mut self, var: DomainId, value: i32) -> Result<bool, EmptyDomain> {
        self.assignments
            .tighten_lower_bound(var, value, self.trailed_values)
    }

    pub fn set_upper_bound(&mut self, var: DomainId, value: i32) -> Result<bool, EmptyDomain> {
        self.assignments
            .tighten_upper_bound(var, value, self.trailed_values)
    }

    pub fn assign(&mut self, var: DomainId, value: i32) -> Result<bool, EmptyDomain> {
        self.assignments
            .make_assignment(var, value, self.trailed_values)
    }

    /// Removing an interior value of an interval domain is not representable and reports no
    /// change.
    pub fn remove(&mut self, var: DomainId, value: i32) -> Result<bool, EmptyDomain> {
        self.assignments
            .remove_value(var, value, self.trailed_values)
    }

    pub fn assign_trailed(&mut self, trailed_integer: TrailedInteger, value: i64) {
        self.trailed_values.assign(trailed_integer, value);
    }

    pub fn add_assign_trailed(&mut self, trailed_integer: TrailedInteger, addition: i64) {
        self.trailed_values.add_assign(trailed_integer, addition);
    }

    /// Direct access to the trailed cells, e.g. for the backtrackable graphs.
    pub fn trailed_values_mut(&mut self) -> &mut TrailedValues {
        self.trailed_values
    }

    /// The values removed from the monitored domain since the previous drain.
    pub fn drain_delta(&mut self, monitor: &DeltaMonitor) -> DomainDelta {
        monitor.drain(self.assignments, self.trailed_values)
    }

    /// Changes made by a propagator do not wake up the propagator itself. A propagator which may
    /// not be at its own fixpoint after a call requests another call with this method.
    pub fn enqueue_again(&mut self) {
        *self.reenqueue = true;
    }
}

impl HasAssignments for PropagationContext<'_> {
    fn assignments(&self) -> &Assignments {
        self.assignments
    }

    fn trailed_values(&self) -> &TrailedValues {
        self.trailed_values
    }
}

/// Provided to the propagator when it is notified of a domain event.
///
/// The difference with [`PropagationContext`] is that domains cannot be narrowed; only the
/// trailed cells of the propagator can be updated.
#[derive(Debug)]
pub struct NotificationContext<'a> {
    pub(crate) trailed_values: &'a mut TrailedValues,
    pub(crate) assignments: &'a Assignments,
}

impl<'a> NotificationContext<'a> {
    pub(crate) fn new(trailed_values: &'a mut TrailedValues, assignments: &'a Assignments) -> Self {
        NotificationContext {
            trailed_values,
            assignments,
        }
    }

    pub fn domains(&self) -> Domains<'_> {
        Domains::new(self.assignments, self.trailed_values)
    }

    pub fn assign_trailed(&mut self, trailed_integer: TrailedInteger, value: i64) {
        self.trailed_values.assign(trailed_integer, value);
    }

    pub fn add_assign_trailed(&mut self, trailed_integer: TrailedInteger, addition: i64) {
        self.trailed_values.add_assign(trailed_integer, addition);
    }

    pub fn drain_delta(&mut self, monitor: &DeltaMonitor) -> DomainDelta {
        monitor.drain(self.assignments, self.trailed_values)
    }
}

impl HasAssignments for NotificationContext<'_> {
    fn assignments(&self) -> &Assignments {
        self.assignments
    }

    fn trailed_values(&self) -> &TrailedValues {
        self.trailed_values
    }
}
