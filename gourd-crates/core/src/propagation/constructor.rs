use super::DeltaMonitor;
use super::DomainEvents;
use super::Domains;
use super::HasAssignments;
use super::LocalId;
use super::Propagator;
use super::PropagatorId;
use super::PropagatorVarId;
use crate::engine::variables::DomainId;
use crate::engine::Assignments;
use crate::engine::State;
use crate::engine::TrailedInteger;
use crate::engine::TrailedValues;

/// A propagator constructor creates a fully initialised instance of a [`Propagator`].
///
/// The constructor is responsible for indicating on which events the propagator should be
/// enqueued, and for allocating the trailed cells the propagator keeps its incremental state in.
pub trait PropagatorConstructor {
    /// The propagator that is produced by this constructor.
    type PropagatorImpl: Propagator + Clone;

    /// Create the propagator instance from `Self`.
    fn create(self, context: PropagatorConstructorContext) -> Self::PropagatorImpl;
}

/// [`PropagatorConstructorContext`] is the communication point between the [`State`] and a
/// [`Propagator`] while the propagator is created.
#[derive(Debug)]
pub struct PropagatorConstructorContext<'a> {
    state: &'a mut State,
    pub(crate) propagator_id: PropagatorId,
}

impl PropagatorConstructorContext<'_> {
    pub(crate) fn new(
        propagator_id: PropagatorId,
        state: &mut State,
    ) -> PropagatorConstructorContext<'_> {
        PropagatorConstructorContext {
            state,
            propagator_id,
        }
    }

    pub fn propagator_id(&self) -> PropagatorId {
        self.propagator_id
    }

    /// Get domain information.
    pub fn domains(&self) -> Domains<'_> {
        Domains::new(&self.state.assignments, &self.state.trailed_values)
    }

    /// Subscribes the propagator to the given [`DomainEvents`] of `var`.
    ///
    /// The domain events determine when [`Propagator::notify`] will be called on the propagator.
    /// The [`LocalId`] identifies the variable in that call; every variable of a propagator
    /// *must* have a unique [`LocalId`], most often its index in the propagator's array of
    /// variables.
    pub fn register(&mut self, var: DomainId, domain_events: DomainEvents, local_id: LocalId) {
        let propagator_var = PropagatorVarId {
            propagator: self.propagator_id,
            variable: local_id,
        };

        self.state
            .notification_engine
            .watch_all(var, domain_events.events(), propagator_var);
    }

    /// Allocates a trailed cell with the given initial value.
    pub fn new_trailed_integer(&mut self, initial_value: i64) -> TrailedInteger {
        self.state.trailed_values.grow(initial_value)
    }

    /// Starts observing the removals of `var` from this point on.
    pub fn new_delta_monitor(&mut self, var: DomainId) -> DeltaMonitor {
        DeltaMonitor::new(var, &self.state.assignments, &mut self.state.trailed_values)
    }

    /// Direct access to the trailed cells, e.g. to create backtrackable graphs.
    pub fn trailed_values_mut(&mut self) -> &mut TrailedValues {
        &mut self.state.trailed_values
    }
}

impl HasAssignments for PropagatorConstructorContext<'_> {
    fn assignments(&self) -> &Assignments {
        &self.state.assignments
    }

    fn trailed_values(&self) -> &TrailedValues {
        &self.state.trailed_values
    }
}
