use log::debug;
use log::trace;
use thiserror::Error;

use super::integer_domain::IntegerDomain;
use super::notifications::NotificationEngine;
use super::variables::DomainId;
use super::Assignments;
use super::EmptyDomain;
use super::PropagatorQueue;
use super::TrailedValues;
use super::VariableNames;
use crate::basic_types::ConstraintOperationError;
use crate::basic_types::Inconsistency;
use crate::constraints::Constraint;
use crate::create_statistics_struct;
use crate::gourd_assert_eq_simple;
use crate::gourd_assert_extreme;
use crate::gourd_assert_simple;
use crate::propagation::store::PropagatorStore;
use crate::propagation::DeltaMonitor;
use crate::propagation::DomainDelta;
use crate::propagation::DomainIterator;
use crate::propagation::Domains;
use crate::propagation::PropagationContext;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorConstructorContext;
use crate::propagation::PropagatorHandle;
use crate::propagation::PropagatorId;
use crate::propagation::ReadDomains;
use crate::statistics::log_statistic;
use crate::statistics::StatisticLogger;

/// The [`State`] is the container of variables and propagators, and the propagation engine
/// working on them.
///
/// The engine is either idle (nothing is enqueued) or running [`State::propagate_to_fixed_point`].
/// Decisions made by a search procedure are narrowing operations on the [`State`]; backtracking
/// is done with [`State::new_checkpoint`] and [`State::restore_to`].
///
/// [`State`] implements [`Clone`], and cloning the [`State`] will create a fresh copy of the
/// [`State`]. If the [`State`] is large, this may be extremely expensive.
#[derive(Debug, Clone, Default)]
pub struct State {
    /// The list of propagators; propagators live here and are queried when events (domain changes)
    /// happen.
    pub(crate) propagators: PropagatorStore,
    /// The domains of the integer variables.
    pub(crate) assignments: Assignments,
    /// Keep track of trailed values (i.e. values which automatically backtrack).
    pub(crate) trailed_values: TrailedValues,
    /// The names of the variables.
    pub(crate) variable_names: VariableNames,
    /// Dictates the order in which propagators will be called to propagate.
    pub(crate) propagator_queue: PropagatorQueue,
    /// Holds the subscriptions of propagators to domain events.
    pub(crate) notification_engine: NotificationEngine,

    statistics: StateStatistics,
}

create_statistics_struct!(StateStatistics {
    num_propagators_called: usize,
    num_conflicts: usize,
    num_checkpoints: usize,
    num_restores: usize,
});

/// The conflict returned by [`State::propagate_to_fixed_point`]: the propagator which failed and
/// the way in which it failed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{propagator} failed: {inconsistency}")]
pub struct Conflict {
    pub propagator: PropagatorId,
    pub inconsistency: Inconsistency,
}

impl State {
    pub fn log_statistics(&self, verbose: bool) {
        log_statistic("variables", self.assignments.num_domains());
        log_statistic("propagators", self.propagators.num_propagators());
        log_statistic("failures", self.statistics.num_conflicts);
        log_statistic("propagations", self.statistics.num_propagators_called);
        log_statistic("checkpoints", self.statistics.num_checkpoints);
        log_statistic("restores", self.statistics.num_restores);
        log_statistic("trailedCells", self.trailed_values.num_cells());
        log_statistic("trailEntries", self.trailed_values.num_trail_entries());
        if verbose {
            for (index, propagator) in self.propagators.iter_propagators().enumerate() {
                propagator.log_statistics(StatisticLogger::new([
                    propagator.name(),
                    "number",
                    index.to_string().as_str(),
                ]));
            }
        }
    }
}

/// Operations to create variables.
impl State {
    /// Creates a new interval variable with the given lower and upper bound. An interval domain
    /// cannot represent holes; removing an interior value from it reports no change.
    ///
    /// Creation of new domains is not influenced by the current checkpoint of the state. If
    /// a domain is created at a non-zero checkpoint, then it will _not_ 'disappear' when
    /// backtracking past the checkpoint where the domain was created.
    pub fn new_interval_variable(
        &mut self,
        lower_bound: i32,
        upper_bound: i32,
        name: Option<&str>,
    ) -> DomainId {
        gourd_assert_simple!(
            lower_bound <= upper_bound,
            "cannot create a variable with an empty domain"
        );

        let domain = IntegerDomain::interval(lower_bound, upper_bound, &mut self.trailed_values);
        self.grow(domain, name)
    }

    /// Creates a new enumerated variable with exactly the given values. The domain keeps one
    /// trailed bit per value between the smallest and the largest value.
    ///
    /// For more information on creation of domains, see [`State::new_interval_variable`].
    pub fn new_sparse_variable(&mut self, values: Vec<i32>, name: Option<&str>) -> DomainId {
        gourd_assert_simple!(
            !values.is_empty(),
            "cannot create a variable with an empty domain"
        );

        let domain = IntegerDomain::enumerated(&values, &mut self.trailed_values);
        self.grow(domain, name)
    }

    /// Creates a new enumerated variable, reporting an empty list of values as a model fault.
    pub fn try_new_sparse_variable(
        &mut self,
        values: Vec<i32>,
        name: Option<&str>,
    ) -> Result<DomainId, ConstraintOperationError> {
        if values.is_empty() {
            return Err(ConstraintOperationError::EmptyInitialDomain);
        }
        Ok(self.new_sparse_variable(values, name))
    }

    /// Creates a new 0-1 variable.
    pub fn new_boolean_variable(&mut self, name: Option<&str>) -> DomainId {
        self.new_interval_variable(0, 1, name)
    }

    fn grow(&mut self, domain: IntegerDomain, name: Option<&str>) -> DomainId {
        let domain_id = self.assignments.grow(domain, &mut self.trailed_values);

        if let Some(name) = name {
            self.variable_names.add_integer(domain_id, name.to_owned());
        }

        self.notification_engine.grow();

        domain_id
    }

    /// Starts observing the removals of `var`; see [`DeltaMonitor`].
    pub fn new_delta_monitor(&mut self, var: DomainId) -> DeltaMonitor {
        DeltaMonitor::new(var, &self.assignments, &mut self.trailed_values)
    }
}

/// Operations to retrieve information about values.
impl State {
    pub fn num_variables(&self) -> usize {
        self.assignments.num_domains()
    }

    pub fn variables(&self) -> impl Iterator<Item = DomainId> {
        self.assignments.domain_ids()
    }

    pub fn variable_name(&self, var: DomainId) -> Option<&str> {
        self.variable_names.get_int_name(var)
    }

    /// A read-only view on all domains.
    pub fn domains(&self) -> Domains<'_> {
        Domains::new(&self.assignments, &self.trailed_values)
    }

    pub fn lower_bound(&self, var: DomainId) -> i32 {
        self.domains().lower_bound(var)
    }

    pub fn upper_bound(&self, var: DomainId) -> i32 {
        self.domains().upper_bound(var)
    }

    pub fn contains(&self, var: DomainId, value: i32) -> bool {
        self.domains().contains(var, value)
    }

    pub fn is_fixed(&self, var: DomainId) -> bool {
        self.domains().is_fixed(var)
    }

    /// If the given `var` is fixed, then [`Some`] containing the assigned value is returned.
    /// Otherwise, [`None`] is returned.
    pub fn fixed_value(&self, var: DomainId) -> Option<i32> {
        self.domains().fixed_value(var)
    }

    pub fn domain_size(&self, var: DomainId) -> usize {
        self.domains().domain_size(var)
    }

    /// The values in the domain of `var` in increasing order.
    pub fn iterate_domain(&self, var: DomainId) -> DomainIterator<'_> {
        DomainIterator::new(self.assignments.domain(var), &self.trailed_values)
    }

    /// Returns the number of created checkpoints.
    pub fn get_checkpoint(&self) -> usize {
        self.trailed_values.get_checkpoint()
    }

    /// The values removed from the monitored domain since the previous drain.
    pub fn drain_delta(&mut self, monitor: &DeltaMonitor) -> DomainDelta {
        monitor.drain(&self.assignments, &mut self.trailed_values)
    }
}

/// Operations for adding propagators.
impl State {
    /// Add a new propagator to the [`State`]. The constructor for that propagator should
    /// subscribe to the appropriate domain events so that the propagator is called when
    /// necessary.
    ///
    /// While the propagator is added to the queue for propagation, this function does _not_
    /// trigger a round of propagation. An explicit call to [`State::propagate_to_fixed_point`] is
    /// necessary to run the new propagator for the first time.
    pub fn add_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
    ) -> PropagatorHandle<Constructor::PropagatorImpl>
    where
        Constructor: PropagatorConstructor,
        Constructor::PropagatorImpl: 'static,
    {
        let original_handle: PropagatorHandle<Constructor::PropagatorImpl> =
            self.propagators.new_propagator().key();
        let constructor_context =
            PropagatorConstructorContext::new(original_handle.propagator_id(), self);
        let propagator = constructor.create(constructor_context);

        let priority = propagator.priority();
        let slot = self.propagators.new_propagator();
        let handle = slot.populate(Box::new(propagator));

        gourd_assert_eq_simple!(handle.propagator_id(), original_handle.propagator_id());

        self.propagator_queue
            .enqueue_propagator(handle.propagator_id(), priority);

        handle
    }

    /// Adds a propagator and propagates to a fixpoint. A conflict at this point means the
    /// model is infeasible; the state should not be used for search afterwards.
    pub fn post_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
    ) -> Result<PropagatorHandle<Constructor::PropagatorImpl>, ConstraintOperationError>
    where
        Constructor: PropagatorConstructor,
        Constructor::PropagatorImpl: 'static,
    {
        let handle = self.add_propagator(constructor);
        match self.propagate_to_fixed_point() {
            Ok(()) => Ok(handle),
            Err(conflict) => {
                debug!("posting a propagator failed: {conflict}");
                Err(ConstraintOperationError::InfeasiblePropagator)
            }
        }
    }

    /// Adds the propagators of a [`Constraint`] and propagates them to a fixpoint.
    pub fn post_constraint(
        &mut self,
        constraint: impl Constraint,
    ) -> Result<(), ConstraintOperationError> {
        constraint.post(self)
    }

    /// Get a reference to the propagator identified by the given handle.
    pub fn get_propagator<P: Propagator>(&self, handle: PropagatorHandle<P>) -> Option<&P> {
        self.propagators.get_propagator(handle)
    }

    /// Get an exclusive reference to the propagator identified by the given handle.
    pub fn get_propagator_mut<P: Propagator>(
        &mut self,
        handle: PropagatorHandle<P>,
    ) -> Option<&mut P> {
        self.propagators.get_propagator_mut(handle)
    }
}

/// Operations for modifying the state.
///
/// The narrowing operations return `Ok(true)` if a domain changed and `Ok(false)` if it did not.
/// If the domain would become empty, an [`EmptyDomain`] error is returned and the domain is left
/// as it was; the caller should then restore an earlier checkpoint.
///
/// These methods do _not_ perform any propagation. For that, an explicit call to
/// [`State::propagate_to_fixed_point`] is required, which allows several decisions to be made
/// before the propagators are invoked.
impl State {
    pub fn set_lower_bound(&mut self, var: DomainId, value: i32) -> Result<bool, EmptyDomain> {
        self.assignments
            .tighten_lower_bound(var, value, &mut self.trailed_values)
    }

    pub fn set_upper_bound(&mut self, var: DomainId, value: i32) -> Result<bool, EmptyDomain> {
        self.assignments
            .tighten_upper_bound(var, value, &mut self.trailed_values)
    }

    pub fn assign(&mut self, var: DomainId, value: i32) -> Result<bool, EmptyDomain> {
        self.assignments
            .make_assignment(var, value, &mut self.trailed_values)
    }

    pub fn remove(&mut self, var: DomainId, value: i32) -> Result<bool, EmptyDomain> {
        self.assignments
            .remove_value(var, value, &mut self.trailed_values)
    }

    /// Create a checkpoint of the current [`State`], that can be returned to with
    /// [`State::restore_to`].
    ///
    /// If propagators are still enqueued, then this method will panic.
    ///
    /// # Example
    /// ```
    /// use gourd_core::engine::State;
    ///
    /// let mut state = State::default();
    /// let variable = state.new_interval_variable(1, 10, Some("x1"));
    ///
    /// assert_eq!(state.get_checkpoint(), 0);
    ///
    /// state.new_checkpoint();
    ///
    /// assert_eq!(state.get_checkpoint(), 1);
    ///
    /// state
    ///     .set_upper_bound(variable, 5)
    ///     .expect("The lower bound is 1 so no conflict");
    /// assert_eq!(state.upper_bound(variable), 5);
    ///
    /// state.restore_to(0);
    ///
    /// assert_eq!(state.get_checkpoint(), 0);
    /// assert_eq!(state.upper_bound(variable), 10);
    /// ```
    pub fn new_checkpoint(&mut self) {
        gourd_assert_simple!(
            self.propagator_queue.is_empty(),
            "Can only create a new checkpoint when all propagation has occurred"
        );
        self.statistics.num_checkpoints += 1;
        self.trailed_values.new_checkpoint();
    }

    /// Restore to the given checkpoint. Every versioned cell (and thereby every domain and every
    /// trailed counter of a propagator) gets the value it had when the checkpoint was created,
    /// pending work is discarded, and every propagator is given the chance to synchronise.
    ///
    /// If the provided checkpoint is equal to the current checkpoint, this is a no-op. If
    /// the provided checkpoint is larger than the current checkpoint, this method will
    /// panic.
    ///
    /// See [`State::new_checkpoint`] for an example.
    pub fn restore_to(&mut self, checkpoint: usize) {
        gourd_assert_simple!(checkpoint <= self.get_checkpoint());

        if checkpoint == self.get_checkpoint() {
            return;
        }

        debug!(
            "restoring checkpoint {checkpoint} from checkpoint {}",
            self.get_checkpoint()
        );
        self.statistics.num_restores += 1;

        self.trailed_values.synchronise(checkpoint);
        self.propagator_queue.clear();
        self.assignments.clear_events();

        for propagator in self.propagators.iter_propagators_mut() {
            propagator.synchronise(Domains::new(&self.assignments, &self.trailed_values));
        }
    }

    /// Performs a single call to [`Propagator::propagate`] for the propagator with the provided
    /// [`PropagatorId`], and notifies the subscribers of the changes it made.
    fn propagate(&mut self, propagator_id: PropagatorId) -> Result<(), Conflict> {
        self.statistics.num_propagators_called += 1;

        let mut reenqueue = false;
        let propagation_status = {
            let propagator = &mut self.propagators[propagator_id];
            trace!("propagating {} ({propagator_id})", propagator.name());
            let context = PropagationContext::new(
                &mut self.trailed_values,
                &mut self.assignments,
                propagator_id,
                &mut reenqueue,
            );
            propagator.propagate(context)
        };

        match propagation_status {
            Ok(()) => {
                // Notify other propagators of the propagations and continue.
                self.notification_engine
                    .notify_propagators_about_domain_events(
                        &mut self.assignments,
                        &mut self.trailed_values,
                        &mut self.propagators,
                        &mut self.propagator_queue,
                        Some(propagator_id),
                    );

                if reenqueue {
                    let priority = self.propagators[propagator_id].priority();
                    self.propagator_queue
                        .enqueue_propagator(propagator_id, priority);
                }

                Ok(())
            }
            Err(inconsistency) => {
                self.statistics.num_conflicts += 1;
                debug!(
                    "{} ({propagator_id}) failed: {inconsistency}",
                    self.propagators[propagator_id].name()
                );

                self.propagator_queue.clear();
                self.assignments.clear_events();

                Err(Conflict {
                    propagator: propagator_id,
                    inconsistency,
                })
            }
        }
    }

    /// Performs fixed-point propagation using the propagators defined in the [`State`].
    ///
    /// The narrowing operations and added propagators (using [`State::add_propagator`]) cause
    /// propagators to be enqueued when the events that they have subscribed to are triggered. As
    /// propagation causes more changes to be made, more propagators are enqueued. This continues
    /// until applying all (enqueued) propagators leads to no more domain changes.
    ///
    /// It could be that the current [`State`] implies a conflict by propagation. In that case, an
    /// error with [`Conflict`] is returned and nothing remains enqueued.
    ///
    /// Once the [`State`] is conflicting, then the only operation that is defined is
    /// [`State::restore_to`]. All other operations and queries on the state are unspecified.
    pub fn propagate_to_fixed_point(&mut self) -> Result<(), Conflict> {
        // The initial domain events are due to decisions.
        self.notification_engine
            .notify_propagators_about_domain_events(
                &mut self.assignments,
                &mut self.trailed_values,
                &mut self.propagators,
                &mut self.propagator_queue,
                None,
            );

        // Keep propagating until there are unprocessed propagators, or a conflict is detected.
        while let Some(propagator_id) = self.propagator_queue.pop() {
            self.propagate(propagator_id)?;
        }

        // Only check fixed point propagation if there was no reported conflict, since otherwise
        // the state may be inconsistent.
        gourd_assert_extreme!(
            self.debug_fixed_point_propagation(),
            "a propagator was not at fixpoint after propagation ended"
        );

        Ok(())
    }

    /// Calls every propagator on a copy of the state and checks that no domain changes.
    fn debug_fixed_point_propagation(&self) -> bool {
        let mut state = self.clone();
        let domains_before = state.domain_snapshot();

        let propagator_ids = state.propagators.propagator_ids().collect::<Vec<_>>();
        for propagator_id in propagator_ids {
            let mut reenqueue = false;
            let context = PropagationContext::new(
                &mut state.trailed_values,
                &mut state.assignments,
                propagator_id,
                &mut reenqueue,
            );
            if state.propagators[propagator_id].propagate(context).is_err() {
                return false;
            }
        }

        domains_before == state.domain_snapshot()
    }

    fn domain_snapshot(&self) -> Vec<Vec<i32>> {
        self.variables()
            .map(|var| self.iterate_domain(var).collect())
            .collect()
    }
}
