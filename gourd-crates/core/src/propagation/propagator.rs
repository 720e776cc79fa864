use downcast_rs::impl_downcast;
use downcast_rs::Downcast;
use dyn_clone::clone_trait_object;
use dyn_clone::DynClone;

use super::contexts::NotificationContext;
use super::Domains;
use super::LocalId;
use super::PropagationContext;
use crate::basic_types::PropagationStatusCP;
#[cfg(doc)]
use crate::create_statistics_struct;
use crate::engine::notifications::DomainEvent;
#[cfg(doc)]
use crate::engine::State;
#[cfg(doc)]
use crate::propagation::PropagatorConstructor;
#[cfg(doc)]
use crate::propagation::PropagatorConstructorContext;
use crate::statistics::StatisticLogger;

// Allows retrieving the concrete propagator behind a `Box<dyn Propagator>` through its handle.
impl_downcast!(Propagator);

// Allows the `State` to be cloned.
clone_trait_object!(Propagator);

/// A propagator removes values from domains which cannot be part of any solution, or detects that
/// the current domains admit no solution at all.
///
/// The only required functions are [`Propagator::name`] and [`Propagator::propagate`]; the other
/// functions have default implementations.
///
/// See the [`crate::propagation`] documentation for more details.
pub trait Propagator: Downcast + DynClone {
    /// Return the name of the propagator, used for logging and statistics.
    fn name(&self) -> &str;

    /// Narrows the domains of the variables of the propagator.
    ///
    /// Narrowing happens through the [`PropagationContext`]. If the propagator detects that the
    /// current domains have no solution, either because a narrowing emptied a domain or because
    /// the filtering algorithm itself found an infeasibility, an error is returned.
    ///
    /// The engine does not notify a propagator of its own changes. A propagator which is not at
    /// its own fixpoint after this call either loops internally or asks to be called again with
    /// [`PropagationContext::enqueue_again`].
    fn propagate(&mut self, context: PropagationContext) -> PropagationStatusCP;

    /// Decides whether the propagator should be enqueued after a [`DomainEvent`] on one of the
    /// variables it registered for (with [`PropagatorConstructorContext::register`]).
    ///
    /// Intended for cheap incremental bookkeeping only. By default the propagator is always
    /// enqueued.
    fn notify(
        &mut self,
        _context: NotificationContext,
        _local_id: LocalId,
        _event: DomainEvent,
    ) -> EnqueueDecision {
        EnqueueDecision::Enqueue
    }

    /// Called after the engine restored an earlier checkpoint, so that non-trailed internal state
    /// can be brought back in line with the domains.
    ///
    /// By default this function does nothing.
    fn synchronise(&mut self, _domains: Domains) {}

    /// Returns the [`Priority`] of the propagator, used for determining the order in which
    /// propagators are called.
    ///
    /// By default the priority is [`Priority::VeryLow`].
    fn priority(&self) -> Priority {
        Priority::VeryLow
    }

    /// Logs statistics of the propagator using the provided [`StatisticLogger`].
    ///
    /// It is recommended to create a struct through the [`create_statistics_struct!`] macro.
    fn log_statistics(&self, _statistic_logger: StatisticLogger) {}
}

/// Indicator of what to do when a propagator is notified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnqueueDecision {
    /// The propagator should be enqueued.
    Enqueue,
    /// The propagator should not be enqueued.
    Skip,
}

/// The priority of a propagator, used for determining the order in which propagators will be
/// called.
///
/// Propagators with high priority are propagated before propagators with low(er) priority. Within
/// one priority the queue is first-in first-out.
///
/// Cheap propagators over few variables should be given a high priority, quadratic global filters
/// a low one.
#[derive(Default, Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Priority {
    High = 0,
    Medium = 1,
    Low = 2,
    #[default]
    VeryLow = 3,
}
