//! Delivery of domain events to the propagators which subscribed to them.
mod domain_events;
mod event_sink;
mod watch_list;

pub use domain_events::DomainEvent;
pub use domain_events::DomainEvents;
pub(crate) use event_sink::EventSink;
use log::trace;
pub(crate) use watch_list::WatchListDomainEvents;

use super::Assignments;
use super::PropagatorQueue;
use super::TrailedValues;
use crate::engine::variables::DomainId;
use crate::propagation::store::PropagatorStore;
use crate::propagation::EnqueueDecision;
use crate::propagation::NotificationContext;
use crate::propagation::PropagatorId;
use crate::propagation::PropagatorVarId;

#[derive(Default, Debug, Clone)]
pub(crate) struct NotificationEngine {
    watch_list: WatchListDomainEvents,
    /// Reused between calls to avoid allocating while draining the event sink.
    event_buffer: Vec<(DomainEvent, DomainId)>,
}

impl NotificationEngine {
    pub(crate) fn grow(&mut self) {
        self.watch_list.grow();
    }

    pub(crate) fn watch_all(
        &mut self,
        domain: DomainId,
        events: enumset::EnumSet<DomainEvent>,
        propagator_var: PropagatorVarId,
    ) {
        self.watch_list.watch_all(domain, events, propagator_var);
    }

    /// Drains the events recorded by the assignments and offers each of them to the subscribed
    /// propagators, enqueueing those which ask for it.
    ///
    /// The propagator which caused the events is not notified of its own changes.
    pub(crate) fn notify_propagators_about_domain_events(
        &mut self,
        assignments: &mut Assignments,
        trailed_values: &mut TrailedValues,
        propagators: &mut PropagatorStore,
        propagator_queue: &mut PropagatorQueue,
        cause: Option<PropagatorId>,
    ) {
        self.event_buffer.clear();
        self.event_buffer.extend(assignments.drain_events());

        for &(event, domain) in self.event_buffer.iter() {
            if !self.watch_list.mask(domain).contains(event) {
                continue;
            }

            for &propagator_var in self.watch_list.get_affected_propagators(event, domain) {
                if Some(propagator_var.propagator) == cause {
                    continue;
                }

                let propagator = &mut propagators[propagator_var.propagator];
                let context = NotificationContext::new(trailed_values, assignments);
                let decision = propagator.notify(context, propagator_var.variable, event);

                if decision == EnqueueDecision::Enqueue {
                    trace!(
                        "{event} on {domain} enqueues {}",
                        propagator_var.propagator
                    );
                    propagator_queue
                        .enqueue_propagator(propagator_var.propagator, propagator.priority());
                }
            }
        }
    }
}
