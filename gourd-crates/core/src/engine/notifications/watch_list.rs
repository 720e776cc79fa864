use enumset::EnumSet;

use super::DomainEvent;
use crate::containers::KeyedVec;
use crate::engine::variables::DomainId;
use crate::propagation::PropagatorVarId;

/// The subscription table: for every variable, which propagators listen to which events.
///
/// Variables never refer to propagators directly; the engine looks up the subscribers here when
/// it processes an event.
#[derive(Default, Debug, Clone)]
pub(crate) struct WatchListDomainEvents {
    watchers: KeyedVec<DomainId, Watcher>,
}

#[derive(Debug, Default, Clone)]
struct Watcher {
    /// The union of the events the subscribers of this variable care about.
    mask: EnumSet<DomainEvent>,
    lower_bound_watchers: Vec<PropagatorVarId>,
    upper_bound_watchers: Vec<PropagatorVarId>,
    assign_watchers: Vec<PropagatorVarId>,
    removal_watchers: Vec<PropagatorVarId>,
}

impl WatchListDomainEvents {
    pub(crate) fn grow(&mut self) {
        let _ = self.watchers.push(Watcher::default());
    }

    pub(crate) fn watch_all(
        &mut self,
        domain: DomainId,
        events: EnumSet<DomainEvent>,
        propagator_var: PropagatorVarId,
    ) {
        let watcher = &mut self.watchers[domain];
        watcher.mask |= events;

        for event in events {
            let watchers = match event {
                DomainEvent::Assign => &mut watcher.assign_watchers,
                DomainEvent::LowerBound => &mut watcher.lower_bound_watchers,
                DomainEvent::UpperBound => &mut watcher.upper_bound_watchers,
                DomainEvent::Removal => &mut watcher.removal_watchers,
            };

            if !watchers.contains(&propagator_var) {
                watchers.push(propagator_var);
            }
        }
    }

    /// The aggregated event mask of the variable.
    pub(crate) fn mask(&self, domain: DomainId) -> EnumSet<DomainEvent> {
        self.watchers[domain].mask
    }

    pub(crate) fn get_affected_propagators(
        &self,
        event: DomainEvent,
        domain: DomainId,
    ) -> &[PropagatorVarId] {
        let watcher = &self.watchers[domain];

        match event {
            DomainEvent::Assign => &watcher.assign_watchers,
            DomainEvent::LowerBound => &watcher.lower_bound_watchers,
            DomainEvent::UpperBound => &watcher.upper_bound_watchers,
            DomainEvent::Removal => &watcher.removal_watchers,
        }
    }
}
