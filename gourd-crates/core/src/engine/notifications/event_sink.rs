use enumset::EnumSet;

use super::DomainEvent;
use crate::containers::KeyedVec;
use crate::engine::variables::DomainId;

/// While a propagator (or a decision) narrows domains, the resulting events are captured here.
/// Afterwards the sink is drained to notify the subscribed propagators.
///
/// Duplicate events between two drains are recorded once.
#[derive(Default, Clone, Debug)]
pub(crate) struct EventSink {
    present: KeyedVec<DomainId, EnumSet<DomainEvent>>,
    events: Vec<(DomainEvent, DomainId)>,
}

impl EventSink {
    pub(crate) fn grow(&mut self) {
        let _ = self.present.push(EnumSet::new());
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub(crate) fn event_occurred(&mut self, event: DomainEvent, domain: DomainId) {
        let present = &mut self.present[domain];
        if present.contains(event) {
            return;
        }

        let _ = present.insert(event);
        self.events.push((event, domain));
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = (DomainEvent, DomainId)> + '_ {
        self.events.drain(..).inspect(|&(event, domain)| {
            let _ = self.present[domain].remove(event);
        })
    }

    pub(crate) fn clear(&mut self) {
        let _ = self.drain().count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captured_events_are_observed_in_the_drain() {
        let mut sink = EventSink::default();
        sink.grow();
        sink.grow();

        sink.event_occurred(DomainEvent::LowerBound, DomainId::new(0));
        sink.event_occurred(DomainEvent::UpperBound, DomainId::new(1));

        let events = sink.drain().collect::<Vec<_>>();
        assert_eq!(
            vec![
                (DomainEvent::LowerBound, DomainId::new(0)),
                (DomainEvent::UpperBound, DomainId::new(1))
            ],
            events
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn duplicate_events_are_ignored_until_drained() {
        let mut sink = EventSink::default();
        sink.grow();

        sink.event_occurred(DomainEvent::LowerBound, DomainId::new(0));
        sink.event_occurred(DomainEvent::LowerBound, DomainId::new(0));
        assert_eq!(1, sink.drain().count());

        sink.event_occurred(DomainEvent::LowerBound, DomainId::new(0));
        assert_eq!(1, sink.drain().count());
    }
}
