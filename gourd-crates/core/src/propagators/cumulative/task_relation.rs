use crate::basic_types::PropagationStatusCP;
use crate::engine::variables::DomainId;
use crate::propagation::DomainEvents;
use crate::propagation::LocalId;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorConstructorContext;
use crate::propagation::ReadDomains;

/// The [`PropagatorConstructor`] for the [`TaskRelation`] propagator.
#[derive(Clone, Copy, Debug)]
pub struct TaskRelationArgs {
    pub start: DomainId,
    pub duration: DomainId,
    pub end: DomainId,
}

impl PropagatorConstructor for TaskRelationArgs {
    type PropagatorImpl = TaskRelation;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let TaskRelationArgs {
            start,
            duration,
            end,
        } = self;

        context.register(start, DomainEvents::BOUNDS, LocalId::from(0));
        context.register(duration, DomainEvents::BOUNDS, LocalId::from(1));
        context.register(end, DomainEvents::BOUNDS, LocalId::from(2));

        TaskRelation {
            start,
            duration,
            end,
        }
    }
}

/// Bounds consistency for `start + duration = end`.
///
/// On domains with holes a bound can land on a removed value, after which the other bounds move
/// again; the propagator repeats until none of the three moves.
#[derive(Clone, Debug)]
pub struct TaskRelation {
    start: DomainId,
    duration: DomainId,
    end: DomainId,
}

impl Propagator for TaskRelation {
    fn name(&self) -> &str {
        "TaskRelation"
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn propagate(&mut self, mut context: PropagationContext) -> PropagationStatusCP {
        loop {
            let mut changed = context.set_lower_bound(
                self.start,
                context.lower_bound(self.end) - context.upper_bound(self.duration),
            )?;
            changed |= context.set_upper_bound(
                self.start,
                context.upper_bound(self.end) - context.lower_bound(self.duration),
            )?;
            changed |= context.set_lower_bound(
                self.end,
                context.lower_bound(self.start) + context.lower_bound(self.duration),
            )?;
            changed |= context.set_upper_bound(
                self.end,
                context.upper_bound(self.start) + context.upper_bound(self.duration),
            )?;
            changed |= context.set_lower_bound(
                self.duration,
                context.lower_bound(self.end) - context.upper_bound(self.start),
            )?;
            changed |= context.set_upper_bound(
                self.duration,
                context.upper_bound(self.end) - context.lower_bound(self.start),
            )?;

            if !changed {
                return Ok(());
            }
        }
    }
}
