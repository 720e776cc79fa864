use crate::engine::variables::DomainId;
use crate::engine::EmptyDomain;
use crate::propagation::PropagationContext;
use crate::propagation::ReadDomains;

/// A task as it is passed to the cumulative constraint: it runs from `start` (inclusive) to `end`
/// (exclusive) and uses `height` of the resource meanwhile.
#[derive(Clone, Copy, Debug)]
pub struct ArgTask {
    pub start: DomainId,
    pub duration: DomainId,
    pub end: DomainId,
    pub height: DomainId,
}

/// A task of a cumulative propagator.
///
/// The bounds are derived from all three time variables, so that the filters stay sound when the
/// relation `start + duration = end` has not been propagated yet.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Task {
    pub(crate) start: DomainId,
    pub(crate) duration: DomainId,
    pub(crate) end: DomainId,
    pub(crate) height: DomainId,
    /// The index of the task in the propagator.
    pub(crate) id: usize,
}

impl Task {
    pub(crate) fn new(task: ArgTask, id: usize) -> Task {
        Task {
            start: task.start,
            duration: task.duration,
            end: task.end,
            height: task.height,
            id,
        }
    }

    pub(crate) fn earliest_start(&self, context: &impl ReadDomains) -> i32 {
        context
            .lower_bound(self.start)
            .max(context.lower_bound(self.end) - context.upper_bound(self.duration))
    }

    pub(crate) fn latest_start(&self, context: &impl ReadDomains) -> i32 {
        context
            .upper_bound(self.start)
            .min(context.upper_bound(self.end) - self.min_duration(context))
    }

    pub(crate) fn earliest_end(&self, context: &impl ReadDomains) -> i32 {
        context
            .lower_bound(self.end)
            .max(context.lower_bound(self.start) + self.min_duration(context))
    }

    pub(crate) fn latest_end(&self, context: &impl ReadDomains) -> i32 {
        context
            .upper_bound(self.end)
            .min(context.upper_bound(self.start) + context.upper_bound(self.duration))
    }

    pub(crate) fn min_duration(&self, context: &impl ReadDomains) -> i32 {
        context.lower_bound(self.duration)
    }

    pub(crate) fn min_height(&self, context: &impl ReadDomains) -> i32 {
        context.lower_bound(self.height)
    }

    /// The smallest area the task occupies in every solution.
    pub(crate) fn min_energy(&self, context: &impl ReadDomains) -> i64 {
        self.min_duration(context) as i64 * self.min_height(context) as i64
    }

    /// The interval `[latest start, earliest end)` in which the task runs in every solution, if
    /// it is not empty.
    pub(crate) fn mandatory_part(&self, context: &impl ReadDomains) -> Option<(i32, i32)> {
        let from = self.latest_start(context);
        let to = self.earliest_end(context);
        (from < to).then_some((from, to))
    }

    /// Delays the task to start no earlier than `value`.
    pub(crate) fn set_earliest_start(
        &self,
        context: &mut PropagationContext,
        value: i32,
    ) -> Result<bool, EmptyDomain> {
        let min_duration = self.min_duration(context);
        let changed = context.set_lower_bound(self.start, value)?;
        Ok(context.set_lower_bound(self.end, value + min_duration)? | changed)
    }

    /// Advances the task to end no later than `value`.
    pub(crate) fn set_latest_end(
        &self,
        context: &mut PropagationContext,
        value: i32,
    ) -> Result<bool, EmptyDomain> {
        let min_duration = self.min_duration(context);
        let changed = context.set_upper_bound(self.end, value)?;
        Ok(context.set_upper_bound(self.start, value - min_duration)? | changed)
    }
}
