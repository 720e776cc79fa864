use super::filter::CumulativeFilter;
use super::task::Task;
use crate::basic_types::Inconsistency;
use crate::basic_types::PropagatorConflict;
use crate::engine::variables::DomainId;
use crate::propagation::PropagationContext;
use crate::propagation::ReadDomains;

/// Time-table filtering over an array with one entry per time point \[1\].
///
/// The array covers the mandatory parts of the tasks and holds their accumulated height. Its peak
/// bounds the capacity from below, and every task is moved past the time points at which it would
/// exceed the capacity together with the mandatory parts of the other tasks. The cost grows with
/// the horizon, see [`super::sweep::SweepFilter`] for a horizon independent version.
///
/// # Bibliography
/// \[1\] A. Schutt, ‘Improving scheduling by learning’, PhD thesis, University of Melbourne,
/// 2011.
#[derive(Clone, Debug, Default)]
pub(crate) struct TimeTableFilter {
    /// The height of the mandatory parts at `horizon_start + index`.
    profile: Vec<i32>,
    horizon_start: i32,
}

impl TimeTableFilter {
    fn horizon_end(&self) -> i32 {
        self.horizon_start + self.profile.len() as i32
    }

    fn load_at(&self, time: i32) -> i32 {
        if time < self.horizon_start || time >= self.horizon_end() {
            0
        } else {
            self.profile[(time - self.horizon_start) as usize]
        }
    }

    /// Builds the profile; returns the mandatory part of every task.
    fn build_profile(
        &mut self,
        tasks: &[Task],
        context: &impl ReadDomains,
    ) -> Vec<Option<(i32, i32)>> {
        let mandatory_parts = tasks
            .iter()
            .map(|task| task.mandatory_part(context))
            .collect::<Vec<_>>();

        self.profile.clear();
        let Some(horizon_start) = mandatory_parts.iter().flatten().map(|&(from, _)| from).min()
        else {
            return mandatory_parts;
        };
        let horizon_end = mandatory_parts
            .iter()
            .flatten()
            .map(|&(_, to)| to)
            .max()
            .expect("there is a mandatory part");

        self.horizon_start = horizon_start;
        self.profile.resize((horizon_end - horizon_start) as usize, 0);
        for (task, mandatory_part) in tasks.iter().zip(mandatory_parts.iter()) {
            if let Some((from, to)) = *mandatory_part {
                let height = task.min_height(context);
                for time in from..to {
                    self.profile[(time - horizon_start) as usize] += height;
                }
            }
        }

        mandatory_parts
    }
}

impl CumulativeFilter for TimeTableFilter {
    fn name(&self) -> &'static str {
        "TimeTable"
    }

    fn filter(
        &mut self,
        tasks: &[Task],
        capacity: DomainId,
        context: &mut PropagationContext,
    ) -> Result<bool, Inconsistency> {
        let mut changed = false;
        let max_capacity = context.upper_bound(capacity);
        for task in tasks {
            // A task which may take no time does not need to fit.
            if task.min_duration(context) > 0 {
                changed |= context.set_upper_bound(task.height, max_capacity)?;
            }
        }

        let mandatory_parts = self.build_profile(tasks, context);
        if self.profile.is_empty() {
            return Ok(changed);
        }

        let peak = self.profile.iter().copied().max().unwrap_or(0);
        if peak > max_capacity {
            return Err(PropagatorConflict::new("the mandatory parts exceed the capacity").into());
        }
        changed |= context.set_lower_bound(capacity, peak)?;

        let horizon_start = self.horizon_start;
        let horizon_end = self.horizon_end();
        for (task, &mandatory_part) in tasks.iter().zip(mandatory_parts.iter()) {
            let height = task.min_height(context);
            let duration = task.min_duration(context);
            let load_of_others = |time: i32| {
                let own = match mandatory_part {
                    Some((from, to)) if from <= time && time < to => height,
                    _ => 0,
                };
                self.load_at(time) - own
            };

            if let Some((from, to)) = mandatory_part {
                let max_load = (from..to).map(load_of_others).max().unwrap_or(0);
                changed |= context.set_upper_bound(task.height, max_capacity - max_load)?;
            }

            if height == 0 || duration == 0 {
                continue;
            }
            let overloads = |time: i32| load_of_others(time) + height > max_capacity;

            let latest_start = task.latest_start(context);
            let mut start = task.earliest_start(context);
            while start <= latest_start {
                match (start.max(horizon_start)..(start + duration).min(horizon_end))
                    .find(|&time| overloads(time))
                {
                    Some(time) => start = time + 1,
                    None => break,
                }
            }
            if start > task.earliest_start(context) {
                changed |= task.set_earliest_start(context, start)?;
            }

            let earliest_end = task.earliest_end(context);
            let mut end = task.latest_end(context);
            while end >= earliest_end {
                match ((end - duration).max(horizon_start)..end.min(horizon_end))
                    .rev()
                    .find(|&time| overloads(time))
                {
                    Some(time) => end = time,
                    None => break,
                }
            }
            if end < task.latest_end(context) {
                changed |= task.set_latest_end(context, end)?;
            }
        }

        Ok(changed)
    }
}
