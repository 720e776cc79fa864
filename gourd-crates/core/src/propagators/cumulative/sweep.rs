use super::filter::CumulativeFilter;
use super::task::Task;
use crate::basic_types::Inconsistency;
use crate::basic_types::PropagatorConflict;
use crate::engine::variables::DomainId;
use crate::propagation::PropagationContext;
use crate::propagation::ReadDomains;

/// A maximal interval `[start, end)` over which the mandatory parts have a constant height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Profile {
    start: i32,
    end: i32,
    height: i32,
}

/// Time-table filtering over the chronologically sorted starts and ends of the mandatory parts.
///
/// The events are swept once to build the profiles; a task then only visits the profiles which
/// intersect its window, jumping past every profile on which it would exceed the capacity. The
/// result equals that of [`super::time_table::TimeTableFilter`] while the cost only depends on the
/// number of tasks.
#[derive(Clone, Debug, Default)]
pub(crate) struct SweepFilter {
    /// `(time, change in height)`, ends before starts at equal times.
    events: Vec<(i32, i32)>,
    profiles: Vec<Profile>,
}

impl SweepFilter {
    fn build_profiles(
        &mut self,
        tasks: &[Task],
        mandatory_parts: &[Option<(i32, i32)>],
        context: &impl ReadDomains,
    ) {
        self.events.clear();
        for (task, mandatory_part) in tasks.iter().zip(mandatory_parts.iter()) {
            if let Some((from, to)) = *mandatory_part {
                let height = task.min_height(context);
                self.events.push((from, height));
                self.events.push((to, -height));
            }
        }
        self.events.sort_unstable();

        self.profiles.clear();
        let mut height = 0;
        for (index, &(time, change)) in self.events.iter().enumerate() {
            height += change;
            let next_time = self
                .events
                .get(index + 1)
                .map_or(time, |&(next_time, _)| next_time);
            if next_time > time && height > 0 {
                self.profiles.push(Profile {
                    start: time,
                    end: next_time,
                    height,
                });
            }
        }
    }
}

impl CumulativeFilter for SweepFilter {
    fn name(&self) -> &'static str {
        "Sweep"
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

        let mandatory_parts = tasks
            .iter()
            .map(|task| task.mandatory_part(context))
            .collect::<Vec<_>>();
        self.build_profiles(tasks, &mandatory_parts, context);
        if self.profiles.is_empty() {
            return Ok(changed);
        }

        let peak = self
            .profiles
            .iter()
            .map(|profile| profile.height)
            .max()
            .unwrap_or(0);
        if peak > max_capacity {
            return Err(PropagatorConflict::new("the mandatory parts exceed the capacity").into());
        }
        changed |= context.set_lower_bound(capacity, peak)?;

        for (task, &mandatory_part) in tasks.iter().zip(mandatory_parts.iter()) {
            let height = task.min_height(context);
            let duration = task.min_duration(context);
            // Profiles never straddle the boundaries of a mandatory part.
            let load_of_others = |profile: &Profile| match mandatory_part {
                Some((from, to)) if from <= profile.start && profile.end <= to => {
                    profile.height - height
                }
                _ => profile.height,
            };

            if let Some((from, to)) = mandatory_part {
                let max_load = self
                    .profiles
                    .iter()
                    .filter(|profile| from <= profile.start && profile.end <= to)
                    .map(load_of_others)
                    .max()
                    .unwrap_or(0);
                changed |= context.set_upper_bound(task.height, max_capacity - max_load)?;
            }

            if height == 0 || duration == 0 {
                continue;
            }
            let overloads = |profile: &Profile| load_of_others(profile) + height > max_capacity;

            let latest_start = task.latest_start(context);
            let mut start = task.earliest_start(context);
            for profile in self.profiles.iter() {
                if profile.end <= start {
                    continue;
                }
                if profile.start >= start + duration || start > latest_start {
                    break;
                }
                if overloads(profile) {
                    start = profile.end;
                }
            }
            if start > task.earliest_start(context) {
                changed |= task.set_earliest_start(context, start)?;
            }

            let earliest_end = task.earliest_end(context);
            let mut end = task.latest_end(context);
            for profile in self.profiles.iter().rev() {
                if profile.start >= end {
                    continue;
                }
                if profile.end <= end - duration || end < earliest_end {
                    break;
                }
                if overloads(profile) {
                    end = profile.start;
                }
            }
            if end < task.latest_end(context) {
                changed |= task.set_latest_end(context, end)?;
            }
        }

        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_solver::TestSolver;
    use crate::propagators::cumulative::test_helpers::new_tasks;
    use crate::propagators::cumulative::test_helpers::new_tasks_with_durations;
    use crate::propagators::cumulative::test_helpers::post_cumulative;
    use crate::propagators::cumulative::CumulativeStrategy;

    #[test]
    fn profiles_are_maximal_rectangles() {
        let mut solver = TestSolver::default();
        let tasks = new_tasks(&mut solver, &[(0, 1, 4, 2), (2, 3, 4, 1), (3, 3, 1, 1)])
            .into_iter()
            .enumerate()
            .map(|(id, task)| Task::new(task, id))
            .collect::<Vec<_>>();
        solver.propagate().expect("no conflict");

        let mut filter = SweepFilter::default();
        let domains = solver.domains();
        let mandatory_parts = tasks
            .iter()
            .map(|task| task.mandatory_part(&domains))
            .collect::<Vec<_>>();
        filter.build_profiles(&tasks, &mandatory_parts, &domains);

        assert_eq!(
            vec![
                Profile { start: 1, end: 3, height: 2 },
                Profile { start: 3, end: 4, height: 4 },
                Profile { start: 4, end: 6, height: 1 },
            ],
            filter.profiles
        );
    }

    #[test]
    fn same_pruning_as_the_discretised_time_table() {
        let instances: [&[(i32, i32, i32, i32)]; 3] = [
            &[(0, 4, 3, 2), (0, 4, 2, 2), (2, 3, 2, 1)],
            &[(0, 1, 4, 2), (2, 3, 4, 1), (0, 9, 2, 2), (5, 6, 3, 1)],
            &[(0, 2, 5, 1), (1, 7, 2, 2), (3, 4, 3, 2), (0, 8, 1, 3)],
        ];

        for instance in instances {
            let mut domains = vec![];
            for strategy in [CumulativeStrategy::TimeTable, CumulativeStrategy::Sweep] {
                let mut solver = TestSolver::default();
                let tasks = new_tasks(&mut solver, instance);
                let capacity = solver.new_variable(0, 3);
                let result = post_cumulative(&mut solver, &tasks, capacity, strategy);

                domains.push(result.map(|_| {
                    tasks
                        .iter()
                        .flat_map(|task| [solver.domain(task.start), solver.domain(task.end)])
                        .chain(std::iter::once(solver.domain(capacity)))
                        .collect::<Vec<_>>()
                }));
            }
            assert_eq!(domains[0].is_ok(), domains[1].is_ok());
            if let (Ok(time_table), Ok(sweep)) = (&domains[0], &domains[1]) {
                assert_eq!(time_table, sweep);
            }
        }
    }

    #[test]
    fn tasks_which_may_take_no_time_may_be_higher_than_the_capacity() {
        let mut solver = TestSolver::default();
        let tasks = new_tasks_with_durations(&mut solver, &[(1, 4, 0, 0, 2), (1, 4, 0, 1, 3)]);
        let capacity = solver.new_variable(1, 1);
        post_cumulative(&mut solver, &tasks, capacity, CumulativeStrategy::Sweep)
            .expect("no conflict");

        solver.assert_bounds(tasks[0].height, 2, 2);
        solver.assert_bounds(tasks[1].height, 3, 3);

        // Once the second task takes time, it no longer fits.
        solver.new_checkpoint();
        let _ = solver.set_lower_bound(tasks[1].duration, 1);
        assert!(solver.propagate().is_err());
    }
}
