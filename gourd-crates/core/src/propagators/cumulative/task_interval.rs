use super::filter::CumulativeFilter;
use super::task::Task;
use crate::basic_types::Inconsistency;
use crate::basic_types::PropagatorConflict;
use crate::engine::variables::DomainId;
use crate::propagation::PropagationContext;
use crate::propagation::ReadDomains;

/// Task-interval reasoning over the tasks which cannot run in parallel \[1\].
///
/// Two tasks which are both higher than half of the capacity never overlap. Among those tasks,
/// every pair `(a, b)` spans the interval `[earliest start of a, latest end of b)`; the tasks
/// whose windows lie inside the interval have to run one after the other within it. If they do
/// not fit this is a conflict. Otherwise, a task outside of the interval which does not fit
/// before the interval's tasks (or after them) together with them is pushed after (or before)
/// all of them.
///
/// Every pair is tried in every round, which makes the filter cubic in the number of tasks.
///
/// # Bibliography
/// \[1\] Y. Caseau and F. Laburthe, ‘Improved CLP scheduling with task intervals’, in ICLP, 1994,
/// pp. 369–383.
#[derive(Clone, Debug, Default)]
pub(crate) struct TaskIntervalFilter {
    /// The tasks which are pairwise disjunctive, with their windows.
    disjunctive: Vec<Window>,
}

#[derive(Clone, Copy, Debug)]
struct Window {
    task: usize,
    earliest_start: i32,
    latest_end: i32,
    duration: i32,
}

impl TaskIntervalFilter {
    fn collect_disjunctive_tasks(
        &mut self,
        tasks: &[Task],
        capacity: DomainId,
        context: &impl ReadDomains,
    ) {
        let max_capacity = context.upper_bound(capacity) as i64;
        self.disjunctive.clear();
        self.disjunctive.extend(
            tasks
                .iter()
                .filter(|task| {
                    task.min_duration(context) > 0
                        && 2 * task.min_height(context) as i64 > max_capacity
                })
                .map(|task| Window {
                    task: task.id,
                    earliest_start: task.earliest_start(context),
                    latest_end: task.latest_end(context),
                    duration: task.min_duration(context),
                }),
        );
    }

    /// The summed duration of the disjunctive tasks whose windows lie inside `[from, to)`.
    fn energy_inside(&self, from: i32, to: i32) -> i64 {
        self.disjunctive
            .iter()
            .filter(|window| window.earliest_start >= from && window.latest_end <= to)
            .map(|window| window.duration as i64)
            .sum()
    }
}

impl CumulativeFilter for TaskIntervalFilter {
    fn name(&self) -> &'static str {
        "TaskInterval"
    }

    fn filter(
        &mut self,
        tasks: &[Task],
        capacity: DomainId,
        context: &mut PropagationContext,
    ) -> Result<bool, Inconsistency> {
        self.collect_disjunctive_tasks(tasks, capacity, context);
        if self.disjunctive.len() < 2 {
            return Ok(false);
        }

        let mut changed = false;
        for first in 0..self.disjunctive.len() {
            for last in 0..self.disjunctive.len() {
                // The windows are read again, as earlier pairs may have moved them.
                let from = tasks[self.disjunctive[first].task].earliest_start(context);
                let to = tasks[self.disjunctive[last].task].latest_end(context);
                if to <= from {
                    continue;
                }
                for window in self.disjunctive.iter_mut() {
                    let task = &tasks[window.task];
                    window.earliest_start = task.earliest_start(context);
                    window.latest_end = task.latest_end(context);
                }

                let energy = self.energy_inside(from, to);
                if energy == 0 {
                    continue;
                }
                if energy > (to - from) as i64 {
                    return Err(PropagatorConflict::new(
                        "the disjunctive tasks do not fit in their interval",
                    )
                    .into());
                }

                for window in self.disjunctive.iter() {
                    if window.earliest_start >= from && window.latest_end <= to {
                        continue;
                    }
                    let task = &tasks[window.task];
                    let required = energy + window.duration as i64;

                    // The task cannot run before all tasks of the interval, so it runs after them.
                    if ((to - window.earliest_start.min(from)) as i64) < required {
                        changed |= task.set_earliest_start(context, from + energy as i32)?;
                    }
                    // The task cannot run after all tasks of the interval, so it runs before them.
                    if ((window.latest_end.max(to) - from) as i64) < required {
                        changed |= task.set_latest_end(context, to - energy as i32)?;
                    }
                }
            }
        }

        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_solver::brute_force_solutions;
    use crate::engine::test_solver::TestSolver;
    use crate::propagators::cumulative::test_helpers::new_tasks;
    use crate::propagators::cumulative::test_helpers::post_cumulative;
    use crate::propagators::cumulative::CumulativeStrategy;

    #[test]
    fn task_is_pushed_after_a_fixed_task() {
        let mut solver = TestSolver::default();
        let tasks = new_tasks(&mut solver, &[(0, 0, 3, 1), (0, 5, 2, 1)]);
        let capacity = solver.new_variable(1, 1);

        post_cumulative(&mut solver, &tasks, capacity, CumulativeStrategy::TaskInterval)
            .expect("no conflict");

        solver.assert_bounds(tasks[1].start, 3, 5);
        solver.assert_bounds(tasks[1].end, 5, 7);
    }

    #[test]
    fn task_is_pushed_after_a_full_interval() {
        let mut solver = TestSolver::default();
        // The first two tasks fill [0, 4) without having mandatory parts.
        let tasks = new_tasks(&mut solver, &[(0, 2, 2, 2), (0, 2, 2, 2), (0, 5, 2, 2)]);
        let capacity = solver.new_variable(0, 3);

        post_cumulative(&mut solver, &tasks, capacity, CumulativeStrategy::TaskInterval)
            .expect("no conflict");

        solver.assert_bounds(tasks[0].start, 0, 2);
        solver.assert_bounds(tasks[1].start, 0, 2);
        solver.assert_bounds(tasks[2].start, 4, 5);
    }

    #[test]
    fn task_is_pulled_before_a_full_interval() {
        let mut solver = TestSolver::default();
        let tasks = new_tasks(&mut solver, &[(3, 5, 2, 1), (3, 5, 2, 1), (0, 6, 3, 1)]);
        let capacity = solver.new_variable(1, 1);

        post_cumulative(&mut solver, &tasks, capacity, CumulativeStrategy::TaskInterval)
            .expect("no conflict");

        // [3, 7) is full, so the third task ends by 3.
        solver.assert_bounds(tasks[2].start, 0, 0);
        solver.assert_bounds(tasks[2].end, 3, 3);
    }

    #[test]
    fn overfull_interval_is_a_conflict() {
        let mut solver = TestSolver::default();
        let tasks = new_tasks(&mut solver, &[(0, 2, 2, 1), (0, 2, 2, 1), (0, 2, 2, 1)]);
        let capacity = solver.new_variable(1, 1);

        let _ = post_cumulative(&mut solver, &tasks, capacity, CumulativeStrategy::TaskInterval)
            .expect_err("6 units of duration do not fit in [0, 4)");
    }

    #[test]
    fn low_tasks_are_ignored() {
        let mut solver = TestSolver::default();
        let tasks = new_tasks(&mut solver, &[(0, 0, 3, 1), (0, 5, 2, 1)]);
        let capacity = solver.new_variable(2, 2);

        post_cumulative(&mut solver, &tasks, capacity, CumulativeStrategy::TaskInterval)
            .expect("no conflict");

        solver.assert_bounds(tasks[1].start, 0, 5);
    }

    #[test]
    fn solutions_match_brute_force_for_disjunctive_tasks() {
        let mut solver = TestSolver::default();
        let durations = [2, 1, 3];
        let tasks = new_tasks(&mut solver, &[(0, 4, 2, 1), (1, 5, 1, 1), (0, 4, 3, 1)]);
        let capacity = solver.new_variable(1, 1);

        post_cumulative(&mut solver, &tasks, capacity, CumulativeStrategy::TaskInterval)
            .expect("no conflict");

        let starts = tasks.iter().map(|task| task.start).collect::<Vec<_>>();
        let solutions = solver.solutions(&starts);
        let expected = brute_force_solutions(
            &[(0..=4).collect::<Vec<_>>(), (1..=5).collect(), (0..=4).collect()],
            |starts| {
                (0..3).all(|i| {
                    (i + 1..3).all(|j| {
                        starts[i] + durations[i] <= starts[j]
                            || starts[j] + durations[j] <= starts[i]
                    })
                })
            },
        );

        assert_eq!(expected, solutions);
    }
}
