//! Propagators for the cumulative constraint, which schedules tasks on a resource of bounded
//! capacity.
//!
//! A task is described by a start, a duration, an end and a height (its resource usage), each of
//! which is a variable; constants are fixed variables. The relation `start + duration = end` of a
//! single task is enforced by [`TaskRelation`], the resource by [`Cumulative`].
//!
//! The [`Cumulative`] propagator combines several filtering algorithms over the same tasks, see
//! [`CumulativeStrategy`]:
//! - time-tabling, over an array indexed by time or over the sorted boundaries of the mandatory
//!   parts;
//! - energetic reasoning on the windows of the tasks;
//! - task intervals on the tasks which are too high to run in parallel.
//!
//! Every strategy detects an overload of the resource once the starts and durations are fixed.
mod cumulative_propagator;
mod energetic;
mod filter;
mod options;
mod overload;
mod sweep;
mod task;
mod task_interval;
mod task_relation;
mod time_table;

pub use cumulative_propagator::Cumulative;
pub use cumulative_propagator::CumulativeArgs;
pub use options::CumulativeOptions;
pub use options::CumulativeStrategy;
pub use task::ArgTask;
pub use task_relation::TaskRelation;
pub use task_relation::TaskRelationArgs;

#[cfg(test)]
pub(crate) mod test_helpers {
    use super::ArgTask;
    use super::CumulativeArgs;
    use super::CumulativeOptions;
    use super::CumulativeStrategy;
    use super::TaskRelationArgs;
    use crate::engine::test_solver::TestSolver;
    use crate::engine::variables::DomainId;
    use crate::engine::Conflict;

    /// Creates a task with a fixed duration and height for every
    /// `(start lower bound, start upper bound, duration, height)`, linked by a [`TaskRelation`].
    ///
    /// [`TaskRelation`]: super::TaskRelation
    pub(crate) fn new_tasks(
        solver: &mut TestSolver,
        tasks: &[(i32, i32, i32, i32)],
    ) -> Vec<ArgTask> {
        let tasks = tasks
            .iter()
            .map(|&(start_lower_bound, start_upper_bound, duration, height)| {
                (start_lower_bound, start_upper_bound, duration, duration, height)
            })
            .collect::<Vec<_>>();
        new_tasks_with_durations(solver, &tasks)
    }

    /// Creates a task for every
    /// `(start lower bound, start upper bound, duration lower bound, duration upper bound,
    /// height)`.
    pub(crate) fn new_tasks_with_durations(
        solver: &mut TestSolver,
        tasks: &[(i32, i32, i32, i32, i32)],
    ) -> Vec<ArgTask> {
        tasks
            .iter()
            .map(
                |&(start_lower_bound, start_upper_bound, min_duration, max_duration, height)| {
                    let start = solver.new_variable(start_lower_bound, start_upper_bound);
                    let end = solver.new_variable(
                        start_lower_bound + min_duration,
                        start_upper_bound + max_duration,
                    );
                    let duration = solver.new_variable(min_duration, max_duration);
                    let height = solver.new_variable(height, height);
                    let _ = solver
                        .new_propagator(TaskRelationArgs {
                            start,
                            duration,
                            end,
                        })
                        .expect("the task is consistent");

                    ArgTask {
                        start,
                        duration,
                        end,
                        height,
                    }
                },
            )
            .collect()
    }

    pub(crate) fn post_cumulative(
        solver: &mut TestSolver,
        tasks: &[ArgTask],
        capacity: DomainId,
        strategy: CumulativeStrategy,
    ) -> Result<(), Conflict> {
        let _ = solver.new_propagator(CumulativeArgs {
            tasks: tasks.into(),
            capacity,
            options: CumulativeOptions {
                strategy,
                ..Default::default()
            },
        })?;
        Ok(())
    }
}
