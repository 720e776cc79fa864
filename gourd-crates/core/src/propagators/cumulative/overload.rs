use super::filter::CumulativeFilter;
use super::task::Task;
use crate::basic_types::Inconsistency;
use crate::basic_types::PropagatorConflict;
use crate::engine::variables::DomainId;
use crate::propagation::PropagationContext;
use crate::propagation::ReadDomains;

/// Fails when the mandatory parts exceed the capacity at some point in time, without pruning.
///
/// Once the start and duration of every task are fixed, the mandatory parts are the tasks
/// themselves; this makes the filters which reason on energy or intervals only exact at the
/// leaves of the search.
#[derive(Clone, Debug, Default)]
pub(crate) struct OverloadCheck {
    /// `(time, change in height)`, ends before starts at equal times.
    events: Vec<(i32, i32)>,
}

impl CumulativeFilter for OverloadCheck {
    fn name(&self) -> &'static str {
        "Overload"
    }

    fn filter(
        &mut self,
        tasks: &[Task],
        capacity: DomainId,
        context: &mut PropagationContext,
    ) -> Result<bool, Inconsistency> {
        self.events.clear();
        for task in tasks {
            if let Some((from, to)) = task.mandatory_part(context) {
                let height = task.min_height(context);
                self.events.push((from, height));
                self.events.push((to, -height));
            }
        }
        self.events.sort_unstable();

        let max_capacity = context.upper_bound(capacity);
        let mut height = 0;
        for &(_, change) in self.events.iter() {
            height += change;
            if height > max_capacity {
                return Err(
                    PropagatorConflict::new("the mandatory parts exceed the capacity").into(),
                );
            }
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::test_solver::TestSolver;
    use crate::propagators::cumulative::test_helpers::new_tasks;
    use crate::propagators::cumulative::test_helpers::post_cumulative;
    use crate::propagators::cumulative::CumulativeStrategy;

    #[test]
    fn fixed_tasks_over_the_capacity_are_a_conflict() {
        for strategy in [CumulativeStrategy::Energetic, CumulativeStrategy::TaskInterval] {
            let mut solver = TestSolver::default();
            // A single task which is higher than the capacity.
            let tasks = new_tasks(&mut solver, &[(1, 1, 2, 3)]);
            let capacity = solver.new_variable(1, 1);

            let _ = post_cumulative(&mut solver, &tasks, capacity, strategy)
                .expect_err("a height of 3 does not fit on a capacity of 1");
        }
    }

    #[test]
    fn adjacent_tasks_do_not_overlap() {
        let mut solver = TestSolver::default();
        let tasks = new_tasks(&mut solver, &[(0, 0, 2, 2), (2, 2, 3, 2), (5, 5, 1, 2)]);
        let capacity = solver.new_variable(2, 2);

        post_cumulative(&mut solver, &tasks, capacity, CumulativeStrategy::Energetic)
            .expect("no conflict");
    }

    #[test]
    fn overlap_of_fixed_tasks_is_a_conflict() {
        let mut solver = TestSolver::default();
        let tasks = new_tasks(&mut solver, &[(0, 0, 2, 1), (1, 1, 2, 1), (1, 1, 1, 1)]);
        let capacity = solver.new_variable(2, 2);

        let _ = post_cumulative(&mut solver, &tasks, capacity, CumulativeStrategy::TaskInterval)
            .expect_err("three tasks run at time 1");
    }
}
