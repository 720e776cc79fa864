use std::cmp::Ordering;

use super::filter::CumulativeFilter;
use super::task::Task;
use crate::basic_types::Inconsistency;
use crate::basic_types::PropagatorConflict;
use crate::engine::variables::DomainId;
use crate::propagation::PropagationContext;
use crate::propagation::ReadDomains;

/// The smallest energy of a task and the window it has to fit in.
#[derive(Clone, Copy, Debug)]
struct EnergyWindow {
    task: usize,
    energy: i64,
    earliest_start: i32,
    latest_end: i32,
}

impl EnergyWindow {
    fn length(&self) -> i64 {
        (self.latest_end - self.earliest_start).max(0) as i64
    }

    /// A window too short for a positive energy is denser than any other.
    fn is_overfull(&self) -> bool {
        self.length() == 0 && self.energy > 0
    }

    /// Orders by decreasing `energy / length`.
    fn cmp_density(&self, other: &EnergyWindow) -> Ordering {
        match (self.is_overfull(), other.is_overfull()) {
            (true, true) => other.energy.cmp(&self.energy),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => {
                let own = self.energy as i128 * other.length().max(1) as i128;
                let others = other.energy as i128 * self.length().max(1) as i128;
                others.cmp(&own)
            }
        }
    }
}

fn clamp_to_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Energetic reasoning over growing sets of tasks.
///
/// The tasks are visited from the densest to the sparsest window. After every task the union of
/// the windows seen so far must offer enough area for the energy of those tasks; the remaining area
/// bounds the height and duration of the task just added and the accumulated energy bounds the
/// capacity from below.
#[derive(Clone, Debug, Default)]
pub(crate) struct EnergeticFilter {
    windows: Vec<EnergyWindow>,
}

impl CumulativeFilter for EnergeticFilter {
    fn name(&self) -> &'static str {
        "Energetic"
    }

    fn filter(
        &mut self,
        tasks: &[Task],
        capacity: DomainId,
        context: &mut PropagationContext,
    ) -> Result<bool, Inconsistency> {
        self.windows.clear();
        self.windows
            .extend(tasks.iter().map(|task| EnergyWindow {
                task: task.id,
                energy: task.min_energy(context),
                earliest_start: task.earliest_start(context),
                latest_end: task.latest_end(context),
            }));
        self.windows.sort_by(EnergyWindow::cmp_density);

        let max_capacity = context.upper_bound(capacity) as i64;
        let mut changed = false;
        let mut window_start = i32::MAX;
        let mut window_end = i32::MIN;
        let mut surface = 0_i64;

        for window in self.windows.iter() {
            window_start = window_start.min(window.earliest_start);
            window_end = window_end.max(window.latest_end);
            surface += window.energy;

            let length = (window_end - window_start).max(0) as i64;
            let area = length * max_capacity;
            if surface > area {
                return Err(PropagatorConflict::new(
                    "the energy of the tasks exceeds the area of their windows",
                )
                .into());
            }
            if length > 0 {
                let required_capacity = (surface + length - 1) / length;
                changed |= context.set_lower_bound(capacity, clamp_to_i32(required_capacity))?;
            }

            let task = &tasks[window.task];
            let spare = area - (surface - window.energy);
            let duration = task.min_duration(context) as i64;
            let height = task.min_height(context) as i64;
            if duration > 0 {
                changed |= context.set_upper_bound(task.height, clamp_to_i32(spare / duration))?;
            }
            if height > 0 {
                changed |= context.set_upper_bound(task.duration, clamp_to_i32(spare / height))?;
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
    use crate::propagators::cumulative::test_helpers::post_cumulative;
    use crate::propagators::cumulative::ArgTask;
    use crate::propagators::cumulative::CumulativeStrategy;

    #[test]
    fn windows_are_ordered_by_density() {
        let window = |energy, earliest_start, latest_end| EnergyWindow {
            task: 0,
            energy,
            earliest_start,
            latest_end,
        };
        let mut windows = vec![window(4, 0, 8), window(6, 0, 4), window(1, 3, 3), window(3, 0, 6)];
        windows.sort_by(EnergyWindow::cmp_density);

        let energies = windows.iter().map(|window| window.energy).collect::<Vec<_>>();
        assert_eq!(vec![1, 6, 4, 3], energies);
    }

    #[test]
    fn too_much_energy_in_a_window_is_a_conflict() {
        let mut solver = TestSolver::default();
        // Each task fits on its own, but together they need 12 units of area in [0, 5).
        let tasks = new_tasks(&mut solver, &[(0, 2, 3, 2), (0, 2, 3, 2)]);
        let capacity = solver.new_variable(0, 2);

        let _ = post_cumulative(&mut solver, &tasks, capacity, CumulativeStrategy::Energetic)
            .expect_err("12 units of energy do not fit in an area of 10");
    }

    #[test]
    fn accumulated_energy_bounds_the_capacity() {
        let mut solver = TestSolver::default();
        let tasks = new_tasks(&mut solver, &[(0, 4, 2, 3), (0, 4, 2, 3)]);
        let capacity = solver.new_variable(0, 10);

        post_cumulative(&mut solver, &tasks, capacity, CumulativeStrategy::Energetic)
            .expect("no conflict");

        // 12 units of energy within [0, 6).
        solver.assert_bounds(capacity, 2, 10);
    }

    #[test]
    fn spare_area_bounds_the_height() {
        let mut solver = TestSolver::default();
        let mut tasks = new_tasks(&mut solver, &[(0, 0, 4, 2)]);
        let start = solver.new_variable(0, 0);
        let duration = solver.new_variable(1, 4);
        let end = solver.new_variable(1, 4);
        let height = solver.new_variable(1, 3);
        tasks.push(ArgTask {
            start,
            duration,
            end,
            height,
        });
        let capacity = solver.new_variable(3, 3);

        post_cumulative(&mut solver, &tasks, capacity, CumulativeStrategy::Energetic)
            .expect("no conflict");
        solver.assert_bounds(height, 1, 3);
        solver.assert_bounds(duration, 1, 4);

        // The window [0, 4) has an area of 12, of which the first task takes 8; the remaining 4
        // units allow a height of 1 over 3 time points.
        let _ = solver.set_lower_bound(duration, 3).expect("non-empty");
        solver.propagate().expect("no conflict");
        solver.assert_bounds(height, 1, 1);
    }
}
