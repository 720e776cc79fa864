use log::trace;
use log::warn;

use super::energetic::EnergeticFilter;
use super::filter::CumulativeFilter;
use super::overload::OverloadCheck;
use super::sweep::SweepFilter;
use super::task::ArgTask;
use super::task::Task;
use super::task_interval::TaskIntervalFilter;
use super::time_table::TimeTableFilter;
use super::CumulativeOptions;
use super::CumulativeStrategy;
use crate::basic_types::PropagationStatusCP;
use crate::create_statistics_struct;
use crate::engine::variables::DomainId;
use crate::propagation::DomainEvents;
use crate::propagation::LocalId;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorConstructorContext;
use crate::propagation::ReadDomains;
use crate::statistics::Statistic;
use crate::statistics::StatisticLogger;

create_statistics_struct!(CumulativeStatistics {
    num_calls: usize,
    num_rounds: usize,
    num_conflicts: usize,
});

/// The [`PropagatorConstructor`] for the [`Cumulative`] propagator.
///
/// The relation `start + duration = end` of the tasks is not enforced by the propagator; see
/// [`super::TaskRelation`].
#[derive(Clone, Debug)]
pub struct CumulativeArgs {
    pub tasks: Box<[ArgTask]>,
    pub capacity: DomainId,
    pub options: CumulativeOptions,
}

impl PropagatorConstructor for CumulativeArgs {
    type PropagatorImpl = Cumulative;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let CumulativeArgs {
            tasks,
            capacity,
            options,
        } = self;

        let tasks = tasks
            .iter()
            .enumerate()
            .map(|(id, &task)| Task::new(task, id))
            .collect::<Box<[_]>>();

        for task in tasks.iter() {
            let offset = 4 * task.id as u32;
            context.register(task.start, DomainEvents::BOUNDS, LocalId::from(offset));
            context.register(task.duration, DomainEvents::BOUNDS, LocalId::from(offset + 1));
            context.register(task.end, DomainEvents::BOUNDS, LocalId::from(offset + 2));
            context.register(task.height, DomainEvents::BOUNDS, LocalId::from(offset + 3));

            if context.upper_bound(task.height) == 0 {
                warn!("task {} of a cumulative never uses the resource", task.id);
            }
        }
        context.register(
            capacity,
            DomainEvents::BOUNDS,
            LocalId::from(4 * tasks.len() as u32),
        );

        let filters = create_filters(&tasks, &options, &context);

        Cumulative {
            tasks,
            capacity,
            filters,
            statistics: CumulativeStatistics::default(),
        }
    }
}

/// The filters which implement `options.strategy`.
fn create_filters(
    tasks: &[Task],
    options: &CumulativeOptions,
    context: &impl ReadDomains,
) -> Vec<Box<dyn CumulativeFilter>> {
    match options.strategy {
        CumulativeStrategy::TimeTable => vec![Box::new(TimeTableFilter::default())],
        CumulativeStrategy::Sweep => vec![Box::new(SweepFilter::default())],
        CumulativeStrategy::Energetic => vec![
            Box::new(EnergeticFilter::default()),
            Box::new(OverloadCheck::default()),
        ],
        CumulativeStrategy::TaskInterval => vec![
            Box::new(TaskIntervalFilter::default()),
            Box::new(OverloadCheck::default()),
        ],
        CumulativeStrategy::Default => {
            let horizon_start = tasks
                .iter()
                .map(|task| task.earliest_start(context))
                .min()
                .unwrap_or(0);
            let horizon_end = tasks
                .iter()
                .map(|task| task.latest_end(context))
                .max()
                .unwrap_or(0);

            let mut filters: Vec<Box<dyn CumulativeFilter>> =
                if horizon_end as i64 - horizon_start as i64
                    <= options.discretisation_horizon_limit as i64
                {
                    vec![Box::new(TimeTableFilter::default())]
                } else {
                    vec![Box::new(SweepFilter::default())]
                };
            filters.push(Box::new(EnergeticFilter::default()));
            if tasks.len() <= options.task_interval_task_limit {
                filters.push(Box::new(TaskIntervalFilter::default()));
            }
            filters
        }
    }
}

/// Propagator for the cumulative constraint: at every time point, the summed height of the tasks
/// which run at that time is at most the capacity.
///
/// The propagator runs a list of filters, chosen through [`CumulativeOptions`], in rounds until
/// a round changes no domain. None of the filters is complete on its own, but every strategy
/// includes time-tabling or an overload check of the mandatory parts, which detects every
/// overload once the starts and durations are fixed.
#[derive(Clone, Debug)]
pub struct Cumulative {
    tasks: Box<[Task]>,
    capacity: DomainId,
    filters: Vec<Box<dyn CumulativeFilter>>,

    statistics: CumulativeStatistics,
}

impl Propagator for Cumulative {
    fn name(&self) -> &str {
        "Cumulative"
    }

    fn priority(&self) -> Priority {
        Priority::Low
    }

    fn propagate(&mut self, mut context: PropagationContext) -> PropagationStatusCP {
        self.statistics.num_calls += 1;

        let result = self.propagate_rounds(&mut context);
        if result.is_err() {
            self.statistics.num_conflicts += 1;
        }
        result
    }

    fn log_statistics(&self, statistic_logger: StatisticLogger) {
        self.statistics.log(statistic_logger);
    }
}

impl Cumulative {
    fn propagate_rounds(&mut self, context: &mut PropagationContext) -> PropagationStatusCP {
        loop {
            self.statistics.num_rounds += 1;

            let mut changed = false;
            for filter in self.filters.iter_mut() {
                match filter.filter(&self.tasks, self.capacity, context) {
                    Ok(filter_changed) => changed |= filter_changed,
                    Err(inconsistency) => {
                        trace!("Cumulative: the {} filter failed", filter.name());
                        return Err(inconsistency);
                    }
                }
            }

            if !changed {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_solver::brute_force_solutions;
    use crate::engine::test_solver::TestSolver;
    use crate::propagators::cumulative::test_helpers::new_tasks;
    use crate::propagators::cumulative::test_helpers::new_tasks_with_durations;
    use crate::propagators::cumulative::test_helpers::post_cumulative;

    const STRATEGIES: [CumulativeStrategy; 5] = [
        CumulativeStrategy::Default,
        CumulativeStrategy::TimeTable,
        CumulativeStrategy::Sweep,
        CumulativeStrategy::Energetic,
        CumulativeStrategy::TaskInterval,
    ];

    /// `(start lower bound, start upper bound, duration lower bound, duration upper bound,
    /// height)` of every task.
    type Instance = [(i32, i32, i32, i32, i32)];

    /// The starts followed by the durations of every schedule which respects the capacity.
    fn feasible_schedules(instance: &Instance, capacity: i32) -> Vec<Vec<i32>> {
        let starts = instance
            .iter()
            .map(|&(lower_bound, upper_bound, _, _, _)| {
                (lower_bound..=upper_bound).collect::<Vec<i32>>()
            });
        let durations = instance
            .iter()
            .map(|&(_, _, lower_bound, upper_bound, _)| {
                (lower_bound..=upper_bound).collect::<Vec<i32>>()
            });
        let domains = starts.chain(durations).collect::<Vec<_>>();

        brute_force_solutions(&domains, |values| {
            let (starts, durations) = values.split_at(instance.len());
            let load = |time: i32| {
                (0..instance.len())
                    .filter(|&task| starts[task] <= time && time < starts[task] + durations[task])
                    .map(|task| instance[task].4)
                    .sum::<i32>()
            };
            // The load peaks at the start of some task.
            starts.iter().all(|&time| load(time) <= capacity)
        })
    }

    /// The starts followed by the durations of every schedule found by search.
    fn schedules_with(
        instance: &Instance,
        capacity: i32,
        strategy: CumulativeStrategy,
    ) -> Vec<Vec<i32>> {
        let mut solver = TestSolver::default();
        let tasks = new_tasks_with_durations(&mut solver, instance);
        let capacity = solver.new_variable(capacity, capacity);
        if post_cumulative(&mut solver, &tasks, capacity, strategy).is_err() {
            return vec![];
        }

        let variables = tasks
            .iter()
            .map(|task| task.start)
            .chain(tasks.iter().map(|task| task.duration))
            .collect::<Vec<_>>();
        solver.solutions(&variables)
    }

    fn assert_exact_for_every_strategy(instance: &Instance, capacity: i32) {
        let expected = feasible_schedules(instance, capacity);
        for strategy in STRATEGIES {
            assert_eq!(
                expected,
                schedules_with(instance, capacity, strategy),
                "{strategy:?} on {instance:?} with capacity {capacity}"
            );
        }
    }

    #[test]
    fn overlapping_tasks_are_separated_after_a_decision() {
        let mut solver = TestSolver::default();
        let tasks = new_tasks(&mut solver, &[(0, 4, 3, 2), (0, 4, 2, 2)]);
        let capacity = solver.new_variable(3, 3);

        post_cumulative(&mut solver, &tasks, capacity, CumulativeStrategy::Default)
            .expect("no conflict");
        solver.assert_bounds(tasks[0].start, 0, 4);
        solver.assert_bounds(tasks[1].start, 0, 4);

        solver.new_checkpoint();
        let _ = solver.assign(tasks[0].start, 0).expect("non-empty");
        solver.propagate().expect("no conflict");
        solver.assert_bounds(tasks[1].start, 3, 4);

        solver.restore_to(0);
        solver.assert_bounds(tasks[1].start, 0, 4);
    }

    #[test]
    fn capacity_is_at_least_the_peak_of_fixed_tasks() {
        let mut solver = TestSolver::default();
        let tasks = new_tasks(&mut solver, &[(0, 0, 3, 2), (1, 1, 3, 2), (5, 5, 1, 1)]);
        let capacity = solver.new_variable(0, 5);

        post_cumulative(&mut solver, &tasks, capacity, CumulativeStrategy::Default)
            .expect("no conflict");

        solver.assert_bounds(capacity, 4, 5);
    }

    #[test]
    fn every_strategy_finds_exactly_the_solutions() {
        let instances: [(&Instance, i32); 4] = [
            (&[(0, 3, 2, 2, 2), (0, 3, 2, 2, 1), (1, 4, 3, 3, 2)], 3),
            (&[(0, 2, 2, 2, 1), (1, 3, 1, 1, 1), (0, 3, 2, 2, 1)], 2),
            (&[(0, 3, 1, 2, 2), (0, 2, 2, 2, 1), (1, 3, 1, 1, 2)], 3),
            (&[(0, 3, 1, 1, 2), (0, 2, 1, 2, 1), (0, 3, 2, 2, 1)], 2),
        ];

        for (instance, capacity) in instances {
            assert!(!feasible_schedules(instance, capacity).is_empty());
            assert_exact_for_every_strategy(instance, capacity);
        }
    }

    #[test]
    fn task_higher_than_the_capacity_has_no_schedule() {
        let instance = [(0, 3, 1, 1, 3), (1, 1, 2, 2, 3)];

        assert!(feasible_schedules(&instance, 1).is_empty());
        assert_exact_for_every_strategy(&instance, 1);
    }

    #[test]
    fn tasks_without_duration_use_no_resource() {
        // Both tasks are allowed to take no time; the first one is too high to run at all.
        let instance = [(1, 4, 0, 0, 2), (1, 4, 0, 1, 1)];
        assert_eq!(32, feasible_schedules(&instance, 1).len());
        assert_exact_for_every_strategy(&instance, 1);

        let instance = [(0, 2, 0, 1, 2), (0, 2, 1, 1, 1)];
        assert_eq!(9, feasible_schedules(&instance, 1).len());
        assert_exact_for_every_strategy(&instance, 1);
    }

    #[test]
    fn tasks_without_height_fit_anywhere() {
        let instance = [(0, 2, 2, 2, 0), (0, 2, 2, 2, 1), (1, 2, 1, 1, 1)];
        assert_exact_for_every_strategy(&instance, 1);

        let instance = [(0, 1, 1, 2, 0), (0, 1, 1, 1, 0)];
        assert_eq!(8, feasible_schedules(&instance, 0).len());
        assert_exact_for_every_strategy(&instance, 0);
    }

    #[test]
    fn default_strategy_depends_on_the_horizon_and_the_number_of_tasks() {
        let filter_names = |horizon: i32, num_tasks: usize| {
            let mut solver = TestSolver::default();
            let instance = vec![(0, horizon, 1, 1); num_tasks];
            let tasks = new_tasks(&mut solver, &instance);
            let capacity = solver.new_variable(num_tasks as i32, num_tasks as i32);
            let handle = solver
                .new_propagator(CumulativeArgs {
                    tasks: tasks.into(),
                    capacity,
                    options: CumulativeOptions {
                        discretisation_horizon_limit: 100,
                        task_interval_task_limit: 2,
                        ..Default::default()
                    },
                })
                .expect("no conflict");

            solver
                .get_propagator(handle)
                .expect("the propagator exists")
                .filters
                .iter()
                .map(|filter| filter.name())
                .collect::<Vec<_>>()
        };

        assert_eq!(
            vec!["TimeTable", "Energetic", "TaskInterval"],
            filter_names(10, 2)
        );
        assert_eq!(vec!["Sweep", "Energetic"], filter_names(1000, 3));
    }

    #[test]
    fn propagator_is_idle_without_tasks() {
        let mut solver = TestSolver::default();
        let capacity = solver.new_variable(0, 2);

        post_cumulative(&mut solver, &[], capacity, CumulativeStrategy::Default)
            .expect("no conflict");
        solver.assert_bounds(capacity, 0, 2);
    }
}
