use super::Constraint;
use crate::basic_types::ConstraintOperationError;
use crate::engine::variables::DomainId;
use crate::engine::State;
use crate::propagators::cumulative::ArgTask;
use crate::propagators::cumulative::CumulativeArgs;
use crate::propagators::cumulative::CumulativeOptions;
use crate::propagators::cumulative::TaskRelationArgs;

/// Creates the [Cumulative](https://sofdem.github.io/gccat/gccat/Ccumulative.html) [`Constraint`].
///
/// This constraint ensures that every task satisfies `start + duration = end` and that at no
/// point in time the summed height of the running tasks exceeds `capacity`. A task runs from its
/// start (inclusive) to its end (exclusive).
///
/// # Example
/// ```rust
/// // Two tasks of height 2 on a resource of capacity 3 cannot overlap; once the first one starts
/// // at 0, the second one has to wait until it ends.
/// # use gourd_core::constraints;
/// # use gourd_core::engine::State;
/// let mut state = State::default();
///
/// let first = state.new_interval_variable(0, 4, None);
/// let second = state.new_interval_variable(0, 4, None);
///
/// state
///     .post_constraint(constraints::cumulative_fixed(
///         vec![first, second],
///         vec![3, 2],
///         vec![2, 2],
///         3,
///     ))
///     .expect("the model is feasible");
///
/// state.new_checkpoint();
/// let _ = state.assign(first, 0).expect("0 is in the domain");
/// state.propagate_to_fixed_point().expect("the tasks fit");
/// assert_eq!(3, state.lower_bound(second));
/// ```
pub fn cumulative(tasks: impl Into<Box<[ArgTask]>>, capacity: DomainId) -> impl Constraint {
    cumulative_with_options(tasks, capacity, CumulativeOptions::default())
}

/// Creates the cumulative [`Constraint`] with the provided [`CumulativeOptions`].
///
/// See the documentation of [`cumulative`] for more information about the constraint.
pub fn cumulative_with_options(
    tasks: impl Into<Box<[ArgTask]>>,
    capacity: DomainId,
    options: CumulativeOptions,
) -> impl Constraint {
    CumulativeConstraint {
        tasks: TaskSpecification::Variables(tasks.into()),
        capacity: Capacity::Variable(capacity),
        options,
    }
}

/// Creates the cumulative [`Constraint`] over tasks with a fixed duration and height, on a
/// resource with a fixed capacity.
///
/// The lengths of `starts`, `durations` and `heights` must be the same.
pub fn cumulative_fixed(
    starts: impl Into<Box<[DomainId]>>,
    durations: impl Into<Box<[i32]>>,
    heights: impl Into<Box<[i32]>>,
    capacity: i32,
) -> impl Constraint {
    CumulativeConstraint {
        tasks: TaskSpecification::Fixed {
            starts: starts.into(),
            durations: durations.into(),
            heights: heights.into(),
        },
        capacity: Capacity::Fixed(capacity),
        options: CumulativeOptions::default(),
    }
}

#[derive(Debug)]
enum TaskSpecification {
    Variables(Box<[ArgTask]>),
    Fixed {
        starts: Box<[DomainId]>,
        durations: Box<[i32]>,
        heights: Box<[i32]>,
    },
}

#[derive(Clone, Copy, Debug)]
enum Capacity {
    Variable(DomainId),
    Fixed(i32),
}

#[derive(Debug)]
struct CumulativeConstraint {
    tasks: TaskSpecification,
    capacity: Capacity,
    options: CumulativeOptions,
}

impl CumulativeConstraint {
    /// Turns the fixed attributes into singleton variables.
    fn create_tasks(
        tasks: TaskSpecification,
        state: &mut State,
    ) -> Result<Box<[ArgTask]>, ConstraintOperationError> {
        match tasks {
            TaskSpecification::Variables(tasks) => Ok(tasks),
            TaskSpecification::Fixed {
                starts,
                durations,
                heights,
            } => {
                for (what, actual) in [("durations", durations.len()), ("heights", heights.len())] {
                    if actual != starts.len() {
                        return Err(ConstraintOperationError::MismatchedLengths {
                            what,
                            expected: starts.len(),
                            actual,
                        });
                    }
                }

                Ok(starts
                    .iter()
                    .zip(durations.iter().zip(heights.iter()))
                    .map(|(&start, (&duration, &height))| {
                        let end = state.new_interval_variable(
                            state.lower_bound(start).saturating_add(duration),
                            state.upper_bound(start).saturating_add(duration),
                            None,
                        );
                        ArgTask {
                            start,
                            duration: state.new_interval_variable(duration, duration, None),
                            end,
                            height: state.new_interval_variable(height, height, None),
                        }
                    })
                    .collect())
            }
        }
    }
}

impl Constraint for CumulativeConstraint {
    fn post(self, state: &mut State) -> Result<(), ConstraintOperationError> {
        let tasks = CumulativeConstraint::create_tasks(self.tasks, state)?;
        for (index, task) in tasks.iter().enumerate() {
            if state.lower_bound(task.duration) < 0 {
                return Err(ConstraintOperationError::NegativeTaskAttribute {
                    what: "duration",
                    task: index,
                });
            }
            if state.lower_bound(task.height) < 0 {
                return Err(ConstraintOperationError::NegativeTaskAttribute {
                    what: "height",
                    task: index,
                });
            }
        }

        let capacity = match self.capacity {
            Capacity::Variable(capacity) => capacity,
            Capacity::Fixed(capacity) => state.new_interval_variable(capacity, capacity, None),
        };

        for task in tasks.iter() {
            TaskRelationArgs {
                start: task.start,
                duration: task.duration,
                end: task.end,
            }
            .post(state)?;
        }
        CumulativeArgs {
            tasks,
            capacity,
            options: self.options,
        }
        .post(state)
    }
}
