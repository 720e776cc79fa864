//! Schedules a small project on one resource: every task occupies part of the resource while it
//! runs, some tasks have to wait for others, and the project should end as early as possible.
//!
//! Run with `RUST_LOG=debug` to follow the conflicts found during the search.

use gourd_core::constraints;
use gourd_core::constraints::Constraint;
use gourd_core::engine::State;
use gourd_core::statistics::configure_statistic_logging;
use gourd_core::statistics::log_statistic;
use gourd_core::DomainId;
use log::info;

struct Task {
    duration: i32,
    height: i32,
    successors: &'static [usize],
}

const TASKS: [Task; 6] = [
    Task {
        duration: 3,
        height: 2,
        successors: &[2, 3],
    },
    Task {
        duration: 2,
        height: 3,
        successors: &[3],
    },
    Task {
        duration: 4,
        height: 2,
        successors: &[5],
    },
    Task {
        duration: 2,
        height: 1,
        successors: &[4],
    },
    Task {
        duration: 3,
        height: 2,
        successors: &[],
    },
    Task {
        duration: 1,
        height: 3,
        successors: &[],
    },
];
const CAPACITY: i32 = 4;
const HORIZON: i32 = 20;

fn main() {
    env_logger::init();
    configure_statistic_logging("%%", None, None, None);

    let mut state = State::default();
    let starts = TASKS
        .iter()
        .enumerate()
        .map(|(index, task)| {
            state.new_interval_variable(
                0,
                HORIZON - task.duration,
                Some(&format!("start_{index}")),
            )
        })
        .collect::<Vec<_>>();
    let makespan = state.new_interval_variable(0, HORIZON, Some("makespan"));

    let mut precedences = vec![];
    for (index, task) in TASKS.iter().enumerate() {
        for &successor in task.successors {
            precedences.push(constraints::less_than_or_equals(
                starts[index],
                starts[successor],
                task.duration,
            ));
        }
        precedences.push(constraints::less_than_or_equals(
            starts[index],
            makespan,
            task.duration,
        ));
    }

    let posted = precedences.post(&mut state).and_then(|_| {
        state.post_constraint(constraints::cumulative_fixed(
            starts.clone(),
            TASKS.iter().map(|task| task.duration).collect::<Vec<_>>(),
            TASKS.iter().map(|task| task.height).collect::<Vec<_>>(),
            CAPACITY,
        ))
    });
    if let Err(error) = posted {
        println!("UNSATISFIABLE ({error})");
        return;
    }

    // Every schedule found bounds the makespan of the next one.
    let mut best = None;
    while let Some(schedule) = search(&mut state, &starts) {
        let length = state.lower_bound(makespan);
        info!("found a schedule of length {length}");
        best = Some((length, schedule));

        state.restore_to(0);
        if state.set_upper_bound(makespan, length - 1).is_err() {
            break;
        }
    }

    match &best {
        Some((length, schedule)) => {
            println!("OPTIMAL makespan={length}");
            for (index, start) in schedule.iter().enumerate() {
                let task = &TASKS[index];
                println!(
                    "task {index}: {}{}",
                    " ".repeat(*start as usize),
                    task.height.to_string().repeat(task.duration as usize)
                );
            }
        }
        None => println!("UNSATISFIABLE"),
    }

    log_statistic("makespan", best.map_or(-1, |(length, _)| length));
    state.log_statistics(true);
}

/// Depth-first search which starts the unscheduled task that can start first, or delays it.
fn search(state: &mut State, starts: &[DomainId]) -> Option<Vec<i32>> {
    if state.propagate_to_fixed_point().is_err() {
        return None;
    }

    let Some(&start) = starts
        .iter()
        .filter(|&&start| !state.is_fixed(start))
        .min_by_key(|&&start| state.lower_bound(start))
    else {
        return Some(starts.iter().map(|&start| state.lower_bound(start)).collect());
    };

    let value = state.lower_bound(start);
    let checkpoint = state.get_checkpoint();

    state.new_checkpoint();
    if state.assign(start, value).is_ok() {
        if let Some(schedule) = search(state, starts) {
            return Some(schedule);
        }
    }
    state.restore_to(checkpoint);

    state.new_checkpoint();
    if state.set_lower_bound(start, value + 1).is_ok() {
        if let Some(schedule) = search(state, starts) {
            return Some(schedule);
        }
    }
    state.restore_to(checkpoint);

    None
}
