use log::trace;

use super::partial_sum::PartialSum;
use crate::basic_types::Inconsistency;
use crate::basic_types::PropagationStatusCP;
use crate::basic_types::PropagatorConflict;
use crate::create_statistics_struct;
use crate::engine::variables::DomainId;
use crate::engine::TrailedInteger;
use crate::gourd_assert_simple;
use crate::propagation::DeltaMonitor;
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

create_statistics_struct!(BoundGccStatistics {
    num_calls: usize,
    num_rounds: usize,
    num_conflicts: usize,
});

/// The [`PropagatorConstructor`] for the [`GlobalCardinalityBounds`] propagator.
///
/// The cardinality of value `first_value + i` is `cardinalities[i]`. Every variable must already
/// be restricted to the values `first_value..first_value + cardinalities.len()` and every
/// cardinality to `[0, variables.len()]`; the global cardinality constraint takes care of this
/// before creating the propagator.
#[derive(Clone, Debug)]
pub struct GlobalCardinalityBoundsArgs {
    pub variables: Box<[DomainId]>,
    pub first_value: i32,
    pub cardinalities: Box<[DomainId]>,
}

impl PropagatorConstructor for GlobalCardinalityBoundsArgs {
    type PropagatorImpl = GlobalCardinalityBounds;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let GlobalCardinalityBoundsArgs {
            variables,
            first_value,
            cardinalities,
        } = self;
        let num_variables = variables.len();
        let range = cardinalities.len();
        let last_value = first_value + range as i32 - 1;

        for (index, &variable) in variables.iter().enumerate() {
            gourd_assert_simple!(
                context.lower_bound(variable) >= first_value
                    && context.upper_bound(variable) <= last_value,
                "the variables of a bound consistent gcc are restricted to its value range"
            );
            context.register(variable, DomainEvents::ANY_INT, LocalId::from(index as u32));
        }
        for (index, &cardinality) in cardinalities.iter().enumerate() {
            context.register(
                cardinality,
                DomainEvents::BOUNDS,
                LocalId::from((num_variables + index) as u32),
            );
        }

        let mut possible = vec![0; range];
        let mut fixed = vec![0; range];
        for &variable in variables.iter() {
            for value in context.iterate_domain(variable) {
                possible[(value - first_value) as usize] += 1;
            }
            if let Some(value) = context.fixed_value(variable) {
                fixed[(value - first_value) as usize] += 1;
            }
        }

        let delta_monitors = variables
            .iter()
            .map(|&variable| context.new_delta_monitor(variable))
            .collect();
        let is_counted_as_fixed = variables
            .iter()
            .map(|&variable| {
                let is_fixed = context.is_fixed(variable);
                context.new_trailed_integer(is_fixed as i64)
            })
            .collect();
        let num_possible = possible
            .into_iter()
            .map(|count| context.new_trailed_integer(count))
            .collect();
        let num_fixed = fixed
            .into_iter()
            .map(|count| context.new_trailed_integer(count))
            .collect();

        let num_breakpoints = 2 * num_variables + 3;
        GlobalCardinalityBounds {
            intervals: vec![HallInterval::default(); num_variables],
            min_sorted: (0..num_variables).collect(),
            max_sorted: (0..num_variables).collect(),
            tree_links: vec![0; num_breakpoints],
            capacities: vec![0; num_breakpoints],
            hall: vec![0; num_breakpoints],
            bounds: vec![0; num_breakpoints],
            stable_interval: vec![0; num_breakpoints],
            potential_stable_sets: vec![0; num_breakpoints],
            new_min: vec![0; num_variables],
            num_bounds: 0,
            lower: PartialSum::new(first_value, range),
            upper: PartialSum::new(first_value, range),
            variables,
            cardinalities,
            first_value,
            delta_monitors,
            is_counted_as_fixed,
            num_possible,
            num_fixed,
            statistics: BoundGccStatistics::default(),
        }
    }
}

/// The bounds of one variable and their ranks among all distinct bounds.
#[derive(Clone, Copy, Debug, Default)]
struct HallInterval {
    lower_bound: i32,
    /// One past the upper bound.
    end: i32,
    min_rank: usize,
    max_rank: usize,
}

/// Bound consistency for the global cardinality constraint over a contiguous value range, based
/// on Hall intervals for the maximum occurrences and on stable sets for the minimum occurrences
/// \[1\].
///
/// Per value the propagator keeps two trailed counters: the number of variables which can still
/// take the value and the number of variables fixed to it. They are brought up to date from the
/// removal deltas of the variables at the start of every round and bound the cardinalities.
///
/// Changes to the cardinalities feed back into the Hall interval passes and vice versa, so a call
/// repeats its rounds until a round changes nothing.
///
/// # Bibliography
/// \[1\] C.-G. Quimper, A. López-Ortiz, P. van Beek, and A. Golynski, ‘Improved algorithms for the
/// global cardinality constraint’, in Principles and Practice of Constraint Programming (CP 2004),
/// pp. 542–556.
#[derive(Clone, Debug)]
pub struct GlobalCardinalityBounds {
    variables: Box<[DomainId]>,
    cardinalities: Box<[DomainId]>,
    first_value: i32,

    delta_monitors: Box<[DeltaMonitor]>,
    /// Whether the fixed value of the variable is included in `num_fixed`.
    is_counted_as_fixed: Box<[TrailedInteger]>,
    /// Per value, the number of variables whose domain contains it.
    num_possible: Box<[TrailedInteger]>,
    /// Per value, the number of variables fixed to it.
    num_fixed: Box<[TrailedInteger]>,

    // Scratch data of the Hall interval passes, rebuilt in every round.
    intervals: Vec<HallInterval>,
    min_sorted: Vec<usize>,
    max_sorted: Vec<usize>,
    tree_links: Vec<usize>,
    capacities: Vec<i32>,
    hall: Vec<usize>,
    bounds: Vec<i32>,
    stable_interval: Vec<usize>,
    potential_stable_sets: Vec<usize>,
    new_min: Vec<usize>,
    num_bounds: usize,
    lower: PartialSum,
    upper: PartialSum,

    statistics: BoundGccStatistics,
}

const INCONSISTENT: &str = "the cardinalities cannot be met within the bounds of the variables";

fn conflict() -> Inconsistency {
    PropagatorConflict::new(INCONSISTENT).into()
}

/// Points every link on the path from `start` to `end` at `to`.
fn path_set(links: &mut [usize], start: usize, end: usize, to: usize) {
    let mut previous = start;
    while previous != end {
        let next = links[previous];
        links[previous] = to;
        previous = next;
    }
}

fn path_min(links: &[usize], mut index: usize) -> usize {
    while links[index] < index {
        index = links[index];
    }
    index
}

fn path_max(links: &[usize], mut index: usize) -> usize {
    while links[index] > index {
        index = links[index];
    }
    index
}

impl Propagator for GlobalCardinalityBounds {
    fn name(&self) -> &str {
        "GlobalCardinalityBounds"
    }

    fn priority(&self) -> Priority {
        Priority::Medium
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

impl GlobalCardinalityBounds {
    fn propagate_rounds(&mut self, context: &mut PropagationContext) -> PropagationStatusCP {
        loop {
            self.statistics.num_rounds += 1;

            self.update_counters(context);
            let mut changed = self.filter_on_counters(context)?;
            changed |= self.propagate_sum_of_cardinalities(context)?;
            if !self.variables.is_empty() {
                changed |= self.filter(context)?;
            }

            if !changed {
                return Ok(());
            }
            trace!("{}: starting another round", self.name());
        }
    }

    fn value_index(&self, value: i32) -> usize {
        (value - self.first_value) as usize
    }

    /// Processes the removals and instantiations since the previous round.
    fn update_counters(&self, context: &mut PropagationContext) {
        let last_value = self.first_value + self.cardinalities.len() as i32 - 1;

        for (index, &variable) in self.variables.iter().enumerate() {
            let delta = context.drain_delta(&self.delta_monitors[index]);
            for &(from, to) in delta.ranges() {
                for value in from.max(self.first_value)..=to.min(last_value) {
                    context.add_assign_trailed(self.num_possible[self.value_index(value)], -1);
                }
            }

            if context.read_trailed(self.is_counted_as_fixed[index]) == 0 {
                if let Some(value) = context.fixed_value(variable) {
                    context.assign_trailed(self.is_counted_as_fixed[index], 1);
                    context.add_assign_trailed(self.num_fixed[self.value_index(value)], 1);
                }
            }
        }
    }

    /// Bounds every cardinality by the counters of its value.
    ///
    /// A value which reached its maximum number of occurrences is removed from the other
    /// variables, and a value which needs every variable that can still take it is assigned to
    /// those variables. The counters may lag behind the changes made here; they are caught up in
    /// the next round.
    fn filter_on_counters(&self, context: &mut PropagationContext) -> Result<bool, Inconsistency> {
        let mut changed = false;

        for (value_index, &cardinality) in self.cardinalities.iter().enumerate() {
            let value = self.first_value + value_index as i32;
            let num_possible = context.read_trailed(self.num_possible[value_index]) as i32;
            let num_fixed = context.read_trailed(self.num_fixed[value_index]) as i32;

            changed |= context.set_upper_bound(cardinality, num_possible)?;
            changed |= context.set_lower_bound(cardinality, num_fixed)?;

            if num_fixed == num_possible {
                continue;
            }
            if num_fixed == context.upper_bound(cardinality) {
                for &variable in self.variables.iter() {
                    if context.fixed_value(variable) != Some(value) {
                        changed |= context.remove(variable, value)?;
                    }
                }
            } else if num_possible == context.lower_bound(cardinality) {
                for &variable in self.variables.iter() {
                    if !context.is_fixed(variable) && context.contains(variable, value) {
                        changed |= context.assign(variable, value)?;
                    }
                }
            }
        }

        // An interior value of an interval domain cannot be removed above, but a bound can.
        for &variable in self.variables.iter() {
            if context.is_enumerated(variable) || context.is_fixed(variable) {
                continue;
            }

            let lower_bound = context.lower_bound(variable);
            let index = self.value_index(lower_bound);
            if context.read_trailed(self.num_fixed[index])
                == context.upper_bound(self.cardinalities[index]) as i64
            {
                changed |= context.set_lower_bound(variable, lower_bound + 1)?;
            }

            let upper_bound = context.upper_bound(variable);
            let index = self.value_index(upper_bound);
            if context.read_trailed(self.num_fixed[index])
                == context.upper_bound(self.cardinalities[index]) as i64
            {
                changed |= context.set_upper_bound(variable, upper_bound - 1)?;
            }
        }

        Ok(changed)
    }

    /// Every variable takes a value of the range, so the cardinalities sum up to the number of
    /// variables.
    fn propagate_sum_of_cardinalities(
        &self,
        context: &mut PropagationContext,
    ) -> Result<bool, Inconsistency> {
        let num_variables = self.variables.len() as i32;
        let mut changed = false;

        loop {
            let sum_of_lower_bounds: i32 = self
                .cardinalities
                .iter()
                .map(|&cardinality| context.lower_bound(cardinality))
                .sum();
            let sum_of_upper_bounds: i32 = self
                .cardinalities
                .iter()
                .map(|&cardinality| context.upper_bound(cardinality))
                .sum();

            let mut round_changed = false;
            for &cardinality in self.cardinalities.iter() {
                let lower_bound = context.lower_bound(cardinality);
                let upper_bound = context.upper_bound(cardinality);
                round_changed |= context.set_upper_bound(
                    cardinality,
                    num_variables - (sum_of_lower_bounds - lower_bound),
                )?;
                round_changed |= context.set_lower_bound(
                    cardinality,
                    num_variables - (sum_of_upper_bounds - upper_bound),
                )?;
            }

            if !round_changed {
                return Ok(changed);
            }
            changed = true;
        }
    }

    fn filter(&mut self, context: &mut PropagationContext) -> Result<bool, Inconsistency> {
        self.lower.compute(
            self.cardinalities
                .iter()
                .map(|&cardinality| context.lower_bound(cardinality)),
        );
        self.upper.compute(
            self.cardinalities
                .iter()
                .map(|&cardinality| context.upper_bound(cardinality)),
        );
        self.sort_bounds(context);

        // Values which are required below the smallest lower bound or above the largest upper
        // bound cannot be taken by any variable; the passes below do not detect this.
        let smallest = self.intervals[self.min_sorted[0]].lower_bound;
        let largest = self.intervals[self.max_sorted[self.variables.len() - 1]].end - 1;
        if self.lower.sum(self.lower.min_value(), smallest - 1) > 0
            || self.lower.sum(largest + 1, self.lower.max_value()) > 0
        {
            return Err(conflict());
        }

        let mut changed = self.filter_lower_max(context)?;
        changed |= self.filter_lower_min(context)?;
        changed |= self.filter_upper_max(context)?;
        changed |= self.filter_upper_min(context)?;
        Ok(changed)
    }

    /// Sorts the variables by their bounds and ranks the distinct bounds.
    fn sort_bounds(&mut self, context: &PropagationContext) {
        for (interval, &variable) in self.intervals.iter_mut().zip(self.variables.iter()) {
            interval.lower_bound = context.lower_bound(variable);
            interval.end = context.upper_bound(variable) + 1;
        }
        let intervals = &self.intervals;
        self.min_sorted
            .sort_by_key(|&index| intervals[index].lower_bound);
        self.max_sorted.sort_by_key(|&index| intervals[index].end);

        let num_variables = self.variables.len();
        let mut min = self.intervals[self.min_sorted[0]].lower_bound;
        let mut max = self.intervals[self.max_sorted[0]].end;
        let mut last = self.lower.first_value() + 1;
        let mut num_bounds = 0;
        self.bounds[0] = last;

        let mut i = 0;
        let mut j = 0;
        loop {
            if i < num_variables && min <= max {
                if min != last {
                    num_bounds += 1;
                    last = min;
                    self.bounds[num_bounds] = min;
                }
                self.intervals[self.min_sorted[i]].min_rank = num_bounds;
                i += 1;
                if i < num_variables {
                    min = self.intervals[self.min_sorted[i]].lower_bound;
                }
            } else {
                if max != last {
                    num_bounds += 1;
                    last = max;
                    self.bounds[num_bounds] = max;
                }
                self.intervals[self.max_sorted[j]].max_rank = num_bounds;
                j += 1;
                if j == num_variables {
                    break;
                }
                max = self.intervals[self.max_sorted[j]].end;
            }
        }

        self.num_bounds = num_bounds;
        self.bounds[num_bounds + 1] = self.upper.last_value() + 1;
    }

    /// Raises lower bounds past the Hall intervals of the maximum occurrences.
    fn filter_lower_max(
        &mut self,
        context: &mut PropagationContext,
    ) -> Result<bool, Inconsistency> {
        let mut changed = false;

        for i in 1..=self.num_bounds + 1 {
            self.tree_links[i] = i - 1;
            self.hall[i] = i - 1;
            self.capacities[i] = self.upper.sum(self.bounds[i - 1], self.bounds[i] - 1);
        }

        // Increasing upper bounds.
        for i in 0..self.variables.len() {
            let variable_index = self.max_sorted[i];
            let x = self.intervals[variable_index].min_rank;
            let y = self.intervals[variable_index].max_rank;

            let mut z = path_max(&self.tree_links, x + 1);
            let j = self.tree_links[z];
            self.capacities[z] -= 1;
            if self.capacities[z] == 0 {
                self.tree_links[z] = z + 1;
                z = path_max(&self.tree_links, z + 1);
                self.tree_links[z] = j;
            }
            path_set(&mut self.tree_links, x + 1, z, z);

            let required = self.upper.sum(self.bounds[y], self.bounds[z] - 1);
            if self.capacities[z] < required {
                return Err(conflict());
            }
            if self.hall[x] > x {
                let w = path_max(&self.hall, self.hall[x]);
                changed |= context.set_lower_bound(self.variables[variable_index], self.bounds[w])?;
                path_set(&mut self.hall, x, w, w);
            }
            if self.capacities[z] == required {
                // [bounds[j], bounds[y]) is a Hall interval
                let start = self.hall[y];
                path_set(&mut self.hall, start, j - 1, y);
                self.hall[y] = j - 1;
            }
        }

        Ok(changed)
    }

    /// Lowers upper bounds below the Hall intervals of the maximum occurrences.
    fn filter_upper_max(
        &mut self,
        context: &mut PropagationContext,
    ) -> Result<bool, Inconsistency> {
        let mut changed = false;

        for i in 0..=self.num_bounds {
            self.tree_links[i] = i + 1;
            self.hall[i] = i + 1;
            self.capacities[i] = self.upper.sum(self.bounds[i], self.bounds[i + 1] - 1);
        }

        // Decreasing lower bounds.
        for i in (0..self.variables.len()).rev() {
            let variable_index = self.min_sorted[i];
            let x = self.intervals[variable_index].max_rank;
            let y = self.intervals[variable_index].min_rank;

            let mut z = path_min(&self.tree_links, x - 1);
            let j = self.tree_links[z];
            self.capacities[z] -= 1;
            if self.capacities[z] == 0 {
                self.tree_links[z] = z - 1;
                z = path_min(&self.tree_links, z - 1);
                self.tree_links[z] = j;
            }
            path_set(&mut self.tree_links, x - 1, z, z);

            let required = self.upper.sum(self.bounds[z], self.bounds[y] - 1);
            if self.capacities[z] < required {
                return Err(conflict());
            }
            if self.hall[x] < x {
                let w = path_min(&self.hall, self.hall[x]);
                changed |=
                    context.set_upper_bound(self.variables[variable_index], self.bounds[w] - 1)?;
                path_set(&mut self.hall, x, w, w);
            }
            if self.capacities[z] == required {
                let start = self.hall[y];
                path_set(&mut self.hall, start, j + 1, y);
                self.hall[y] = j + 1;
            }
        }

        Ok(changed)
    }

    /// Raises lower bounds for the minimum occurrences, skipping the variables which lie in a
    /// stable set.
    fn filter_lower_min(
        &mut self,
        context: &mut PropagationContext,
    ) -> Result<bool, Inconsistency> {
        let num_bounds = self.num_bounds;
        let mut changed = false;

        // Between two bounds without required occurrences lies an unstable set.
        let mut w = num_bounds + 1;
        for i in (1..=num_bounds + 1).rev() {
            self.potential_stable_sets[i] = i - 1;
            self.stable_interval[i] = i - 1;
            self.capacities[i] = self.lower.sum(self.bounds[i - 1], self.bounds[i] - 1);
            if self.capacities[i] == 0 {
                self.hall[i - 1] = w;
            } else {
                self.hall[w] = i - 1;
                w = i - 1;
            }
        }

        // Breakpoint 0 stands for the padding below the range, which always has capacity.
        w = num_bounds + 1;
        for i in (0..=num_bounds + 1).rev() {
            if i > 0 && self.capacities[i] == 0 {
                self.tree_links[i] = w;
            } else {
                self.tree_links[w] = i;
                w = i;
            }
        }

        // Increasing upper bounds.
        for i in 0..self.variables.len() {
            let variable_index = self.max_sorted[i];
            let x = self.intervals[variable_index].min_rank;
            let mut y = self.intervals[variable_index].max_rank;

            let mut z = path_max(&self.tree_links, x + 1);
            let j = self.tree_links[z];
            if z != x + 1 {
                // [bounds[x], bounds[z]) is part of the stable set which contains bounds[z] - 1
                let w = path_max(&self.potential_stable_sets, x + 1);
                let v = self.potential_stable_sets[w];
                path_set(&mut self.potential_stable_sets, x + 1, w, w);
                let w = y.min(z);
                let start = self.potential_stable_sets[w];
                path_set(&mut self.potential_stable_sets, start, v, w);
                self.potential_stable_sets[w] = v;
            }

            let required = self.lower.sum(self.bounds[y], self.bounds[z] - 1);
            if self.capacities[z] <= required {
                // (potential_stable_sets[y], y] is a stable set
                let start = self.potential_stable_sets[y];
                let w = path_max(&self.stable_interval, start);
                path_set(&mut self.stable_interval, start, w, w);
                let v = self.stable_interval[w];
                let start = self.stable_interval[y];
                path_set(&mut self.stable_interval, start, v, y);
                self.stable_interval[y] = v;
            } else {
                self.capacities[z] -= 1;
                if self.capacities[z] == 0 {
                    self.tree_links[z] = z + 1;
                    z = path_max(&self.tree_links, z + 1);
                    self.tree_links[z] = j;
                }

                if self.hall[x] > x {
                    let w = path_max(&self.hall, x);
                    self.new_min[i] = w;
                    path_set(&mut self.hall, x, w, w);
                } else {
                    self.new_min[i] = x;
                }

                if self.capacities[z] == self.lower.sum(self.bounds[y], self.bounds[z] - 1) {
                    // a new unstable set
                    if self.hall[y] > y {
                        y = self.hall[y];
                    }
                    let start = self.hall[y];
                    path_set(&mut self.hall, start, j - 1, y);
                    self.hall[y] = j - 1;
                }
            }
            path_set(&mut self.tree_links, x + 1, z, z);
        }

        // A failure set remains.
        if self.hall[num_bounds] != 0 {
            return Err(conflict());
        }

        w = num_bounds + 1;
        for i in (1..=num_bounds + 1).rev() {
            if self.stable_interval[i] > i {
                self.stable_interval[i] = w;
            } else {
                w = i;
            }
        }

        for i in (0..self.variables.len()).rev() {
            let variable_index = self.max_sorted[i];
            let x = self.intervals[variable_index].min_rank;
            let y = self.intervals[variable_index].max_rank;
            if self.stable_interval[x] <= x || y > self.stable_interval[x] {
                let new_lower_bound = self
                    .lower
                    .skip_non_null_elements_right(self.bounds[self.new_min[i]]);
                changed |=
                    context.set_lower_bound(self.variables[variable_index], new_lower_bound)?;
            }
        }

        Ok(changed)
    }

    /// Lowers upper bounds for the minimum occurrences; relies on the stable sets found by
    /// [`GlobalCardinalityBounds::filter_lower_min`].
    fn filter_upper_min(
        &mut self,
        context: &mut PropagationContext,
    ) -> Result<bool, Inconsistency> {
        let num_bounds = self.num_bounds;
        let mut changed = false;

        let mut w = 0;
        for i in 0..=num_bounds {
            self.capacities[i] = self.lower.sum(self.bounds[i], self.bounds[i + 1] - 1);
            if self.capacities[i] == 0 {
                self.tree_links[i] = w;
            } else {
                self.tree_links[w] = i;
                w = i;
            }
        }
        self.tree_links[w] = num_bounds + 1;

        w = 0;
        for i in 1..=num_bounds {
            if self.capacities[i - 1] == 0 {
                self.hall[i] = w;
            } else {
                self.hall[w] = i;
                w = i;
            }
        }
        self.hall[w] = num_bounds + 1;

        // Decreasing lower bounds.
        for i in (0..self.variables.len()).rev() {
            let variable_index = self.min_sorted[i];
            let x = self.intervals[variable_index].max_rank;
            let mut y = self.intervals[variable_index].min_rank;

            let mut z = path_min(&self.tree_links, x - 1);
            let j = self.tree_links[z];

            if self.capacities[z] > self.lower.sum(self.bounds[z], self.bounds[y] - 1) {
                self.capacities[z] -= 1;
                if self.capacities[z] == 0 {
                    self.tree_links[z] = z - 1;
                    z = path_min(&self.tree_links, z - 1);
                    self.tree_links[z] = j;
                }

                if self.hall[x] < x {
                    let w = path_min(&self.hall, self.hall[x]);
                    self.new_min[i] = w;
                    path_set(&mut self.hall, x, w, w);
                } else {
                    self.new_min[i] = x;
                }

                if self.capacities[z] == self.lower.sum(self.bounds[z], self.bounds[y] - 1) {
                    if self.hall[y] < y {
                        y = self.hall[y];
                    }
                    let start = self.hall[y];
                    path_set(&mut self.hall, start, j + 1, y);
                    self.hall[y] = j + 1;
                }
            }
            path_set(&mut self.tree_links, x - 1, z, z);
        }

        for i in (0..self.variables.len()).rev() {
            let variable_index = self.min_sorted[i];
            let x = self.intervals[variable_index].min_rank;
            let y = self.intervals[variable_index].max_rank;
            if self.stable_interval[x] <= x || y > self.stable_interval[x] {
                let new_upper_bound = self
                    .lower
                    .skip_non_null_elements_left(self.bounds[self.new_min[i]] - 1);
                changed |=
                    context.set_upper_bound(self.variables[variable_index], new_upper_bound)?;
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

    fn post(
        solver: &mut TestSolver,
        variables: &[DomainId],
        first_value: i32,
        cardinalities: &[DomainId],
    ) -> Result<(), crate::engine::Conflict> {
        solver
            .new_propagator(GlobalCardinalityBoundsArgs {
                variables: variables.into(),
                first_value,
                cardinalities: cardinalities.into(),
            })
            .map(|_| ())
    }

    #[test]
    fn all_different_through_cardinalities_has_every_permutation() {
        let mut solver = TestSolver::default();
        let variables = (0..3)
            .map(|_| solver.new_sparse_variable(vec![1, 2, 3]))
            .collect::<Vec<_>>();
        let cardinalities = (0..3).map(|_| solver.new_variable(0, 1)).collect::<Vec<_>>();
        post(&mut solver, &variables, 1, &cardinalities).expect("no conflict");

        let solutions = solver.solutions(&variables);
        let expected = brute_force_solutions(&vec![vec![1, 2, 3]; 3], |values| {
            values[0] != values[1] && values[0] != values[2] && values[1] != values[2]
        });
        assert_eq!(6, solutions.len());
        assert_eq!(expected, solutions);
    }

    #[test]
    fn fixed_cardinalities_settle_before_search() {
        let mut solver = TestSolver::default();
        let variables = (0..3)
            .map(|_| solver.new_variable(0, 2))
            .collect::<Vec<_>>();
        let cardinalities = vec![
            solver.new_variable(2, 2),
            solver.new_variable(0, 1),
            solver.new_variable(1, 2),
        ];
        post(&mut solver, &variables, 0, &cardinalities).expect("no conflict");

        solver.assert_bounds(cardinalities[0], 2, 2);
        solver.assert_bounds(cardinalities[1], 0, 0);
        solver.assert_bounds(cardinalities[2], 1, 1);

        let solutions = solver.solutions(&variables);
        assert_eq!(
            vec![vec![0, 0, 2], vec![0, 2, 0], vec![2, 0, 0]],
            solutions
        );
    }

    #[test]
    fn value_without_occurrences_is_removed_from_enumerated_domains() {
        let mut solver = TestSolver::default();
        let variables = (0..3)
            .map(|_| solver.new_sparse_variable(vec![0, 1, 2]))
            .collect::<Vec<_>>();
        let cardinalities = vec![
            solver.new_variable(2, 2),
            solver.new_variable(0, 1),
            solver.new_variable(1, 2),
        ];
        post(&mut solver, &variables, 0, &cardinalities).expect("no conflict");

        for &variable in &variables {
            assert_eq!(vec![0, 2], solver.domain(variable));
        }
    }

    #[test]
    fn hall_interval_pushes_lower_bound() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(1, 2);
        let y = solver.new_variable(1, 2);
        let z = solver.new_variable(1, 3);
        let cardinalities = (0..3).map(|_| solver.new_variable(0, 1)).collect::<Vec<_>>();
        post(&mut solver, &[x, y, z], 1, &cardinalities).expect("no conflict");

        solver.assert_bounds(z, 3, 3);
        solver.assert_bounds(cardinalities[2], 1, 1);
    }

    #[test]
    fn too_many_fixed_occurrences_is_a_conflict() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(1, 1);
        let y = solver.new_variable(1, 1);
        let cardinalities = vec![solver.new_variable(0, 1), solver.new_variable(0, 2)];

        let _ = post(&mut solver, &[x, y], 1, &cardinalities)
            .expect_err("value 1 occurs twice but at most once is allowed");
    }

    #[test]
    fn required_value_which_no_variable_can_take_is_a_conflict() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(1, 2);
        let y = solver.new_variable(1, 2);
        let cardinalities = vec![
            solver.new_variable(0, 2),
            solver.new_variable(0, 2),
            solver.new_variable(1, 2),
        ];

        let _ = post(&mut solver, &[x, y], 1, &cardinalities)
            .expect_err("value 3 is required but out of reach");
    }

    #[test]
    fn counters_follow_backtracking() {
        let mut solver = TestSolver::default();
        let variables = (0..3)
            .map(|_| solver.new_sparse_variable(vec![1, 2]))
            .collect::<Vec<_>>();
        let cardinalities = vec![solver.new_variable(0, 2), solver.new_variable(0, 3)];
        post(&mut solver, &variables, 1, &cardinalities).expect("no conflict");

        solver.new_checkpoint();
        let _ = solver.assign(variables[0], 1).expect("non-empty");
        let _ = solver.assign(variables[1], 1).expect("non-empty");
        solver.propagate().expect("no conflict");
        assert_eq!(Some(2), solver.fixed_value(variables[2]));

        solver.restore_to(0);
        solver.new_checkpoint();
        let _ = solver.assign(variables[0], 1).expect("non-empty");
        solver.propagate().expect("no conflict");
        assert_eq!(vec![1, 2], solver.domain(variables[1]));
        assert_eq!(vec![1, 2], solver.domain(variables[2]));
    }

    #[test]
    fn every_solution_is_kept_and_only_solutions_survive() {
        let domains = [
            vec![vec![0, 1, 2], vec![0, 2], vec![1, 2], vec![0, 1, 2]],
            vec![vec![0, 1], vec![0, 1], vec![1, 2], vec![2, 3]],
            vec![vec![1, 3], vec![0, 1, 2, 3], vec![0, 3], vec![2]],
        ];
        let cardinality_bounds = [
            vec![(1, 2), (0, 1), (1, 3)],
            vec![(0, 1), (1, 2), (0, 2), (1, 1)],
            vec![(0, 1), (1, 1), (1, 2), (0, 2)],
        ];

        for (domains, cardinality_bounds) in domains.iter().zip(cardinality_bounds.iter()) {
            let mut solver = TestSolver::default();
            let variables = domains
                .iter()
                .map(|values| solver.new_sparse_variable(values.clone()))
                .collect::<Vec<_>>();
            let cardinalities = cardinality_bounds
                .iter()
                .map(|&(low, up)| solver.new_variable(low, up))
                .collect::<Vec<_>>();

            let expected = brute_force_solutions(domains, |values| {
                cardinality_bounds
                    .iter()
                    .enumerate()
                    .all(|(value, &(low, up))| {
                        let count =
                            values.iter().filter(|&&v| v == value as i32).count() as i32;
                        low <= count && count <= up
                    })
            });

            let solutions = match post(&mut solver, &variables, 0, &cardinalities) {
                Ok(()) => solver.solutions(&variables),
                Err(_) => vec![],
            };
            assert_eq!(expected, solutions);
        }
    }
}
