use log::trace;

use crate::basic_types::Inconsistency;
use crate::basic_types::PropagationStatusCP;
use crate::basic_types::PropagatorConflict;
use crate::containers::HashMap;
use crate::create_statistics_struct;
use crate::engine::variables::DomainId;
use crate::gourd_assert_moderate;
use crate::gourd_assert_simple;
use crate::graph::strongly_connected_components;
use crate::graph::DirectedGraph;
use crate::graph::DirectedGraphAccess;
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

create_statistics_struct!(ArcGccStatistics {
    num_calls: usize,
    num_rounds: usize,
    num_augmenting_paths: usize,
    num_conflicts: usize,
});

/// The [`PropagatorConstructor`] for the [`GlobalCardinalityArc`] propagator.
///
/// The number of variables taking `values[i]` lies within the bounds of `cardinalities[i]`. The
/// values must be distinct; values which are not listed may occur any number of times.
#[derive(Clone, Debug)]
pub struct GlobalCardinalityArcArgs {
    pub variables: Box<[DomainId]>,
    pub values: Box<[i32]>,
    pub cardinalities: Box<[DomainId]>,
}

impl PropagatorConstructor for GlobalCardinalityArcArgs {
    type PropagatorImpl = GlobalCardinalityArc;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let GlobalCardinalityArcArgs {
            variables,
            values,
            cardinalities,
        } = self;
        gourd_assert_simple!(
            values.len() == cardinalities.len(),
            "every listed value has a cardinality"
        );

        let num_variables = variables.len();
        let mut value_nodes = HashMap::default();
        let mut interval_variables = vec![];

        for (index, &variable) in variables.iter().enumerate() {
            context.register(variable, DomainEvents::ANY_INT, LocalId::from(index as u32));
            if !context.is_enumerated(variable) {
                interval_variables.push(index);
            }
            for value in context.iterate_domain(variable) {
                add_value_node(&mut value_nodes, num_variables, value);
            }
        }
        for &value in values.iter() {
            add_value_node(&mut value_nodes, num_variables, value);
        }

        let cardinality_nodes = values
            .iter()
            .map(|value| value_nodes[value])
            .collect::<Box<[_]>>();
        gourd_assert_simple!(
            {
                let mut sorted = cardinality_nodes.to_vec();
                sorted.sort();
                sorted.windows(2).all(|pair| pair[0] != pair[1])
            },
            "the values of a gcc are distinct"
        );
        for (index, &cardinality) in cardinalities.iter().enumerate() {
            context.register(
                cardinality,
                DomainEvents::BOUNDS,
                LocalId::from((num_variables + index) as u32),
            );
        }

        let num_nodes = num_variables + value_nodes.len();
        // A variable is matched to exactly one value; an unlisted value may take any number of
        // variables.
        let mut lower_capacity = vec![0; num_nodes];
        let mut upper_capacity = vec![num_variables as i32; num_nodes];
        lower_capacity[..num_variables].fill(1);
        upper_capacity[..num_variables].fill(1);

        GlobalCardinalityArc {
            variables,
            cardinalities,
            cardinality_nodes,
            value_nodes,
            interval_variables: interval_variables.into(),
            graph: DirectedGraph::new(num_nodes + 1),
            flow: vec![0; num_nodes],
            lower_capacity,
            upper_capacity,
            path_search: PathSearch {
                parent: vec![0; num_nodes],
                visited: vec![false; num_nodes],
                queue: Vec::with_capacity(num_nodes),
            },
            statistics: ArcGccStatistics::default(),
        }
    }
}

/// Value nodes are numbered after the variable nodes, in order of first appearance.
fn add_value_node(value_nodes: &mut HashMap<i32, usize>, num_variables: usize, value: i32) {
    let next_node = num_variables + value_nodes.len();
    let _ = value_nodes.entry(value).or_insert(next_node);
}

/// Arc consistency on the variables of the global cardinality constraint through a feasible flow
/// in the variable-value graph \[1\].
///
/// The graph has a node for every variable and one for every value in the initial domains or in
/// the list of constrained values. An arc `value -> variable` means the variable is matched to
/// the value; an arc `variable -> value` means it could take the value instead. A variable has one
/// unit of flow and a value between the bounds of its cardinality. After a flow satisfying the
/// lower bounds is found, a sink node closes the residual graph, and every arc which does not lie
/// within one strongly connected component and is not in the flow belongs to no solution.
///
/// The flow is not kept between calls; every round rebuilds it from the domains. The
/// cardinalities are only bounded by the degrees of their values, which is weaker than arc
/// consistency on them.
///
/// # Bibliography
/// \[1\] J.-C. Régin, ‘Generalized arc consistency for global cardinality constraint’, in
/// Proceedings of the Thirteenth National Conference on Artificial Intelligence (AAAI-96),
/// pp. 209–215, 1996.
#[derive(Clone, Debug)]
pub struct GlobalCardinalityArc {
    variables: Box<[DomainId]>,
    cardinalities: Box<[DomainId]>,
    /// The value node of every cardinality.
    cardinality_nodes: Box<[usize]>,
    value_nodes: HashMap<i32, usize>,
    /// The variables whose domain cannot represent holes.
    interval_variables: Box<[usize]>,

    /// Variable nodes come first, then value nodes, then the sink.
    graph: DirectedGraph,
    flow: Vec<i32>,
    lower_capacity: Vec<i32>,
    upper_capacity: Vec<i32>,

    path_search: PathSearch,

    statistics: ArcGccStatistics,
}

impl Propagator for GlobalCardinalityArc {
    fn name(&self) -> &str {
        "GlobalCardinalityArc"
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

impl GlobalCardinalityArc {
    fn num_variables(&self) -> usize {
        self.variables.len()
    }

    fn num_nodes(&self) -> usize {
        self.flow.len()
    }

    fn sink(&self) -> usize {
        self.num_nodes()
    }

    fn value_node(&self, value: i32) -> usize {
        *self
            .value_nodes
            .get(&value)
            .expect("domains only contain values which were present at creation")
    }

    fn propagate_rounds(&mut self, context: &mut PropagationContext) -> PropagationStatusCP {
        loop {
            self.statistics.num_rounds += 1;

            for (&node, &cardinality) in self
                .cardinality_nodes
                .iter()
                .zip(self.cardinalities.iter())
            {
                self.lower_capacity[node] = context.lower_bound(cardinality);
                self.upper_capacity[node] = context.upper_bound(cardinality);
            }

            self.build_graph(context)?;
            self.repair_flow()?;
            if !self.filter(context)? {
                return Ok(());
            }
            trace!("{}: starting another round", self.name());
        }
    }

    /// Builds the graph of the current domains. Fixed variables are matched to their value, the
    /// other variables are left unmatched.
    fn build_graph(&mut self, context: &PropagationContext) -> PropagationStatusCP {
        self.graph.clear();
        self.flow.fill(0);

        for (index, &variable) in self.variables.iter().enumerate() {
            if let Some(value) = context.fixed_value(variable) {
                let node = self.value_node(value);
                if self.flow[node] == self.upper_capacity[node] {
                    return Err(PropagatorConflict::new(
                        "more variables are fixed to a value than its cardinality allows",
                    )
                    .into());
                }
                let _ = self.graph.add_arc(node, index);
                self.flow[node] += 1;
                self.flow[index] += 1;
            } else {
                for value in context.iterate_domain(variable) {
                    let node = self.value_node(value);
                    let _ = self.graph.add_arc(index, node);
                }
            }
        }

        Ok(())
    }

    /// Extends the flow until every variable is matched and every value meets its lower bound.
    fn repair_flow(&mut self) -> PropagationStatusCP {
        for index in 0..self.num_variables() {
            if self.flow[index] == 0 {
                self.match_variable(index)?;
            }
        }
        for node in self.num_variables()..self.num_nodes() {
            while self.flow[node] < self.lower_capacity[node] {
                self.draw_to_value(node)?;
            }
        }
        Ok(())
    }

    /// Matches an unmatched variable along an augmenting path to a value with spare capacity.
    fn match_variable(&mut self, variable_node: usize) -> PropagationStatusCP {
        let Some(end) = self.path_search.search(&self.graph, variable_node, true, |node| {
            self.flow[node] < self.upper_capacity[node]
        }) else {
            return Err(PropagatorConflict::new("a variable cannot be matched to any value").into());
        };
        gourd_assert_moderate!(end >= self.num_variables(), "only values have spare capacity");

        self.statistics.num_augmenting_paths += 1;
        self.flow[end] += 1;
        self.flow[variable_node] += 1;
        let mut node = end;
        while node != variable_node {
            let parent = self.path_search.parent[node];
            let _ = self.graph.remove_arc(parent, node);
            let _ = self.graph.add_arc(node, parent);
            node = parent;
        }
        Ok(())
    }

    /// Moves a variable to the value `value_node` from a value which has flow above its lower
    /// bound, shifting other variables along the way.
    fn draw_to_value(&mut self, value_node: usize) -> PropagationStatusCP {
        let Some(end) = self.path_search.search(&self.graph, value_node, false, |node| {
            self.flow[node] > self.lower_capacity[node]
        }) else {
            return Err(PropagatorConflict::new(
                "not enough variables can take a value to meet its cardinality",
            )
            .into());
        };

        self.statistics.num_augmenting_paths += 1;
        self.flow[end] -= 1;
        self.flow[value_node] += 1;
        let mut node = end;
        while node != value_node {
            let parent = self.path_search.parent[node];
            let _ = self.graph.remove_arc(node, parent);
            let _ = self.graph.add_arc(parent, node);
            node = parent;
        }
        Ok(())
    }

    /// Removes the values which are not part of any flow and bounds the cardinalities. Returns
    /// whether a domain changed.
    fn filter(&mut self, context: &mut PropagationContext) -> Result<bool, Inconsistency> {
        let sink = self.sink();
        for node in self.num_variables()..self.num_nodes() {
            if self.flow[node] < self.upper_capacity[node] {
                let _ = self.graph.add_arc(node, sink);
            }
            if self.flow[node] > self.lower_capacity[node] {
                let _ = self.graph.add_arc(sink, node);
            }
        }
        let components = strongly_connected_components(&self.graph);
        self.graph.isolate(sink);

        let mut changed = false;
        for (index, &variable) in self.variables.iter().enumerate() {
            if context.is_fixed(variable) {
                continue;
            }

            let values = context.iterate_domain(variable).collect::<Vec<_>>();
            for value in values {
                let node = self.value_node(value);
                if components[index] == components[node] {
                    continue;
                }

                if self.graph.contains_arc(node, index) {
                    // The matched value is the only support of the variable.
                    changed |= context.assign(variable, value)?;
                    self.graph.remove_successors(index);
                    break;
                }
                changed |= context.remove(variable, value)?;
                let _ = self.graph.remove_arc(index, node);
            }
        }

        // Unsupported interior values of interval domains stay, but the bounds move to the first
        // supported values.
        for &index in self.interval_variables.iter() {
            let variable = self.variables[index];

            let mut lower_bound = context.lower_bound(variable);
            let upper_bound = context.upper_bound(variable);
            while lower_bound < upper_bound && !self.is_supported(index, lower_bound) {
                lower_bound += 1;
            }
            changed |= context.set_lower_bound(variable, lower_bound)?;

            let mut upper_bound = upper_bound;
            while upper_bound > lower_bound && !self.is_supported(index, upper_bound) {
                upper_bound -= 1;
            }
            changed |= context.set_upper_bound(variable, upper_bound)?;
        }

        for (&node, &cardinality) in self.cardinality_nodes.iter().zip(self.cardinalities.iter()) {
            let num_possible = self.graph.out_degree(node) + self.graph.in_degree(node);
            changed |= context.set_upper_bound(cardinality, num_possible as i32)?;

            let num_fixed = self
                .graph
                .successor_slice(node)
                .iter()
                .filter(|&&index| context.is_fixed(self.variables[index]))
                .count();
            changed |= context.set_lower_bound(cardinality, num_fixed as i32)?;
        }

        Ok(changed)
    }

    fn is_supported(&self, variable_node: usize, value: i32) -> bool {
        self.value_nodes.get(&value).is_some_and(|&node| {
            self.graph.contains_arc(variable_node, node)
                || self.graph.contains_arc(node, variable_node)
        })
    }
}

/// Breadth-first search state for the augmenting paths.
#[derive(Clone, Debug)]
struct PathSearch {
    parent: Vec<usize>,
    visited: Vec<bool>,
    queue: Vec<usize>,
}

impl PathSearch {
    /// Breadth-first search from `root` along the successors (or the predecessors) for a node
    /// other than the root which satisfies `is_end`. The path is recorded in `parent`.
    fn search(
        &mut self,
        graph: &DirectedGraph,
        root: usize,
        forward: bool,
        is_end: impl Fn(usize) -> bool,
    ) -> Option<usize> {
        self.visited.fill(false);
        self.queue.clear();
        self.queue.push(root);
        self.visited[root] = true;

        let mut head = 0;
        while head < self.queue.len() {
            let node = self.queue[head];
            head += 1;

            let neighbours = if forward {
                graph.successor_slice(node)
            } else {
                graph.predecessor_slice(node)
            };
            for &neighbour in neighbours {
                if self.visited[neighbour] {
                    continue;
                }
                self.parent[neighbour] = node;
                self.visited[neighbour] = true;
                if is_end(neighbour) {
                    return Some(neighbour);
                }
                self.queue.push(neighbour);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_solver::brute_force_solutions;
    use crate::engine::test_solver::TestSolver;
    use crate::engine::Conflict;

    fn post(
        solver: &mut TestSolver,
        variables: &[DomainId],
        values: &[i32],
        cardinalities: &[DomainId],
    ) -> Result<(), Conflict> {
        solver
            .new_propagator(GlobalCardinalityArcArgs {
                variables: variables.into(),
                values: values.into(),
                cardinalities: cardinalities.into(),
            })
            .map(|_| ())
    }

    #[test]
    fn two_variables_sharing_two_values_are_not_pruned() {
        let mut solver = TestSolver::default();
        let x = solver.new_sparse_variable(vec![1, 2]);
        let y = solver.new_sparse_variable(vec![1, 2]);
        let cardinalities = vec![solver.new_variable(0, 1), solver.new_variable(0, 1)];

        post(&mut solver, &[x, y], &[1, 2], &cardinalities).expect("no conflict");

        assert_eq!(vec![1, 2], solver.domain(x));
        assert_eq!(vec![1, 2], solver.domain(y));
        solver.assert_bounds(cardinalities[0], 0, 1);
        solver.assert_bounds(cardinalities[1], 0, 1);
    }

    #[test]
    fn third_variable_on_two_values_is_a_conflict() {
        let mut solver = TestSolver::default();
        let variables = (0..3)
            .map(|_| solver.new_sparse_variable(vec![1, 2]))
            .collect::<Vec<_>>();
        let cardinalities = vec![solver.new_variable(0, 1), solver.new_variable(0, 1)];

        let _ = post(&mut solver, &variables, &[1, 2], &cardinalities)
            .expect_err("three variables cannot share two values taken at most once");
    }

    #[test]
    fn values_outside_every_matching_are_removed() {
        let mut solver = TestSolver::default();
        let x = solver.new_sparse_variable(vec![1, 2]);
        let y = solver.new_sparse_variable(vec![1, 2]);
        let z = solver.new_sparse_variable(vec![1, 2, 3]);
        let cardinalities = (0..3).map(|_| solver.new_variable(0, 1)).collect::<Vec<_>>();

        post(&mut solver, &[x, y, z], &[1, 2, 3], &cardinalities).expect("no conflict");

        assert_eq!(Some(3), solver.fixed_value(z));
        solver.assert_bounds(cardinalities[2], 1, 1);
    }

    #[test]
    fn lower_bound_forces_variables_onto_a_value() {
        let mut solver = TestSolver::default();
        let variables = (0..3)
            .map(|_| solver.new_sparse_variable(vec![1, 2, 4]))
            .collect::<Vec<_>>();
        let cardinalities = vec![solver.new_variable(0, 0), solver.new_variable(2, 3)];

        post(&mut solver, &variables, &[1, 2], &cardinalities).expect("no conflict");

        for &variable in &variables {
            assert_eq!(vec![2, 4], solver.domain(variable));
        }
        solver.assert_bounds(cardinalities[1], 2, 3);
    }

    #[test]
    fn unlisted_values_are_unconstrained() {
        let mut solver = TestSolver::default();
        let variables = (0..3)
            .map(|_| solver.new_sparse_variable(vec![5, 7]))
            .collect::<Vec<_>>();
        let cardinality = solver.new_variable(0, 0);

        post(&mut solver, &variables, &[7], &[cardinality]).expect("no conflict");

        for &variable in &variables {
            assert_eq!(Some(5), solver.fixed_value(variable));
        }
    }

    #[test]
    fn listed_value_outside_the_domains_needs_no_occurrences() {
        let mut solver = TestSolver::default();
        let x = solver.new_sparse_variable(vec![1, 2]);
        let cardinality = solver.new_variable(1, 1);

        let _ = post(&mut solver, &[x], &[9], &[cardinality])
            .expect_err("value 9 must occur once but no variable can take it");
    }

    #[test]
    fn interval_domains_shrink_at_their_bounds() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(1, 1);
        let y = solver.new_variable(1, 3);
        let cardinalities = vec![solver.new_variable(0, 1), solver.new_variable(0, 0)];

        post(&mut solver, &[x, y], &[1, 3], &cardinalities).expect("no conflict");

        solver.assert_bounds(y, 2, 2);
    }

    #[test]
    fn too_many_fixed_variables_is_a_conflict() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(4, 4);
        let y = solver.new_variable(4, 4);
        let cardinality = solver.new_variable(0, 1);

        let _ = post(&mut solver, &[x, y], &[4], &[cardinality])
            .expect_err("value 4 is taken twice but allowed once");
    }

    #[test]
    fn flow_is_rebuilt_after_backtracking() {
        let mut solver = TestSolver::default();
        let variables = (0..3)
            .map(|_| solver.new_sparse_variable(vec![1, 2, 3]))
            .collect::<Vec<_>>();
        let cardinalities = (0..3).map(|_| solver.new_variable(1, 1)).collect::<Vec<_>>();
        post(&mut solver, &variables, &[1, 2, 3], &cardinalities).expect("no conflict");

        solver.new_checkpoint();
        let _ = solver.assign(variables[0], 2).expect("non-empty");
        solver.propagate().expect("no conflict");
        assert_eq!(vec![1, 3], solver.domain(variables[1]));

        solver.restore_to(0);
        solver.new_checkpoint();
        let _ = solver.remove(variables[0], 1).expect("non-empty");
        let _ = solver.remove(variables[1], 1).expect("non-empty");
        solver.propagate().expect("no conflict");
        assert_eq!(Some(1), solver.fixed_value(variables[2]));
        assert_eq!(vec![2, 3], solver.domain(variables[0]));
    }

    #[test]
    fn solutions_match_brute_force() {
        let domains = [
            vec![vec![0, 1, 2], vec![0, 2], vec![1, 2], vec![0, 1, 2]],
            vec![vec![0, 1, 5], vec![0, 1], vec![1, 5], vec![1, 3]],
            vec![vec![1, 3], vec![0, 1, 2, 3], vec![0, 3], vec![2, 3], vec![0, 2]],
        ];
        let values = [vec![0, 1, 2], vec![0, 1, 3], vec![0, 1, 2, 3]];
        let cardinality_bounds = [
            vec![(1, 2), (0, 1), (1, 3)],
            vec![(0, 1), (1, 2), (0, 0)],
            vec![(0, 1), (1, 1), (1, 2), (0, 2)],
        ];

        for ((domains, values), cardinality_bounds) in domains
            .iter()
            .zip(values.iter())
            .zip(cardinality_bounds.iter())
        {
            let mut solver = TestSolver::default();
            let variables = domains
                .iter()
                .map(|domain| solver.new_sparse_variable(domain.clone()))
                .collect::<Vec<_>>();
            let cardinalities = cardinality_bounds
                .iter()
                .map(|&(low, up)| solver.new_variable(low, up))
                .collect::<Vec<_>>();

            let expected = brute_force_solutions(domains, |assignment| {
                values
                    .iter()
                    .zip(cardinality_bounds.iter())
                    .all(|(&value, &(low, up))| {
                        let count = assignment.iter().filter(|&&v| v == value).count() as i32;
                        low <= count && count <= up
                    })
            });

            let solutions = match post(&mut solver, &variables, values, &cardinalities) {
                Ok(()) => solver.solutions(&variables),
                Err(_) => vec![],
            };
            assert_eq!(expected, solutions);
        }
    }
}
