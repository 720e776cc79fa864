//! This module exposes helpers that aid testing of propagators. The [`TestSolver`] allows setting
//! up specific scenarios under which to test the various operations of a propagator, and
//! enumerates the solutions of small models by depth-first search.
use std::ops::Deref;
use std::ops::DerefMut;

use super::variables::DomainId;
use super::Conflict;
use super::State;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorHandle;

/// A [`State`] with shortcuts for writing propagator tests.
#[derive(Debug, Default)]
pub(crate) struct TestSolver {
    state: State,
}

impl Deref for TestSolver {
    type Target = State;

    fn deref(&self) -> &State {
        &self.state
    }
}

impl DerefMut for TestSolver {
    fn deref_mut(&mut self) -> &mut State {
        &mut self.state
    }
}

impl TestSolver {
    pub(crate) fn new_variable(&mut self, lower_bound: i32, upper_bound: i32) -> DomainId {
        self.state
            .new_interval_variable(lower_bound, upper_bound, None)
    }

    pub(crate) fn new_sparse_variable(&mut self, values: Vec<i32>) -> DomainId {
        self.state.new_sparse_variable(values, None)
    }

    /// Adds the propagator and propagates to a fixpoint.
    pub(crate) fn new_propagator<Constructor>(
        &mut self,
        constructor: Constructor,
    ) -> Result<PropagatorHandle<Constructor::PropagatorImpl>, Conflict>
    where
        Constructor: PropagatorConstructor,
        Constructor::PropagatorImpl: 'static,
    {
        let handle = self.state.add_propagator(constructor);
        self.state.propagate_to_fixed_point()?;
        Ok(handle)
    }

    pub(crate) fn propagate(&mut self) -> Result<(), Conflict> {
        self.state.propagate_to_fixed_point()
    }

    pub(crate) fn assert_bounds(&self, var: DomainId, lower_bound: i32, upper_bound: i32) {
        let actual_lower_bound = self.state.lower_bound(var);
        let actual_upper_bound = self.state.upper_bound(var);

        assert_eq!(
            (lower_bound, upper_bound),
            (actual_lower_bound, actual_upper_bound),
            "The expected bounds [{lower_bound}..{upper_bound}] did not match the actual bounds [{actual_lower_bound}..{actual_upper_bound}]"
        );
    }

    pub(crate) fn domain(&self, var: DomainId) -> Vec<i32> {
        self.state.iterate_domain(var).collect()
    }

    /// Enumerates every assignment of `vars` which survives propagation, by branching on the
    /// values of the first unfixed variable and restoring after every branch.
    ///
    /// The solutions are returned in lexicographic order. Every decision is undone afterwards.
    pub(crate) fn solutions(&mut self, vars: &[DomainId]) -> Vec<Vec<i32>> {
        let mut solutions = vec![];
        if self.state.propagate_to_fixed_point().is_ok() {
            self.collect_solutions(vars, &mut solutions);
        }
        solutions
    }

    fn collect_solutions(&mut self, vars: &[DomainId], solutions: &mut Vec<Vec<i32>>) {
        let Some(&var) = vars.iter().find(|&&var| !self.state.is_fixed(var)) else {
            solutions.push(
                vars.iter()
                    .map(|&var| self.state.lower_bound(var))
                    .collect(),
            );
            return;
        };

        let checkpoint = self.state.get_checkpoint();
        for value in self.domain(var) {
            self.state.new_checkpoint();
            if self.state.assign(var, value).is_ok()
                && self.state.propagate_to_fixed_point().is_ok()
            {
                self.collect_solutions(vars, solutions);
            }
            self.state.restore_to(checkpoint);
        }
    }
}

/// All assignments of `domains` satisfying `check`, in lexicographic order.
pub(crate) fn brute_force_solutions(
    domains: &[Vec<i32>],
    check: impl Fn(&[i32]) -> bool,
) -> Vec<Vec<i32>> {
    let mut solutions = vec![];
    let mut current = Vec::with_capacity(domains.len());
    fn extend(
        domains: &[Vec<i32>],
        current: &mut Vec<i32>,
        check: &dyn Fn(&[i32]) -> bool,
        solutions: &mut Vec<Vec<i32>>,
    ) {
        if current.len() == domains.len() {
            if check(current) {
                solutions.push(current.clone());
            }
            return;
        }
        for &value in &domains[current.len()] {
            current.push(value);
            extend(domains, current, check, solutions);
            let _ = current.pop();
        }
    }
    extend(domains, &mut current, &check, &mut solutions);
    solutions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagators::arithmetic::BinaryNotEqualsArgs;

    #[test]
    fn search_finds_every_solution() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(1, 3);
        let y = solver.new_sparse_variable(vec![1, 2, 3]);
        let _ = solver
            .new_propagator(BinaryNotEqualsArgs { x, y, offset: 0 })
            .expect("no conflict");

        let solutions = solver.solutions(&[x, y]);
        let expected = brute_force_solutions(&[vec![1, 2, 3], vec![1, 2, 3]], |values| {
            values[0] != values[1]
        });

        assert_eq!(expected, solutions);
        assert_eq!(0, solver.get_checkpoint());
        solver.assert_bounds(x, 1, 3);
    }
}
