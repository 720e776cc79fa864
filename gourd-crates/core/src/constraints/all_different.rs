use super::global_cardinality_with_bounds;
use super::not_equals;
use super::Constraint;
use crate::basic_types::ConstraintOperationError;
use crate::engine::variables::DomainId;
use crate::engine::State;
use crate::propagators::gcc::GccOptions;

/// Creates the [`Constraint`] that enforces that all the given `variables` are distinct, through
/// a disequality between every pair of variables.
pub fn all_different(variables: impl Into<Box<[DomainId]>>) -> impl Constraint {
    let variables: Box<[DomainId]> = variables.into();
    let mut constraints = Vec::new();

    for i in 0..variables.len() {
        for j in i + 1..variables.len() {
            constraints.push(not_equals(variables[i], variables[j], 0));
        }
    }

    constraints
}

/// Creates the [`Constraint`] that enforces that all the given `variables` are distinct, as a
/// global cardinality constraint in which every value occurs at most once.
///
/// The filtering algorithm of the global cardinality constraint is chosen through `options`.
pub fn all_different_with_options(
    variables: impl Into<Box<[DomainId]>>,
    options: GccOptions,
) -> impl Constraint {
    AllDifferentCardinality {
        variables: variables.into(),
        options,
    }
}

struct AllDifferentCardinality {
    variables: Box<[DomainId]>,
    options: GccOptions,
}

impl Constraint for AllDifferentCardinality {
    fn post(self, state: &mut State) -> Result<(), ConstraintOperationError> {
        let mut values = self
            .variables
            .iter()
            .flat_map(|&variable| state.iterate_domain(variable).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        values.sort_unstable();
        values.dedup();

        let num_values = values.len();
        global_cardinality_with_bounds(
            self.variables,
            values,
            vec![0; num_values],
            vec![1; num_values],
            self.options,
        )
        .post(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_solver::brute_force_solutions;
    use crate::engine::test_solver::TestSolver;
    use crate::propagators::gcc::GccStrategy;

    fn is_all_different(values: &[i32]) -> bool {
        (0..values.len()).all(|i| (i + 1..values.len()).all(|j| values[i] != values[j]))
    }

    #[test]
    fn decomposition_and_cardinality_versions_agree() {
        let domains = vec![vec![1, 2, 3], vec![1, 2], vec![2, 3, 4], vec![1, 4]];
        let expected = brute_force_solutions(&domains, is_all_different);

        let mut decomposition = TestSolver::default();
        let variables = domains
            .iter()
            .map(|domain| decomposition.new_sparse_variable(domain.clone()))
            .collect::<Vec<_>>();
        decomposition
            .post_constraint(all_different(variables.clone()))
            .expect("the model is feasible");
        assert_eq!(expected, decomposition.solutions(&variables));

        for strategy in [GccStrategy::BoundConsistency, GccStrategy::ArcConsistency] {
            let mut solver = TestSolver::default();
            let variables = domains
                .iter()
                .map(|domain| solver.new_sparse_variable(domain.clone()))
                .collect::<Vec<_>>();
            solver
                .post_constraint(all_different_with_options(
                    variables.clone(),
                    GccOptions { strategy },
                ))
                .expect("the model is feasible");
            assert_eq!(expected, solver.solutions(&variables), "{strategy:?}");
        }
    }

    #[test]
    fn pigeonhole_is_detected_at_the_root_by_the_flow() {
        let mut solver = TestSolver::default();
        let variables = (0..3)
            .map(|_| solver.new_sparse_variable(vec![1, 2]))
            .collect::<Vec<_>>();

        assert_eq!(
            Err(ConstraintOperationError::InfeasiblePropagator),
            solver.post_constraint(all_different_with_options(
                variables,
                GccOptions {
                    strategy: GccStrategy::ArcConsistency
                },
            ))
        );
    }
}
