use crate::basic_types::PropagationStatusCP;
use crate::engine::variables::DomainId;
use crate::propagation::DomainEvents;
use crate::propagation::LocalId;
use crate::propagation::Priority;
use crate::propagation::PropagationContext;
use crate::propagation::Propagator;
use crate::propagation::PropagatorConstructor;
use crate::propagation::PropagatorConstructorContext;
use crate::propagation::ReadDomains;

/// The [`PropagatorConstructor`] for the [`BinaryNotEquals`] propagator.
#[derive(Clone, Copy, Debug)]
pub struct BinaryNotEqualsArgs {
    pub x: DomainId,
    pub y: DomainId,
    pub offset: i32,
}

impl PropagatorConstructor for BinaryNotEqualsArgs {
    type PropagatorImpl = BinaryNotEquals;

    fn create(self, mut context: PropagatorConstructorContext) -> Self::PropagatorImpl {
        let BinaryNotEqualsArgs { x, y, offset } = self;

        // Bound events are needed as well: the value to remove may be interior to an interval
        // domain at first and only become removable once it is a bound.
        context.register(x, DomainEvents::ANY_INT, LocalId::from(0));
        context.register(y, DomainEvents::ANY_INT, LocalId::from(1));

        BinaryNotEquals { x, y, offset }
    }
}

/// Propagator for `x != y + offset`.
#[derive(Clone, Debug)]
pub struct BinaryNotEquals {
    x: DomainId,
    y: DomainId,
    offset: i32,
}

impl Propagator for BinaryNotEquals {
    fn name(&self) -> &str {
        "BinaryNotEquals"
    }

    fn priority(&self) -> Priority {
        Priority::High
    }

    fn propagate(&mut self, mut context: PropagationContext) -> PropagationStatusCP {
        // A removal can fix the other variable, after which the first may lose a value.
        loop {
            let mut changed = false;

            if let Some(x_value) = context.fixed_value(self.x) {
                changed |= context.remove(self.y, x_value - self.offset)?;
            }
            if let Some(y_value) = context.fixed_value(self.y) {
                changed |= context.remove(self.x, y_value + self.offset)?;
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
    use crate::engine::test_solver::TestSolver;

    #[test]
    fn detects_conflict() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(3, 3);
        let y = solver.new_variable(1, 1);

        let _ = solver
            .new_propagator(BinaryNotEqualsArgs { x, y, offset: 2 })
            .expect_err("3 != 1 + 2 does not hold");
    }

    #[test]
    fn fixed_side_removes_value_from_the_other() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(4, 4);
        let y = solver.new_sparse_variable(vec![1, 2, 3]);

        let _ = solver
            .new_propagator(BinaryNotEqualsArgs { x, y, offset: 2 })
            .expect("no conflict");

        assert!(!solver.contains(y, 2));
        solver.assert_bounds(y, 1, 3);
    }

    #[test]
    fn removals_cascade_within_one_call() {
        let mut solver = TestSolver::default();
        let x = solver.new_sparse_variable(vec![1, 2]);
        let y = solver.new_variable(1, 2);

        let _ = solver
            .new_propagator(BinaryNotEqualsArgs { x, y, offset: 0 })
            .expect("no conflict");
        solver.new_checkpoint();
        let _ = solver.assign(y, 1).expect("1 is in the domain");
        solver.propagate().expect("no conflict");

        solver.assert_bounds(x, 2, 2);
    }

    #[test]
    fn interior_value_of_interval_domain_is_removed_once_it_is_a_bound() {
        let mut solver = TestSolver::default();
        let x = solver.new_variable(0, 10);
        let y = solver.new_variable(5, 5);

        let _ = solver
            .new_propagator(BinaryNotEqualsArgs { x, y, offset: 0 })
            .expect("no conflict");
        solver.assert_bounds(x, 0, 10);

        let _ = solver.set_lower_bound(x, 5).expect("non-empty");
        solver.propagate().expect("no conflict");
        solver.assert_bounds(x, 6, 10);
    }
}
