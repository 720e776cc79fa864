//! Defines the constraints which can be added to a [`State`].
//!
//! A constraint is a relation over variables. In the engine, constraints are enforced through
//! propagators, and therefore constraints can be viewed as a collection of propagators. Posting a
//! constraint checks its arguments, installs its propagators and propagates them; errors in the
//! model are reported as a [`ConstraintOperationError`].
//!
//! # Example
//! ```
//! # use gourd_core::constraints;
//! # use gourd_core::engine::State;
//! let mut state = State::default();
//!
//! let x = state.new_interval_variable(0, 3, Some("x"));
//! let y = state.new_interval_variable(0, 3, Some("y"));
//!
//! state
//!     .post_constraint(constraints::less_than_or_equals(x, y, 2))
//!     .expect("the model is feasible");
//!
//! assert_eq!(1, state.upper_bound(x));
//! assert_eq!(2, state.lower_bound(y));
//! ```
mod all_different;
mod arithmetic;
mod cumulative;
mod global_cardinality;

pub use all_different::*;
pub use arithmetic::*;
pub use cumulative::*;
pub use global_cardinality::*;

use crate::basic_types::ConstraintOperationError;
use crate::engine::State;
use crate::propagation::PropagatorConstructor;

/// A [`Constraint`] is a relation over variables. It disqualifies certain partial assignments of
/// making it into a solution of the problem.
pub trait Constraint {
    /// Add the [`Constraint`] to the [`State`] and propagate.
    ///
    /// This method returns a [`ConstraintOperationError`] if the arguments of the constraint are
    /// malformed, or if its addition led to a conflict at the root.
    fn post(self, state: &mut State) -> Result<(), ConstraintOperationError>;
}

impl<ConcretePropagator> Constraint for ConcretePropagator
where
    ConcretePropagator: PropagatorConstructor,
    ConcretePropagator::PropagatorImpl: 'static,
{
    fn post(self, state: &mut State) -> Result<(), ConstraintOperationError> {
        let _ = state.post_propagator(self)?;
        Ok(())
    }
}

impl<C: Constraint> Constraint for Vec<C> {
    fn post(self, state: &mut State) -> Result<(), ConstraintOperationError> {
        self.into_iter().try_for_each(|constraint| constraint.post(state))
    }
}

/// Reports a domain which becomes empty while a constraint is set up as an infeasible model.
fn infeasible<T>(_: T) -> ConstraintOperationError {
    ConstraintOperationError::InfeasiblePropagator
}
