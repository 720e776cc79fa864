//! The propagation engine: the store of versioned cells, the integer domains built on it, and the
//! [`State`] which drives propagators to a fixpoint.
mod assignments;
pub(crate) mod integer_domain;
pub(crate) mod notifications;
mod propagator_queue;
mod state;
#[cfg(test)]
pub(crate) mod test_solver;
pub(crate) mod trailed;
mod variable_names;
pub mod variables;

pub use assignments::Assignments;
pub use assignments::EmptyDomain;
pub(crate) use propagator_queue::PropagatorQueue;
pub use state::Conflict;
pub use state::State;
pub(crate) use trailed::TrailedBitSet;
pub use trailed::TrailedInteger;
pub use trailed::TrailedValues;
pub(crate) use variable_names::VariableNames;
