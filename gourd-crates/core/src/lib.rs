//! # Gourd
//! The propagation engine of the gourd constraint solver.
//!
//! The engine keeps integer variables with interval or enumerated domains on a trail, so that a
//! search procedure can create a checkpoint before every decision and restore it on failure.
//! Constraints are enforced by propagators, which the [`engine::State`] schedules by priority
//! and runs until none of them can narrow a domain any further.
//!
//! Besides simple arithmetic relations, the crate provides two global constraints:
//! - the global cardinality constraint, with a bound consistent filter based on Hall intervals
//!   and an arc consistent filter based on flows ([`propagators::gcc`]);
//! - the cumulative constraint, with time-tabling, energetic reasoning and task intervals
//!   ([`propagators::cumulative`]).
//!
//! # Example
//! ```
//! # use gourd_core::constraints;
//! # use gourd_core::engine::State;
//! let mut state = State::default();
//!
//! let x = state.new_sparse_variable(vec![1, 2, 3], Some("x"));
//! let y = state.new_sparse_variable(vec![1, 2], Some("y"));
//! let z = state.new_sparse_variable(vec![1, 2], Some("z"));
//!
//! state
//!     .post_constraint(constraints::all_different(vec![x, y, z]))
//!     .expect("the model is feasible");
//! // Nothing is fixed yet, as the disequalities only look at fixed variables.
//! assert_eq!(3, state.domain_size(x));
//!
//! state.new_checkpoint();
//! let _ = state.assign(y, 1).expect("1 is in the domain");
//! state.propagate_to_fixed_point().expect("no conflict");
//! assert_eq!(Some(2), state.fixed_value(z));
//! assert_eq!(Some(3), state.fixed_value(x));
//!
//! state.restore_to(0);
//! assert_eq!(3, state.domain_size(x));
//! ```
#[doc(hidden)]
pub mod asserts;
pub mod basic_types;
pub mod constraints;
pub mod containers;
pub mod engine;
pub mod graph;
pub mod propagation;
pub mod propagators;
pub mod statistics;

pub use convert_case;

pub use crate::basic_types::ConstraintOperationError;
pub use crate::engine::variables::DomainId;
pub use crate::engine::Conflict;
pub use crate::engine::EmptyDomain;
pub use crate::engine::State;
