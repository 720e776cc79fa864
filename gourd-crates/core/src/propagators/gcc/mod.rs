//! Propagators for the global cardinality constraint, which bounds how often each value is taken
//! by a list of variables.
//!
//! Two filtering algorithms are available, selected through [`GccOptions`]:
//! - [`GlobalCardinalityBounds`] reasons on the bounds of the variables over a contiguous range of
//!   values;
//! - [`GlobalCardinalityArc`] removes every value which is not part of a feasible assignment.
mod arc_consistency;
mod bound_consistency;
mod options;
mod partial_sum;

pub use arc_consistency::GlobalCardinalityArc;
pub use arc_consistency::GlobalCardinalityArcArgs;
pub use bound_consistency::GlobalCardinalityBounds;
pub use bound_consistency::GlobalCardinalityBoundsArgs;
pub use options::GccOptions;
pub use options::GccStrategy;
