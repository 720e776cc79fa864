//! The propagators of the engine.
//!
//! Every propagator comes with a [`crate::propagation::PropagatorConstructor`], named after it
//! with an `Args` suffix, which is added to a [`crate::engine::State`]. See
//! [`crate::propagation`] for the contract propagators follow.
pub mod arithmetic;
pub mod cumulative;
pub mod gcc;
