//! Contains the main building blocks for propagators.
//!
//! # Background
//!
//! A propagator takes as input a set of variables (<code>x<sub>i</sub> ∈ X</code>) and for each
//! variable a corresponding domain (<code>D<sub>i</sub> ∈ D</code>); it can then be seen as a
//! function which maps `D ↦ D'` such that <code>D'<sub>i</sub> ⊆ D<sub>i</sub></code> for all
//! variables. A propagator is at fixpoint if applying it again changes no domain, and it is
//! "idempotent" if a single call always leaves it at fixpoint.
//!
//! # Practical
//!
//! Each concrete propagator implements the [`Propagator`] trait and is created by a
//! [`PropagatorConstructor`]. The constructor subscribes the propagator to [`DomainEvents`] on its
//! variables through the [`PropagatorConstructorContext`], and allocates the trailed cells and
//! [`DeltaMonitor`]s the propagator uses for incremental bookkeeping.
//!
//! Variables never refer to propagators. The engine keeps the subscription table and, after a
//! propagator ran, offers every recorded [`DomainEvent`] to the subscribers of the changed
//! variable, skipping the propagator that caused it. Propagators which are not idempotent
//! therefore either loop internally or call [`PropagationContext::enqueue_again`].
//!
//! Propagators are added to the engine through [`crate::engine::State::add_propagator`].
//!
//! # Bibliography
//!
//! \[1\] C. Schulte and P. J. Stuckey, ‘Efficient constraint propagation engines’, ACM Transactions
//! on Programming Languages and Systems (TOPLAS), vol. 31, no. 1, pp. 1–43, 2008.

mod constructor;
mod contexts;
mod delta;
mod domains;
mod local_id;
mod propagator;

pub(crate) mod propagator_id;
pub(crate) mod store;

pub use constructor::PropagatorConstructor;
pub use constructor::PropagatorConstructorContext;
pub use contexts::NotificationContext;
pub use contexts::PropagationContext;
pub use delta::DeltaMonitor;
pub use delta::DomainDelta;
pub use domains::DomainIterator;
pub use domains::Domains;
pub use domains::HasAssignments;
pub use domains::ReadDomains;
pub use local_id::LocalId;
pub use propagator::EnqueueDecision;
pub use propagator::Priority;
pub use propagator::Propagator;
pub use propagator_id::PropagatorId;
pub(crate) use propagator_id::PropagatorVarId;
pub use store::PropagatorHandle;

pub use crate::engine::notifications::DomainEvent;
pub use crate::engine::notifications::DomainEvents;
