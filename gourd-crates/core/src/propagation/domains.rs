use crate::engine::integer_domain::IntegerDomain;
use crate::engine::variables::DomainId;
use crate::engine::Assignments;
use crate::engine::TrailedInteger;
use crate::engine::TrailedValues;

/// A read-only view of the current domains.
///
/// Handed to [`crate::propagation::Propagator::synchronise`] and obtainable from every context.
#[derive(Clone, Copy, Debug)]
pub struct Domains<'a> {
    pub(crate) assignments: &'a Assignments,
    pub(crate) trailed_values: &'a TrailedValues,
}

impl<'a> Domains<'a> {
    pub(crate) fn new(assignments: &'a Assignments, trailed_values: &'a TrailedValues) -> Self {
        Domains {
            assignments,
            trailed_values,
        }
    }
}

/// A trait which defines common methods for retrieving the [`Assignments`] and the
/// [`TrailedValues`] from the structure which implements this trait.
pub trait HasAssignments {
    fn assignments(&self) -> &Assignments;

    fn trailed_values(&self) -> &TrailedValues;
}

impl HasAssignments for Domains<'_> {
    fn assignments(&self) -> &Assignments {
        self.assignments
    }

    fn trailed_values(&self) -> &TrailedValues {
        self.trailed_values
    }
}

/// Queries on the current domains, available on every type which can see them.
pub trait ReadDomains: HasAssignments {
    fn lower_bound(&self, var: DomainId) -> i32 {
        self.assignments()
            .domain(var)
            .lower_bound(self.trailed_values())
    }

    fn upper_bound(&self, var: DomainId) -> i32 {
        self.assignments()
            .domain(var)
            .upper_bound(self.trailed_values())
    }

    fn contains(&self, var: DomainId, value: i32) -> bool {
        self.assignments()
            .domain(var)
            .contains(value, self.trailed_values())
    }

    /// Returns `true` if the domain of the given variable is singleton.
    fn is_fixed(&self, var: DomainId) -> bool {
        self.lower_bound(var) == self.upper_bound(var)
    }

    fn fixed_value(&self, var: DomainId) -> Option<i32> {
        self.is_fixed(var).then(|| self.lower_bound(var))
    }

    fn domain_size(&self, var: DomainId) -> usize {
        self.assignments().domain(var).size(self.trailed_values())
    }

    /// Whether the domain can represent holes.
    fn is_enumerated(&self, var: DomainId) -> bool {
        self.assignments().domain(var).is_enumerated()
    }

    /// The values of the domain in increasing order.
    fn iterate_domain(&self, var: DomainId) -> DomainIterator<'_> {
        DomainIterator::new(self.assignments().domain(var), self.trailed_values())
    }

    fn read_trailed(&self, trailed_integer: TrailedInteger) -> i64 {
        self.trailed_values().read(trailed_integer)
    }
}

impl<T: HasAssignments> ReadDomains for T {}

/// Iterates the values of one domain in increasing order.
#[derive(Debug)]
pub struct DomainIterator<'a> {
    domain: &'a IntegerDomain,
    trailed_values: &'a TrailedValues,
    next: Option<i32>,
}

impl<'a> DomainIterator<'a> {
    pub(crate) fn new(domain: &'a IntegerDomain, trailed_values: &'a TrailedValues) -> Self {
        DomainIterator {
            domain,
            trailed_values,
            next: Some(domain.lower_bound(trailed_values)),
        }
    }
}

impl Iterator for DomainIterator<'_> {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        let current = self.domain.next_value(self.next?, self.trailed_values)?;
        self.next = current.checked_add(1);
        Some(current)
    }
}
