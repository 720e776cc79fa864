use super::TrailedBitSet;
use super::TrailedInteger;
use super::TrailedValues;
use crate::gourd_assert_extreme;
use crate::gourd_assert_moderate;

/// The representation of the values a variable can still take.
///
/// An interval domain only stores its bounds and cannot represent holes. An enumerated domain
/// additionally stores a bitset of its values; its cached bounds are always members of the set
/// and no member lies outside of them.
#[derive(Debug, Clone)]
pub(crate) enum IntegerDomain {
    Interval {
        lower_bound: TrailedInteger,
        upper_bound: TrailedInteger,
    },
    Enumerated(EnumeratedDomain),
}

#[derive(Debug, Clone)]
pub(crate) struct EnumeratedDomain {
    /// The value represented by bit 0 of `values`.
    offset: i32,
    values: TrailedBitSet,
    lower_bound: TrailedInteger,
    upper_bound: TrailedInteger,
}

impl IntegerDomain {
    pub(crate) fn interval(
        lower_bound: i32,
        upper_bound: i32,
        trailed_values: &mut TrailedValues,
    ) -> IntegerDomain {
        IntegerDomain::Interval {
            lower_bound: trailed_values.grow(lower_bound as i64),
            upper_bound: trailed_values.grow(upper_bound as i64),
        }
    }

    /// Creates an enumerated domain from a non-empty list of values; duplicates are ignored.
    pub(crate) fn enumerated(values: &[i32], trailed_values: &mut TrailedValues) -> IntegerDomain {
        let min = values.iter().copied().min().unwrap_or_default();
        let max = values.iter().copied().max().unwrap_or_default();
        let capacity = (max as i64 - min as i64 + 1) as usize;

        IntegerDomain::Enumerated(EnumeratedDomain {
            offset: min,
            values: TrailedBitSet::new(
                capacity,
                values.iter().map(|&value| (value as i64 - min as i64) as usize),
                trailed_values,
            ),
            lower_bound: trailed_values.grow(min as i64),
            upper_bound: trailed_values.grow(max as i64),
        })
    }

    pub(crate) fn is_enumerated(&self) -> bool {
        matches!(self, IntegerDomain::Enumerated(_))
    }

    pub(crate) fn lower_bound(&self, trailed_values: &TrailedValues) -> i32 {
        match self {
            IntegerDomain::Interval { lower_bound, .. } => trailed_values.read(*lower_bound) as i32,
            IntegerDomain::Enumerated(domain) => trailed_values.read(domain.lower_bound) as i32,
        }
    }

    pub(crate) fn upper_bound(&self, trailed_values: &TrailedValues) -> i32 {
        match self {
            IntegerDomain::Interval { upper_bound, .. } => trailed_values.read(*upper_bound) as i32,
            IntegerDomain::Enumerated(domain) => trailed_values.read(domain.upper_bound) as i32,
        }
    }

    pub(crate) fn contains(&self, value: i32, trailed_values: &TrailedValues) -> bool {
        if value < self.lower_bound(trailed_values) || value > self.upper_bound(trailed_values) {
            return false;
        }
        match self {
            IntegerDomain::Interval { .. } => true,
            IntegerDomain::Enumerated(domain) => domain
                .values
                .contains(domain.index_of(value), trailed_values),
        }
    }

    pub(crate) fn size(&self, trailed_values: &TrailedValues) -> usize {
        match self {
            IntegerDomain::Interval { .. } => {
                (self.upper_bound(trailed_values) as i64 - self.lower_bound(trailed_values) as i64
                    + 1) as usize
            }
            IntegerDomain::Enumerated(domain) => domain.values.len(trailed_values),
        }
    }

    /// The smallest value in the domain which is at least `value`.
    pub(crate) fn next_value(&self, value: i32, trailed_values: &TrailedValues) -> Option<i32> {
        let lower_bound = self.lower_bound(trailed_values);
        let upper_bound = self.upper_bound(trailed_values);
        if value > upper_bound {
            return None;
        }
        let value = value.max(lower_bound);
        match self {
            IntegerDomain::Interval { .. } => Some(value),
            IntegerDomain::Enumerated(domain) => domain
                .values
                .next_member(domain.index_of(value), trailed_values)
                .map(|index| domain.value_of(index)),
        }
    }

    /// Raises the lower bound to the smallest member which is at least `value`.
    ///
    /// Requires `lower_bound < value <= upper_bound`. Every removed value is reported to
    /// `on_removal` in increasing order, grouped into inclusive ranges.
    pub(crate) fn raise_lower_bound(
        &self,
        value: i32,
        trailed_values: &mut TrailedValues,
        on_removal: &mut impl FnMut(i32, i32),
    ) -> i32 {
        let lower_bound = self.lower_bound(trailed_values);
        gourd_assert_moderate!(lower_bound < value && value <= self.upper_bound(trailed_values));

        match self {
            IntegerDomain::Interval {
                lower_bound: cell, ..
            } => {
                on_removal(lower_bound, value - 1);
                trailed_values.assign(*cell, value as i64);
                value
            }
            IntegerDomain::Enumerated(domain) => {
                domain.remove_members(lower_bound, value - 1, trailed_values, on_removal);
                let new_lower_bound = domain
                    .values
                    .next_member(domain.index_of(value), trailed_values)
                    .map(|index| domain.value_of(index))
                    .expect("the upper bound is a member");
                trailed_values.assign(domain.lower_bound, new_lower_bound as i64);
                gourd_assert_extreme!(domain.is_consistent(trailed_values));
                new_lower_bound
            }
        }
    }

    /// Lowers the upper bound to the largest member which is at most `value`.
    ///
    /// Requires `lower_bound <= value < upper_bound`.
    pub(crate) fn lower_upper_bound(
        &self,
        value: i32,
        trailed_values: &mut TrailedValues,
        on_removal: &mut impl FnMut(i32, i32),
    ) -> i32 {
        let upper_bound = self.upper_bound(trailed_values);
        gourd_assert_moderate!(self.lower_bound(trailed_values) <= value && value < upper_bound);

        match self {
            IntegerDomain::Interval {
                upper_bound: cell, ..
            } => {
                on_removal(value + 1, upper_bound);
                trailed_values.assign(*cell, value as i64);
                value
            }
            IntegerDomain::Enumerated(domain) => {
                domain.remove_members(value + 1, upper_bound, trailed_values, on_removal);
                let new_upper_bound = domain
                    .values
                    .previous_member(domain.index_of(value), trailed_values)
                    .map(|index| domain.value_of(index))
                    .expect("the lower bound is a member");
                trailed_values.assign(domain.upper_bound, new_upper_bound as i64);
                gourd_assert_extreme!(domain.is_consistent(trailed_values));
                new_upper_bound
            }
        }
    }

    /// Removes a value strictly between the bounds. Returns whether the domain changed; interval
    /// domains cannot represent holes and are left untouched.
    pub(crate) fn remove_interior(&self, value: i32, trailed_values: &mut TrailedValues) -> bool {
        match self {
            IntegerDomain::Interval { .. } => false,
            IntegerDomain::Enumerated(domain) => {
                gourd_assert_moderate!(
                    trailed_values.read(domain.lower_bound) < value as i64
                        && (value as i64) < trailed_values.read(domain.upper_bound)
                );
                domain.values.remove(domain.index_of(value), trailed_values)
            }
        }
    }
}

impl EnumeratedDomain {
    fn index_of(&self, value: i32) -> usize {
        (value as i64 - self.offset as i64).max(0) as usize
    }

    fn value_of(&self, index: usize) -> i32 {
        (self.offset as i64 + index as i64) as i32
    }

    fn remove_members(
        &self,
        from: i32,
        to: i32,
        trailed_values: &mut TrailedValues,
        on_removal: &mut impl FnMut(i32, i32),
    ) {
        let mut run: Option<(i32, i32)> = None;
        self.values.remove_range(
            self.index_of(from),
            self.index_of(to),
            trailed_values,
            |index| {
                let value = self.value_of(index);
                run = match run {
                    Some((start, end)) if end + 1 == value => Some((start, value)),
                    Some((start, end)) => {
                        on_removal(start, end);
                        Some((value, value))
                    }
                    None => Some((value, value)),
                };
            },
        );
        if let Some((start, end)) = run {
            on_removal(start, end);
        }
    }

    fn is_consistent(&self, trailed_values: &TrailedValues) -> bool {
        let lower_bound = trailed_values.read(self.lower_bound) as i32;
        let upper_bound = trailed_values.read(self.upper_bound) as i32;
        let members = self.values.iter(trailed_values).collect::<Vec<_>>();

        members.first().map(|&index| self.value_of(index)) == Some(lower_bound)
            && members.last().map(|&index| self.value_of(index)) == Some(upper_bound)
    }
}
