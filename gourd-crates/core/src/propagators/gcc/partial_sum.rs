use crate::gourd_assert_eq_simple;

/// Prefix sums of per-value occurrence bounds over a contiguous value range.
///
/// The range is padded with two elements of value `1` on each side so that the Hall interval
/// passes never have to special-case the first or last value. Besides the sums, a table of
/// "skip" pointers allows jumping over runs of values whose element is zero in constant time.
#[derive(Clone, Debug)]
pub(super) struct PartialSum {
    /// The value stored at index `0`; three below the first value of the range.
    first_value: i32,
    /// The last padded value; two above the last value of the range.
    last_value: i32,
    sum: Box<[i32]>,
    ds: Box<[usize]>,
}

impl PartialSum {
    pub(super) fn new(first_value: i32, count: usize) -> PartialSum {
        PartialSum {
            first_value: first_value - 3,
            last_value: first_value + count as i32 + 1,
            sum: vec![0; count + 5].into_boxed_slice(),
            ds: vec![0; count + 5].into_boxed_slice(),
        }
    }

    pub(super) fn first_value(&self) -> i32 {
        self.first_value
    }

    pub(super) fn last_value(&self) -> i32 {
        self.last_value
    }

    fn range(&self) -> usize {
        self.sum.len() - 5
    }

    fn index(&self, value: i32) -> usize {
        (value - self.first_value) as usize
    }

    /// Recomputes the sums from one element per value of the range, in increasing value order.
    pub(super) fn compute(&mut self, elements: impl IntoIterator<Item = i32>) {
        let range = self.range();

        self.sum[0] = 0;
        self.sum[1] = 1;
        self.sum[2] = 2;
        let mut num_elements = 0;
        for (index, element) in (2..range + 2).zip(elements) {
            self.sum[index + 1] = self.sum[index] + element;
            num_elements += 1;
        }
        gourd_assert_eq_simple!(range, num_elements);
        self.sum[range + 3] = self.sum[range + 2] + 1;
        self.sum[range + 4] = self.sum[range + 3] + 1;

        let mut i = range + 3;
        let mut j = i + 1;
        while i > 0 {
            while self.sum[i] == self.sum[i - 1] {
                self.ds[i] = j;
                i -= 1;
            }
            self.ds[j] = i;
            j = i;
            i -= 1;
        }
        self.ds[j] = 0;
    }

    /// The sum of the elements of the values in `from..=to`.
    ///
    /// For `from > to` the result is never positive, so an empty range has no capacity.
    pub(super) fn sum(&self, from: i32, to: i32) -> i32 {
        if from <= to {
            self.sum[self.index(to)] - self.sum[self.index(from) - 1]
        } else {
            self.sum[self.index(to) - 1] - self.sum[self.index(from)]
        }
    }

    pub(super) fn min_value(&self) -> i32 {
        self.first_value + 3
    }

    pub(super) fn max_value(&self) -> i32 {
        self.last_value - 2
    }

    /// The first value at or after `value` which does not lie in a run of zero elements.
    pub(super) fn skip_non_null_elements_right(&self, value: i32) -> i32 {
        let index = self.index(value);
        let target = if self.ds[index] < index {
            index
        } else {
            self.ds[index]
        };
        target as i32 + self.first_value
    }

    /// The last value at or before `value` which does not lie in a run of zero elements.
    pub(super) fn skip_non_null_elements_left(&self, value: i32) -> i32 {
        let index = self.index(value);
        let target = if self.ds[index] > index {
            self.ds[self.ds[index]]
        } else {
            index
        };
        target as i32 + self.first_value
    }
}

#[cfg(test)]
mod tests {
    use super::PartialSum;

    #[test]
    fn sums_over_value_ranges() {
        let mut partial_sum = PartialSum::new(10, 4);
        partial_sum.compute([2, 0, 1, 3]);

        assert_eq!(10, partial_sum.min_value());
        assert_eq!(13, partial_sum.max_value());
        assert_eq!(6, partial_sum.sum(10, 13));
        assert_eq!(1, partial_sum.sum(11, 12));
        assert_eq!(0, partial_sum.sum(11, 11));
        assert_eq!(3, partial_sum.sum(13, 13));
    }

    #[test]
    fn padding_counts_one_per_value() {
        let mut partial_sum = PartialSum::new(0, 2);
        partial_sum.compute([0, 0]);

        assert_eq!(2, partial_sum.sum(-2, -1));
        assert_eq!(2, partial_sum.sum(2, 3));
        assert_eq!(0, partial_sum.sum(0, 1));
    }

    #[test]
    fn empty_range_has_no_positive_sum() {
        let mut partial_sum = PartialSum::new(0, 3);
        partial_sum.compute([1, 1, 1]);

        assert!(partial_sum.sum(0, -1) <= 0);
        assert!(partial_sum.sum(3, 2) <= 0);
    }
}
