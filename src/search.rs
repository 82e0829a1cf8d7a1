//! Binary search over ascending numeric arrays.
//!
//! All variants are O(log n) and treat an empty slice as "not found".

/// Index of an element equal to `target`, if any.
pub fn binary_search_exact<T: PartialOrd + Copy>(values: &[T], target: T) -> Option<usize> {
    let mut lo = 0usize;
    let mut hi = values.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let value = values[mid];
        if value == target {
            return Some(mid);
        }
        if value > target {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    None
}

/// Rightmost index whose value is `<= target`.
///
/// Plateaus of equal values resolve to their last entry.
pub fn binary_search_floor<T: PartialOrd + Copy>(values: &[T], target: T) -> Option<usize> {
    values.partition_point(|v| *v <= target).checked_sub(1)
}

/// Leftmost index whose value is `>= target`.
pub fn binary_search_lower_bound<T: PartialOrd + Copy>(values: &[T], target: T) -> Option<usize> {
    let idx = values.partition_point(|v| *v < target);
    (idx < values.len()).then_some(idx)
}
