//! Order statistics shared by the crude trigger threshold estimator and the
//! marker engine's reductions.
//!
//! Both the reference trigger (`kth_smallest`) and the reference marker
//! engine (`get_kth_biggest`) implement the same Hoare-partition quickselect
//! over a mutable slice; this is the one shared copy.

/// Reorders `data` in place and returns the value that would sit at index
/// `k` in sorted order (the `k`-th order statistic, 0-indexed).
///
/// Panics if `data` is empty or `k >= data.len()`.
pub fn kth_smallest(data: &mut [f64], k: usize) -> f64 {
    assert!(!data.is_empty(), "kth_smallest on empty slice");
    assert!(k < data.len(), "k out of bounds");

    let mut l = 0isize;
    let mut m = data.len() as isize - 1;
    let k = k as isize;

    while l < m {
        let x = data[k as usize];
        let mut i = l;
        let mut j = m;
        loop {
            while data[i as usize] < x {
                i += 1;
            }
            while x < data[j as usize] {
                j -= 1;
            }
            if i <= j {
                data.swap(i as usize, j as usize);
                i += 1;
                j -= 1;
            }
            if i > j {
                break;
            }
        }
        if j < k {
            l = i;
        }
        if k < i {
            m = j;
        }
    }
    data[k as usize]
}

/// The median (`n/2`-th order statistic) of `data`, reordering it in place.
///
/// Returns `None` for an empty slice.
pub fn median(data: &mut [f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(kth_smallest(data, data.len() / 2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_odd_length() {
        let mut v = vec![5.0, 1.0, 3.0, 2.0, 4.0];
        assert_eq!(median(&mut v), Some(3.0));
    }

    #[test]
    fn median_of_single_element() {
        let mut v = vec![42.0];
        assert_eq!(median(&mut v), Some(42.0));
    }

    #[test]
    fn median_of_empty_is_none() {
        let mut v: Vec<f64> = vec![];
        assert_eq!(median(&mut v), None);
    }

    #[test]
    fn kth_smallest_matches_sorted_order() {
        let data = vec![9.0, 2.0, 7.0, 4.0, 1.0, 8.0, 3.0, 6.0, 5.0];
        let mut sorted = data.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for k in 0..data.len() {
            let mut v = data.clone();
            assert_eq!(kth_smallest(&mut v, k), sorted[k]);
        }
    }

    proptest::proptest! {
        /// For any non-empty slice and in-bounds `k`, quickselect must agree
        /// with a full sort, for every `k` at once (one sort, every index
        /// checked), since the same partitioning has to hold up regardless
        /// of which order statistic is asked for.
        #[test]
        fn kth_smallest_agrees_with_full_sort(values in proptest::collection::vec(-10_000i32..10_000, 1..200)) {
            let data: Vec<f64> = values.iter().map(|&v| v as f64).collect();
            let mut sorted = data.clone();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
            for k in 0..data.len() {
                let mut v = data.clone();
                proptest::prop_assert_eq!(kth_smallest(&mut v, k), sorted[k]);
            }
        }

        #[test]
        fn median_matches_manual_midpoint(values in proptest::collection::vec(-10_000i32..10_000, 1..200)) {
            let mut data: Vec<f64> = values.iter().map(|&v| v as f64).collect();
            let mut sorted = data.clone();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let expected = sorted[sorted.len() / 2];
            proptest::prop_assert_eq!(median(&mut data), Some(expected));
        }
    }
}
