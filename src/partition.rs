//! Count-based splitting of a work batch across workers

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PartitionError {
    #[error("cannot split work into zero partitions")]
    NoSlices,
}

/// Split `items` into `n` contiguous slices of near-equal length.
///
/// With `base = len / n` and `rem = len % n`, the first `rem` slices hold
/// `base + 1` items and the rest hold `base`. Concatenating the slices in
/// order yields `items` again. When `n > len` the trailing slices are empty.
pub fn partition<T: Clone>(items: &[T], n: usize) -> Result<Vec<Vec<T>>, PartitionError> {
    if n == 0 {
        return Err(PartitionError::NoSlices);
    }

    let base = items.len() / n;
    let rem = items.len() % n;

    let mut slices = Vec::with_capacity(n);
    let mut start = 0;
    for i in 0..n {
        let len = if i < rem { base + 1 } else { base };
        slices.push(items[start..start + len].to_vec());
        start += len;
    }

    Ok(slices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remainder_goes_to_earliest_slices() {
        let slices = partition(&[1, 2, 3, 4, 5], 2).unwrap();
        assert_eq!(slices, vec![vec![1, 2, 3], vec![4, 5]]);
    }

    #[test]
    fn test_more_slices_than_items() {
        let slices = partition(&[1, 2, 3], 5).unwrap();
        assert_eq!(
            slices,
            vec![vec![1], vec![2], vec![3], Vec::<i32>::new(), Vec::new()]
        );
    }

    #[test]
    fn test_zero_slices_rejected() {
        assert_eq!(partition(&["a"], 0), Err(PartitionError::NoSlices));
    }

    #[test]
    fn test_single_slice_is_whole_batch() {
        let items = vec!["a".to_string(), "b".to_string()];
        assert_eq!(partition(&items, 1).unwrap(), vec![items]);
    }

    #[test]
    fn test_slice_shape_invariants() {
        for len in 1..40usize {
            let items: Vec<usize> = (0..len).collect();
            for n in 1..12usize {
                let slices = partition(&items, n).unwrap();
                assert_eq!(slices.len(), n);

                let base = len / n;
                assert!(
                    slices
                        .iter()
                        .all(|s| s.len() == base || s.len() == base + 1)
                );
                assert!(slices.windows(2).all(|w| w[0].len() >= w[1].len()));

                let rejoined: Vec<usize> = slices.into_iter().flatten().collect();
                assert_eq!(rejoined, items, "len={len} n={n}");
            }
        }
    }
}
