//! Splitting a flat index space across workers.
//!
//! A length `N` and worker count `k` always produce the same `k` contiguous,
//! ordered ranges covering `[0, N)`, so every execution policy visits
//! elements in the same per-partition order and merges results in the same
//! sequence.

use std::ops::Range;

/// Partition `[0, len)` into `workers` contiguous ranges.
///
/// Each range holds `len / workers` elements and the last one absorbs the
/// remainder. When `len < workers` the first `len` workers get one element
/// each and the rest get empty ranges. `workers == 0` is treated as 1.
pub fn partition_ranges(len: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    if len < workers {
        return (0..workers)
            .map(|w| if w < len { w..w + 1 } else { len..len })
            .collect();
    }
    let chunk = len / workers;
    (0..workers)
        .map(|w| {
            let start = w * chunk;
            let end = if w + 1 == workers { len } else { start + chunk };
            start..end
        })
        .collect()
}

/// Exclusive prefix sum: `offsets[i] = counts[..i].sum()`, plus the total.
pub fn exclusive_prefix_sum(counts: &[usize]) -> (Vec<usize>, usize) {
    let mut offsets = Vec::with_capacity(counts.len());
    let mut total = 0usize;
    for &count in counts {
        offsets.push(total);
        total += count;
    }
    (offsets, total)
}

/// Split `slice` into disjoint mutable chunks, one per range.
///
/// `ranges` must be contiguous and ascending starting at 0 (as produced by
/// [`partition_ranges`]) and end within `slice`.
pub fn split_mut_by_ranges<'a, T>(
    mut slice: &'a mut [T],
    ranges: &[Range<usize>],
) -> Vec<&'a mut [T]> {
    let mut chunks = Vec::with_capacity(ranges.len());
    let mut consumed = 0usize;
    for range in ranges {
        debug_assert_eq!(range.start, consumed, "ranges must be contiguous");
        let (head, tail) = std::mem::take(&mut slice).split_at_mut(range.len());
        chunks.push(head);
        slice = tail;
        consumed = range.end;
    }
    chunks
}

/// Ranges `offsets[i]..offsets[i] + counts[i]`.
pub fn ranges_from_counts(offsets: &[usize], counts: &[usize]) -> Vec<Range<usize>> {
    offsets
        .iter()
        .zip(counts)
        .map(|(&offset, &count)| offset..offset + count)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers(ranges: &[Range<usize>], len: usize) {
        let mut next = 0;
        for r in ranges {
            assert_eq!(r.start, next);
            assert!(r.end >= r.start);
            next = r.end;
        }
        assert_eq!(next, len);
    }

    #[test]
    fn test_partition_even() {
        let ranges = partition_ranges(12, 4);
        assert_eq!(ranges, vec![0..3, 3..6, 6..9, 9..12]);
    }

    #[test]
    fn test_partition_last_absorbs_remainder() {
        let ranges = partition_ranges(10, 3);
        assert_eq!(ranges, vec![0..3, 3..6, 6..10]);
        assert_covers(&ranges, 10);
    }

    #[test]
    fn test_partition_fewer_elements_than_workers() {
        let ranges = partition_ranges(3, 5);
        assert_eq!(ranges, vec![0..1, 1..2, 2..3, 3..3, 3..3]);
        assert_covers(&ranges, 3);
    }

    #[test]
    fn test_partition_empty_and_single_worker() {
        assert_eq!(partition_ranges(0, 4), vec![0..0; 4]);
        assert_eq!(partition_ranges(7, 1), vec![0..7]);
        assert_eq!(partition_ranges(7, 0), vec![0..7]);
    }

    #[test]
    fn test_partition_no_empty_range_when_enough_elements() {
        for len in 1..64 {
            for workers in 1..=len {
                let ranges = partition_ranges(len, workers);
                assert_eq!(ranges.len(), workers);
                assert!(ranges.iter().all(|r| !r.is_empty()));
                assert_covers(&ranges, len);
            }
        }
    }

    #[test]
    fn test_exclusive_prefix_sum() {
        let (offsets, total) = exclusive_prefix_sum(&[3, 0, 2, 5]);
        assert_eq!(offsets, vec![0, 3, 3, 5]);
        assert_eq!(total, 10);

        let (offsets, total) = exclusive_prefix_sum(&[]);
        assert!(offsets.is_empty());
        assert_eq!(total, 0);
    }

    #[test]
    fn test_split_mut_by_ranges_disjoint() {
        let mut data: Vec<usize> = (0..10).collect();
        let ranges = partition_ranges(10, 3);
        let chunks = split_mut_by_ranges(&mut data, &ranges);
        assert_eq!(chunks.len(), 3);
        for (w, chunk) in chunks.into_iter().enumerate() {
            for x in chunk.iter_mut() {
                *x = w;
            }
        }
        assert_eq!(data, vec![0, 0, 0, 1, 1, 1, 2, 2, 2, 2]);
    }

    #[test]
    fn test_split_prefix_only() {
        let mut data = [0u8; 8];
        let ranges = ranges_from_counts(&[0, 2, 2], &[2, 0, 3]);
        assert_eq!(ranges, vec![0..2, 2..2, 2..5]);
        let chunks = split_mut_by_ranges(&mut data, &ranges);
        let lens: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(lens, vec![2, 0, 3]);
    }
}
