//! Stream compaction: gather the valid elements of an array, in order, into
//! the front of an output buffer.
//!
//! The index space is partitioned into contiguous ranges. In the scan phase
//! every partition collects its valid elements into a private buffer and
//! hands that buffer back as its result. After the join, an exclusive prefix
//! sum over the buffer lengths gives each partition its output offset, and in
//! the merge phase every partition copies its buffer into its own disjoint
//! slice of the output. Sequential execution is the one-partition case, so
//! both paths produce the same output.
//!
//! Without masking the scan is pointless and compaction is an
//! order-preserving parallel copy.

use lattice_view::{ArrayError, ArraySink, ArraySource};
use tracing::{debug, trace};

use crate::execution::ExecutionPolicy;
use crate::maybe_sync::MaybeSendSync;
use crate::no_data::{InputNoDataPolicy, NoMask};
use crate::partition::{exclusive_prefix_sum, ranges_from_counts, split_mut_by_ranges};
use crate::Result;

/// Copy every element of `input`, in row-major order, to the front of
/// `output` and return the element count.
///
/// `output` must hold at least as many elements as `input`.
pub fn compress<T, E, Src, Dst>(execution: &E, input: &Src, output: &mut Dst) -> Result<usize>
where
    T: Copy + MaybeSendSync,
    E: ExecutionPolicy,
    Src: ArraySource<T> + ?Sized,
    Dst: ArraySink<T> + ?Sized,
{
    compress_masked(&NoMask, execution, input, output)
}

/// Copy the elements of `input` accepted by `no_data`, in row-major order,
/// to the front of `output` and return how many were copied.
///
/// Elements of `output` at or beyond the returned count are left untouched.
/// `output` must hold at least as many elements as `input`, and `no_data`
/// must cover every element of `input`; both are checked before any work is
/// done.
pub fn compress_masked<T, P, E, Src, Dst>(
    no_data: &P,
    execution: &E,
    input: &Src,
    output: &mut Dst,
) -> Result<usize>
where
    T: Copy + MaybeSendSync,
    P: InputNoDataPolicy + ?Sized,
    E: ExecutionPolicy,
    Src: ArraySource<T> + ?Sized,
    Dst: ArraySink<T> + ?Sized,
{
    let src = input.as_slice();
    let dst = output.as_mut_slice();
    if dst.len() < src.len() {
        return Err(ArrayError::CapacityTooSmall {
            required: src.len(),
            capacity: dst.len(),
        }
        .into());
    }
    no_data.check_extent(src.len())?;
    debug!(
        len = src.len(),
        workers = execution.workers(),
        masked = P::MASKS,
        "compress"
    );
    if src.is_empty() {
        return Ok(0);
    }

    let count = if P::MASKS {
        scan_and_merge(no_data, execution, src, dst)
    } else {
        copy_all(execution, src, dst)
    };

    trace!(count, "compress finished");
    Ok(count)
}

/// Allocate an output, compress into it, and truncate it to the valid count.
pub fn compress_to_vec<T, P, E, Src>(no_data: &P, execution: &E, input: &Src) -> Result<Vec<T>>
where
    T: Copy + Default + MaybeSendSync,
    P: InputNoDataPolicy + ?Sized,
    E: ExecutionPolicy,
    Src: ArraySource<T> + ?Sized,
{
    let mut output = vec![T::default(); input.as_slice().len()];
    let count = compress_masked(no_data, execution, input, &mut output)?;
    output.truncate(count);
    Ok(output)
}

fn scan_and_merge<T, P, E>(no_data: &P, execution: &E, src: &[T], dst: &mut [T]) -> usize
where
    T: Copy + MaybeSendSync,
    P: InputNoDataPolicy + ?Sized,
    E: ExecutionPolicy,
{
    // Scan: each partition returns its own dense buffer.
    let buffers: Vec<Vec<T>> = execution.fork_join(execution.partition(src.len()), |range| {
        src[range.clone()]
            .iter()
            .zip(range)
            .filter(|&(_, index)| no_data.is_valid(index))
            .map(|(&value, _)| value)
            .collect()
    });

    let counts: Vec<usize> = buffers.iter().map(Vec::len).collect();
    let (offsets, count) = exclusive_prefix_sum(&counts);
    trace!(?counts, ?offsets, "compress scan finished");

    // Merge: disjoint output slices, one per buffer.
    let targets = split_mut_by_ranges(&mut dst[..count], &ranges_from_counts(&offsets, &counts));
    execution.fork_join(
        buffers.into_iter().zip(targets).collect(),
        |(buffer, target): (Vec<T>, &mut [T])| target.copy_from_slice(&buffer),
    );
    count
}

fn copy_all<T, E>(execution: &E, src: &[T], dst: &mut [T]) -> usize
where
    T: Copy + MaybeSendSync,
    E: ExecutionPolicy,
{
    let ranges = execution.partition(src.len());
    let targets = split_mut_by_ranges(&mut dst[..src.len()], &ranges);
    execution.fork_join(
        ranges.into_iter().zip(targets).collect(),
        |(range, target): (std::ops::Range<usize>, &mut [T])| {
            target.copy_from_slice(&src[range])
        },
    );
    src.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::{DynamicExecution, Parallel, Sequential};
    use crate::no_data::{MaskDetector, SentinelDetector};
    use crate::KernelError;

    fn sentinel_input(len: usize) -> Vec<i32> {
        (0..len as i32)
            .map(|v| if v % 5 == 0 { 99 } else { v })
            .collect()
    }

    #[test]
    fn test_compress_sentinel_scenario() {
        let values = sentinel_input(10);
        assert_eq!(values, vec![99, 1, 2, 3, 4, 99, 6, 7, 8, 9]);
        let detector = SentinelDetector::new(&values, 99);

        for workers in [1, 4] {
            let mut out = vec![0; values.len()];
            let count =
                compress_masked(&detector, &Parallel::new(workers).unwrap(), &values, &mut out)
                    .unwrap();
            assert_eq!(count, 8);
            assert_eq!(&out[..count], &[1, 2, 3, 4, 6, 7, 8, 9]);
        }
    }

    #[test]
    fn test_compress_leaves_tail_untouched() {
        let values = sentinel_input(10);
        let detector = SentinelDetector::new(&values, 99);
        let mut out = vec![-1; 12];
        let count = compress_masked(&detector, &Sequential, &values, &mut out).unwrap();
        assert_eq!(count, 8);
        assert_eq!(&out[count..], &[-1, -1, -1, -1]);
    }

    #[test]
    fn test_compress_unmasked_is_copy() {
        let values: Vec<u64> = (0..37).collect();
        for policy in [
            DynamicExecution::from(Sequential),
            Parallel::new(2).unwrap().into(),
            Parallel::new(5).unwrap().into(),
        ] {
            let mut out = vec![0; values.len()];
            let count = compress(&policy, &values, &mut out).unwrap();
            assert_eq!(count, values.len());
            assert_eq!(out, values);
        }
    }

    #[test]
    fn test_compress_capacity_checked_first() {
        let values = vec![1, 2, 3];
        let mut out = vec![0; 2];
        let err = compress(&Sequential, &values, &mut out).unwrap_err();
        assert_eq!(
            err,
            KernelError::Array(ArrayError::CapacityTooSmall {
                required: 3,
                capacity: 2
            })
        );
        assert_eq!(out, vec![0, 0]);
    }

    #[test]
    fn test_compress_policy_extent_checked_first() {
        let values = vec![1, 2, 3, 4, 5];
        let mask = vec![false, true, false];
        let mut out = vec![0; 5];
        let err = compress_masked(
            &MaskDetector::new(&mask),
            &Parallel::new(2).unwrap(),
            &values,
            &mut out,
        )
        .unwrap_err();
        assert_eq!(
            err,
            KernelError::Array(ArrayError::LengthMismatch {
                dims: vec![5],
                expected: 5,
                actual: 3
            })
        );
        assert_eq!(out, vec![0; 5]);

        // a one-element rank-1 array is not a broadcast scalar
        let short = vec![3];
        let err = compress_masked(&SentinelDetector::new(&short, 3), &Sequential, &values, &mut out)
            .unwrap_err();
        assert!(matches!(
            err,
            KernelError::Array(ArrayError::LengthMismatch { actual: 1, .. })
        ));
        assert_eq!(out, vec![0; 5]);
    }

    #[test]
    fn test_compress_scalar_sentinel_broadcasts() {
        let values = vec![1, 2, 3];
        let scalar = lattice_view::GridArray::scalar(7);
        let detector = SentinelDetector::new(&scalar, 3);
        let got = compress_to_vec(&detector, &Sequential, &values).unwrap();
        assert_eq!(got, values);
    }

    #[test]
    fn test_compress_empty_input() {
        let values: Vec<f32> = Vec::new();
        let mut out = vec![7.0f32; 3];
        let detector = SentinelDetector::new(&values, -1.0);
        assert_eq!(compress(&Sequential, &values, &mut out).unwrap(), 0);
        assert_eq!(
            compress_masked(&detector, &Parallel::new(4).unwrap(), &values, &mut out).unwrap(),
            0
        );
        assert_eq!(out, vec![7.0; 3]);
    }

    #[test]
    fn test_compress_nothing_valid() {
        let values = vec![99; 9];
        let detector = SentinelDetector::new(&values, 99);
        let mut out = vec![0; 9];
        let count =
            compress_masked(&detector, &Parallel::new(3).unwrap(), &values, &mut out).unwrap();
        assert_eq!(count, 0);
        assert_eq!(out, vec![0; 9]);
    }

    #[test]
    fn test_compress_with_boolean_mask() {
        let values = vec![10, 20, 30, 40, 50];
        let mask = vec![true, false, false, true, false];
        let got = compress_to_vec(&MaskDetector::new(&mask), &Parallel::new(2).unwrap(), &values)
            .unwrap();
        assert_eq!(got, vec![20, 30, 50]);
    }

    #[test]
    fn test_compress_more_workers_than_elements() {
        let values = vec![1, 99, 3];
        let detector = SentinelDetector::new(&values, 99);
        let got = compress_to_vec(&detector, &Parallel::new(8).unwrap(), &values).unwrap();
        assert_eq!(got, vec![1, 3]);
    }
}
