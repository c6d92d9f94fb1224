//! Execution policies: how a batch of independent tasks is run.
//!
//! Each policy exposes a fork-join primitive: run one task per work item,
//! block until every task has finished, and hand back the results in item
//! order. Kernels build one work item per partition (see
//! [`partition_ranges`]), so results from different policies are merged in
//! exactly the same sequence.

use std::ops::Range;

use crate::config::default_worker_count;
use crate::maybe_sync::{MaybeSend, MaybeSync};
use crate::partition::partition_ranges;
use crate::{KernelError, Result};

/// Scheduling strategy for a batch operation.
pub trait ExecutionPolicy {
    /// Number of partitions the index space is split into.
    fn workers(&self) -> usize;

    /// Run `task` on every item and return the results in item order.
    ///
    /// Returns only after all tasks completed. A panicking task propagates
    /// to the caller.
    fn fork_join<I, R, F>(&self, items: Vec<I>, task: F) -> Vec<R>
    where
        I: MaybeSend,
        R: MaybeSend,
        F: Fn(I) -> R + MaybeSync;

    /// Contiguous partition of `[0, len)`, one range per worker.
    fn partition(&self, len: usize) -> Vec<Range<usize>> {
        partition_ranges(len, self.workers())
    }
}

/// Run everything on the calling thread, in order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sequential;

impl ExecutionPolicy for Sequential {
    #[inline]
    fn workers(&self) -> usize {
        1
    }

    fn fork_join<I, R, F>(&self, items: Vec<I>, task: F) -> Vec<R>
    where
        I: MaybeSend,
        R: MaybeSend,
        F: Fn(I) -> R + MaybeSync,
    {
        items.into_iter().map(task).collect()
    }
}

/// Split work into `workers` contiguous partitions processed concurrently.
///
/// Partitions are scheduled on the rayon pool; the worker count fixes how the
/// index space is divided, so results never depend on how many threads the
/// pool actually has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parallel {
    workers: usize,
}

impl Parallel {
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(KernelError::ZeroWorkers);
        }
        Ok(Self { workers })
    }
}

impl Default for Parallel {
    /// Uses [`default_worker_count`].
    fn default() -> Self {
        Self {
            workers: default_worker_count(),
        }
    }
}

impl ExecutionPolicy for Parallel {
    #[inline]
    fn workers(&self) -> usize {
        self.workers
    }

    fn fork_join<I, R, F>(&self, items: Vec<I>, task: F) -> Vec<R>
    where
        I: MaybeSend,
        R: MaybeSend,
        F: Fn(I) -> R + MaybeSync,
    {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            if items.len() > 1 {
                return items.into_par_iter().map(&task).collect();
            }
        }
        items.into_iter().map(task).collect()
    }
}

/// Execution policy chosen at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicExecution {
    Sequential(Sequential),
    Parallel(Parallel),
}

impl Default for DynamicExecution {
    fn default() -> Self {
        DynamicExecution::Sequential(Sequential)
    }
}

impl From<Sequential> for DynamicExecution {
    fn from(policy: Sequential) -> Self {
        DynamicExecution::Sequential(policy)
    }
}

impl From<Parallel> for DynamicExecution {
    fn from(policy: Parallel) -> Self {
        DynamicExecution::Parallel(policy)
    }
}

impl ExecutionPolicy for DynamicExecution {
    fn workers(&self) -> usize {
        match self {
            DynamicExecution::Sequential(policy) => policy.workers(),
            DynamicExecution::Parallel(policy) => policy.workers(),
        }
    }

    fn fork_join<I, R, F>(&self, items: Vec<I>, task: F) -> Vec<R>
    where
        I: MaybeSend,
        R: MaybeSend,
        F: Fn(I) -> R + MaybeSync,
    {
        match self {
            DynamicExecution::Sequential(policy) => policy.fork_join(items, task),
            DynamicExecution::Parallel(policy) => policy.fork_join(items, task),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_is_single_partition() {
        assert_eq!(Sequential.workers(), 1);
        assert_eq!(Sequential.partition(5), vec![0..5]);
    }

    #[test]
    fn test_parallel_rejects_zero_workers() {
        assert_eq!(Parallel::new(0).unwrap_err(), KernelError::ZeroWorkers);
        assert_eq!(Parallel::new(3).unwrap().workers(), 3);
    }

    #[test]
    fn test_parallel_default_has_workers() {
        assert!(Parallel::default().workers() >= 1);
    }

    #[test]
    fn test_fork_join_preserves_item_order() {
        let items: Vec<usize> = (0..64).collect();
        let expected: Vec<usize> = items.iter().map(|x| x * x).collect();

        let par = Parallel::new(8).unwrap();
        assert_eq!(par.fork_join(items.clone(), |x| x * x), expected);
        assert_eq!(Sequential.fork_join(items, |x| x * x), expected);
    }

    #[test]
    fn test_fork_join_with_disjoint_mutable_chunks() {
        let mut data = vec![0usize; 10];
        let par = Parallel::new(3).unwrap();
        let ranges = par.partition(data.len());
        let chunks = crate::partition::split_mut_by_ranges(&mut data, &ranges);
        let items: Vec<_> = ranges.into_iter().zip(chunks).collect();
        let sums = par.fork_join(items, |(range, chunk)| {
            for (i, slot) in range.zip(chunk.iter_mut()) {
                *slot = i;
            }
            chunk.iter().sum::<usize>()
        });
        assert_eq!(data, (0..10).collect::<Vec<_>>());
        assert_eq!(sums, vec![3, 12, 30]);
    }

    #[test]
    fn test_dynamic_forwards() {
        let dynamic: DynamicExecution = Parallel::new(4).unwrap().into();
        assert_eq!(dynamic.workers(), 4);
        assert_eq!(dynamic.partition(8), vec![0..2, 2..4, 4..6, 6..8]);

        let dynamic: DynamicExecution = Sequential.into();
        assert_eq!(dynamic.workers(), 1);
        assert_eq!(dynamic.fork_join(vec![1, 2, 3], |x| x + 1), vec![2, 3, 4]);
    }
}
