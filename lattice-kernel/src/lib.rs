//! Masked local operations and stream compaction over N-D arrays.
//!
//! Every operation in this crate is composed from three independent
//! capabilities chosen at the call site:
//!
//! - **No-data policy**: which input elements are valid, and how invalid
//!   output elements are flagged ([`InputNoDataPolicy`], [`OutputNoDataPolicy`])
//! - **Execution policy**: [`Sequential`], [`Parallel`], or the runtime-selected
//!   [`DynamicExecution`]
//! - **Algorithm**: a pure elementwise functor ([`UnaryAlgorithm`],
//!   [`BinaryAlgorithm`]) with optional domain/range checks, handled according
//!   to an [`ErrorPolicy`]
//!
//! The same algorithm produces identical output under every execution policy.
//!
//! # Primary API
//!
//! - [`unary_local_operation`], [`binary_local_operation`]: shape-preserving
//!   elementwise transforms
//! - [`compress`], [`compress_masked`], [`compress_to_vec`]: order-preserving
//!   stream compaction of the valid elements
//!
//! # Example
//!
//! ```rust
//! use lattice_kernel::{compress_masked, Parallel, SentinelDetector};
//!
//! let values = vec![99, 1, 2, 3, 4, 99, 6, 7, 8, 9];
//! let mut out = vec![0; values.len()];
//! let policy = SentinelDetector::new(&values, 99);
//!
//! let count = compress_masked(&policy, &Parallel::new(4).unwrap(), &values, &mut out).unwrap();
//! assert_eq!(count, 8);
//! assert_eq!(&out[..count], &[1, 2, 3, 4, 6, 7, 8, 9]);
//! ```
//!
//! # Features
//!
//! - `parallel` (default): run [`Parallel`] partitions on rayon worker threads.
//!   Without it, partitions are still formed identically but run in order on
//!   the calling thread.

mod algorithm;
pub mod algorithms;
mod compress;
pub mod config;
mod error_policy;
mod execution;
mod local_operation;
mod maybe_sync;
mod no_data;
pub mod partition;

pub use algorithm::{BinaryAlgorithm, UnaryAlgorithm};
pub use compress::{compress, compress_masked, compress_to_vec};
pub use config::{default_worker_count, hardware_concurrency};
pub use error_policy::{Discard, ErrorPolicy, FaultAction, Record, SkipCall};
pub use execution::{DynamicExecution, ExecutionPolicy, Parallel, Sequential};
pub use local_operation::{binary_local_operation, unary_local_operation, LocalOperationReport};
pub use maybe_sync::{MaybeSend, MaybeSendSync, MaybeSync};
pub use no_data::{
    InputNoDataPolicy, MarkNoDataByValue, MaskDetector, NoDataMask, NoMask, OutputNoDataPolicy,
    SentinelDetector,
};

pub use lattice_view::{
    ArrayError, ArrayShape, ArraySink, ArraySource, GridArray, GridView, GridViewMut,
};

/// Errors returned by kernel entry points.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KernelError {
    /// Invalid array arguments (shape, capacity, length).
    #[error(transparent)]
    Array(#[from] ArrayError),

    /// A parallel policy needs at least one worker.
    #[error("worker count must be at least 1")]
    ZeroWorkers,
}

/// Result type for kernel operations.
pub type Result<T> = std::result::Result<T, KernelError>;
