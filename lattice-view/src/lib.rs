//! Rank-agnostic array views for the lattice kernels.
//!
//! Every array in this crate is a contiguous buffer traversed in row-major
//! order (last index varies fastest). Whatever the rank, element `i` of the
//! flat index space `[0, len)` is simply `data[i]`, which lets the kernels in
//! `lattice-kernel` treat 1-D, 2-D and N-D inputs uniformly.
//!
//! # Core Types
//!
//! - [`GridArray`]: Owned row-major array
//! - [`GridView`] / [`GridViewMut`]: Borrowed views over caller-supplied storage
//!
//! # Capabilities
//!
//! - [`ArrayShape`]: shape, element count, and linear index ↔ coordinate mapping
//! - [`ArraySource`]: read access to the contiguous elements
//! - [`ArraySink`]: write access to the contiguous elements
//!
//! `Vec<T>` and slices implement all three as rank-1 arrays, so plain
//! buffers can be passed wherever an array is expected.
//!
//! # Example
//!
//! ```rust
//! use lattice_view::{ArrayShape, GridArray};
//!
//! let grid = GridArray::from_vec(&[2, 3], vec![1, 2, 3, 4, 5, 6]).unwrap();
//! assert_eq!(grid.get(&[1, 0]), 4);
//! assert_eq!(grid.unravel(4).unwrap().as_slice(), &[1, 1]);
//! assert_eq!(grid.ravel(&[0, 2]).unwrap(), 2);
//! ```

pub mod view;

pub use view::{
    ensure_same_shape, ravel_index, total_len, unravel_index, ArrayShape, ArraySink, ArraySource,
    Dims, GridArray, GridView, GridViewMut,
};

/// Errors raised when an array is constructed or addressed inconsistently.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArrayError {
    /// Array ranks do not match.
    #[error("rank mismatch: {0} vs {1}")]
    RankMismatch(usize, usize),

    /// Array shapes are incompatible for the operation.
    #[error("shape mismatch: {0:?} vs {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// Buffer length differs from the product of the shape's extents.
    #[error("buffer of length {actual} does not match shape {dims:?} ({expected} elements)")]
    LengthMismatch {
        dims: Vec<usize>,
        expected: usize,
        actual: usize,
    },

    /// Output buffer cannot hold every element the operation may produce.
    #[error("output capacity {capacity} is smaller than the required {required} elements")]
    CapacityTooSmall { required: usize, capacity: usize },

    /// Linear index or coordinate outside the array.
    #[error("index {index} out of bounds for extent {extent}")]
    IndexOutOfBounds { index: usize, extent: usize },
}

/// Result type for array construction and indexing.
pub type Result<T> = std::result::Result<T, ArrayError>;
