//! Row-major array types and the flat-index capabilities shared by all of them.
//!
//! - [`GridArray`]: Owned row-major array
//! - [`GridView`]: Immutable view over a borrowed buffer
//! - [`GridViewMut`]: Mutable view over a borrowed buffer

use std::ops::{Index, IndexMut};
use std::sync::Arc;

use smallvec::SmallVec;

use crate::{ArrayError, Result};

/// Stack-allocated extents/coordinates.
/// 8 entries cover every rank the kernels see in practice.
pub type Dims = SmallVec<[usize; 8]>;

// ============================================================================
// Index helpers
// ============================================================================

/// Number of elements described by `dims`. Rank 0 is a scalar (one element).
#[inline]
pub fn total_len(dims: &[usize]) -> usize {
    dims.iter().product()
}

/// Map a linear row-major index to per-dimension coordinates.
pub fn unravel_index(dims: &[usize], index: usize) -> Result<Dims> {
    let len = total_len(dims);
    if index >= len {
        return Err(ArrayError::IndexOutOfBounds { index, extent: len });
    }
    let mut coords: Dims = SmallVec::from_elem(0, dims.len());
    let mut rest = index;
    for (coord, &extent) in coords.iter_mut().zip(dims.iter()).rev() {
        *coord = rest % extent;
        rest /= extent;
    }
    Ok(coords)
}

/// Map per-dimension coordinates to the linear row-major index.
pub fn ravel_index(dims: &[usize], coords: &[usize]) -> Result<usize> {
    if coords.len() != dims.len() {
        return Err(ArrayError::RankMismatch(coords.len(), dims.len()));
    }
    let mut index = 0usize;
    for (&coord, &extent) in coords.iter().zip(dims.iter()) {
        if coord >= extent {
            return Err(ArrayError::IndexOutOfBounds {
                index: coord,
                extent,
            });
        }
        index = index * extent + coord;
    }
    Ok(index)
}

pub fn ensure_same_shape(a: &[usize], b: &[usize]) -> Result<()> {
    if a.len() != b.len() {
        return Err(ArrayError::RankMismatch(a.len(), b.len()));
    }
    if a != b {
        return Err(ArrayError::ShapeMismatch(a.to_vec(), b.to_vec()));
    }
    Ok(())
}

fn check_len(dims: &[usize], actual: usize) -> Result<()> {
    let expected = total_len(dims);
    if expected != actual {
        return Err(ArrayError::LengthMismatch {
            dims: dims.to_vec(),
            expected,
            actual,
        });
    }
    Ok(())
}

// ============================================================================
// Capabilities
// ============================================================================

/// Shape of an array and the mapping between its flat index space and
/// row-major coordinates.
pub trait ArrayShape {
    /// Per-dimension extents.
    fn shape(&self) -> Dims;

    fn rank(&self) -> usize {
        self.shape().len()
    }

    /// Total number of elements.
    fn size(&self) -> usize {
        total_len(&self.shape())
    }

    fn unravel(&self, index: usize) -> Result<Dims> {
        unravel_index(&self.shape(), index)
    }

    fn ravel(&self, coords: &[usize]) -> Result<usize> {
        ravel_index(&self.shape(), coords)
    }
}

/// Read access to an array's elements in linear row-major order.
pub trait ArraySource<T> {
    fn as_slice(&self) -> &[T];
}

/// Write access to an array's elements in linear row-major order.
pub trait ArraySink<T> {
    fn as_mut_slice(&mut self) -> &mut [T];
}

impl<T> ArrayShape for [T] {
    fn shape(&self) -> Dims {
        SmallVec::from_slice(&[self.len()])
    }
}

impl<T> ArraySource<T> for [T] {
    fn as_slice(&self) -> &[T] {
        self
    }
}

impl<T> ArraySink<T> for [T] {
    fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }
}

impl<T> ArrayShape for Vec<T> {
    fn shape(&self) -> Dims {
        SmallVec::from_slice(&[self.len()])
    }
}

impl<T> ArraySource<T> for Vec<T> {
    fn as_slice(&self) -> &[T] {
        self
    }
}

impl<T> ArraySink<T> for Vec<T> {
    fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }
}

// ============================================================================
// GridView
// ============================================================================

/// Immutable row-major view over a borrowed buffer.
pub struct GridView<'a, T> {
    data: &'a [T],
    dims: Arc<[usize]>,
}

impl<T> Clone for GridView<'_, T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data,
            dims: self.dims.clone(),
        }
    }
}

impl<T> std::fmt::Debug for GridView<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridView")
            .field("dims", &self.dims)
            .field("len", &self.data.len())
            .finish()
    }
}

impl<'a, T> GridView<'a, T> {
    /// View `data` with the given extents. The buffer must hold exactly
    /// `dims.iter().product()` elements.
    pub fn new(data: &'a [T], dims: &[usize]) -> Result<Self> {
        check_len(dims, data.len())?;
        Ok(Self {
            data,
            dims: Arc::from(dims),
        })
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn data(&self) -> &'a [T] {
        self.data
    }
}

impl<T: Copy> GridView<'_, T> {
    /// Get an element by multi-dimensional index.
    pub fn get(&self, indices: &[usize]) -> T {
        match ravel_index(&self.dims, indices) {
            Ok(i) => self.data[i],
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T> ArrayShape for GridView<'_, T> {
    fn shape(&self) -> Dims {
        SmallVec::from_slice(&self.dims)
    }
}

impl<T> ArraySource<T> for GridView<'_, T> {
    fn as_slice(&self) -> &[T] {
        self.data
    }
}

// ============================================================================
// GridViewMut
// ============================================================================

/// Mutable row-major view over a borrowed buffer, typically caller-allocated
/// output storage.
pub struct GridViewMut<'a, T> {
    data: &'a mut [T],
    dims: Arc<[usize]>,
}

impl<T> std::fmt::Debug for GridViewMut<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridViewMut")
            .field("dims", &self.dims)
            .field("len", &self.data.len())
            .finish()
    }
}

impl<'a, T> GridViewMut<'a, T> {
    pub fn new(data: &'a mut [T], dims: &[usize]) -> Result<Self> {
        check_len(dims, data.len())?;
        Ok(Self {
            data,
            dims: Arc::from(dims),
        })
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn data(&self) -> &[T] {
        &*self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut *self.data
    }

    /// Reborrow as an immutable view.
    pub fn as_view(&self) -> GridView<'_, T> {
        GridView {
            data: &*self.data,
            dims: self.dims.clone(),
        }
    }
}

impl<T: Copy> GridViewMut<'_, T> {
    pub fn get(&self, indices: &[usize]) -> T {
        self.as_view().get(indices)
    }

    pub fn set(&mut self, indices: &[usize], value: T) {
        match ravel_index(&self.dims, indices) {
            Ok(i) => self.data[i] = value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T> ArrayShape for GridViewMut<'_, T> {
    fn shape(&self) -> Dims {
        SmallVec::from_slice(&self.dims)
    }
}

impl<T> ArraySource<T> for GridViewMut<'_, T> {
    fn as_slice(&self) -> &[T] {
        &*self.data
    }
}

impl<T> ArraySink<T> for GridViewMut<'_, T> {
    fn as_mut_slice(&mut self) -> &mut [T] {
        &mut *self.data
    }
}

// ============================================================================
// GridArray
// ============================================================================

/// Owned row-major multidimensional array.
///
/// The shape is fixed at construction; an empty shape (`&[]`) is a rank-0
/// scalar holding one element.
pub struct GridArray<T> {
    data: Vec<T>,
    dims: Arc<[usize]>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for GridArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridArray")
            .field("dims", &self.dims)
            .field("data", &self.data)
            .finish()
    }
}

impl<T: Clone> Clone for GridArray<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            dims: self.dims.clone(),
        }
    }
}

impl<T: PartialEq> PartialEq for GridArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.dims == other.dims && self.data == other.data
    }
}

impl<T: Clone + Default> GridArray<T> {
    /// Create an array filled with `T::default()`.
    pub fn row_major(dims: &[usize]) -> Self {
        Self::filled(dims, T::default())
    }
}

impl<T: Clone> GridArray<T> {
    /// Create an array with every element set to `value`.
    pub fn filled(dims: &[usize], value: T) -> Self {
        Self {
            data: vec![value; total_len(dims)],
            dims: Arc::from(dims),
        }
    }
}

impl<T> GridArray<T> {
    /// Take ownership of a row-major buffer.
    pub fn from_vec(dims: &[usize], data: Vec<T>) -> Result<Self> {
        check_len(dims, data.len())?;
        Ok(Self {
            data,
            dims: Arc::from(dims),
        })
    }

    /// Rank-0 array holding a single value.
    pub fn scalar(value: T) -> Self {
        Self {
            data: vec![value],
            dims: Arc::from(Vec::<usize>::new()),
        }
    }

    /// Create an array with values produced by a function.
    ///
    /// The function is called with indices in row-major iteration order.
    pub fn from_fn_row_major(dims: &[usize], mut f: impl FnMut(&[usize]) -> T) -> Self {
        let total = total_len(dims);
        let rank = dims.len();
        let mut data = Vec::with_capacity(total);
        let mut idx = vec![0usize; rank];
        for _ in 0..total {
            data.push(f(&idx));
            for d in (0..rank).rev() {
                idx[d] += 1;
                if idx[d] < dims[d] {
                    break;
                }
                idx[d] = 0;
            }
        }
        Self {
            data,
            dims: Arc::from(dims),
        }
    }

    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    pub fn view(&self) -> GridView<'_, T> {
        GridView {
            data: &self.data,
            dims: self.dims.clone(),
        }
    }

    pub fn view_mut(&mut self) -> GridViewMut<'_, T> {
        GridViewMut {
            data: &mut self.data,
            dims: self.dims.clone(),
        }
    }

    /// Iterate over all elements in row-major order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.data.iter_mut()
    }
}

impl<T: Copy> GridArray<T> {
    /// Get an element by multi-dimensional index.
    pub fn get(&self, indices: &[usize]) -> T {
        self[indices]
    }

    /// Set an element by multi-dimensional index.
    pub fn set(&mut self, indices: &[usize], value: T) {
        self[indices] = value;
    }
}

impl<T> Index<&[usize]> for GridArray<T> {
    type Output = T;

    fn index(&self, indices: &[usize]) -> &T {
        match ravel_index(&self.dims, indices) {
            Ok(i) => &self.data[i],
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T> IndexMut<&[usize]> for GridArray<T> {
    fn index_mut(&mut self, indices: &[usize]) -> &mut T {
        match ravel_index(&self.dims, indices) {
            Ok(i) => &mut self.data[i],
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T> ArrayShape for GridArray<T> {
    fn shape(&self) -> Dims {
        SmallVec::from_slice(&self.dims)
    }
}

impl<T> ArraySource<T> for GridArray<T> {
    fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T> ArraySink<T> for GridArray<T> {
    fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

// ============================================================================
// Tests
// ============================================================================
