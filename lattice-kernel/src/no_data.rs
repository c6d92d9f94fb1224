//! No-data policies.
//!
//! An input policy answers whether the element at a linear index holds a
//! valid value; an output policy flags output elements that could not be
//! computed. Both are consulted concurrently from every worker, always on
//! disjoint indices, so input policies are read-only and output policies
//! either write through the slot the engine hands them or flip a per-index
//! atomic flag.

use std::sync::atomic::{AtomicBool, Ordering};

use lattice_view::{ArrayError, ArrayShape, ArraySource};

use crate::maybe_sync::MaybeSync;

/// Validity of input elements.
pub trait InputNoDataPolicy: MaybeSync {
    /// `false` for policies that consider every element valid, letting the
    /// engines drop the per-element check entirely.
    const MASKS: bool = true;

    fn is_valid(&self, index: usize) -> bool;

    #[inline]
    fn is_no_data(&self, index: usize) -> bool {
        !self.is_valid(index)
    }

    /// Number of elements the policy can answer for, `None` if unbounded.
    fn extent(&self) -> Option<usize> {
        None
    }

    /// Fail unless the policy covers an array of `len` elements.
    fn check_extent(&self, len: usize) -> lattice_view::Result<()> {
        extent_matches(self.extent(), len)
    }
}

/// Flagging of output elements that hold no data.
pub trait OutputNoDataPolicy<R>: MaybeSync {
    /// Mark element `index`, whose storage is `slot`, as no-data.
    fn mark_no_data(&self, index: usize, slot: &mut R);

    /// Number of elements the policy can flag, `None` if unbounded.
    fn extent(&self) -> Option<usize> {
        None
    }

    /// Fail unless the policy covers an array of `len` elements.
    fn check_extent(&self, len: usize) -> lattice_view::Result<()> {
        extent_matches(self.extent(), len)
    }
}

fn extent_matches(extent: Option<usize>, len: usize) -> lattice_view::Result<()> {
    match extent {
        Some(actual) if actual != len => Err(ArrayError::LengthMismatch {
            dims: vec![len],
            expected: len,
            actual,
        }),
        _ => Ok(()),
    }
}

/// No masking: every input is valid and marking is a no-op.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoMask;

impl InputNoDataPolicy for NoMask {
    const MASKS: bool = false;

    #[inline(always)]
    fn is_valid(&self, _index: usize) -> bool {
        true
    }
}

impl<R> OutputNoDataPolicy<R> for NoMask {
    #[inline(always)]
    fn mark_no_data(&self, _index: usize, _slot: &mut R) {}
}

/// Elements equal to a sentinel value are no-data.
///
/// Bound to a rank-0 array, the sentinel test applies to every index,
/// matching how scalar operands broadcast. Any other array must have as many
/// elements as the arrays it is used with.
#[derive(Debug, Clone, Copy)]
pub struct SentinelDetector<'a, T> {
    data: &'a [T],
    sentinel: T,
    broadcast: bool,
}

impl<'a, T: Copy + PartialEq> SentinelDetector<'a, T> {
    pub fn new<A: ArraySource<T> + ArrayShape + ?Sized>(array: &'a A, sentinel: T) -> Self {
        Self {
            data: array.as_slice(),
            sentinel,
            broadcast: array.rank() == 0,
        }
    }

    pub fn sentinel(&self) -> T {
        self.sentinel
    }
}

impl<T: Copy + PartialEq + MaybeSync> InputNoDataPolicy for SentinelDetector<'_, T> {
    #[inline]
    fn is_valid(&self, index: usize) -> bool {
        let value = if self.broadcast {
            self.data[0]
        } else {
            self.data[index]
        };
        value != self.sentinel
    }

    fn extent(&self) -> Option<usize> {
        (!self.broadcast).then_some(self.data.len())
    }
}

/// Validity from a boolean mask where `true` means no-data.
#[derive(Debug, Clone, Copy)]
pub struct MaskDetector<'a> {
    mask: &'a [bool],
}

impl<'a> MaskDetector<'a> {
    pub fn new<A: ArraySource<bool> + ?Sized>(mask: &'a A) -> Self {
        Self {
            mask: mask.as_slice(),
        }
    }
}

impl InputNoDataPolicy for MaskDetector<'_> {
    #[inline]
    fn is_valid(&self, index: usize) -> bool {
        !self.mask[index]
    }

    fn extent(&self) -> Option<usize> {
        Some(self.mask.len())
    }
}

/// Writes a sentinel value into no-data output elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkNoDataByValue<R> {
    value: R,
}

impl<R: Copy> MarkNoDataByValue<R> {
    pub fn new(value: R) -> Self {
        Self { value }
    }
}

impl<R: Copy + MaybeSync> OutputNoDataPolicy<R> for MarkNoDataByValue<R> {
    #[inline]
    fn mark_no_data(&self, _index: usize, slot: &mut R) {
        *slot = self.value;
    }
}

/// Owned per-element no-data flags.
///
/// Usable as an output policy (marking sets the flag) and afterwards as an
/// input policy for a following operation.
#[derive(Debug, Default)]
pub struct NoDataMask {
    flags: Vec<AtomicBool>,
}

impl NoDataMask {
    /// Mask of `len` elements, all valid.
    pub fn new(len: usize) -> Self {
        Self {
            flags: (0..len).map(|_| AtomicBool::new(false)).collect(),
        }
    }

    pub fn from_flags(flags: &[bool]) -> Self {
        Self {
            flags: flags.iter().map(|&f| AtomicBool::new(f)).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    #[inline]
    pub fn is_marked(&self, index: usize) -> bool {
        self.flags[index].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn mark(&self, index: usize) {
        self.flags[index].store(true, Ordering::Relaxed);
    }

    /// Number of flagged elements.
    pub fn count(&self) -> usize {
        self.flags
            .iter()
            .filter(|f| f.load(Ordering::Relaxed))
            .count()
    }

    pub fn to_vec(&self) -> Vec<bool> {
        self.flags
            .iter()
            .map(|f| f.load(Ordering::Relaxed))
            .collect()
    }
}

impl Clone for NoDataMask {
    fn clone(&self) -> Self {
        Self::from_flags(&self.to_vec())
    }
}

impl InputNoDataPolicy for NoDataMask {
    #[inline]
    fn is_valid(&self, index: usize) -> bool {
        !self.is_marked(index)
    }

    fn extent(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<R> OutputNoDataPolicy<R> for NoDataMask {
    #[inline]
    fn mark_no_data(&self, index: usize, _slot: &mut R) {
        self.mark(index);
    }

    fn extent(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<P: InputNoDataPolicy + ?Sized> InputNoDataPolicy for &P {
    const MASKS: bool = P::MASKS;

    #[inline]
    fn is_valid(&self, index: usize) -> bool {
        (**self).is_valid(index)
    }

    fn extent(&self) -> Option<usize> {
        (**self).extent()
    }

    fn check_extent(&self, len: usize) -> lattice_view::Result<()> {
        (**self).check_extent(len)
    }
}

impl<R, P: OutputNoDataPolicy<R> + ?Sized> OutputNoDataPolicy<R> for &P {
    #[inline]
    fn mark_no_data(&self, index: usize, slot: &mut R) {
        (**self).mark_no_data(index, slot);
    }

    fn extent(&self) -> Option<usize> {
        (**self).extent()
    }

    fn check_extent(&self, len: usize) -> lattice_view::Result<()> {
        (**self).check_extent(len)
    }
}

/// An element is valid only if both policies consider it valid.
impl<A: InputNoDataPolicy, B: InputNoDataPolicy> InputNoDataPolicy for (A, B) {
    const MASKS: bool = A::MASKS || B::MASKS;

    #[inline]
    fn is_valid(&self, index: usize) -> bool {
        (!A::MASKS || self.0.is_valid(index)) && (!B::MASKS || self.1.is_valid(index))
    }

    fn check_extent(&self, len: usize) -> lattice_view::Result<()> {
        self.0.check_extent(len)?;
        self.1.check_extent(len)
    }
}

/// Marks through both policies.
impl<R, A: OutputNoDataPolicy<R>, B: OutputNoDataPolicy<R>> OutputNoDataPolicy<R> for (A, B) {
    #[inline]
    fn mark_no_data(&self, index: usize, slot: &mut R) {
        self.0.mark_no_data(index, slot);
        self.1.mark_no_data(index, slot);
    }

    fn check_extent(&self, len: usize) -> lattice_view::Result<()> {
        self.0.check_extent(len)?;
        self.1.check_extent(len)
    }
}
