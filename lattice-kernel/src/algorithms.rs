//! Reference elementwise algorithms.
//!
//! Small functors that plug into [`unary_local_operation`] and
//! [`binary_local_operation`], each declaring its own domain and range.

use std::marker::PhantomData;

use lattice_view::{ArrayShape, ArraySink, ArraySource};
use num_traits::{CheckedAdd, CheckedNeg, Float, NumCast, Signed, WrappingAdd, WrappingNeg};

use crate::algorithm::{BinaryAlgorithm, UnaryAlgorithm};
use crate::error_policy::Discard;
use crate::execution::ExecutionPolicy;
use crate::local_operation::{binary_local_operation, unary_local_operation, LocalOperationReport};
use crate::maybe_sync::MaybeSendSync;
use crate::no_data::{InputNoDataPolicy, OutputNoDataPolicy};
use crate::Result;

/// Round towards negative infinity. Defined everywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Floor;

impl<T: Float> UnaryAlgorithm<T, T> for Floor {
    #[inline]
    fn apply(&self, value: T) -> T {
        value.floor()
    }
}

/// Square root. Domain: `value >= 0` (NaN is outside).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sqrt;

impl<T: Float> UnaryAlgorithm<T, T> for Sqrt {
    #[inline]
    fn apply(&self, value: T) -> T {
        value.sqrt()
    }

    #[inline]
    fn within_domain(&self, value: &T) -> bool {
        *value >= T::zero()
    }
}

/// Absolute value of a signed integer. Range: the type's minimum has no
/// positive counterpart.
///
/// Out-of-range values wrap back to the minimum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Abs;

impl<T: Signed + CheckedNeg + WrappingNeg> UnaryAlgorithm<T, T> for Abs {
    #[inline]
    fn apply(&self, value: T) -> T {
        if value.is_negative() {
            value.wrapping_neg()
        } else {
            value
        }
    }

    #[inline]
    fn within_range(&self, value: &T, _result: &T) -> bool {
        !value.is_negative() || value.checked_neg().is_some()
    }
}

/// Integer addition. Range: the exact sum fits the type.
///
/// Out-of-range sums wrap, so unchecked callers still get a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Add;

impl<T: CheckedAdd + WrappingAdd> BinaryAlgorithm<T, T, T> for Add {
    #[inline]
    fn apply(&self, lhs: T, rhs: T) -> T {
        lhs.wrapping_add(&rhs)
    }

    #[inline]
    fn within_range(&self, lhs: &T, rhs: &T, _result: &T) -> bool {
        lhs.checked_add(rhs).is_some()
    }
}

/// Numeric conversion to `R`. Range: the value is representable in `R`.
///
/// Unrepresentable values convert to `R::default()`.
pub struct Cast<R>(PhantomData<fn() -> R>);

impl<R> Cast<R> {
    pub fn new() -> Self {
        Cast(PhantomData)
    }
}

impl<R> Default for Cast<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for Cast<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Cast<R> {}

impl<R> std::fmt::Debug for Cast<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Cast<{}>", std::any::type_name::<R>())
    }
}

impl<A: NumCast + Copy, R: NumCast + Default> UnaryAlgorithm<A, R> for Cast<R> {
    #[inline]
    fn apply(&self, value: A) -> R {
        num_traits::cast(value).unwrap_or_default()
    }

    #[inline]
    fn within_range(&self, value: &A, _result: &R) -> bool {
        num_traits::cast::<A, R>(*value).is_some()
    }
}

/// Floor of every element, with faults discarded.
pub fn floor<T, IN, ON, E, Src, Dst>(
    input_no_data: &IN,
    output_no_data: &ON,
    execution: &E,
    input: &Src,
    output: &mut Dst,
) -> Result<LocalOperationReport>
where
    T: Float + MaybeSendSync,
    IN: InputNoDataPolicy + ?Sized,
    ON: OutputNoDataPolicy<T> + ?Sized,
    E: ExecutionPolicy,
    Src: ArraySource<T> + ArrayShape + ?Sized,
    Dst: ArraySink<T> + ArrayShape + ?Sized,
{
    unary_local_operation(
        Floor,
        Discard,
        Discard,
        input_no_data,
        output_no_data,
        execution,
        input,
        output,
    )
}

/// Elementwise integer sum, with faults discarded (sums wrap).
pub fn add<T, IN, ON, E, Lhs, Rhs, Dst>(
    input_no_data: &IN,
    output_no_data: &ON,
    execution: &E,
    lhs: &Lhs,
    rhs: &Rhs,
    output: &mut Dst,
) -> Result<LocalOperationReport>
where
    T: CheckedAdd + WrappingAdd + Copy + MaybeSendSync,
    IN: InputNoDataPolicy + ?Sized,
    ON: OutputNoDataPolicy<T> + ?Sized,
    E: ExecutionPolicy,
    Lhs: ArraySource<T> + ArrayShape + ?Sized,
    Rhs: ArraySource<T> + ArrayShape + ?Sized,
    Dst: ArraySink<T> + ArrayShape + ?Sized,
{
    binary_local_operation(
        Add,
        Discard,
        Discard,
        input_no_data,
        output_no_data,
        execution,
        lhs,
        rhs,
        output,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_policy::Record;
    use crate::execution::{Parallel, Sequential};
    use crate::no_data::{MarkNoDataByValue, NoDataMask, NoMask};
    use approx::assert_relative_eq;
    use lattice_view::GridArray;

    #[test]
    fn test_floor_values() {
        let input = GridArray::from_vec(&[2, 3], vec![1.5, -1.5, 0.0, 2.999, -0.1, 7.0]).unwrap();
        let mut output = GridArray::<f64>::row_major(&[2, 3]);
        let report = floor(
            &NoMask,
            &NoMask,
            &Parallel::new(2).unwrap(),
            &input,
            &mut output,
        )
        .unwrap();
        assert!(report.is_clean());
        for (got, want) in output.iter().zip([1.0, -2.0, 0.0, 2.0, -1.0, 7.0]) {
            assert_relative_eq!(*got, want);
        }
    }

    #[test]
    fn test_sqrt_domain_recorded() {
        let input = vec![4.0f32, -1.0, 9.0];
        let mask = NoDataMask::new(3);
        let mut output = vec![0.0f32; 3];
        let report = unary_local_operation(
            Sqrt,
            Record,
            Discard,
            &NoMask,
            &mask,
            &Sequential,
            &input,
            &mut output,
        )
        .unwrap();
        assert_eq!(report.domain_errors, 1);
        assert_eq!(mask.to_vec(), vec![false, true, false]);
        assert_relative_eq!(output[0], 2.0);
        assert_relative_eq!(output[2], 3.0);
    }

    #[test]
    fn test_abs_minimum_out_of_range() {
        let input = vec![-5i32, 0, i32::MIN, 7];
        let marker = MarkNoDataByValue::new(-1);
        let mut output = vec![0i32; 4];
        let report = unary_local_operation(
            Abs,
            Discard,
            Record,
            &NoMask,
            &marker,
            &Parallel::new(2).unwrap(),
            &input,
            &mut output,
        )
        .unwrap();
        assert_eq!(report.range_errors, 1);
        assert_eq!(output, vec![5, 0, -1, 7]);

        let mut unchecked = vec![0i32; 4];
        unary_local_operation(
            Abs,
            Discard,
            Discard,
            &NoMask,
            &NoMask,
            &Sequential,
            &input,
            &mut unchecked,
        )
        .unwrap();
        assert_eq!(unchecked, vec![5, 0, i32::MIN, 7]);
    }

    #[test]
    fn test_add_range_recorded() {
        let lhs = vec![i8::MAX, 1, -100];
        let rhs = vec![1i8, 2, -100];
        let mask = NoDataMask::new(3);
        let mut output = vec![0i8; 3];
        let report = binary_local_operation(
            Add,
            Discard,
            Record,
            &NoMask,
            &mask,
            &Sequential,
            &lhs,
            &rhs,
            &mut output,
        )
        .unwrap();
        assert_eq!(report.range_errors, 2);
        assert_eq!(mask.to_vec(), vec![true, false, true]);
        assert_eq!(output[1], 3);
    }

    #[test]
    fn test_add_discard_wraps() {
        let lhs = vec![i16::MAX];
        let rhs = GridArray::scalar(1i16);
        let mut output = vec![0i16];
        add(&NoMask, &NoMask, &Sequential, &lhs, &rhs, &mut output).unwrap();
        assert_eq!(output[0], i16::MIN);
    }

    #[test]
    fn test_cast_range() {
        let input = vec![1.9f64, 300.0, -5.0, f64::NAN];
        let mut output = vec![7u8; 4];
        let report = unary_local_operation(
            Cast::<u8>::new(),
            Discard,
            Record,
            &NoMask,
            &NoMask,
            &Parallel::new(2).unwrap(),
            &input,
            &mut output,
        )
        .unwrap();
        assert_eq!(report.range_errors, 3);
        assert_eq!(output, vec![1, 7, 7, 7]);
    }
}
