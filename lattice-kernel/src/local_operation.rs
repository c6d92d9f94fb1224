//! Shape-preserving elementwise operations.
//!
//! For every linear index the engine
//! 1. marks the output no-data (without calling the algorithm) when the input
//!    no-data policy rejects the index,
//! 2. applies the domain error policy,
//! 3. runs the algorithm and applies the range error policy to its result,
//! 4. writes the result.
//!
//! The output is split into one disjoint chunk per partition, so workers
//! never share an output element and no locking is involved. Output values
//! do not depend on the execution policy.

use std::iter::Sum;
use std::ops::{Add, Range};

use lattice_view::{ensure_same_shape, ArrayError, ArrayShape, ArraySink, ArraySource};
use tracing::{debug, trace};

use crate::algorithm::{BinaryAlgorithm, UnaryAlgorithm};
use crate::error_policy::{ErrorPolicy, FaultAction};
use crate::execution::ExecutionPolicy;
use crate::maybe_sync::{MaybeSend, MaybeSendSync, MaybeSync};
use crate::no_data::{InputNoDataPolicy, OutputNoDataPolicy};
use crate::partition::split_mut_by_ranges;
use crate::Result;

/// Per-call tally of elements that did not receive a computed result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalOperationReport {
    /// Inputs rejected by the input no-data policy.
    pub no_data: usize,
    /// Inputs outside the algorithm's domain (only counted when checked).
    pub domain_errors: usize,
    /// Results outside the algorithm's range (only counted when checked).
    pub range_errors: usize,
}

impl LocalOperationReport {
    pub fn faults(&self) -> usize {
        self.domain_errors + self.range_errors
    }

    /// No element was skipped or faulty.
    pub fn is_clean(&self) -> bool {
        self.no_data == 0 && self.faults() == 0
    }
}

impl Add for LocalOperationReport {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            no_data: self.no_data + rhs.no_data,
            domain_errors: self.domain_errors + rhs.domain_errors,
            range_errors: self.range_errors + rhs.range_errors,
        }
    }
}

impl Sum for LocalOperationReport {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Apply a unary algorithm to every element of `input`, writing `output`.
///
/// `input` and `output` must have the same shape, and both no-data policies
/// must cover that many elements; this is checked before any element is
/// touched. Output elements that are marked no-data or dropped by
/// [`SkipCall`](crate::SkipCall) keep whatever the output policy (or the
/// caller) left in them.
#[allow(clippy::too_many_arguments)]
pub fn unary_local_operation<A, R, Alg, DP, RP, IN, ON, E, Src, Dst>(
    algorithm: Alg,
    _domain_policy: DP,
    _range_policy: RP,
    input_no_data: &IN,
    output_no_data: &ON,
    execution: &E,
    input: &Src,
    output: &mut Dst,
) -> Result<LocalOperationReport>
where
    A: Copy + MaybeSendSync,
    R: MaybeSendSync,
    Alg: UnaryAlgorithm<A, R>,
    DP: ErrorPolicy,
    RP: ErrorPolicy,
    IN: InputNoDataPolicy + ?Sized,
    ON: OutputNoDataPolicy<R> + ?Sized,
    E: ExecutionPolicy,
    Src: ArraySource<A> + ArrayShape + ?Sized,
    Dst: ArraySink<R> + ArrayShape + ?Sized,
{
    ensure_same_shape(&input.shape(), &output.shape())?;
    let src = input.as_slice();
    input_no_data.check_extent(src.len())?;
    output_no_data.check_extent(src.len())?;
    let dst = output.as_mut_slice();
    debug!(
        len = src.len(),
        workers = execution.workers(),
        "unary local operation"
    );

    let report = run_partitioned(execution, dst, |index, slot, report| {
        let value = src[index];
        if IN::MASKS && !input_no_data.is_valid(index) {
            output_no_data.mark_no_data(index, slot);
            report.no_data += 1;
            return;
        }
        if let Some(action) = DP::ACTION {
            if !algorithm.within_domain(&value) {
                report.domain_errors += 1;
                resolve_fault(action, output_no_data, index, slot);
                return;
            }
        }
        let result = algorithm.apply(value);
        if let Some(action) = RP::ACTION {
            if !algorithm.within_range(&value, &result) {
                report.range_errors += 1;
                resolve_fault(action, output_no_data, index, slot);
                return;
            }
        }
        *slot = result;
    });

    trace!(?report, "unary local operation finished");
    Ok(report)
}

/// Apply a binary algorithm elementwise to `lhs` and `rhs`, writing `output`.
///
/// Each operand either has the output's shape or is a rank-0 scalar array,
/// which is broadcast to every index.
#[allow(clippy::too_many_arguments)]
pub fn binary_local_operation<A, B, R, Alg, DP, RP, IN, ON, E, Lhs, Rhs, Dst>(
    algorithm: Alg,
    _domain_policy: DP,
    _range_policy: RP,
    input_no_data: &IN,
    output_no_data: &ON,
    execution: &E,
    lhs: &Lhs,
    rhs: &Rhs,
    output: &mut Dst,
) -> Result<LocalOperationReport>
where
    A: Copy + MaybeSendSync,
    B: Copy + MaybeSendSync,
    R: MaybeSendSync,
    Alg: BinaryAlgorithm<A, B, R>,
    DP: ErrorPolicy,
    RP: ErrorPolicy,
    IN: InputNoDataPolicy + ?Sized,
    ON: OutputNoDataPolicy<R> + ?Sized,
    E: ExecutionPolicy,
    Lhs: ArraySource<A> + ArrayShape + ?Sized,
    Rhs: ArraySource<B> + ArrayShape + ?Sized,
    Dst: ArraySink<R> + ArrayShape + ?Sized,
{
    let shape = output.shape();
    let lhs = Operand::bind(lhs, &shape)?;
    let rhs = Operand::bind(rhs, &shape)?;
    let dst = output.as_mut_slice();
    input_no_data.check_extent(dst.len())?;
    output_no_data.check_extent(dst.len())?;
    debug!(
        len = dst.len(),
        workers = execution.workers(),
        "binary local operation"
    );

    let report = run_partitioned(execution, dst, |index, slot, report| {
        let (a, b) = (lhs.get(index), rhs.get(index));
        if IN::MASKS && !input_no_data.is_valid(index) {
            output_no_data.mark_no_data(index, slot);
            report.no_data += 1;
            return;
        }
        if let Some(action) = DP::ACTION {
            if !algorithm.within_domain(&a, &b) {
                report.domain_errors += 1;
                resolve_fault(action, output_no_data, index, slot);
                return;
            }
        }
        let result = algorithm.apply(a, b);
        if let Some(action) = RP::ACTION {
            if !algorithm.within_range(&a, &b, &result) {
                report.range_errors += 1;
                resolve_fault(action, output_no_data, index, slot);
                return;
            }
        }
        *slot = result;
    });

    trace!(?report, "binary local operation finished");
    Ok(report)
}

#[inline(always)]
fn resolve_fault<R, ON: OutputNoDataPolicy<R> + ?Sized>(
    action: FaultAction,
    output_no_data: &ON,
    index: usize,
    slot: &mut R,
) {
    if action == FaultAction::MarkNoData {
        output_no_data.mark_no_data(index, slot);
    }
}

/// Run `body(index, slot, report)` for every output element, one partition
/// per work item, and merge the partial reports in partition order.
fn run_partitioned<R, E, F>(execution: &E, dst: &mut [R], body: F) -> LocalOperationReport
where
    R: MaybeSend,
    E: ExecutionPolicy,
    F: Fn(usize, &mut R, &mut LocalOperationReport) + MaybeSync,
{
    let ranges = execution.partition(dst.len());
    let chunks = split_mut_by_ranges(dst, &ranges);
    let items: Vec<(Range<usize>, &mut [R])> = ranges.into_iter().zip(chunks).collect();
    execution
        .fork_join(items, |(range, chunk)| {
            let mut report = LocalOperationReport::default();
            for (index, slot) in range.zip(chunk.iter_mut()) {
                body(index, slot, &mut report);
            }
            report
        })
        .into_iter()
        .sum()
}

/// Operand of a binary operation: a full array or a broadcast scalar.
enum Operand<'a, T> {
    Scalar(T),
    Array(&'a [T]),
}

impl<'a, T: Copy> Operand<'a, T> {
    fn bind<S>(source: &'a S, shape: &[usize]) -> Result<Self>
    where
        S: ArraySource<T> + ArrayShape + ?Sized,
    {
        let source_shape = source.shape();
        if source_shape.is_empty() {
            return match source.as_slice() {
                [value] => Ok(Operand::Scalar(*value)),
                other => Err(ArrayError::LengthMismatch {
                    dims: Vec::new(),
                    expected: 1,
                    actual: other.len(),
                }
                .into()),
            };
        }
        ensure_same_shape(&source_shape, shape)?;
        Ok(Operand::Array(source.as_slice()))
    }

    #[inline(always)]
    fn get(&self, index: usize) -> T {
        match self {
            Operand::Scalar(value) => *value,
            Operand::Array(data) => data[index],
        }
    }
}
