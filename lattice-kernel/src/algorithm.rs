//! Elementwise algorithm traits.
//!
//! Algorithms are pure: the result depends only on the input element(s).
//! The `within_*` checks are only consulted when the caller's
//! [`ErrorPolicy`](crate::ErrorPolicy) asks for them. Any `Fn` closure is an
//! algorithm with no domain or range restriction.

use crate::maybe_sync::MaybeSync;

/// One input element to one output element.
pub trait UnaryAlgorithm<A, R>: MaybeSync {
    fn apply(&self, value: A) -> R;

    /// Whether `value` is inside the algorithm's domain.
    #[inline]
    fn within_domain(&self, _value: &A) -> bool {
        true
    }

    /// Whether `result`, computed from `value`, is representable.
    #[inline]
    fn within_range(&self, _value: &A, _result: &R) -> bool {
        true
    }
}

/// Two input elements to one output element.
pub trait BinaryAlgorithm<A, B, R>: MaybeSync {
    fn apply(&self, lhs: A, rhs: B) -> R;

    #[inline]
    fn within_domain(&self, _lhs: &A, _rhs: &B) -> bool {
        true
    }

    #[inline]
    fn within_range(&self, _lhs: &A, _rhs: &B, _result: &R) -> bool {
        true
    }
}

impl<A, R, F> UnaryAlgorithm<A, R> for F
where
    F: Fn(A) -> R + MaybeSync,
{
    #[inline(always)]
    fn apply(&self, value: A) -> R {
        self(value)
    }
}

impl<A, B, R, F> BinaryAlgorithm<A, B, R> for F
where
    F: Fn(A, B) -> R + MaybeSync,
{
    #[inline(always)]
    fn apply(&self, lhs: A, rhs: B) -> R {
        self(lhs, rhs)
    }
}
