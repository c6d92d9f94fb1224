//! Domain and range error handling for local operations.
//!
//! A policy decides whether an algorithm's `within_domain`/`within_range`
//! check runs at all and what happens when it fails:
//!
//! | policy       | checks | on domain fault            | on range fault               |
//! |--------------|--------|----------------------------|------------------------------|
//! | [`Discard`]  | no     | algorithm runs             | result written               |
//! | [`Record`]   | yes    | output marked no-data      | output marked no-data        |
//! | [`SkipCall`] | yes    | algorithm skipped, slot untouched | result dropped, slot untouched |
//!
//! `Discard` is the default: the algorithm is trusted to write *something*
//! for every input.

use crate::maybe_sync::MaybeSendSync;

/// What a checking policy does with a faulty element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultAction {
    /// Flag the output element through the output no-data policy.
    MarkNoData,
    /// Leave the output element as it was.
    Skip,
}

/// Handling of domain or range faults.
pub trait ErrorPolicy: Copy + Default + MaybeSendSync {
    /// `None` disables the check.
    const ACTION: Option<FaultAction>;
}

/// No check: faults go unnoticed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Discard;

impl ErrorPolicy for Discard {
    const ACTION: Option<FaultAction> = None;
}

/// Check, and turn faults into no-data output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Record;

impl ErrorPolicy for Record {
    const ACTION: Option<FaultAction> = Some(FaultAction::MarkNoData);
}

/// Check, and drop the computation for faulty elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCall;

impl ErrorPolicy for SkipCall {
    const ACTION: Option<FaultAction> = Some(FaultAction::Skip);
}
