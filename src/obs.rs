//! Optional observability helpers for gate operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `tollgate.op` with the `op` and `stage`
//!   fields, plus events for rejected credentials and swallowed side-effect failures (the
//!   operator channel).
//! - Enable `metrics` to increment the `tollgate_op_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`, and
//!   `tollgate_side_effect_failure_total` labeled by `op`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Gate operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Credential validation.
	Validate,
	/// Lazy status transition recorded during validation.
	Transition,
	/// Access recency touch.
	Touch,
	/// Quota debit.
	Decrement,
	/// Quota credit.
	TopUp,
	/// Owner-facing token management.
	Manage,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::Validate => "validate",
			OpKind::Transition => "transition",
			OpKind::Touch => "touch",
			OpKind::Decrement => "decrement",
			OpKind::TopUp => "top_up",
			OpKind::Manage => "manage",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to a gate operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
