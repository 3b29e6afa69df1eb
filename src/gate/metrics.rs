// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for gate activity, available without the `metrics` feature.
#[derive(Debug, Default)]
pub struct GateMetrics {
	validations: AtomicU64,
	rejections: AtomicU64,
	touches_scheduled: AtomicU64,
	touches_recorded: AtomicU64,
	side_effect_failures: AtomicU64,
}
impl GateMetrics {
	/// Returns the total number of validation attempts.
	pub fn validations(&self) -> u64 {
		self.validations.load(Ordering::Relaxed)
	}

	/// Returns the number of validations rejected for credential reasons.
	pub fn rejections(&self) -> u64 {
		self.rejections.load(Ordering::Relaxed)
	}

	/// Returns the number of access touches handed to the background executor.
	pub fn touches_scheduled(&self) -> u64 {
		self.touches_scheduled.load(Ordering::Relaxed)
	}

	/// Returns the number of access touches that reached the store.
	pub fn touches_recorded(&self) -> u64 {
		self.touches_recorded.load(Ordering::Relaxed)
	}

	/// Returns the number of swallowed status-transition or touch write failures.
	pub fn side_effect_failures(&self) -> u64 {
		self.side_effect_failures.load(Ordering::Relaxed)
	}

	pub(crate) fn record_validation(&self) {
		self.validations.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_rejection(&self) {
		self.rejections.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_touch_scheduled(&self) {
		self.touches_scheduled.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_touch_recorded(&self) {
		self.touches_recorded.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_side_effect_failure(&self) {
		self.side_effect_failures.fetch_add(1, Ordering::Relaxed);
	}
}
