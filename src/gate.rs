//! The gate facade: credential validation, quota accounting, access recording, and owner-scoped
//! token management over an injected [`TokenStore`].

pub mod ledger;
pub mod manage;
pub mod recorder;
pub mod validate;

mod metrics;

pub use metrics::GateMetrics;
pub use recorder::AccessRecorder;

// self
use crate::{
	_prelude::*,
	config::GateSettings,
	store::TokenStore,
	task::BackgroundTasks,
};
#[cfg(feature = "tokio")] use crate::task::TokioTasks;

/// Coordinates every gate operation against a single token store.
///
/// The gate owns the store handle, the executor used for fire-and-forget bookkeeping, the
/// settings, and the shared counters, so individual operations only carry their own logic.
/// The gate itself holds no locks; every mutation that must be atomic is a single store call.
#[derive(Clone)]
pub struct TokenGate {
	/// Token store shared by every operation.
	pub store: Arc<dyn TokenStore>,
	/// Executor that runs access touches off the request path.
	pub tasks: Arc<dyn BackgroundTasks>,
	/// Gate tunables.
	pub settings: GateSettings,
	/// Shared activity counters.
	pub metrics: Arc<GateMetrics>,
}
impl TokenGate {
	/// Creates a gate that dispatches background work through `tasks`.
	pub fn with_tasks(store: Arc<dyn TokenStore>, tasks: Arc<dyn BackgroundTasks>) -> Self {
		Self { store, tasks, settings: GateSettings::default(), metrics: Default::default() }
	}

	/// Replaces the settings.
	pub fn with_settings(mut self, settings: GateSettings) -> Self {
		self.settings = settings;

		self
	}

	/// Access recorder bound to this gate's store, executor, and counters.
	pub fn recorder(&self) -> AccessRecorder {
		AccessRecorder::new(self.store.clone(), self.tasks.clone(), self.metrics.clone())
	}
}
#[cfg(feature = "tokio")]
impl TokenGate {
	/// Creates a gate whose background work is spawned on the ambient Tokio runtime.
	pub fn new(store: Arc<dyn TokenStore>) -> Self {
		Self::with_tasks(store, Arc::new(TokioTasks::default()))
	}
}
impl Debug for TokenGate {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenGate")
			.field("settings", &self.settings)
			.field("metrics", &self.metrics)
			.finish()
	}
}
