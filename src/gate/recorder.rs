//! Best-effort access recency bookkeeping, decoupled from the validation path.

// self
use crate::{
	_prelude::*,
	auth::{Token, TokenId},
	gate::GateMetrics,
	obs::{self, OpKind},
	store::{ObservedWrite, TokenStore},
	task::BackgroundTasks,
};

/// Records `last_accessed_at` for successfully validated tokens.
///
/// Touches go through [`TokenStore::write_observed`] and only list the access instant. The
/// token's status is never part of the write: the copy held here may be stale, and writing it
/// back could revive a token another request has just retired.
#[derive(Clone)]
pub struct AccessRecorder {
	store: Arc<dyn TokenStore>,
	tasks: Arc<dyn BackgroundTasks>,
	metrics: Arc<GateMetrics>,
}
impl AccessRecorder {
	const TASK_LABEL: &'static str = "tollgate.touch";

	/// Creates a recorder over the provided store and executor.
	pub fn new(
		store: Arc<dyn TokenStore>,
		tasks: Arc<dyn BackgroundTasks>,
		metrics: Arc<GateMetrics>,
	) -> Self {
		Self { store, tasks, metrics }
	}

	/// Writes the access instant now and reports whether it landed.
	///
	/// Failures are sent to the operator channel and reported as `false`; they are never
	/// returned to the caller.
	pub async fn touch(&self, token: &Token, instant: OffsetDateTime) -> bool {
		Self::touch_id(&self.store, &self.metrics, token.id, instant).await
	}

	/// Dispatches a touch as a detached background task and returns immediately.
	pub fn schedule(&self, token: &Token, instant: OffsetDateTime) {
		let store = self.store.clone();
		let metrics = self.metrics.clone();
		let id = token.id;

		self.metrics.record_touch_scheduled();
		self.tasks.dispatch(
			Self::TASK_LABEL,
			Box::pin(async move {
				Self::touch_id(&store, &metrics, id, instant).await;
			}),
		);
	}

	async fn touch_id(
		store: &Arc<dyn TokenStore>,
		metrics: &GateMetrics,
		id: TokenId,
		instant: OffsetDateTime,
	) -> bool {
		let write = ObservedWrite::accessed_at(instant);

		match store.write_observed(id, &write).await {
			Ok(true) => {
				metrics.record_touch_recorded();

				true
			},
			// Deleted between validation and the touch; nothing left to record.
			Ok(false) => false,
			Err(e) => {
				metrics.record_side_effect_failure();
				obs::report_side_effect_failure(OpKind::Touch, id, &e);

				false
			},
		}
	}
}
impl Debug for AccessRecorder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("AccessRecorder(..)")
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;
	use crate::{
		auth::{OwnerId, TokenStatus},
		store::MemoryStore,
		task::TaskQueue,
	};

	async fn seeded() -> (AccessRecorder, Arc<MemoryStore>, Arc<TaskQueue>, Arc<GateMetrics>, Token)
	{
		let backend = Arc::new(MemoryStore::default());
		let queue = Arc::new(TaskQueue::default());
		let metrics = Arc::new(GateMetrics::default());
		let token = backend
			.insert(
				Token::builder(OwnerId::new(1).expect("Owner fixture should be valid."))
					.remaining_quota(3)
					.created_at(macros::datetime!(2025-01-01 00:00 UTC))
					.build()
					.expect("Token fixture should build."),
			)
			.await
			.expect("Seeding the recorder fixture should succeed.");
		let recorder = AccessRecorder::new(backend.clone(), queue.clone(), metrics.clone());

		(recorder, backend, queue, metrics, token)
	}

	#[tokio::test]
	async fn scheduled_touch_lands_only_when_the_executor_runs_it() {
		let (recorder, backend, queue, metrics, token) = seeded().await;
		let instant = macros::datetime!(2025-02-01 12:00 UTC);

		recorder.schedule(&token, instant);

		assert_eq!(metrics.touches_scheduled(), 1);
		assert_eq!(
			backend.snapshot(token.id).map(|t| t.last_accessed_at),
			Some(macros::datetime!(2025-01-01 00:00 UTC))
		);

		queue.run_pending().await;

		assert_eq!(backend.snapshot(token.id).map(|t| t.last_accessed_at), Some(instant));
		assert_eq!(metrics.touches_recorded(), 1);
	}

	#[tokio::test]
	async fn touch_never_rewrites_status() {
		let (recorder, backend, _queue, _metrics, token) = seeded().await;

		backend
			.write_observed(token.id, &ObservedWrite::status(TokenStatus::Exhausted))
			.await
			.expect("Recording the exhausted status should succeed.");

		assert!(recorder.touch(&token, macros::datetime!(2025-03-01 00:00 UTC)).await);
		assert_eq!(backend.snapshot(token.id).map(|t| t.status), Some(TokenStatus::Exhausted));
	}

	#[tokio::test]
	async fn touch_on_deleted_token_is_a_quiet_miss() {
		let (recorder, backend, _queue, metrics, token) = seeded().await;

		assert!(backend.delete(token.id, token.owner).await.expect("Delete should succeed."));
		assert!(!recorder.touch(&token, OffsetDateTime::now_utc()).await);
		assert_eq!(metrics.side_effect_failures(), 0);
	}
}
