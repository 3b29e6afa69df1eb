//! Best-effort background work that must never block or fail the request path.
//!
//! A dispatched task is attempted at most once. Its outcome is not reported back to the
//! dispatcher; tasks log their own failures through [`obs`](crate::obs) before finishing.

// self
use crate::_prelude::*;

/// Detached unit of work handed to a [`BackgroundTasks`] executor.
pub type BackgroundFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Executor contract for fire-and-forget side effects.
pub trait BackgroundTasks
where
	Self: Send + Sync,
{
	/// Hands `task` off for independent execution and returns immediately.
	///
	/// `label` names the work in logs. Implementations may drop the task (and must log it) when
	/// they cannot run it, but must never run it twice.
	fn dispatch(&self, label: &'static str, task: BackgroundFuture);
}

/// Spawns tasks onto the ambient Tokio runtime.
#[cfg(feature = "tokio")]
#[derive(Clone, Debug, Default)]
pub struct TokioTasks {
	handle: Option<tokio::runtime::Handle>,
}
#[cfg(feature = "tokio")]
impl TokioTasks {
	/// Pins task execution to a specific runtime instead of the caller's ambient one.
	pub fn with_handle(handle: tokio::runtime::Handle) -> Self {
		Self { handle: Some(handle) }
	}
}
#[cfg(feature = "tokio")]
impl BackgroundTasks for TokioTasks {
	fn dispatch(&self, label: &'static str, task: BackgroundFuture) {
		let handle = match &self.handle {
			Some(handle) => handle.clone(),
			None => match tokio::runtime::Handle::try_current() {
				Ok(handle) => handle,
				Err(_) => {
					crate::obs::report_dropped_task(label);

					return;
				},
			},
		};

		drop(handle.spawn(task));
	}
}

/// In-process FIFO queue drained explicitly by its owner.
///
/// Useful for single-threaded hosts that flush bookkeeping between requests, and for tests that
/// need deterministic control over when side effects land.
#[derive(Default)]
pub struct TaskQueue {
	pending: Mutex<Vec<(&'static str, BackgroundFuture)>>,
}
impl TaskQueue {
	/// Number of tasks waiting to run.
	pub fn len(&self) -> usize {
		self.pending.lock().len()
	}

	/// Returns `true` if nothing is queued.
	pub fn is_empty(&self) -> bool {
		self.pending.lock().is_empty()
	}

	/// Labels of the queued tasks, oldest first.
	pub fn labels(&self) -> Vec<&'static str> {
		self.pending.lock().iter().map(|(label, _)| *label).collect()
	}

	/// Runs every queued task to completion, oldest first, and returns how many ran.
	///
	/// Tasks dispatched while draining are picked up by the same call.
	pub async fn run_pending(&self) -> usize {
		let mut ran = 0;

		loop {
			let batch = std::mem::take(&mut *self.pending.lock());

			if batch.is_empty() {
				return ran;
			}

			for (_, task) in batch {
				task.await;

				ran += 1;
			}
		}
	}

	/// Discards every queued task without running it.
	pub fn clear(&self) -> usize {
		let dropped = std::mem::take(&mut *self.pending.lock());

		dropped.len()
	}
}
impl BackgroundTasks for TaskQueue {
	fn dispatch(&self, label: &'static str, task: BackgroundFuture) {
		self.pending.lock().push((label, task));
	}
}
impl Debug for TaskQueue {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TaskQueue").field("pending", &self.len()).finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;

	fn counting_task(counter: &Arc<AtomicUsize>) -> BackgroundFuture {
		let counter = counter.clone();

		Box::pin(async move {
			counter.fetch_add(1, Ordering::SeqCst);
		})
	}

	#[tokio::test]
	async fn queue_defers_until_drained() {
		let queue = TaskQueue::default();
		let counter = Arc::new(AtomicUsize::new(0));

		queue.dispatch("first", counting_task(&counter));
		queue.dispatch("second", counting_task(&counter));

		assert_eq!(counter.load(Ordering::SeqCst), 0);
		assert_eq!(queue.labels(), vec!["first", "second"]);
		assert_eq!(queue.run_pending().await, 2);
		assert_eq!(counter.load(Ordering::SeqCst), 2);
		assert!(queue.is_empty());
		assert_eq!(queue.run_pending().await, 0, "Tasks must run at most once.");
	}

	#[test]
	fn clear_drops_without_running() {
		let queue = TaskQueue::default();
		let counter = Arc::new(AtomicUsize::new(0));

		queue.dispatch("dropped", counting_task(&counter));

		assert_eq!(queue.clear(), 1);
		assert_eq!(counter.load(Ordering::SeqCst), 0);
	}

	#[cfg(feature = "tokio")]
	#[tokio::test]
	async fn tokio_tasks_run_detached() {
		let counter = Arc::new(AtomicUsize::new(0));
		let (tx, rx) = tokio::sync::oneshot::channel();
		let observed = counter.clone();

		TokioTasks::default().dispatch(
			"detached",
			Box::pin(async move {
				observed.fetch_add(1, Ordering::SeqCst);

				let _ = tx.send(());
			}),
		);

		rx.await.expect("Detached task should signal completion.");

		assert_eq!(counter.load(Ordering::SeqCst), 1);
	}

	#[cfg(feature = "tokio")]
	#[test]
	fn tokio_tasks_drop_work_outside_a_runtime() {
		let counter = Arc::new(AtomicUsize::new(0));

		TokioTasks::default().dispatch("orphan", counting_task(&counter));

		assert_eq!(counter.load(Ordering::SeqCst), 0);
	}

	#[cfg(feature = "tokio")]
	#[test]
	fn pinned_handle_runs_work_without_an_ambient_runtime() {
		let runtime = tokio::runtime::Builder::new_multi_thread()
			.worker_threads(1)
			.build()
			.expect("Failed to build Tokio runtime for pinned task test.");
		let (tx, rx) = std::sync::mpsc::channel();

		TokioTasks::with_handle(runtime.handle().clone()).dispatch(
			"pinned",
			Box::pin(async move {
				let _ = tx.send("ran");
			}),
		);

		assert_eq!(
			rx.recv_timeout(std::time::Duration::from_secs(5)),
			Ok("ran"),
			"Pinned runtime should execute the task."
		);
	}
}
