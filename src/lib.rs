//! Access control and usage accounting for a multi-tenant API relay.
//!
//! [`gate::TokenGate`] validates bearer credentials, lazily retires expired or exhausted tokens,
//! and keeps quota debits atomic under concurrent traffic. [`provider`] resolves per-request
//! backend parameters before a call is forwarded.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod gate;
pub mod obs;
pub mod provider;
pub mod store;
pub mod task;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;
	pub use time::Duration;

	// self
	use crate::{
		auth::{NewToken, OwnerId, Token},
		gate::TokenGate,
		store::{MemoryStore, TokenStore},
		task::{BackgroundTasks, TaskQueue},
	};

	/// Builds an owner identifier, panicking on invalid fixtures.
	pub fn owner(value: u64) -> OwnerId {
		OwnerId::new(value).expect("Owner fixture should be a valid identifier.")
	}

	/// Constructs a [`TokenGate`] backed by an in-memory store and a manually drained task queue.
	pub fn build_queued_test_gate() -> (TokenGate, Arc<MemoryStore>, Arc<TaskQueue>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn TokenStore> = store_backend.clone();
		let queue = Arc::new(TaskQueue::default());
		let tasks: Arc<dyn BackgroundTasks> = queue.clone();

		(TokenGate::with_tasks(store, tasks), store_backend, queue)
	}

	/// Inserts a token fixture straight into the store, bypassing gate-level validation.
	pub async fn seed_token(store: &MemoryStore, draft: NewToken) -> Token {
		store.insert(draft).await.expect("Seeding a token fixture into the memory store should succeed.")
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use url;
#[cfg(test)] use color_eyre as _;
