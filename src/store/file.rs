//! Simple file-backed [`TokenStore`] for lightweight single-node deployments.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{NewToken, OwnerId, Token, TokenId},
	store::{
		ObservedWrite, Page, SettingsPatch, StoreError, StoreFuture, TokenStore,
		memory::MemoryState,
	},
};

/// On-disk layout: the identifier sequence plus every record.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
	last_id: u64,
	tokens: Vec<Token>,
}

/// Persists relay tokens to a JSON file after each mutation.
///
/// Mutations hold the write lock while the snapshot is rewritten, so each trait operation
/// stays atomic for callers sharing the same [`FileStore`].
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<MemoryState>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let state = if path.exists() { Self::load_snapshot(&path)? } else { MemoryState::default() };

		Ok(Self { path, inner: Arc::new(RwLock::new(state)) })
	}

	fn load_snapshot(path: &Path) -> Result<MemoryState, StoreError> {
		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(MemoryState::default());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;
		let snapshot: Snapshot =
			serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		Ok(MemoryState::from_tokens(snapshot.last_id, snapshot.tokens))
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn persist_locked(&self, state: &MemoryState) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let snapshot =
			Snapshot { last_id: state.last_id, tokens: state.tokens.values().cloned().collect() };
		let serialized =
			serde_json::to_vec_pretty(&snapshot).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	/// Runs a mutation under the write lock and persists the snapshot when `changed` says so.
	fn mutate<T>(
		&self,
		op: impl FnOnce(&mut MemoryState) -> Result<T, StoreError>,
		changed: impl FnOnce(&T) -> bool,
	) -> Result<T, StoreError> {
		let mut guard = self.inner.write();
		let before = guard.clone();
		let outcome = op(&mut *guard)?;

		if changed(&outcome)
			&& let Err(e) = self.persist_locked(&guard)
		{
			*guard = before;

			return Err(e);
		}

		Ok(outcome)
	}
}
impl TokenStore for FileStore {
	fn insert(&self, draft: NewToken) -> StoreFuture<'_, Token> {
		Box::pin(async move { self.mutate(|state| state.insert(draft), |_| true) })
	}

	fn find_by_secret<'a>(&'a self, secret: &'a str) -> StoreFuture<'a, Option<Token>> {
		Box::pin(async move { Ok(self.inner.read().find_by_secret(secret)) })
	}

	fn find_by_id_and_owner(
		&self,
		id: TokenId,
		owner: OwnerId,
	) -> StoreFuture<'_, Option<Token>> {
		Box::pin(async move { Ok(self.inner.read().find_by_id_and_owner(id, owner)) })
	}

	fn list_by_owner(&self, owner: OwnerId, page: Page) -> StoreFuture<'_, Vec<Token>> {
		Box::pin(async move { Ok(self.inner.read().list_by_owner(owner, page)) })
	}

	fn search_by_owner<'a>(
		&'a self,
		owner: OwnerId,
		keyword: &'a str,
	) -> StoreFuture<'a, Vec<Token>> {
		Box::pin(async move { Ok(self.inner.read().search_by_owner(owner, keyword)) })
	}

	fn update_settings<'a>(
		&'a self,
		id: TokenId,
		owner: OwnerId,
		patch: &'a SettingsPatch,
	) -> StoreFuture<'a, Option<Token>> {
		Box::pin(async move {
			self.mutate(|state| Ok(state.update_settings(id, owner, patch)), Option::is_some)
		})
	}

	fn write_observed<'a>(
		&'a self,
		id: TokenId,
		write: &'a ObservedWrite,
	) -> StoreFuture<'a, bool> {
		Box::pin(async move { self.mutate(|state| Ok(state.write_observed(id, write)), |hit| *hit) })
	}

	fn adjust_quota(&self, id: TokenId, delta: i64) -> StoreFuture<'_, Option<i64>> {
		Box::pin(async move {
			self.mutate(|state| Ok(state.adjust_quota(id, delta)), Option::is_some)
		})
	}

	fn delete(&self, id: TokenId, owner: OwnerId) -> StoreFuture<'_, bool> {
		Box::pin(async move { self.mutate(|state| Ok(state.delete(id, owner)), |hit| *hit) })
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;
	use crate::auth::TokenStatus;

	fn temp_path() -> PathBuf {
		let unique = format!(
			"tollgate_file_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	fn draft(secret: &str) -> NewToken {
		Token::builder(OwnerId::new(3).expect("Failed to build owner fixture."))
			.name("bot")
			.secret(secret)
			.remaining_quota(25)
			.build()
			.expect("Failed to build file-store draft.")
	}

	#[test]
	fn save_and_reload_round_trip() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");
		let token =
			rt.block_on(store.insert(draft("file-secret"))).expect("Failed to insert draft.");

		rt.block_on(store.adjust_quota(token.id, -5)).expect("Failed to debit file store token.");
		rt.block_on(store.write_observed(token.id, &ObservedWrite::status(TokenStatus::Exhausted)))
			.expect("Failed to record status on file store token.");
		drop(store);

		let persisted = fs::read_to_string(&path).expect("Failed to read file store snapshot.");

		assert!(persisted.contains("\"status\": 4"), "Status should persist as its numeric code.");

		let reopened = FileStore::open(&path).expect("Failed to reopen file store snapshot.");
		let fetched = rt
			.block_on(reopened.find_by_secret("file-secret"))
			.expect("Failed to fetch fixture token from file store.")
			.expect("File store lost token after reopen.");

		assert_eq!(fetched.id, token.id);
		assert_eq!(fetched.remaining_quota, 20);
		assert_eq!(fetched.status, TokenStatus::Exhausted);

		let next = rt
			.block_on(reopened.insert(draft("file-secret-2")))
			.expect("Failed to insert after reopen.");

		assert!(next.id > token.id, "Identifier sequence must survive a reopen.");

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}

	#[test]
	fn duplicate_secret_is_rejected_without_touching_disk() {
		let path = temp_path();
		let store = FileStore::open(&path).expect("Failed to open file store snapshot.");
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.insert(draft("dup"))).expect("First insert should succeed.");

		let err = rt
			.block_on(store.insert(draft("dup")))
			.expect_err("Second insert with the same secret should conflict.");

		assert!(matches!(err, StoreError::Conflict { .. }));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary file store snapshot {}: {e}", path.display())
		});
	}
}
