// crates.io
use time::macros;
// self
use tollgate::{
	auth::{Expiry, NewToken, OwnerId, Token, TokenStatus},
	store::{MemoryStore, ObservedWrite, Page, SettingsPatch, StoreError, TokenStore},
};

fn owner(value: u64) -> OwnerId {
	OwnerId::new(value).expect("Owner fixture should be a valid identifier.")
}

fn draft(owner_id: u64, name: &str, secret: &str) -> NewToken {
	Token::builder(owner(owner_id))
		.name(name)
		.secret(secret)
		.remaining_quota(50)
		.created_at(macros::datetime!(2025-11-10 12:00 UTC))
		.build()
		.expect("Token draft fixture should build successfully.")
}

#[tokio::test]
async fn insert_assigns_sequential_ids_and_rejects_duplicate_secrets() {
	let store = MemoryStore::default();
	let first = store.insert(draft(1, "a", "secret-a")).await.expect("First insert should succeed.");
	let second =
		store.insert(draft(1, "b", "secret-b")).await.expect("Second insert should succeed.");

	assert_eq!(first.id.get(), 1);
	assert_eq!(second.id.get(), 2);

	let err = store
		.insert(draft(2, "c", "secret-a"))
		.await
		.expect_err("Reusing a secret must be rejected.");

	assert!(matches!(err, StoreError::Conflict { .. }));
	assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn lookups_respect_ownership() {
	let store = MemoryStore::default();
	let token = store.insert(draft(9, "ops", "secret-ops")).await.expect("Insert should succeed.");

	assert_eq!(
		store.find_by_secret("secret-ops").await.expect("Lookup should succeed.").map(|t| t.id),
		Some(token.id)
	);
	assert!(store.find_by_secret("secret-op").await.expect("Lookup should succeed.").is_none());
	assert!(
		store.find_by_id_and_owner(token.id, owner(3)).await.expect("Lookup should succeed.").is_none()
	);
	assert!(!store.delete(token.id, owner(3)).await.expect("Delete should not error."));
	assert!(store.delete(token.id, owner(9)).await.expect("Delete should succeed."));
	assert!(store.find_by_secret("secret-ops").await.expect("Lookup should succeed.").is_none());
}

#[tokio::test]
async fn listing_and_search_are_newest_first() {
	let store = MemoryStore::default();

	for (index, name) in ["prod-a", "dev", "prod-b", "prod-c"].into_iter().enumerate() {
		store
			.insert(draft(1, name, &format!("secret-{index}")))
			.await
			.expect("Insert should succeed.");
	}
	store.insert(draft(2, "prod-z", "secret-other")).await.expect("Insert should succeed.");

	let page = store.list_by_owner(owner(1), Page::new(1, 2)).await.expect("List should succeed.");
	let found = store.search_by_owner(owner(1), "prod").await.expect("Search should succeed.");

	assert_eq!(page.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(), ["prod-b", "dev"]);
	assert_eq!(
		found.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
		["prod-c", "prod-b", "prod-a"]
	);
}

#[tokio::test]
async fn settings_path_cannot_zero_fields_but_observed_path_can() {
	let store = MemoryStore::default();
	let token = store.insert(draft(1, "keep", "secret-keep")).await.expect("Insert should succeed.");
	let zeroing = SettingsPatch {
		name: Some(String::new()),
		remaining_quota: Some(0),
		unlimited_quota: Some(false),
		expiry: Some(Expiry::At(macros::datetime!(2026-01-01 00:00 UTC))),
		..Default::default()
	};
	let updated = store
		.update_settings(token.id, owner(1), &zeroing)
		.await
		.expect("Settings update should succeed.")
		.expect("Owner should see the updated token.");

	assert_eq!(updated.name, "keep");
	assert_eq!(updated.remaining_quota, 50);
	assert_eq!(updated.expiry, Expiry::At(macros::datetime!(2026-01-01 00:00 UTC)));

	let instant = macros::datetime!(2025-11-11 08:30 UTC);

	assert!(
		store
			.write_observed(
				token.id,
				&ObservedWrite { status: Some(TokenStatus::Exhausted), last_accessed_at: Some(instant) },
			)
			.await
			.expect("Observed write should succeed.")
	);

	let stored = store.snapshot(token.id).expect("Token should remain stored.");

	assert_eq!(stored.status, TokenStatus::Exhausted);
	assert_eq!(stored.last_accessed_at, instant);
}

#[tokio::test]
async fn adjust_quota_is_atomic_under_contention() {
	let store = MemoryStore::default();
	let token = store.insert(draft(1, "hot", "secret-hot")).await.expect("Insert should succeed.");
	let mut tasks = Vec::new();

	for _ in 0..50 {
		let store = store.clone();

		tasks.push(tokio::spawn(async move { store.adjust_quota(token.id, -1).await }));
	}
	for task in tasks {
		task.await
			.expect("Adjust task should not panic.")
			.expect("Adjust should succeed.")
			.expect("Token should exist.");
	}

	assert_eq!(store.snapshot(token.id).map(|t| t.remaining_quota), Some(0));
}
