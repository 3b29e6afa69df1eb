//! Owner-scoped token management.
//!
//! Every operation here takes the calling owner and treats a token owned by someone else exactly
//! like a missing one.

// self
use crate::{
	_prelude::*,
	auth::{self, NewToken, NewTokenBuilder, OwnerId, Token, TokenId, TokenStatus},
	gate::TokenGate,
	obs::{self, OpKind, OpOutcome, OpSpan},
	store::{Page, SettingsPatch},
};

impl TokenGate {
	/// Starts a draft for `owner` using the configured secret length.
	pub fn new_token(&self, owner: OwnerId) -> NewTokenBuilder {
		Token::builder(owner).secret_len(self.settings.secret_len)
	}

	/// Persists a draft and returns the stored token.
	pub async fn issue_token(&self, draft: NewToken) -> Result<Token> {
		self.managed("issue", async { Ok::<_, Error>(self.store.insert(draft).await?) }).await
	}

	/// Fetches one of `owner`'s tokens.
	pub async fn token(&self, id: TokenId, owner: OwnerId) -> Result<Token> {
		self.managed("get", async {
			self.store.find_by_id_and_owner(id, owner).await?.ok_or(Error::NotFound)
		})
		.await
	}

	/// Lists `owner`'s tokens, newest first.
	///
	/// `page_index` counts from zero; `page_size` is clamped by
	/// [`GateSettings::page_size`](crate::config::GateSettings::page_size).
	pub async fn list_tokens(
		&self,
		owner: OwnerId,
		page_index: usize,
		page_size: Option<usize>,
	) -> Result<Vec<Token>> {
		let limit = self.settings.page_size(page_size);
		let page = Page::new(page_index.saturating_mul(limit), limit);

		self.managed("list", async { Ok::<_, Error>(self.store.list_by_owner(owner, page).await?) })
			.await
	}

	/// Finds `owner`'s tokens whose id equals `keyword` or whose name starts with it.
	pub async fn search_tokens(&self, owner: OwnerId, keyword: &str) -> Result<Vec<Token>> {
		self.managed("search", async {
			Ok::<_, Error>(self.store.search_by_owner(owner, keyword).await?)
		})
		.await
	}

	/// Applies an owner's settings change as of the current clock.
	pub async fn update_token(
		&self,
		id: TokenId,
		owner: OwnerId,
		patch: SettingsPatch,
	) -> Result<Token> {
		self.update_token_at(id, owner, patch, OffsetDateTime::now_utc()).await
	}

	/// Applies an owner's settings change as of `now`.
	///
	/// Only non-default patch values are written (see [`SettingsPatch::effective`]). Setting the
	/// status to `Enabled` is refused when the resulting token would be expired or out of quota
	/// at `now`, so owners cannot revive a token that the next validation would retire again.
	pub async fn update_token_at(
		&self,
		id: TokenId,
		owner: OwnerId,
		patch: SettingsPatch,
		now: OffsetDateTime,
	) -> Result<Token> {
		self.managed("update", async {
			if let Some(name) = &patch.name {
				auth::validate_name(name)?;
			}

			let current =
				self.store.find_by_id_and_owner(id, owner).await?.ok_or(Error::NotFound)?;

			if patch.is_empty() {
				return Ok(current);
			}

			let mut preview = current.clone();

			patch.apply_to(&mut preview);

			if patch.effective().status == Some(TokenStatus::Enabled) {
				if preview.is_expired_at(now) {
					return Err(Error::invalid_request(
						"the token has expired; extend the expiry before enabling it",
					));
				}
				if preview.is_exhausted() {
					return Err(Error::invalid_request(
						"the token has no remaining quota; top it up or make it unlimited before enabling it",
					));
				}
			}

			self.store.update_settings(id, owner, &patch).await?.ok_or(Error::NotFound)
		})
		.await
	}

	/// Deletes one of `owner`'s tokens.
	pub async fn delete_token(&self, id: TokenId, owner: OwnerId) -> Result<()> {
		self.managed("delete", async {
			if self.store.delete(id, owner).await? { Ok(()) } else { Err(Error::NotFound) }
		})
		.await
	}

	async fn managed<T, Fut>(&self, stage: &'static str, op: Fut) -> Result<T>
	where
		Fut: Future<Output = Result<T>>,
	{
		const KIND: OpKind = OpKind::Manage;

		let span = OpSpan::new(KIND, stage);

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let result = span.instrument(op).await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}
}
