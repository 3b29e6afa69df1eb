//! Credential validation with lazy status transitions.
//!
//! There is no background sweeper: every validation doubles as the retirement pass for the token
//! it looks at. Checks run in a fixed order once the token is found:
//!
//! 1. a status other than `Enabled` rejects with [`Error::Unusable`];
//! 2. a passed expiry records `Expired` and rejects with [`Error::Expired`];
//! 3. a limited token with a balance `<= 0` records `Exhausted` and rejects with
//!    [`Error::QuotaExhausted`];
//! 4. otherwise the token is returned and an access touch is dispatched in the background.
//!
//! The transition writes in (2) and (3) are awaited so the next validation short-circuits at (1),
//! but a failed write only reaches the operator channel; the caller always sees the rejection.

// self
use crate::{
	_prelude::*,
	auth::{self, Token, TokenStatus},
	gate::TokenGate,
	obs::{self, OpKind, OpOutcome, OpSpan},
	store::ObservedWrite,
};

impl TokenGate {
	/// Validates a presented credential against the current clock.
	pub async fn validate(&self, raw: &str) -> Result<Token> {
		self.validate_at(raw, OffsetDateTime::now_utc()).await
	}

	/// Validates a presented credential as of `now`.
	///
	/// `raw` may carry the configured scheme prefix (`"Bearer "` by default). Validation never
	/// changes the token's balance; debiting is the ledger's job.
	pub async fn validate_at(&self, raw: &str, now: OffsetDateTime) -> Result<Token> {
		const KIND: OpKind = OpKind::Validate;

		let span = OpSpan::new(KIND, "validate");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);
		self.metrics.record_validation();

		let result = span.instrument(self.check_credential(raw, now)).await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(err) => {
				obs::record_op_outcome(KIND, OpOutcome::Failure);

				if err.is_rejection() {
					self.metrics.record_rejection();
					obs::report_rejection(self.bare_secret(raw), err);
				}
			},
		}

		result
	}

	async fn check_credential(&self, raw: &str, now: OffsetDateTime) -> Result<Token> {
		let secret = self.bare_secret(raw);

		if secret.is_empty() {
			return Err(Error::MissingCredential);
		}

		let token = self.store.find_by_secret(secret).await?.ok_or(Error::NotFound)?;

		if !token.status.is_enabled() {
			return Err(Error::Unusable { status: token.status });
		}
		if token.is_expired_at(now) {
			self.record_transition(&token, TokenStatus::Expired).await;

			return Err(Error::Expired);
		}
		if token.is_exhausted() {
			self.record_transition(&token, TokenStatus::Exhausted).await;

			return Err(Error::QuotaExhausted);
		}

		self.recorder().schedule(&token, now);

		Ok(token)
	}

	fn bare_secret<'a>(&self, raw: &'a str) -> &'a str {
		auth::strip_scheme(raw, &self.settings.scheme_prefix)
	}

	async fn record_transition(&self, token: &Token, status: TokenStatus) {
		let write = ObservedWrite::status(status);

		if let Err(e) = self.store.write_observed(token.id, &write).await {
			self.metrics.record_side_effect_failure();
			obs::report_side_effect_failure(OpKind::Transition, token.id, &e);
		}
	}
}
