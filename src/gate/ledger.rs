//! Quota accounting.
//!
//! Every adjustment is one atomic [`TokenStore::adjust_quota`](crate::store::TokenStore::adjust_quota)
//! call, so concurrent debits never lose updates. Balances have no zero floor: a debit that
//! races a validation may leave a limited token slightly negative, and the next validation
//! retires it.

// self
use crate::{
	_prelude::*,
	auth::TokenId,
	gate::TokenGate,
	obs::{self, OpKind, OpOutcome, OpSpan},
};

impl TokenGate {
	/// Debits `amount` from the token's balance and returns the new balance.
	pub async fn decrement(&self, id: TokenId, amount: i64) -> Result<i64> {
		let delta = Self::checked_amount(amount)?;

		self.adjust(OpKind::Decrement, id, -delta).await
	}

	/// Debits a single unit.
	pub async fn decrement_one(&self, id: TokenId) -> Result<i64> {
		self.decrement(id, 1).await
	}

	/// Credits `amount` to the token's balance and returns the new balance.
	///
	/// Topping up does not re-enable an exhausted token; that is an owner decision made through
	/// [`update_token`](TokenGate::update_token).
	pub async fn top_up(&self, id: TokenId, amount: i64) -> Result<i64> {
		let delta = Self::checked_amount(amount)?;

		self.adjust(OpKind::TopUp, id, delta).await
	}

	fn checked_amount(amount: i64) -> Result<i64> {
		if amount < 0 {
			return Err(Error::invalid_request(format!("amount must not be negative, got {amount}")));
		}

		Ok(amount)
	}

	async fn adjust(&self, kind: OpKind, id: TokenId, delta: i64) -> Result<i64> {
		let span = OpSpan::new(kind, "adjust_quota");

		obs::record_op_outcome(kind, OpOutcome::Attempt);

		let result = span
			.instrument(async { self.store.adjust_quota(id, delta).await?.ok_or(Error::NotFound) })
			.await;

		match &result {
			Ok(_) => obs::record_op_outcome(kind, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(kind, OpOutcome::Failure),
		}

		result
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{_preludet::*, auth::Token};

	async fn seeded(quota: i64) -> (TokenGate, Token) {
		let (gate, store, _queue) = build_queued_test_gate();
		let token = seed_token(
			&store,
			Token::builder(owner(1))
				.remaining_quota(quota)
				.build()
				.expect("Token fixture should build."),
		)
		.await;

		(gate, token)
	}

	#[tokio::test]
	async fn decrement_may_go_negative() {
		let (gate, token) = seeded(1).await;

		assert_eq!(gate.decrement_one(token.id).await.expect("Decrement should succeed."), 0);
		assert_eq!(gate.decrement(token.id, 5).await.expect("Decrement should succeed."), -5);
	}

	#[tokio::test]
	async fn top_up_returns_the_new_balance() {
		let (gate, token) = seeded(10).await;

		assert_eq!(gate.top_up(token.id, 15).await.expect("Top up should succeed."), 25);
		assert_eq!(gate.decrement(token.id, 0).await.expect("Zero debit should succeed."), 25);
	}

	#[tokio::test]
	async fn negative_amounts_are_rejected() {
		let (gate, token) = seeded(10).await;

		assert!(matches!(gate.decrement(token.id, -1).await, Err(Error::InvalidRequest { .. })));
		assert!(matches!(gate.top_up(token.id, -1).await, Err(Error::InvalidRequest { .. })));
	}

	#[tokio::test]
	async fn unknown_token_is_not_found() {
		let (gate, _token) = seeded(10).await;
		let missing = TokenId::new(404).expect("Token id fixture should be valid.");

		assert!(matches!(gate.decrement_one(missing).await, Err(Error::NotFound)));
		assert!(matches!(gate.top_up(missing, 3).await, Err(Error::NotFound)));
	}
}
