// self
use crate::{_prelude::*, auth::TokenId, obs::OpKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOp<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOp<F> = F;

/// A span builder used by gate operations.
#[derive(Clone, Debug)]
pub struct OpSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OpSpan {
	/// Creates a new span tagged with the provided operation kind + stage.
	pub fn new(kind: OpKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("tollgate.op", op = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOp<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Logs a rejected credential; only the secret fingerprint is ever recorded.
///
/// `secret` is the presented value with the scheme prefix removed. It is hashed only when an
/// event is actually emitted.
pub fn report_rejection(secret: &str, error: &Error) {
	#[cfg(feature = "tracing")]
	{
		let fingerprint = crate::auth::fingerprint(secret);

		tracing::debug!(fingerprint, %error, "credential rejected");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (secret, error);
	}
}

/// Operator channel for side-effect writes whose failure is swallowed.
pub fn report_side_effect_failure(kind: OpKind, id: TokenId, error: &dyn StdError) {
	crate::obs::record_side_effect_failure(kind);

	#[cfg(feature = "tracing")]
	{
		tracing::error!(op = kind.as_str(), token = id.get(), %error, "side-effect write failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (id, error);
	}
}

/// Operator channel for background tasks that could not be scheduled at all.
pub fn report_dropped_task(label: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(task = label, "no runtime available; background task dropped");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = label;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn op_span_passes_values_through() {
		let span = OpSpan::new(OpKind::Validate, "op_span_passes_values_through");

		assert_eq!(span.instrument(async { "ok" }).await, "ok");
	}

	#[test]
	fn reporters_accept_any_error() {
		let id = TokenId::new(1).expect("Token id fixture should be valid.");
		let error = crate::store::StoreError::Backend { message: "offline".into() };

		report_side_effect_failure(OpKind::Touch, id, &error);
		report_rejection("abc123", &Error::NotFound);
		report_dropped_task("touch");
	}
}
