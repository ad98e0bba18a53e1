// self
use crate::{_prelude::*, auth::PrincipalScope, error::RefreshFailure, obs::CallKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedCall<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedCall<F> = F;

/// A span builder used by pipeline operations.
#[derive(Clone, Debug)]
pub struct CallSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl CallSpan {
	/// Creates a new span tagged with the provided call kind, scope, and stage.
	pub fn new(kind: CallKind, scope: PrincipalScope, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"backoffice_client.call",
				call = kind.as_str(),
				scope = scope.as_str(),
				stage
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, scope, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedCall<Fut>
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

/// Emits a `warn` event describing a failed refresh (when tracing is enabled).
pub fn trace_refresh_failure(scope: PrincipalScope, failure: &RefreshFailure) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(scope = scope.as_str(), reason = %failure, "refresh failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (scope, failure);
	}
}

/// Emits a `debug` event when a request joins a refresh that is already in flight.
pub fn trace_refresh_coalesced(scope: PrincipalScope, queued: usize) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(scope = scope.as_str(), queued, "waiting on in-flight refresh");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (scope, queued);
	}
}
