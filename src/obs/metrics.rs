// self
use crate::{
	auth::PrincipalScope,
	obs::{CallKind, CallOutcome},
};

/// Records a call outcome via the global metrics recorder (when enabled).
pub fn record_call_outcome(kind: CallKind, outcome: CallOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"backoffice_client_call_total",
			"call" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records that a scope's session ended (metric + `warn` event when enabled).
pub fn record_session_terminated(scope: PrincipalScope, removed_state: bool) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("backoffice_client_session_terminated_total", "scope" => scope.as_str())
			.increment(1);
	}
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(scope = scope.as_str(), removed_state, "session terminated");
	}

	#[cfg(not(feature = "tracing"))]
	let _ = removed_state;
	#[cfg(not(any(feature = "metrics", feature = "tracing")))]
	let _ = scope;
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_noop_without_features() {
		record_call_outcome(CallKind::Request, CallOutcome::Failure);
		record_session_terminated(PrincipalScope::Admin, false);
	}
}
