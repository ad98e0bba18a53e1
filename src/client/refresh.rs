//! Single-flight token refresh with compare-and-swap rotation.
//!
//! A 401 on an authenticated request starts the recovery path. The first request per scope
//! leads the refresh call; every other request that hits a 401 while it runs waits in the
//! scope's queue and receives the leader's outcome. Successful refreshes rotate the stored pair
//! with a compare-and-swap on the old refresh token so a concurrent writer is never overwritten;
//! failed refreshes terminate the session before the queue is released. A leader that is
//! cancelled mid-refresh hands its queue back to the gate, where the next waiter leads again.

mod gate;
mod metrics;

pub use metrics::RefreshMetrics;

pub(crate) use gate::RefreshGate;

// self
use crate::{
	_prelude::*,
	auth::{PrincipalScope, TokenSecret},
	client::{ApiClient, ApiRequest, Envelope, decode_body, error_message},
	error::{RefreshFailure, ResponseError},
	obs::{self, CallKind, CallOutcome, CallSpan},
	store::{CompareAndSwapOutcome, StoreError},
	transport::ApiTransport,
};
use gate::{RefreshOutcome, Ticket};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshBody<'a> {
	refresh_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshGrant {
	access_token: String,
	#[serde(default)]
	refresh_token: Option<String>,
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Obtains a usable access token after `sent_with` was rejected with a 401.
	pub(crate) async fn recover(
		&self,
		scope: PrincipalScope,
		sent_with: Option<&TokenSecret>,
	) -> Result<TokenSecret> {
		loop {
			if let Some(current) = self.rotated_since(scope, sent_with).await? {
				return Ok(current);
			}

			match self.gate.join(scope) {
				Ticket::Follower { receiver, position } => {
					self.refresh_metrics.record_coalesced();
					obs::trace_refresh_coalesced(scope, position);

					match gate::wait(receiver).await {
						Ok(token) => return Ok(token),
						// The leader was cancelled; the session itself is untouched.
						Err(RefreshFailure::Abandoned) => continue,
						Err(reason) => return Err(Error::SessionExpired { scope, reason }),
					}
				},
				Ticket::Leader(lease) => {
					// A refresh may have settled between the check above and the join.
					if let Some(current) = self.rotated_since(scope, sent_with).await? {
						lease.settle(&Ok(current.clone()));

						return Ok(current);
					}

					return match self.refresh(scope).await {
						Ok(token) => {
							lease.settle(&Ok(token.clone()));

							Ok(token)
						},
						Err(reason) => {
							// Waiters are released only once the scope is cleared.
							let terminated = self.terminator.terminate(scope).await;

							lease.settle(&Err(reason.clone()));
							terminated?;

							Err(Error::SessionExpired { scope, reason })
						},
					};
				},
			}
		}
	}

	/// Returns the stored access token if another request rotated it after `sent_with` went out.
	async fn rotated_since(
		&self,
		scope: PrincipalScope,
		sent_with: Option<&TokenSecret>,
	) -> Result<Option<TokenSecret>> {
		Ok(self.store.access_token(scope).await?.filter(|current| Some(current) != sent_with))
	}

	/// Performs one refresh call for the scope and records its outcome.
	async fn refresh(&self, scope: PrincipalScope) -> RefreshOutcome {
		const KIND: CallKind = CallKind::Refresh;

		let span = CallSpan::new(KIND, scope, "refresh");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let outcome = span.instrument(self.exchange_refresh_token(scope)).await;

		match &outcome {
			Ok(_) => {
				self.refresh_metrics.record_success();
				obs::record_call_outcome(KIND, CallOutcome::Success);
			},
			Err(failure) => {
				self.refresh_metrics.record_failure();
				obs::record_call_outcome(KIND, CallOutcome::Failure);
				obs::trace_refresh_failure(scope, failure);
			},
		}

		outcome
	}

	async fn exchange_refresh_token(&self, scope: PrincipalScope) -> RefreshOutcome {
		let current = self
			.store
			.credentials(scope)
			.await
			.map_err(storage_failure)?
			.ok_or(RefreshFailure::MissingRefreshToken)?;

		if current.refresh_token.expose().is_empty() {
			return Err(RefreshFailure::MissingRefreshToken);
		}

		let expected_refresh = current.refresh_token.expose();
		let request = ApiRequest::post(self.config.refresh_path.as_str())
			.json(&RefreshBody { refresh_token: expected_refresh })
			.and_then(|request| request.anonymous().build(&self.config, None))
			.map_err(|e| RefreshFailure::Transport { message: e.to_string() })?;
		let response = self
			.transport
			.send(request)
			.await
			.map_err(|e| RefreshFailure::Transport { message: e.to_string() })?;

		if !response.status().is_success() {
			return Err(RefreshFailure::Rejected {
				status: response.status().as_u16(),
				message: error_message(&response),
			});
		}

		let grant = decode_body::<Envelope<RefreshGrant>>(&self.config.refresh_path, &response)
			.map_err(|ResponseError::Parse { source, .. }| RefreshFailure::Malformed {
				message: source.to_string(),
			})?
			.data;

		if grant.access_token.is_empty() {
			return Err(RefreshFailure::Malformed { message: "accessToken is empty".into() });
		}

		let rotated = current.rotate(grant.access_token, grant.refresh_token);
		let outcome = self
			.store
			.compare_and_swap_refresh(scope, expected_refresh, rotated.clone())
			.await
			.map_err(storage_failure)?;

		match outcome {
			CompareAndSwapOutcome::Updated => Ok(rotated.access_token),
			CompareAndSwapOutcome::RefreshMismatch => self
				.store
				.access_token(scope)
				.await
				.map_err(storage_failure)?
				.ok_or(RefreshFailure::Cleared),
			CompareAndSwapOutcome::Missing => Err(RefreshFailure::Cleared),
		}
	}
}

fn storage_failure(e: StoreError) -> RefreshFailure {
	RefreshFailure::Storage { message: e.to_string() }
}
