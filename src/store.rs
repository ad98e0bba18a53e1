//! Storage contracts and built-in store implementations for per-scope credentials.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, IdentitySnapshot, PrincipalScope, TokenSecret},
};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by client token stores.
///
/// Admin and vendor state live side by side; no operation on one scope may read or mutate the
/// other.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Fetches the credential pair stored for the scope, if present.
	fn credentials(&self, scope: PrincipalScope) -> StoreFuture<'_, Option<CredentialPair>>;

	/// Persists or replaces both tokens for the scope in one step.
	fn set_credentials(&self, scope: PrincipalScope, pair: CredentialPair) -> StoreFuture<'_, ()>;

	/// Atomically replaces the pair if the stored refresh token still equals `expected_refresh`.
	fn compare_and_swap_refresh<'a>(
		&'a self,
		scope: PrincipalScope,
		expected_refresh: &'a str,
		replacement: CredentialPair,
	) -> StoreFuture<'a, CompareAndSwapOutcome>;

	/// Fetches the identity snapshot stored for the scope, if present.
	fn identity(&self, scope: PrincipalScope) -> StoreFuture<'_, Option<IdentitySnapshot>>;

	/// Persists or replaces the identity snapshot for the scope.
	fn set_identity(
		&self,
		scope: PrincipalScope,
		identity: IdentitySnapshot,
	) -> StoreFuture<'_, ()>;

	/// Replaces everything stored for the scope in one step.
	fn set_entry(&self, scope: PrincipalScope, entry: ScopeEntry) -> StoreFuture<'_, ()>;

	/// Removes credentials and identity for the scope; returns `true` if anything was removed.
	fn clear(&self, scope: PrincipalScope) -> StoreFuture<'_, bool>;

	/// Returns the stored access token for the scope.
	fn access_token(&self, scope: PrincipalScope) -> StoreFuture<'_, Option<TokenSecret>> {
		Box::pin(async move { Ok(self.credentials(scope).await?.map(|pair| pair.access_token)) })
	}

	/// Returns the stored refresh token for the scope.
	fn refresh_token(&self, scope: PrincipalScope) -> StoreFuture<'_, Option<TokenSecret>> {
		Box::pin(async move { Ok(self.credentials(scope).await?.map(|pair| pair.refresh_token)) })
	}
}

/// Result of a refresh-token compare-and-swap attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareAndSwapOutcome {
	/// The refresh secret matched the expected value and the pair was replaced.
	Updated,
	/// A pair exists but its refresh secret was rotated by another writer.
	RefreshMismatch,
	/// No pair is stored for the scope.
	Missing,
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Everything persisted for one scope.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeEntry {
	/// Credential pair, when signed in.
	pub credentials: Option<CredentialPair>,
	/// Identity snapshot, when known.
	pub identity: Option<IdentitySnapshot>,
}
impl ScopeEntry {
	/// Returns `true` if neither credentials nor identity are stored.
	pub fn is_empty(&self) -> bool {
		self.credentials.is_none() && self.identity.is_none()
	}
}

pub(crate) fn swap_refresh(
	entries: &mut HashMap<PrincipalScope, ScopeEntry>,
	scope: PrincipalScope,
	expected_refresh: &str,
	replacement: CredentialPair,
) -> CompareAndSwapOutcome {
	let Some(current) = entries.get_mut(&scope).and_then(|entry| entry.credentials.as_mut())
	else {
		return CompareAndSwapOutcome::Missing;
	};

	if current.refresh_token.expose() != expected_refresh {
		return CompareAndSwapOutcome::RefreshMismatch;
	}

	*current = replacement;

	CompareAndSwapOutcome::Updated
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;

	#[test]
	fn store_error_converts_into_client_error_with_source() {
		let store_error = StoreError::Backend { message: "disk full".into() };
		let client_error: Error = store_error.clone().into();

		assert!(matches!(client_error, Error::Storage(_)));
		assert!(client_error.to_string().contains("disk full"));

		let source = StdError::source(&client_error)
			.expect("Client error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn swap_refresh_reports_each_outcome() {
		let mut entries = HashMap::new();
		let pair = CredentialPair::new("access-1", "refresh-1");

		assert_eq!(
			swap_refresh(&mut entries, PrincipalScope::Admin, "refresh-1", pair.clone()),
			CompareAndSwapOutcome::Missing
		);

		entries.insert(
			PrincipalScope::Admin,
			ScopeEntry { credentials: Some(pair.clone()), identity: None },
		);

		assert_eq!(
			swap_refresh(
				&mut entries,
				PrincipalScope::Admin,
				"refresh-0",
				pair.rotate("access-x", None)
			),
			CompareAndSwapOutcome::RefreshMismatch
		);
		assert_eq!(
			swap_refresh(
				&mut entries,
				PrincipalScope::Admin,
				"refresh-1",
				pair.rotate("access-2", Some("refresh-2".into()))
			),
			CompareAndSwapOutcome::Updated
		);
		assert_eq!(
			entries[&PrincipalScope::Admin]
				.credentials
				.as_ref()
				.map(|pair| pair.refresh_token.expose()),
			Some("refresh-2")
		);
	}

	#[test]
	fn compare_and_swap_outcome_can_be_serialized() {
		let payload = serde_json::to_string(&CompareAndSwapOutcome::RefreshMismatch)
			.expect("CompareAndSwapOutcome should serialize to JSON.");

		assert_eq!(payload, "\"RefreshMismatch\"");
	}
}
