//! Thread-safe in-memory [`TokenStore`] implementation for tests and short-lived processes.

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, IdentitySnapshot, PrincipalScope},
	store::{self, CompareAndSwapOutcome, ScopeEntry, StoreFuture, TokenStore},
};

type StoreMap = Arc<RwLock<HashMap<PrincipalScope, ScopeEntry>>>;

/// Storage backend that keeps per-scope entries in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Returns a copy of everything stored for the scope.
	pub fn entry(&self, scope: PrincipalScope) -> ScopeEntry {
		self.0.read().get(&scope).cloned().unwrap_or_default()
	}

	fn read_now<T>(
		map: StoreMap,
		scope: PrincipalScope,
		f: impl FnOnce(&ScopeEntry) -> T,
	) -> Option<T> {
		map.read().get(&scope).map(f)
	}

	fn write_now(map: StoreMap, scope: PrincipalScope, f: impl FnOnce(&mut ScopeEntry)) {
		f(map.write().entry(scope).or_default());
	}

	fn clear_now(map: StoreMap, scope: PrincipalScope) -> bool {
		map.write().remove(&scope).is_some_and(|entry| !entry.is_empty())
	}
}
impl TokenStore for MemoryStore {
	fn credentials(&self, scope: PrincipalScope) -> StoreFuture<'_, Option<CredentialPair>> {
		let map = self.0.clone();

		Box::pin(async move {
			Ok(Self::read_now(map, scope, |entry| entry.credentials.clone()).flatten())
		})
	}

	fn set_credentials(&self, scope: PrincipalScope, pair: CredentialPair) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			Self::write_now(map, scope, |entry| entry.credentials = Some(pair));

			Ok(())
		})
	}

	fn compare_and_swap_refresh<'a>(
		&'a self,
		scope: PrincipalScope,
		expected_refresh: &'a str,
		replacement: CredentialPair,
	) -> StoreFuture<'a, CompareAndSwapOutcome> {
		let map = self.0.clone();

		Box::pin(async move {
			let mut guard = map.write();

			Ok(store::swap_refresh(&mut guard, scope, expected_refresh, replacement))
		})
	}

	fn identity(&self, scope: PrincipalScope) -> StoreFuture<'_, Option<IdentitySnapshot>> {
		let map = self.0.clone();

		Box::pin(async move {
			Ok(Self::read_now(map, scope, |entry| entry.identity.clone()).flatten())
		})
	}

	fn set_identity(
		&self,
		scope: PrincipalScope,
		identity: IdentitySnapshot,
	) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			Self::write_now(map, scope, |entry| entry.identity = Some(identity));

			Ok(())
		})
	}

	fn set_entry(&self, scope: PrincipalScope, entry: ScopeEntry) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move {
			Self::write_now(map, scope, |current| *current = entry);

			Ok(())
		})
	}

	fn clear(&self, scope: PrincipalScope) -> StoreFuture<'_, bool> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::clear_now(map, scope)) })
	}
}
