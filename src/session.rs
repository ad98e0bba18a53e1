//! Session termination: clearing a scope and sending the user back to its sign-in route.

// self
use crate::{
	_prelude::*,
	auth::PrincipalScope,
	config::LoginRoutes,
	obs::{self, CallKind, CallOutcome},
	store::TokenStore,
};

/// Navigation primitive of the host application.
pub trait Navigator
where
	Self: Send + Sync,
{
	/// Route the user is currently on, if the host tracks one.
	fn current_route(&self) -> Option<String>;

	/// Sends the user to `target`, replacing the current page.
	fn redirect(&self, target: &str);
}

/// In-process [`Navigator`] that tracks the current route and records every redirect.
///
/// Suitable for headless hosts and tests; GUI hosts bridge [`Navigator`] to their router.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
	route: Mutex<Option<String>>,
	redirects: Mutex<Vec<String>>,
}
impl RecordingNavigator {
	/// Creates a navigator positioned on `route`.
	pub fn at(route: impl Into<String>) -> Self {
		Self { route: Mutex::new(Some(route.into())), redirects: Default::default() }
	}

	/// Moves to `route` without recording a redirect, as user navigation would.
	pub fn navigate(&self, route: impl Into<String>) {
		*self.route.lock() = Some(route.into());
	}

	/// Every redirect issued so far, oldest first.
	pub fn redirects(&self) -> Vec<String> {
		self.redirects.lock().clone()
	}
}
impl Navigator for RecordingNavigator {
	fn current_route(&self) -> Option<String> {
		self.route.lock().clone()
	}

	fn redirect(&self, target: &str) {
		*self.route.lock() = Some(target.to_owned());
		self.redirects.lock().push(target.to_owned());
	}
}

/// Ends sessions whose credentials can no longer be refreshed.
#[derive(Clone)]
pub struct SessionTerminator {
	store: Arc<dyn TokenStore>,
	navigator: Arc<dyn Navigator>,
	login_routes: LoginRoutes,
}
impl SessionTerminator {
	/// Creates a terminator over the shared store and navigator.
	pub fn new(
		store: Arc<dyn TokenStore>,
		navigator: Arc<dyn Navigator>,
		login_routes: LoginRoutes,
	) -> Self {
		Self { store, navigator, login_routes }
	}

	/// Clears the scope's persisted state, then redirects to its sign-in route.
	///
	/// Repeated calls are harmless: the second clear removes nothing and no redirect is issued
	/// while the navigator already sits on the sign-in route.
	pub async fn terminate(&self, scope: PrincipalScope) -> Result<()> {
		let removed = self.store.clear(scope).await?;
		let target = self.login_routes.for_scope(scope);

		if self.navigator.current_route().as_deref() != Some(target) {
			self.navigator.redirect(target);
		}

		obs::record_session_terminated(scope, removed);
		obs::record_call_outcome(CallKind::Terminate, CallOutcome::Success);

		Ok(())
	}
}
impl Debug for SessionTerminator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionTerminator").field("login_routes", &self.login_routes).finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{auth::CredentialPair, store::MemoryStore};

	fn terminator() -> (SessionTerminator, Arc<MemoryStore>, Arc<RecordingNavigator>) {
		let store = Arc::new(MemoryStore::default());
		let navigator = Arc::new(RecordingNavigator::at("/vendor/wallet"));
		let terminator =
			SessionTerminator::new(store.clone(), navigator.clone(), LoginRoutes::default());

		(terminator, store, navigator)
	}

	#[tokio::test]
	async fn terminate_clears_only_the_target_scope() {
		let (terminator, store, navigator) = terminator();

		store
			.set_credentials(PrincipalScope::Vendor, CredentialPair::new("v-access", "v-refresh"))
			.await
			.expect("Seeding vendor credentials should succeed.");
		store
			.set_credentials(PrincipalScope::Admin, CredentialPair::new("a-access", "a-refresh"))
			.await
			.expect("Seeding admin credentials should succeed.");
		terminator.terminate(PrincipalScope::Vendor).await.expect("Termination should succeed.");

		assert!(store.entry(PrincipalScope::Vendor).is_empty());
		assert!(store.entry(PrincipalScope::Admin).credentials.is_some());
		assert_eq!(navigator.redirects(), vec!["/vendor/login".to_owned()]);
	}

	#[tokio::test]
	async fn terminate_is_idempotent() {
		let (terminator, store, navigator) = terminator();

		store
			.set_credentials(PrincipalScope::Vendor, CredentialPair::new("v-access", "v-refresh"))
			.await
			.expect("Seeding vendor credentials should succeed.");

		for _ in 0..3 {
			terminator
				.terminate(PrincipalScope::Vendor)
				.await
				.expect("Repeated termination should succeed.");
		}

		assert!(store.entry(PrincipalScope::Vendor).is_empty());
		assert_eq!(navigator.redirects().len(), 1);
		assert_eq!(navigator.current_route().as_deref(), Some("/vendor/login"));
	}
}
