//! Authenticated API client: credential attachment, single-flight refresh, session termination.

pub mod account;
pub mod pipeline;
pub mod refresh;
pub mod request;

pub use account::*;
pub use refresh::RefreshMetrics;
pub use request::*;

// self
use crate::{
	_prelude::*,
	client::refresh::RefreshGate,
	config::ClientConfig,
	session::{Navigator, SessionTerminator},
	store::TokenStore,
	transport::ApiTransport,
};
#[cfg(feature = "reqwest")] use crate::transport::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestTransport>;

/// Issues API calls on behalf of the admin and vendor back-offices.
///
/// The client owns the transport, token store, navigator, and configuration references plus
/// one refresh gate per principal scope. Every call resolves its scope, attaches that scope's
/// bearer token, and on a 401 joins (or leads) the scope's single-flight refresh before retrying
/// once. Build one client per process and share it; refresh coordination only spans requests
/// issued through the same instance.
pub struct ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Transport used for every outbound request, including refresh calls.
	pub transport: Arc<T>,
	/// Token store holding per-scope credentials and identities.
	pub store: Arc<dyn TokenStore>,
	/// Host navigation used for scope inference and sign-in redirects.
	pub navigator: Arc<dyn Navigator>,
	/// Validated client configuration.
	pub config: ClientConfig,
	/// Shared counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	terminator: SessionTerminator,
	gate: Arc<RefreshGate>,
}
impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_transport(
		config: ClientConfig,
		store: Arc<dyn TokenStore>,
		navigator: Arc<dyn Navigator>,
		transport: impl Into<Arc<T>>,
	) -> Self {
		let terminator =
			SessionTerminator::new(store.clone(), navigator.clone(), config.login_routes.clone());

		Self {
			transport: transport.into(),
			store,
			navigator,
			config,
			refresh_metrics: Default::default(),
			terminator,
			gate: Default::default(),
		}
	}

	/// Session terminator bound to this client's store, navigator, and sign-in routes.
	pub fn terminator(&self) -> &SessionTerminator {
		&self.terminator
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestTransport> {
	/// Creates a new client backed by a default reqwest transport.
	pub fn new(
		config: ClientConfig,
		store: Arc<dyn TokenStore>,
		navigator: Arc<dyn Navigator>,
	) -> Self {
		Self::with_transport(config, store, navigator, ReqwestTransport::default())
	}
}
impl<T> Clone for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self {
			transport: self.transport.clone(),
			store: self.store.clone(),
			navigator: self.navigator.clone(),
			config: self.config.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			terminator: self.terminator.clone(),
			gate: self.gate.clone(),
		}
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("refresh_path", &self.config.refresh_path)
			.field("refresh_metrics", &self.refresh_metrics)
			.finish()
	}
}
