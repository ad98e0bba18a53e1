//! Client configuration: API location, refresh endpoint, and per-scope routes.
//!
//! Configuration is assembled through [`ClientConfigBuilder`] so invariants (absolute routes,
//! HTTP(S) base URLs) are checked once, before any request is issued. The validated
//! [`ClientConfig`] is serializable so hosts can keep it next to their own settings.

/// Builder API for assembling client configuration.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, auth::PrincipalScope, resolve::ScopeResolver};

/// Unauthenticated entry points, one per scope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRoutes {
	/// Admin sign-in route.
	pub admin: String,
	/// Vendor sign-in route.
	pub vendor: String,
}
impl LoginRoutes {
	/// Returns the route for the provided scope.
	pub fn for_scope(&self, scope: PrincipalScope) -> &str {
		match scope {
			PrincipalScope::Admin => &self.admin,
			PrincipalScope::Vendor => &self.vendor,
		}
	}
}
impl Default for LoginRoutes {
	fn default() -> Self {
		Self { admin: "/login".into(), vendor: "/vendor/login".into() }
	}
}

/// Immutable configuration consumed by [`ApiClient`](crate::client::ApiClient).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
	/// Base URL every request path is appended to.
	pub base_url: Url,
	/// Path of the token refresh endpoint.
	pub refresh_path: String,
	/// Scope resolver carrying the vendor route prefix.
	pub resolver: ScopeResolver,
	/// Redirect targets used when a session ends.
	pub login_routes: LoginRoutes,
}
impl ClientConfig {
	/// Creates a new builder for the provided base URL.
	pub fn builder(base_url: Url) -> ClientConfigBuilder {
		ClientConfigBuilder::new(base_url)
	}

	/// Joins `path` onto the base URL, keeping any path prefix the base URL carries.
	pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
		let base = self.base_url.as_str().trim_end_matches('/');
		let path = path.trim_start_matches('/');

		Url::parse(&format!("{base}/{path}"))
	}
}
