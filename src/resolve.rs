//! Scope resolution for outgoing requests.
//!
//! Call sites that know their scope tag the request explicitly. Shared utilities fall back to a
//! heuristic that is a pure function of the current route and what the store holds for the
//! vendor scope, evaluated in this order:
//!
//! 1. the current route sits under the vendor route prefix;
//! 2. a vendor identity snapshot is stored;
//! 3. a vendor credential pair is stored;
//! 4. otherwise the admin scope applies.

// self
use crate::{_prelude::*, auth::PrincipalScope};

/// What the token store currently holds for a scope.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScopePresence {
	/// An identity snapshot is stored.
	pub identity: bool,
	/// A credential pair is stored.
	pub credentials: bool,
}

/// Decides which principal scope governs a request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeResolver {
	vendor_route_prefix: String,
}
impl ScopeResolver {
	/// Creates a resolver that treats routes under `vendor_route_prefix` as vendor routes.
	pub fn new(vendor_route_prefix: impl Into<String>) -> Self {
		let prefix = vendor_route_prefix.into();
		let trimmed = prefix.trim_end_matches('/');

		Self { vendor_route_prefix: trimmed.to_owned() }
	}

	/// Route prefix of the vendor portal.
	pub fn vendor_route_prefix(&self) -> &str {
		&self.vendor_route_prefix
	}

	/// Returns `true` if `route` is the vendor prefix itself or lies beneath it.
	pub fn is_vendor_route(&self, route: &str) -> bool {
		let path = route.split(['?', '#']).next().unwrap_or_default();

		match path.strip_prefix(self.vendor_route_prefix.as_str()) {
			Some(rest) => rest.is_empty() || rest.starts_with('/'),
			None => false,
		}
	}

	/// Resolves the scope for a request.
	///
	/// `explicit` wins when present; otherwise the heuristic described in the module docs runs.
	pub fn resolve(
		&self,
		explicit: Option<PrincipalScope>,
		current_route: Option<&str>,
		vendor: ScopePresence,
	) -> PrincipalScope {
		if let Some(scope) = explicit {
			return scope;
		}
		if current_route.is_some_and(|route| self.is_vendor_route(route)) {
			return PrincipalScope::Vendor;
		}
		if vendor.identity || vendor.credentials {
			return PrincipalScope::Vendor;
		}

		PrincipalScope::Admin
	}
}
impl Default for ScopeResolver {
	fn default() -> Self {
		Self::new("/vendor")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const NOTHING: ScopePresence = ScopePresence { identity: false, credentials: false };

	#[test]
	fn vendor_routes_respect_segment_boundaries() {
		let resolver = ScopeResolver::default();

		assert!(resolver.is_vendor_route("/vendor"));
		assert!(resolver.is_vendor_route("/vendor/products/12"));
		assert!(resolver.is_vendor_route("/vendor?tab=wallet"));
		assert!(!resolver.is_vendor_route("/vendors"));
		assert!(!resolver.is_vendor_route("/admin/vendor"));
	}

	#[test]
	fn resolution_follows_priority_order() {
		let resolver = ScopeResolver::new("/vendor/");
		let identity_only = ScopePresence { identity: true, credentials: false };
		let credentials_only = ScopePresence { identity: false, credentials: true };

		assert_eq!(resolver.vendor_route_prefix(), "/vendor");
		assert_eq!(
			resolver.resolve(Some(PrincipalScope::Admin), Some("/vendor/orders"), identity_only),
			PrincipalScope::Admin
		);
		assert_eq!(
			resolver.resolve(None, Some("/vendor/orders"), NOTHING),
			PrincipalScope::Vendor
		);
		assert_eq!(
			resolver.resolve(None, Some("/dashboard"), identity_only),
			PrincipalScope::Vendor
		);
		assert_eq!(resolver.resolve(None, None, credentials_only), PrincipalScope::Vendor);
		assert_eq!(resolver.resolve(None, Some("/dashboard"), NOTHING), PrincipalScope::Admin);
		assert_eq!(resolver.resolve(None, None, NOTHING), PrincipalScope::Admin);
	}
}
