// self
use crate::{
	_prelude::*,
	auth::PrincipalScope,
	config::{ClientConfig, LoginRoutes},
	resolve::ScopeResolver,
};

/// Errors raised while constructing or validating client configuration.
#[derive(Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum ClientConfigError {
	/// Base URL must use HTTP or HTTPS.
	#[error("The base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Base URL that failed validation.
		url: String,
	},
	/// Base URL cannot have paths appended to it.
	#[error("The base URL cannot be used as a base: {url}.")]
	NotABase {
		/// Base URL that failed validation.
		url: String,
	},
	/// Paths and routes must be absolute.
	#[error("The {field} must start with `/`: {value}.")]
	RelativePath {
		/// Which setting failed validation.
		field: &'static str,
		/// Offending value.
		value: String,
	},
	/// The vendor prefix would swallow every route.
	#[error("The vendor route prefix cannot be the root route.")]
	RootVendorPrefix,
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	/// Base URL every request path is appended to.
	pub base_url: Url,
	/// Path of the token refresh endpoint.
	pub refresh_path: String,
	/// Route prefix of the vendor portal.
	pub vendor_route_prefix: String,
	/// Redirect targets used when a session ends.
	pub login_routes: LoginRoutes,
}
impl ClientConfigBuilder {
	/// Default refresh endpoint path.
	pub const DEFAULT_REFRESH_PATH: &'static str = "/auth/refresh";
	/// Default vendor portal route prefix.
	pub const DEFAULT_VENDOR_ROUTE_PREFIX: &'static str = "/vendor";

	/// Creates a new builder seeded with defaults for everything but the base URL.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			refresh_path: Self::DEFAULT_REFRESH_PATH.into(),
			vendor_route_prefix: Self::DEFAULT_VENDOR_ROUTE_PREFIX.into(),
			login_routes: LoginRoutes::default(),
		}
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the vendor portal route prefix.
	pub fn vendor_route_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.vendor_route_prefix = prefix.into();

		self
	}

	/// Overrides the sign-in route for one scope.
	pub fn login_route(mut self, scope: PrincipalScope, route: impl Into<String>) -> Self {
		match scope {
			PrincipalScope::Admin => self.login_routes.admin = route.into(),
			PrincipalScope::Vendor => self.login_routes.vendor = route.into(),
		}

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ClientConfigError> {
		validate_base_url(&self.base_url)?;
		validate_absolute("refresh path", &self.refresh_path)?;
		validate_absolute("vendor route prefix", &self.vendor_route_prefix)?;
		validate_absolute("admin login route", &self.login_routes.admin)?;
		validate_absolute("vendor login route", &self.login_routes.vendor)?;

		if self.vendor_route_prefix.trim_end_matches('/').is_empty() {
			return Err(ClientConfigError::RootVendorPrefix);
		}

		Ok(ClientConfig {
			base_url: self.base_url,
			refresh_path: self.refresh_path,
			resolver: ScopeResolver::new(self.vendor_route_prefix),
			login_routes: self.login_routes,
		})
	}
}

fn validate_base_url(url: &Url) -> Result<(), ClientConfigError> {
	if !matches!(url.scheme(), "http" | "https") {
		return Err(ClientConfigError::UnsupportedScheme { url: url.to_string() });
	}
	if url.cannot_be_a_base() {
		return Err(ClientConfigError::NotABase { url: url.to_string() });
	}

	Ok(())
}

fn validate_absolute(field: &'static str, value: &str) -> Result<(), ClientConfigError> {
	if value.starts_with('/') {
		Ok(())
	} else {
		Err(ClientConfigError::RelativePath { field, value: value.to_owned() })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn base() -> Url {
		Url::parse("https://api.example.com").expect("Fixture URL should parse.")
	}

	#[test]
	fn builder_rejects_invalid_settings() {
		let err = ClientConfig::builder(
			Url::parse("ftp://files.example.com").expect("Fixture URL should parse."),
		)
		.build()
		.expect_err("Non-HTTP schemes should be rejected.");

		assert!(matches!(err, ClientConfigError::UnsupportedScheme { .. }));

		let err = ClientConfig::builder(base())
			.refresh_path("auth/refresh")
			.build()
			.expect_err("Relative refresh paths should be rejected.");

		assert_eq!(
			err,
			ClientConfigError::RelativePath { field: "refresh path", value: "auth/refresh".into() }
		);

		let err = ClientConfig::builder(base())
			.vendor_route_prefix("/")
			.build()
			.expect_err("A root vendor prefix should be rejected.");

		assert_eq!(err, ClientConfigError::RootVendorPrefix);
	}

	#[test]
	fn builder_applies_overrides() {
		let config = ClientConfig::builder(base())
			.refresh_path("/v2/auth/refresh")
			.vendor_route_prefix("/seller")
			.login_route(PrincipalScope::Admin, "/admin/sign-in")
			.login_route(PrincipalScope::Vendor, "/seller/sign-in")
			.build()
			.expect("Overridden configuration should validate.");

		assert_eq!(config.refresh_path, "/v2/auth/refresh");
		assert!(config.resolver.is_vendor_route("/seller/payouts"));
		assert_eq!(config.login_routes.for_scope(PrincipalScope::Admin), "/admin/sign-in");
		assert_eq!(config.login_routes.for_scope(PrincipalScope::Vendor), "/seller/sign-in");
	}
}
