//! Session establishment and teardown for a scope.

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, IdentitySnapshot, PrincipalScope, TokenSecret},
	client::{ApiClient, ApiRequest, Envelope, decode_body},
	store::ScopeEntry,
	transport::ApiTransport,
};

/// Body returned by a sign-in endpoint inside its `{ data }` envelope.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGrant {
	/// Newly issued access token.
	pub access_token: TokenSecret,
	/// Newly issued refresh token.
	pub refresh_token: TokenSecret,
	/// Signed-in user, when the endpoint returns one.
	#[serde(default, alias = "admin", alias = "vendor")]
	pub user: Option<IdentitySnapshot>,
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Posts `credentials` to a sign-in endpoint and stores the issued session under `scope`.
	///
	/// The call is anonymous, so a 401 (wrong password) surfaces as [`Error::Api`] without
	/// touching the refresh protocol. Any state previously stored for the scope is replaced.
	pub async fn sign_in<B>(
		&self,
		scope: PrincipalScope,
		path: &str,
		credentials: &B,
	) -> Result<SessionGrant>
	where
		B: ?Sized + Serialize,
	{
		let request = ApiRequest::post(path).json(credentials)?.scoped(scope).anonymous();
		let response = self.send(request).await?;
		let grant = decode_body::<Envelope<SessionGrant>>(path, &response)?.data;
		let entry = ScopeEntry {
			credentials: Some(CredentialPair::new(
				grant.access_token.expose(),
				grant.refresh_token.expose(),
			)),
			identity: grant.user.clone(),
		};

		self.store.set_entry(scope, entry).await?;

		Ok(grant)
	}

	/// Forgets the scope's credentials and identity without redirecting.
	///
	/// Returns `true` if anything was stored.
	pub async fn sign_out(&self, scope: PrincipalScope) -> Result<bool> {
		Ok(self.store.clear(scope).await?)
	}

	/// Fetches the signed-in user from `path` and replaces the scope's identity snapshot.
	pub async fn reload_identity(
		&self,
		scope: PrincipalScope,
		path: &str,
	) -> Result<IdentitySnapshot> {
		let identity: IdentitySnapshot =
			self.request_data(ApiRequest::get(path).scoped(scope)).await?;

		self.store.set_identity(scope, identity.clone()).await?;

		Ok(identity)
	}

	/// Identity snapshot stored for the scope, if signed in.
	pub async fn identity(&self, scope: PrincipalScope) -> Result<Option<IdentitySnapshot>> {
		Ok(self.store.identity(scope).await?)
	}
}
