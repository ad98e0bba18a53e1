//! Authenticated request pipeline.
//!
//! [`ApiClient::send`] resolves the request's scope, attaches that scope's access token, and
//! classifies the response. A first 401 recovers a token through the scope's single-flight
//! refresh and retries the request once; a second 401 terminates the session.

// self
use crate::{
	_prelude::*,
	auth::{PrincipalScope, TokenSecret},
	client::{ApiClient, ApiRequest, Envelope, decode_body, error_message},
	error::TransportError,
	obs::{self, CallKind, CallOutcome, CallSpan},
	resolve::ScopePresence,
	transport::{ApiTransport, HttpResponse},
};

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Sends a request and returns the successful response.
	///
	/// Non-2xx responses other than a recoverable 401 become [`Error::Api`]; transport failures
	/// become [`Error::Transport`] and never touch stored credentials.
	pub async fn send(&self, request: ApiRequest) -> Result<HttpResponse> {
		if request.anonymous {
			let response = self.dispatch(&request, None).await?;

			return into_success(response);
		}

		const KIND: CallKind = CallKind::Request;

		let scope = self.resolve_scope(&request).await?;
		let span = CallSpan::new(KIND, scope, "send");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(self.send_scoped(scope, &request)).await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}

	/// Sends a request and decodes the JSON body; an empty body decodes as `null`.
	pub async fn request<R>(&self, request: ApiRequest) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let path = request.path.clone();
		let response = self.send(request).await?;

		Ok(decode_body(&path, &response)?)
	}

	/// Sends a request and unwraps the `{ data }` envelope of the response.
	pub async fn request_data<R>(&self, request: ApiRequest) -> Result<R>
	where
		R: DeserializeOwned,
	{
		Ok(self.request::<Envelope<R>>(request).await?.data)
	}

	/// `GET` returning the enveloped payload.
	pub async fn get<R>(&self, path: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		self.request_data(ApiRequest::get(path)).await
	}

	/// `POST` a JSON body, returning the enveloped payload.
	pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		self.request_data(ApiRequest::post(path).json(body)?).await
	}

	/// `PUT` a JSON body, returning the enveloped payload.
	pub async fn put<B, R>(&self, path: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		self.request_data(ApiRequest::put(path).json(body)?).await
	}

	/// `PATCH` a JSON body, returning the enveloped payload.
	pub async fn patch<B, R>(&self, path: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		self.request_data(ApiRequest::patch(path).json(body)?).await
	}

	/// `DELETE`, discarding any response body.
	pub async fn delete(&self, path: &str) -> Result<()> {
		self.send(ApiRequest::delete(path)).await.map(|_| ())
	}

	/// Determines which scope governs `request`.
	///
	/// Explicit tags win; otherwise the current route and the vendor scope's stored state decide.
	pub async fn resolve_scope(&self, request: &ApiRequest) -> Result<PrincipalScope> {
		if let Some(scope) = request.scope {
			return Ok(scope);
		}

		let route = self.navigator.current_route();
		let vendor = PrincipalScope::Vendor;
		let presence = ScopePresence {
			identity: self.store.identity(vendor).await?.is_some(),
			credentials: self.store.credentials(vendor).await?.is_some(),
		};

		Ok(self.config.resolver.resolve(None, route.as_deref(), presence))
	}

	async fn send_scoped(
		&self,
		scope: PrincipalScope,
		request: &ApiRequest,
	) -> Result<HttpResponse> {
		let sent_with = self.store.access_token(scope).await?;
		let response = self.dispatch(request, sent_with.as_ref()).await?;

		if response.status() != StatusCode::UNAUTHORIZED {
			return into_success(response);
		}

		let token = self.recover(scope, sent_with.as_ref()).await?;
		let retried = self.dispatch(request, Some(&token)).await?;

		if retried.status() == StatusCode::UNAUTHORIZED {
			self.terminator.terminate(scope).await?;

			return Err(Error::Unauthorized { scope });
		}

		into_success(retried)
	}

	async fn dispatch(
		&self,
		request: &ApiRequest,
		bearer: Option<&TokenSecret>,
	) -> Result<HttpResponse> {
		let http_request = request.build(&self.config, bearer)?;

		self.transport
			.send(http_request)
			.await
			.map_err(|e| TransportError::network(request.path.as_str(), e).into())
	}
}

fn into_success(response: HttpResponse) -> Result<HttpResponse> {
	if response.status().is_success() {
		Ok(response)
	} else {
		Err(Error::Api { status: response.status().as_u16(), message: error_message(&response) })
	}
}
