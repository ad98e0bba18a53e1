//! Transport primitives for API calls.
//!
//! [`ApiTransport`] is the client's only dependency on an HTTP stack. Requests and responses are
//! plain [`http`] values with byte bodies so custom transports (in-process fakes, alternative
//! HTTP clients) can be plugged in without touching the request pipeline.

// self
use crate::_prelude::*;

/// Fully resolved outgoing request (absolute URI, headers, serialized body).
pub type HttpRequest = http::Request<Vec<u8>>;
/// Raw response returned by a transport.
pub type HttpResponse = http::Response<Vec<u8>>;

/// Boxed future returned by [`ApiTransport::send`].
pub type TransportFuture<'a, E> =
	Pin<Box<dyn Future<Output = Result<HttpResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports used by the request pipeline.
///
/// Implementations must return every HTTP response, including 4xx and 5xx ones, as `Ok`; the
/// pipeline classifies statuses itself. `Err` is reserved for failures where no response
/// arrived (DNS, TCP, TLS, timeouts).
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Sends the request and resolves once the full response body is read.
	fn send(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a transport whose client applies `timeout` to every call.
	pub fn with_timeout(timeout: std::time::Duration) -> Result<Self, crate::error::ConfigError> {
		Ok(Self(ReqwestClient::builder().timeout(timeout).build()?))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	type TransportError = ReqwestError;

	fn send(&self, request: HttpRequest) -> TransportFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let response = client.execute(request.try_into()?).await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let mut response_new = HttpResponse::new(response.bytes().await?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// crates.io
	use httpmock::prelude::{GET, MockServer};
	// self
	use super::*;

	#[tokio::test]
	async fn reqwest_transport_returns_error_statuses_as_responses() {
		let server = MockServer::start_async().await;
		let mock = server
			.mock_async(|when, then| {
				when.method(GET).path("/orders/7");
				then.status(404)
					.header("content-type", "application/json")
					.body("{\"message\":\"Order not found\"}");
			})
			.await;
		let request = http::Request::builder()
			.method(Method::GET)
			.uri(server.url("/orders/7"))
			.body(Vec::new())
			.expect("Fixture request should build.");
		let response = ReqwestTransport::default()
			.send(request)
			.await
			.expect("Error statuses should not surface as transport errors.");

		mock.assert_async().await;

		assert_eq!(response.status(), StatusCode::NOT_FOUND);
		assert_eq!(response.body().as_slice(), b"{\"message\":\"Order not found\"}");
	}
}
