//! Caller-facing request descriptions and response envelopes.

// crates.io
use http::{
	HeaderName, HeaderValue,
	header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth::{PrincipalScope, TokenSecret},
	config::ClientConfig,
	error::{ConfigError, ResponseError},
	transport::{HttpRequest, HttpResponse},
};

const JSON: &str = "application/json";

/// An API call as application code describes it.
///
/// Paths are relative to the configured base URL. The scope is inferred unless set with
/// [`scoped`](Self::scoped); [`anonymous`](Self::anonymous) requests carry no credentials and
/// never trigger a refresh.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Path appended to the base URL.
	pub path: String,
	/// Query pairs appended in order.
	pub query: Vec<(String, String)>,
	/// JSON body, if any.
	pub body: Option<serde_json::Value>,
	/// Extra headers applied after the defaults.
	pub headers: HeaderMap,
	/// Explicit scope tag; inferred when absent.
	pub scope: Option<PrincipalScope>,
	/// Skips credential attachment and the refresh protocol.
	pub anonymous: bool,
}
impl ApiRequest {
	/// Creates a request with no body, query, or scope tag.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			query: Vec::new(),
			body: None,
			headers: HeaderMap::new(),
			scope: None,
			anonymous: false,
		}
	}

	/// `GET` request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::GET, path)
	}

	/// `POST` request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::POST, path)
	}

	/// `PUT` request.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::PUT, path)
	}

	/// `PATCH` request.
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(Method::PATCH, path)
	}

	/// `DELETE` request.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::DELETE, path)
	}

	/// Serializes `body` as the JSON payload.
	pub fn json<B>(mut self, body: &B) -> Result<Self, ConfigError>
	where
		B: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_value(body).map_err(ConfigError::InvalidBody)?);

		Ok(self)
	}

	/// Uses an already-built JSON payload.
	pub fn with_json(mut self, body: serde_json::Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Appends a query pair.
	pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
		self.query.push((key.into(), value.to_string()));

		self
	}

	/// Adds a header, replacing any previous value for the same name.
	pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Tags the request with an explicit scope.
	pub fn scoped(mut self, scope: PrincipalScope) -> Self {
		self.scope = Some(scope);

		self
	}

	/// Marks the request as public (no credentials, no refresh on 401).
	pub fn anonymous(mut self) -> Self {
		self.anonymous = true;

		self
	}

	/// Resolves the request against `config`, attaching `bearer` when provided.
	pub fn build(
		&self,
		config: &ClientConfig,
		bearer: Option<&TokenSecret>,
	) -> Result<HttpRequest, ConfigError> {
		let mut url = config
			.endpoint(&self.path)
			.map_err(|source| ConfigError::InvalidPath { path: self.path.clone(), source })?;

		if !self.query.is_empty() {
			url.query_pairs_mut().extend_pairs(self.query.iter());
		}

		let body = match &self.body {
			Some(value) => serde_json::to_vec(value).map_err(ConfigError::InvalidBody)?,
			None => Vec::new(),
		};
		let mut builder = http::Request::builder()
			.method(self.method.clone())
			.uri(url.as_str())
			.header(ACCEPT, JSON);

		if let Some(token) = bearer {
			builder = builder.header(AUTHORIZATION, token.bearer());
		}
		if self.body.is_some() {
			builder = builder.header(CONTENT_TYPE, JSON);
		}
		if let Some(headers) = builder.headers_mut() {
			headers.extend(self.headers.clone());
		}

		Ok(builder.body(body)?)
	}
}

/// Conventional `{ data }` success envelope.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Envelope<T> {
	/// Payload.
	pub data: T,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
	#[serde(default)]
	message: Option<ErrorMessage>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
	Single(String),
	Many(Vec<String>),
}

/// Extracts the `{ message }` field of an error body; validation errors that carry a list of
/// messages are joined with `; `.
pub fn error_message(response: &HttpResponse) -> String {
	let status = response.status().as_u16();
	let message = serde_json::from_slice::<ErrorEnvelope>(response.body())
		.ok()
		.and_then(|envelope| envelope.message)
		.map(|message| match message {
			ErrorMessage::Single(text) => text,
			ErrorMessage::Many(items) => items.join("; "),
		})
		.filter(|text| !text.trim().is_empty());

	message.unwrap_or_else(|| format!("Request failed with status {status}."))
}

/// Decodes a JSON body, treating an empty body as `null`.
pub fn decode_body<R>(path: &str, response: &HttpResponse) -> Result<R, ResponseError>
where
	R: DeserializeOwned,
{
	let body = response.body().as_slice();
	let bytes = if body.iter().all(u8::is_ascii_whitespace) { b"null".as_slice() } else { body };
	let mut deserializer = serde_json::Deserializer::from_slice(bytes);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|source| ResponseError::Parse {
		path: path.to_owned(),
		source,
		status: response.status().as_u16(),
	})
}
