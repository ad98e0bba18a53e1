//! Client-level error types shared across the pipeline, stores, and transports.

// self
use crate::{_prelude::*, auth::PrincipalScope};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration or request construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS); the request may never have reached the server.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Successful response whose body did not match the expected shape.
	#[error(transparent)]
	Decode(#[from] ResponseError),

	/// Server answered with a non-success status other than a recoverable 401.
	#[error("{message}")]
	Api {
		/// HTTP status code returned by the server.
		status: u16,
		/// Message taken from the `{ message }` envelope, or a generic fallback.
		message: String,
	},
	/// The request was rejected again after a refresh-and-retry; the session was terminated.
	#[error("The {scope} session is no longer authorized.")]
	Unauthorized {
		/// Scope whose session was terminated.
		scope: PrincipalScope,
	},
	/// Credentials could not be refreshed; the session was terminated.
	#[error("The {scope} session expired: {reason}")]
	SessionExpired {
		/// Scope whose session was terminated.
		scope: PrincipalScope,
		/// Why the refresh did not produce a token.
		reason: RefreshFailure,
	},
}
impl Error {
	/// Returns the HTTP status associated with the error, when one exists.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Api { status, .. } => Some(*status),
			Self::Unauthorized { .. } => Some(401),
			Self::Decode(err) => Some(err.status()),
			_ => None,
		}
	}

	/// Returns `true` if the error ended the session for its scope.
	pub fn is_session_terminal(&self) -> bool {
		matches!(self, Self::Unauthorized { .. } | Self::SessionExpired { .. })
	}
}

/// Configuration and request construction failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] http::Error),
	/// Request path cannot be joined onto the base URL.
	#[error("Request path `{path}` does not form a valid URL.")]
	InvalidPath {
		/// Path that failed to join.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be serialized.")]
	InvalidBody(#[source] serde_json::Error),
	/// Client configuration failed validation.
	#[error(transparent)]
	Client(#[from] crate::config::ClientConfigError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Response bodies that could not be decoded.
#[derive(Debug, ThisError)]
pub enum ResponseError {
	/// Server responded with JSON that does not match the expected type.
	#[error("Response body from {path} could not be decoded.")]
	Parse {
		/// Request path whose response failed to decode.
		path: String,
		/// Structured parsing failure, including the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
}
impl ResponseError {
	/// HTTP status of the undecodable response.
	pub fn status(&self) -> u16 {
		match self {
			Self::Parse { status, .. } => *status,
		}
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling {path}.")]
	Network {
		/// Request path that failed.
		path: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		path: impl Into<String>,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { path: path.into(), source: Box::new(src) }
	}
}

/// Reason a refresh attempt did not yield a new access token.
///
/// The value is cloned to every request queued behind the same refresh, so it carries
/// rendered messages instead of source errors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum RefreshFailure {
	/// No refresh token was stored for the scope; the endpoint was not called.
	#[error("No refresh token is stored.")]
	MissingRefreshToken,
	/// Refresh endpoint answered with a non-success status.
	#[error("Refresh endpoint rejected the token with status {status}: {message}")]
	Rejected {
		/// HTTP status code.
		status: u16,
		/// Message taken from the `{ message }` envelope, or a generic fallback.
		message: String,
	},
	/// Refresh endpoint answered 2xx with a body that lacks an access token.
	#[error("Refresh endpoint returned a malformed body: {message}")]
	Malformed {
		/// Rendered decoding failure.
		message: String,
	},
	/// Refresh call failed before a response arrived.
	#[error("Refresh call failed in transport: {message}")]
	Transport {
		/// Rendered transport failure.
		message: String,
	},
	/// Rotated credentials could not be persisted.
	#[error("Rotated credentials could not be stored: {message}")]
	Storage {
		/// Rendered storage failure.
		message: String,
	},
	/// The scope was signed out while the refresh was in flight.
	#[error("Credentials were cleared while the refresh was in flight.")]
	Cleared,
	/// The task driving the refresh was dropped before it settled.
	///
	/// Queued requests never surface this reason; they rejoin the gate and retry.
	#[error("Refresh was abandoned before it settled.")]
	Abandoned,
}
