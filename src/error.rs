//! Client-level error types shared across the pipeline, stores, and transports.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The credential store could not be read, so the request was never sent.
	#[error("Credential store read failed: {0}")]
	Credential(
		#[from]
		#[source]
		crate::credential::StoreError,
	),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Backend rejected the credential (HTTP 401).
	#[error("Backend rejected the request as unauthorized.")]
	Unauthorized(HttpStatusError),
	/// Backend answered with any other non-success status.
	#[error(transparent)]
	Status(HttpStatusError),
	/// Response body could not be decoded into the requested type.
	#[error("Response body could not be decoded as JSON.")]
	Decode {
		/// Structured parsing failure, including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status of the response that failed to decode.
		status: u16,
	},
}
impl Error {
	/// Returns the HTTP status associated with the failure, when one was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Unauthorized(e) | Self::Status(e) => Some(e.status),
			Self::Decode { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Returns `true` when the backend classified the request as unauthorized.
	pub fn is_unauthorized(&self) -> bool {
		matches!(self, Self::Unauthorized(_))
	}
}

/// Non-success HTTP response surfaced to callers.
#[derive(Clone, Debug, ThisError)]
#[error("Backend responded with HTTP {status}.")]
pub struct HttpStatusError {
	/// HTTP status code returned by the backend.
	pub status: u16,
	/// Retry-After hint from upstream, if supplied.
	pub retry_after: Option<Duration>,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl HttpStatusError {
	/// Lossy UTF-8 preview of the response body.
	pub fn body_text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Base address cannot be parsed.
	#[error("Base address `{value}` is not a valid URL.")]
	InvalidBaseUrl {
		/// Rejected value.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base address parses but is not a hierarchical `http`/`https` URL.
	#[error("Base address `{value}` must be an http or https URL.")]
	UnsupportedBaseUrl {
		/// Rejected value.
		value: String,
	},
	/// Request path cannot be joined onto the base address.
	#[error("Request path `{path}` does not form a valid URL.")]
	InvalidPath {
		/// Rejected path.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Header name or value is malformed.
	#[error("Header `{name}` is invalid.")]
	InvalidHeader {
		/// Header name as supplied.
		name: String,
	},
	/// Request body could not be serialized to JSON.
	#[error("Request body could not be serialized as JSON.")]
	BodySerialize(#[from] serde_json::Error),
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the backend.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request exceeded its deadline.
	#[error("Request to the backend timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the backend.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}
