//! Per-call request descriptors and the dispatch-ready form handed to transports.

// crates.io
use http::header::{HeaderName, HeaderValue};
// self
use crate::{_prelude::*, config::ClientConfig, error::ConfigError};

/// Request descriptor built by callers and mutated by outbound pipeline stages.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Path relative to the configured base address; may carry a query string.
	pub path: String,
	/// Extra query pairs appended after any query already present in `path`.
	pub query: Vec<(String, String)>,
	/// Per-request headers; these win over the configured defaults.
	pub headers: HeaderMap,
	/// Raw request body.
	pub body: Option<Vec<u8>>,
	/// Per-request deadline passed through to the transport.
	pub timeout: Option<StdDuration>,
	/// Typed values outbound stages leave for inbound stages; never sent on the wire.
	pub extensions: Extensions,
}
impl ApiRequest {
	/// Creates a request with no headers, query, or body.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self {
			method,
			path: path.into(),
			query: Vec::new(),
			headers: HeaderMap::new(),
			body: None,
			timeout: None,
			extensions: Extensions::new(),
		}
	}

	/// `GET` request for `path`.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::GET, path)
	}

	/// `POST` request for `path`.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::POST, path)
	}

	/// `PUT` request for `path`.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::PUT, path)
	}

	/// `PATCH` request for `path`.
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(Method::PATCH, path)
	}

	/// `DELETE` request for `path`.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::DELETE, path)
	}

	/// Sets a header, replacing any previous value with the same name.
	pub fn header(mut self, name: &str, value: &str) -> Result<Self, ConfigError> {
		let invalid = || ConfigError::InvalidHeader { name: name.to_owned() };
		let name_parsed = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
		let value_parsed = HeaderValue::from_str(value).map_err(|_| invalid())?;

		self.headers.insert(name_parsed, value_parsed);

		Ok(self)
	}

	/// Appends a query pair.
	pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((key.into(), value.into()));

		self
	}

	/// Serializes `body` as the JSON payload.
	pub fn json<T>(mut self, body: &T) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_vec(body)?);

		Ok(self)
	}

	/// Uses `body` verbatim as the payload.
	pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Sets the per-request deadline.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}
}

/// Fully resolved request a transport can execute without further configuration.
#[derive(Clone, Debug)]
pub struct PreparedRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute target URL.
	pub url: Url,
	/// Merged headers (defaults first, then per-request values).
	pub headers: HeaderMap,
	/// Raw request body.
	pub body: Option<Vec<u8>>,
	/// Effective deadline, if any.
	pub timeout: Option<StdDuration>,
}
impl PreparedRequest {
	/// Resolves `request` against `config`.
	pub fn prepare(config: &ClientConfig, request: ApiRequest) -> Result<Self, ConfigError> {
		let ApiRequest { method, path, query, headers, body, timeout, extensions: _ } = request;
		let mut url = config.resolve(&path)?;

		if !query.is_empty() {
			url.query_pairs_mut().extend_pairs(query.iter());
		}

		let mut merged = config.default_headers.clone();

		// `HeaderMap::extend` replaces all values for names present in `headers`.
		merged.extend(headers);

		Ok(Self { method, url, headers: merged, body, timeout: timeout.or(config.timeout) })
	}
}
