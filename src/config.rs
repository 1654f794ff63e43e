//! Transport configuration: base address, default headers, and default deadline.

// crates.io
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
// self
use crate::{_prelude::*, error::ConfigError};

/// Environment variable consulted first for the backend base address.
pub const API_URL_ENV: &str = "RAINROUTE_API_URL";
/// Public-configuration variable shared with the web frontend; used when [`API_URL_ENV`] is unset.
pub const PUBLIC_API_URL_ENV: &str = "NEXT_PUBLIC_API_URL";
/// Local-development backend used when no environment override resolves.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Immutable transport settings shared by every request a client sends.
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// Root URL every request path is resolved against.
	pub base_url: Url,
	/// Headers applied to each request unless the request sets the same name.
	pub default_headers: HeaderMap,
	/// Deadline applied to requests that do not carry their own.
	pub timeout: Option<StdDuration>,
}
impl ClientConfig {
	/// Creates a configuration for `base_url` with the JSON content-type default.
	pub fn new(base_url: Url) -> Self {
		let mut default_headers = HeaderMap::new();

		default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

		Self { base_url, default_headers, timeout: None }
	}

	/// Parses `base_url` and builds a configuration around it.
	///
	/// Only hierarchical `http` and `https` addresses are accepted.
	pub fn parse(base_url: &str) -> Result<Self, ConfigError> {
		let url = Url::parse(base_url).map_err(|source| ConfigError::InvalidBaseUrl {
			value: base_url.to_owned(),
			source,
		})?;

		validate_base_url(&url)?;

		Ok(Self::new(url))
	}

	/// Resolves the base address from the process environment.
	///
	/// Never fails: unset, blank, or malformed values fall through to the next source and
	/// finally to [`DEFAULT_BASE_URL`].
	pub fn from_env() -> Self {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Same resolution as [`from_env`](Self::from_env) with an injected variable reader.
	pub fn from_lookup<F>(lookup: F) -> Self
	where
		F: Fn(&str) -> Option<String>,
	{
		for key in [API_URL_ENV, PUBLIC_API_URL_ENV] {
			let Some(raw) = lookup(key) else { continue };
			let raw = raw.trim();

			if raw.is_empty() {
				continue;
			}

			match Self::parse(raw) {
				Ok(config) => return config,
				Err(e) => {
					#[cfg(feature = "tracing")]
					tracing::warn!(variable = key, error = %e, "ignoring malformed base address");
					#[cfg(not(feature = "tracing"))]
					let _ = e;
				},
			}
		}

		Self::default()
	}

	/// Adds or replaces a default header.
	pub fn with_default_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.default_headers.insert(name, value);

		self
	}

	/// Sets the deadline used when a request carries none.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Joins `path` onto the base address with exactly one `/` between them.
	///
	/// The base path prefix is preserved (unlike [`Url::join`]) and any query string in `path`
	/// is kept.
	pub fn resolve(&self, path: &str) -> Result<Url, ConfigError> {
		let base = self.base_url.as_str().trim_end_matches('/');
		let relative = path.trim_start_matches('/');
		let joined =
			if relative.is_empty() { base.to_owned() } else { format!("{base}/{relative}") };

		Url::parse(&joined)
			.map_err(|source| ConfigError::InvalidPath { path: path.to_owned(), source })
	}
}
impl Default for ClientConfig {
	fn default() -> Self {
		Self::new(Url::parse(DEFAULT_BASE_URL).expect("Default base address must be a valid URL."))
	}
}

fn validate_base_url(url: &Url) -> Result<(), ConfigError> {
	if matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base() {
		Ok(())
	} else {
		Err(ConfigError::UnsupportedBaseUrl { value: url.to_string() })
	}
}
