//! Successful backend responses and their decoding helpers.

// crates.io
use http::header::RETRY_AFTER;
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, error::HttpStatusError};

/// Outcome of a single call as observed by inbound pipeline stages.
pub type Outcome = Result<ApiResponse>;

/// Response exactly as the transport delivered it.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw body bytes.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Assembles a response from its parts.
	pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
		Self { status, headers, body: body.into() }
	}

	/// Raw body bytes.
	pub fn bytes(&self) -> &[u8] {
		&self.body
	}

	/// Lossy UTF-8 rendering of the body.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Decodes the body as JSON, reporting the failing path on error.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut de = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut de)
			.map_err(|source| Error::Decode { source, status: self.status.as_u16() })
	}

	/// Splits transport output into success or a classified status failure.
	///
	/// Any 2xx is a success; 401 becomes [`Error::Unauthorized`]; everything else becomes
	/// [`Error::Status`].
	pub fn into_outcome(self) -> Outcome {
		if self.status.is_success() {
			return Ok(self);
		}

		let failure = HttpStatusError {
			status: self.status.as_u16(),
			retry_after: parse_retry_after(&self.headers),
			body: self.body,
		};

		if self.status == StatusCode::UNAUTHORIZED {
			Err(Error::Unauthorized(failure))
		} else {
			Err(Error::Status(failure))
		}
	}
}

/// Decodes an empty or JSON body; empty bodies decode as JSON `null`.
pub(crate) fn decode_json_or_null<T>(response: &ApiResponse) -> Result<T>
where
	T: DeserializeOwned,
{
	if response.body.iter().all(u8::is_ascii_whitespace) {
		let mut de = serde_json::Deserializer::from_slice(b"null");

		return serde_path_to_error::deserialize(&mut de)
			.map_err(|source| Error::Decode { source, status: response.status.as_u16() });
	}

	response.json()
}

/// Parses `Retry-After` expressed in delta-seconds or as an RFC 2822 date.
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
