//! Transport primitives for backend calls.
//!
//! [`ApiTransport`] is the client's only dependency on an HTTP stack. The pipeline hands it a
//! fully resolved [`PreparedRequest`] and expects the raw [`ApiResponse`] back; status
//! classification and interceptor stages stay in [`ApiClient`](crate::client::ApiClient), so a
//! custom transport never has to reimplement them.

// self
use crate::{_prelude::*, error::TransportError, request::PreparedRequest, response::ApiResponse};

/// Boxed future returned by [`ApiTransport::send`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing a prepared backend request.
///
/// Implementations must be `Send + Sync + 'static` so one transport can be shared by every
/// clone of a client. Any response that arrives, whatever its status, is returned as `Ok`;
/// only failures to obtain a response at all map to [`TransportError`]. Deadlines carried in
/// [`PreparedRequest::timeout`] should be enforced with the transport's native mechanism.
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes `request` and returns the response exactly as received.
	fn send(&self, request: PreparedRequest) -> TransportFuture<'_>;
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
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	fn send(&self, request: PreparedRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let PreparedRequest { method, url, headers, body, timeout } = request;
			let mut builder = client.request(method, url).headers(headers);

			if let Some(body) = body {
				builder = builder.body(body);
			}
			if let Some(timeout) = timeout {
				builder = builder.timeout(timeout);
			}

			let response = builder.send().await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await?;

			Ok(ApiResponse::new(status, headers, body.to_vec()))
		})
	}
}
