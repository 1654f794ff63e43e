//! Authenticated RainRoute backend client: one shared transport, a bearer-token outbound stage,
//! and a session-aware inbound stage composed into an explicit interceptor pipeline.
//!
//! ```no_run
//! # async fn demo() -> rainroute_api::error::Result<()> {
//! use rainroute_api::{client::ApiClient, credential::MemoryCredentialStore};
//!
//! let store = MemoryCredentialStore::with_credential("abc123");
//! let client = ApiClient::from_env(store);
//! let routes: serde_json::Value = client.get_json("/routes").await?;
//! # let _ = routes;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod http;
pub mod obs;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod session;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::{ApiClientBuilder, ReqwestApiClient},
		config::ClientConfig,
		http::ReqwestTransport,
		session::{SessionEvent, SessionListener},
	};

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_transport() -> ReqwestTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestTransport::with_client(client)
	}

	/// Starts a builder pointed at `base_url` (typically `MockServer::url("/api/v1")`).
	pub fn test_client_builder(base_url: &str) -> ApiClientBuilder {
		let config = ClientConfig::parse(base_url).expect("Mock base address should parse.");

		ApiClientBuilder::new(config)
	}

	/// Finishes `builder` on the test transport.
	pub fn finish_test_client(builder: ApiClientBuilder) -> ReqwestApiClient {
		builder.build_with_transport(test_reqwest_transport())
	}

	/// Session listener that records every event it receives.
	#[derive(Clone, Debug, Default)]
	pub struct SessionEventLog(Arc<Mutex<Vec<SessionEvent>>>);
	impl SessionEventLog {
		/// Events received so far.
		pub fn events(&self) -> Vec<SessionEvent> {
			self.0.lock().clone()
		}
	}
	impl SessionListener for SessionEventLog {
		fn on_session_event(&self, event: &SessionEvent) {
			self.0.lock().push(*event);
		}
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use http::{Extensions, HeaderMap, Method, StatusCode};
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
