//! Outbound stage that attaches the stored bearer credential.

// crates.io
use http::header::{AUTHORIZATION, HeaderValue};
// self
use crate::{
	_prelude::*,
	credential::{Credential, CredentialStore},
	error::ConfigError,
	pipeline::RequestInterceptor,
	request::ApiRequest,
};

/// Request extension naming the credential [`BearerAuth`] attached to the request.
///
/// Inbound stages use it to act on the credential the backend actually rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachedCredential(pub Credential);

/// Injects `Authorization: Bearer <credential>` into every request while a credential is stored.
///
/// The store is read on every call, so a login or logout between two calls is reflected on the
/// very next request. Absent and unavailable stores leave the request untouched; a failed read
/// aborts the call rather than sending it unauthenticated.
#[derive(Clone)]
pub struct BearerAuth {
	store: Arc<dyn CredentialStore>,
}
impl BearerAuth {
	/// Stage name reported by [`RequestInterceptor::name`].
	pub const NAME: &'static str = "bearer_auth";

	/// Creates the stage over `store`.
	pub fn new(store: Arc<dyn CredentialStore>) -> Self {
		Self { store }
	}
}
impl RequestInterceptor for BearerAuth {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn before_send(&self, request: &mut ApiRequest) -> Result<()> {
		let lookup = self.store.read()?;
		let Some(credential) = lookup.credential() else {
			request.extensions.remove::<AttachedCredential>();

			return Ok(());
		};
		let mut value = HeaderValue::from_str(&credential.bearer())
			.map_err(|_| ConfigError::InvalidHeader { name: AUTHORIZATION.to_string() })?;

		value.set_sensitive(true);
		request.headers.insert(AUTHORIZATION, value);
		request.extensions.insert(AttachedCredential(credential.clone()));

		Ok(())
	}
}
impl Debug for BearerAuth {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("BearerAuth(..)")
	}
}
