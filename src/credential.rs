//! Credential store contracts and built-in store implementations.
//!
//! The client only ever reads the stored bearer token on the request path; writes happen in
//! login flows outside this crate, plus the optional clear performed by
//! [`SessionGuard`](crate::session::SessionGuard) after a 401.

pub mod file;
pub mod memory;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

// self
use crate::_prelude::*;

/// Slot name used by stores that keep several named values.
pub const DEFAULT_SLOT: &str = "token";

/// Redacted bearer token keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);
impl Credential {
	/// Wraps a new token string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Renders the `Authorization` header value for this credential.
	pub fn bearer(&self) -> String {
		format!("Bearer {}", self.0)
	}
}
impl AsRef<str> for Credential {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Credential").field(&"<redacted>").finish()
	}
}
impl Display for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Result of reading the credential slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CredentialLookup {
	/// A non-empty credential is stored.
	Present(Credential),
	/// The store is reachable but holds no session.
	Absent,
	/// No store exists in this execution environment.
	Unavailable,
}
impl CredentialLookup {
	/// Normalizes a raw slot value; empty tokens count as no session.
	pub fn from_raw(raw: Option<String>) -> Self {
		match raw {
			Some(value) if !value.is_empty() => Self::Present(Credential::new(value)),
			_ => Self::Absent,
		}
	}

	/// Returns the credential when one is present.
	pub fn credential(&self) -> Option<&Credential> {
		match self {
			Self::Present(credential) => Some(credential),
			Self::Absent | Self::Unavailable => None,
		}
	}
}

/// Storage backend contract for the bearer credential.
///
/// Reads are synchronous so the outbound stage never suspends on I/O; each read returns the
/// most recently written value.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Reads the current credential.
	fn read(&self) -> Result<CredentialLookup, StoreError>;

	/// Persists or replaces the credential.
	fn save(&self, credential: Credential) -> Result<(), StoreError>;

	/// Removes the credential, ending the local session.
	fn clear(&self) -> Result<(), StoreError>;

	/// Atomically removes the credential if it still equals `expected`.
	///
	/// A credential written after `expected` was read is left in place.
	fn clear_if(&self, expected: &Credential) -> Result<ClearOutcome, StoreError>;
}

/// Result of a [`CredentialStore::clear_if`] attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClearOutcome {
	/// The stored credential matched and was removed.
	Cleared,
	/// A different credential is stored; it was kept.
	Mismatch,
	/// Nothing was stored.
	Missing,
}
impl ClearOutcome {
	/// Compares the stored raw value against `expected`; empty values count as missing.
	pub fn of(stored: Option<&str>, expected: &Credential) -> Self {
		match stored {
			Some(value) if value.is_empty() => Self::Missing,
			Some(value) if value == expected.expose() => Self::Cleared,
			Some(_) => Self::Mismatch,
			None => Self::Missing,
		}
	}
}

/// Store for environments without client-side persistence.
///
/// Every read reports [`CredentialLookup::Unavailable`] and writes are ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCredentialStore;
impl CredentialStore for NoCredentialStore {
	fn read(&self) -> Result<CredentialLookup, StoreError> {
		Ok(CredentialLookup::Unavailable)
	}

	fn save(&self, _: Credential) -> Result<(), StoreError> {
		Ok(())
	}

	fn clear(&self) -> Result<(), StoreError> {
		Ok(())
	}

	fn clear_if(&self, _: &Credential) -> Result<ClearOutcome, StoreError> {
		Ok(ClearOutcome::Missing)
	}
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn credential_formatters_redact() {
		let credential = Credential::new("abc123");

		assert_eq!(format!("{credential:?}"), "Credential(\"<redacted>\")");
		assert_eq!(format!("{credential}"), "<redacted>");
		assert_eq!(credential.bearer(), "Bearer abc123");
	}

	#[test]
	fn empty_raw_value_is_absent() {
		assert_eq!(CredentialLookup::from_raw(None), CredentialLookup::Absent);
		assert_eq!(CredentialLookup::from_raw(Some(String::new())), CredentialLookup::Absent);
		assert_eq!(
			CredentialLookup::from_raw(Some("abc123".into())),
			CredentialLookup::Present(Credential::new("abc123")),
		);
	}

	#[test]
	fn clear_outcome_compares_the_stored_value() {
		let expected = Credential::new("abc123");

		assert_eq!(ClearOutcome::of(Some("abc123"), &expected), ClearOutcome::Cleared);
		assert_eq!(ClearOutcome::of(Some("def456"), &expected), ClearOutcome::Mismatch);
		assert_eq!(ClearOutcome::of(Some(""), &expected), ClearOutcome::Missing);
		assert_eq!(ClearOutcome::of(None, &expected), ClearOutcome::Missing);
	}

	#[test]
	fn no_store_is_always_unavailable() {
		let store = NoCredentialStore;

		store.save(Credential::new("ignored")).expect("Saving into NoCredentialStore is a no-op.");

		let lookup = store.read().expect("NoCredentialStore reads never fail.");

		assert_eq!(lookup, CredentialLookup::Unavailable);
		assert!(lookup.credential().is_none());
		assert_eq!(
			store.clear_if(&Credential::new("ignored")).expect("NoCredentialStore never fails."),
			ClearOutcome::Missing,
		);
	}
}
