//! Thread-safe in-memory [`CredentialStore`] for long-running processes and tests.

// self
use crate::{
	_prelude::*,
	credential::{ClearOutcome, Credential, CredentialLookup, CredentialStore, StoreError},
};

/// Single credential slot kept in-process.
///
/// Clones share the same slot, so a login flow holding one clone is immediately visible to
/// the client holding another.
#[derive(Clone, Debug, Default)]
pub struct MemoryCredentialStore(Arc<RwLock<Option<Credential>>>);
impl MemoryCredentialStore {
	/// Creates a store already holding `credential`.
	pub fn with_credential(credential: impl Into<String>) -> Self {
		Self(Arc::new(RwLock::new(Some(Credential::new(credential)))))
	}
}
impl CredentialStore for MemoryCredentialStore {
	fn read(&self) -> Result<CredentialLookup, StoreError> {
		let raw = self.0.read().as_ref().map(|c| c.expose().to_owned());

		Ok(CredentialLookup::from_raw(raw))
	}

	fn save(&self, credential: Credential) -> Result<(), StoreError> {
		*self.0.write() = Some(credential);

		Ok(())
	}

	fn clear(&self) -> Result<(), StoreError> {
		*self.0.write() = None;

		Ok(())
	}

	fn clear_if(&self, expected: &Credential) -> Result<ClearOutcome, StoreError> {
		let mut slot = self.0.write();
		let outcome = ClearOutcome::of(slot.as_ref().map(Credential::expose), expected);

		if outcome == ClearOutcome::Cleared {
			*slot = None;
		}

		Ok(outcome)
	}
}
