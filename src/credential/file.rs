//! File-backed [`CredentialStore`] holding named slots in a JSON object.

// std
use std::{
	fs::{self, File},
	io::{ErrorKind, Write},
	path::{self, Path, PathBuf},
	process,
};
// self
use crate::{
	_prelude::*,
	credential::{
		ClearOutcome, Credential, CredentialLookup, CredentialStore, DEFAULT_SLOT, StoreError,
	},
};

type Slots = BTreeMap<String, String>;

/// Write locks keyed by absolute store path, shared by every handle in the process.
static WRITE_LOCKS: Mutex<BTreeMap<PathBuf, Arc<Mutex<()>>>> = Mutex::new(BTreeMap::new());

fn write_lock_for(path: &Path) -> Arc<Mutex<()>> {
	let key = path::absolute(path).unwrap_or_else(|_| path.to_path_buf());

	WRITE_LOCKS.lock().entry(key).or_default().clone()
}

/// Persists credentials to a JSON object keyed by slot name (`{"token": "..."}`).
///
/// The file is re-read on every [`read`](CredentialStore::read) so a login flow running in
/// another process is picked up by the next request. Writes replace the file atomically and
/// leave unrelated slots untouched. Handles opened on the same path within one process share a
/// write lock, so concurrent read-modify-write cycles never drop each other's slots.
#[derive(Clone, Debug)]
pub struct FileCredentialStore {
	path: PathBuf,
	slot: String,
	write_lock: Arc<Mutex<()>>,
}
impl FileCredentialStore {
	/// Opens a store at `path` using the default `"token"` slot.
	///
	/// The file itself is created lazily on the first write.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let write_lock = write_lock_for(&path);

		Ok(Self { path, slot: DEFAULT_SLOT.into(), write_lock })
	}

	/// Uses a different slot name inside the same file.
	pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
		self.slot = slot.into();

		self
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_slots(path: &Path) -> Result<Slots, StoreError> {
		let bytes = match fs::read(path) {
			Ok(bytes) => bytes,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Slots::new()),
			Err(e) =>
				return Err(StoreError::Backend {
					message: format!("Failed to read {}: {e}", path.display()),
				}),
		};

		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(Slots::new());
		}

		serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
			message: format!("Failed to parse {}: {e}", path.display()),
		})
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist(&self, slots: &Slots) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let serialized =
			serde_json::to_vec_pretty(slots).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize credential slots: {e}"),
			})?;
		let tmp_path = self.tmp_path();
		let written = Self::write_synced(&tmp_path, &serialized).and_then(|()| {
			fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
				message: format!("Failed to replace {}: {e}", self.path.display()),
			})
		});

		if written.is_err() {
			let _ = fs::remove_file(&tmp_path);
		}

		written
	}

	// Unique per writer so other processes never rename a half-written file.
	fn tmp_path(&self) -> PathBuf {
		let name = self.path.file_name().map_or_else(
			|| "credentials".into(),
			|name| name.to_string_lossy().into_owned(),
		);

		self.path.with_file_name(format!(
			".{name}.{}.{}.tmp",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		))
	}

	fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
		let mut file = File::create(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to create {}: {e}", path.display()),
		})?;

		file.write_all(bytes).map_err(|e| StoreError::Backend {
			message: format!("Failed to write {}: {e}", path.display()),
		})?;
		file.sync_all().map_err(|e| StoreError::Backend {
			message: format!("Failed to sync {}: {e}", path.display()),
		})
	}

	fn update<R>(&self, f: impl FnOnce(&mut Slots) -> (R, bool)) -> Result<R, StoreError> {
		let _guard = self.write_lock.lock();
		let mut slots = Self::load_slots(&self.path)?;
		let (result, changed) = f(&mut slots);

		if changed {
			self.persist(&slots)?;
		}

		Ok(result)
	}
}
impl CredentialStore for FileCredentialStore {
	fn read(&self) -> Result<CredentialLookup, StoreError> {
		let mut slots = Self::load_slots(&self.path)?;

		Ok(CredentialLookup::from_raw(slots.remove(&self.slot)))
	}

	fn save(&self, credential: Credential) -> Result<(), StoreError> {
		self.update(|slots| {
			slots.insert(self.slot.clone(), credential.expose().to_owned());

			((), true)
		})
	}

	fn clear(&self) -> Result<(), StoreError> {
		self.update(|slots| ((), slots.remove(&self.slot).is_some()))
	}

	fn clear_if(&self, expected: &Credential) -> Result<ClearOutcome, StoreError> {
		self.update(|slots| {
			let outcome = ClearOutcome::of(slots.get(&self.slot).map(String::as_str), expected);

			if outcome == ClearOutcome::Cleared {
				slots.remove(&self.slot);
			}

			(outcome, outcome == ClearOutcome::Cleared)
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, thread};
	// self
	use super::*;

	fn temp_path(label: &str) -> PathBuf {
		let unique = format!(
			"rainroute_api_credentials_{label}_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	#[test]
	fn missing_file_reads_as_absent() {
		let store = FileCredentialStore::open(temp_path("missing"))
			.expect("Opening a store on a missing file should succeed.");

		let lookup = store.read().expect("Missing file should read cleanly.");

		assert_eq!(lookup, CredentialLookup::Absent);
	}

	#[test]
	fn save_is_visible_to_a_second_handle_and_keeps_other_slots() {
		let path = temp_path("shared");

		fs::write(&path, br#"{"theme":"dark"}"#).expect("Failed to seed credential file.");

		let client_side = FileCredentialStore::open(&path).expect("Failed to open client store.");
		let login_side = FileCredentialStore::open(&path).expect("Failed to open login store.");

		login_side.save(Credential::new("abc123")).expect("Saving the credential should succeed.");

		assert_eq!(
			client_side.read().expect("Reading the saved credential should succeed."),
			CredentialLookup::Present(Credential::new("abc123")),
		);

		client_side.clear().expect("Clearing the credential should succeed.");

		let slots = FileCredentialStore::load_slots(&path).expect("Slots should still parse.");

		assert_eq!(slots.get("theme").map(String::as_str), Some("dark"));
		assert!(!slots.contains_key(DEFAULT_SLOT));
		assert_eq!(
			login_side.read().expect("Read after clear should succeed."),
			CredentialLookup::Absent
		);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary credential file {}: {e}", path.display())
		});
	}

	#[test]
	fn clear_if_only_removes_the_expected_credential() {
		let path = temp_path("clear_if");
		let client_side = FileCredentialStore::open(&path).expect("Failed to open client store.");
		let login_side = FileCredentialStore::open(&path).expect("Failed to open login store.");

		login_side.save(Credential::new("fresh-login")).expect("Saving should succeed.");

		let outcome =
			client_side.clear_if(&Credential::new("stale")).expect("Compare-and-clear should run.");

		assert_eq!(outcome, ClearOutcome::Mismatch);
		assert_eq!(
			login_side.read().expect("Read should succeed."),
			CredentialLookup::Present(Credential::new("fresh-login")),
		);

		let outcome = client_side
			.clear_if(&Credential::new("fresh-login"))
			.expect("Compare-and-clear should run.");

		assert_eq!(outcome, ClearOutcome::Cleared);
		assert_eq!(login_side.read().expect("Read should succeed."), CredentialLookup::Absent);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary credential file {}: {e}", path.display())
		});
	}

	#[test]
	fn concurrent_handles_keep_every_slot() {
		let path = temp_path("concurrent");
		let handles = [
			FileCredentialStore::open(&path).expect("Failed to open first handle."),
			FileCredentialStore::open(&path).expect("Failed to open second handle."),
		];

		thread::scope(|scope| {
			for (handle_index, handle) in handles.iter().enumerate() {
				scope.spawn(move || {
					for i in 0..16 {
						handle
							.clone()
							.with_slot(format!("h{handle_index}_{i}"))
							.save(Credential::new("value"))
							.expect("Concurrent saves should succeed.");
					}
				});
			}
		});

		let slots = FileCredentialStore::load_slots(&path).expect("Slots should parse.");

		assert_eq!(slots.len(), 32);

		let parent = path.parent().expect("Temporary files live in a directory.");
		let stem = path.file_name().and_then(|n| n.to_str()).expect("Temp name is UTF-8.");
		let leftovers = fs::read_dir(parent)
			.expect("Temporary directory should be readable.")
			.filter_map(Result::ok)
			.filter(|entry| entry.file_name().to_string_lossy().starts_with(&format!(".{stem}.")))
			.count();

		assert_eq!(leftovers, 0);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary credential file {}: {e}", path.display())
		});
	}

	#[test]
	fn malformed_file_fails_the_read() {
		let path = temp_path("malformed");

		fs::write(&path, b"not json").expect("Failed to seed malformed credential file.");

		let store = FileCredentialStore::open(&path)
			.expect("Opening does not parse the file.")
			.with_slot("session");
		let err = store.read().expect_err("Malformed JSON must surface as a read failure.");

		assert!(matches!(err, StoreError::Serialization { .. }));

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary credential file {}: {e}", path.display())
		});
	}
}
