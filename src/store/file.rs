//! File-backed [`TokenStore`] that survives process restarts.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, IdentitySnapshot, PrincipalScope},
	store::{self, CompareAndSwapOutcome, ScopeEntry, StoreError, StoreFuture, TokenStore},
};

type Snapshot = HashMap<PrincipalScope, ScopeEntry>;

/// Persists per-scope entries to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<Snapshot>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the backing file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<Snapshot, StoreError> {
		if !path.exists() {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(HashMap::new());
		}

		let entries: Vec<(PrincipalScope, ScopeEntry)> =
			serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		Ok(entries.into_iter().collect())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &Snapshot) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let snapshot: BTreeMap<_, _> =
			contents.iter().filter(|(_, entry)| !entry.is_empty()).collect();
		let snapshot: Vec<_> = snapshot.into_iter().collect();
		let serialized =
			serde_json::to_vec_pretty(&snapshot).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}

	fn mutate<R>(&self, f: impl FnOnce(&mut Snapshot) -> R) -> Result<R, StoreError> {
		let mut guard = self.inner.write();
		let result = f(&mut guard);

		self.persist_locked(&guard)?;

		Ok(result)
	}
}
impl TokenStore for FileStore {
	fn credentials(&self, scope: PrincipalScope) -> StoreFuture<'_, Option<CredentialPair>> {
		Box::pin(async move {
			Ok(self.inner.read().get(&scope).and_then(|entry| entry.credentials.clone()))
		})
	}

	fn set_credentials(&self, scope: PrincipalScope, pair: CredentialPair) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			self.mutate(|snapshot| snapshot.entry(scope).or_default().credentials = Some(pair))
		})
	}

	fn compare_and_swap_refresh<'a>(
		&'a self,
		scope: PrincipalScope,
		expected_refresh: &'a str,
		replacement: CredentialPair,
	) -> StoreFuture<'a, CompareAndSwapOutcome> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let outcome = store::swap_refresh(&mut guard, scope, expected_refresh, replacement);

			if matches!(outcome, CompareAndSwapOutcome::Updated) {
				self.persist_locked(&guard)?;
			}

			Ok(outcome)
		})
	}

	fn identity(&self, scope: PrincipalScope) -> StoreFuture<'_, Option<IdentitySnapshot>> {
		Box::pin(async move {
			Ok(self.inner.read().get(&scope).and_then(|entry| entry.identity.clone()))
		})
	}

	fn set_identity(
		&self,
		scope: PrincipalScope,
		identity: IdentitySnapshot,
	) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			self.mutate(|snapshot| snapshot.entry(scope).or_default().identity = Some(identity))
		})
	}

	fn set_entry(&self, scope: PrincipalScope, entry: ScopeEntry) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			self.mutate(|snapshot| {
				snapshot.insert(scope, entry);
			})
		})
	}

	fn clear(&self, scope: PrincipalScope) -> StoreFuture<'_, bool> {
		Box::pin(async move {
			self.mutate(|snapshot| snapshot.remove(&scope).is_some_and(|entry| !entry.is_empty()))
		})
	}
}
