// self
use backoffice_client::{
	auth::{CredentialPair, IdentitySnapshot, PrincipalScope, TokenSecret, UserId},
	store::{CompareAndSwapOutcome, MemoryStore, ScopeEntry, TokenStore},
};

fn vendor_identity() -> IdentitySnapshot {
	IdentitySnapshot::new(
		UserId::new("vendor-42").expect("Fixture user identifier should be valid."),
		"Acme Supplies",
		"owner@acme.test",
	)
	.with_role("vendor")
}

#[tokio::test]
async fn credentials_and_identity_round_trip() {
	let store = MemoryStore::default();
	let pair = CredentialPair::new("access-1", "refresh-1");

	store
		.set_credentials(PrincipalScope::Vendor, pair.clone())
		.await
		.expect("Storing vendor credentials should succeed.");
	store
		.set_identity(PrincipalScope::Vendor, vendor_identity())
		.await
		.expect("Storing vendor identity should succeed.");

	let fetched = store
		.credentials(PrincipalScope::Vendor)
		.await
		.expect("Fetching vendor credentials should succeed.")
		.expect("Vendor credentials should be present.");

	assert_eq!(fetched, pair);
	assert_eq!(
		store
			.access_token(PrincipalScope::Vendor)
			.await
			.expect("Reading the access token should succeed.")
			.as_ref()
			.map(|secret| secret.expose()),
		Some("access-1")
	);
	assert_eq!(
		store
			.refresh_token(PrincipalScope::Vendor)
			.await
			.expect("Reading the refresh token should succeed.")
			.as_ref()
			.map(|secret| secret.expose()),
		Some("refresh-1")
	);
	assert_eq!(
		store
			.identity(PrincipalScope::Vendor)
			.await
			.expect("Fetching vendor identity should succeed.")
			.map(|identity| identity.email),
		Some("owner@acme.test".to_owned())
	);
}

#[tokio::test]
async fn scopes_never_see_each_other() {
	let store = MemoryStore::default();

	store
		.set_credentials(
			PrincipalScope::Vendor,
			CredentialPair::new("vendor-access", "vendor-refresh"),
		)
		.await
		.expect("Storing vendor credentials should succeed.");

	assert!(
		store
			.credentials(PrincipalScope::Admin)
			.await
			.expect("Fetching admin credentials should succeed.")
			.is_none()
	);

	store
		.set_credentials(
			PrincipalScope::Admin,
			CredentialPair::new("admin-access", "admin-refresh"),
		)
		.await
		.expect("Storing admin credentials should succeed.");

	let removed = store
		.clear(PrincipalScope::Admin)
		.await
		.expect("Clearing the admin scope should succeed.");

	assert!(removed);
	assert!(store.entry(PrincipalScope::Admin).is_empty());
	assert_eq!(
		store.entry(PrincipalScope::Vendor).credentials.map(|pair| pair.access_token),
		Some(TokenSecret::new("vendor-access"))
	);

	let removed_again = store
		.clear(PrincipalScope::Admin)
		.await
		.expect("Clearing an empty scope should succeed.");

	assert!(!removed_again);
}

#[tokio::test]
async fn set_entry_swaps_credentials_and_identity_together() {
	let store = MemoryStore::default();

	store
		.set_credentials(PrincipalScope::Vendor, CredentialPair::new("access-1", "refresh-1"))
		.await
		.expect("Storing vendor credentials should succeed.");
	store
		.set_identity(PrincipalScope::Vendor, vendor_identity())
		.await
		.expect("Storing vendor identity should succeed.");

	let replacement = ScopeEntry {
		credentials: Some(CredentialPair::new("access-2", "refresh-2")),
		identity: None,
	};

	store
		.set_entry(PrincipalScope::Vendor, replacement.clone())
		.await
		.expect("Replacing the vendor entry should succeed.");

	assert_eq!(store.entry(PrincipalScope::Vendor), replacement);
	assert!(store.entry(PrincipalScope::Admin).is_empty());
}

#[tokio::test]
async fn cas_reports_updated_mismatch_and_missing() {
	let store = MemoryStore::default();
	let initial = CredentialPair::new("access-old", "refresh-old");

	store
		.set_credentials(PrincipalScope::Vendor, initial.clone())
		.await
		.expect("Storing initial credentials should succeed.");

	let rotated = initial.rotate("access-new", Some("refresh-new".into()));
	let outcome = store
		.compare_and_swap_refresh(PrincipalScope::Vendor, "refresh-old", rotated.clone())
		.await
		.expect("CAS should complete when refresh tokens match.");

	assert_eq!(outcome, CompareAndSwapOutcome::Updated);
	assert_eq!(store.entry(PrincipalScope::Vendor).credentials, Some(rotated.clone()));

	let mismatch = store
		.compare_and_swap_refresh(PrincipalScope::Vendor, "refresh-old", initial.clone())
		.await
		.expect("CAS should complete when refresh tokens differ.");

	assert_eq!(mismatch, CompareAndSwapOutcome::RefreshMismatch);
	assert_eq!(store.entry(PrincipalScope::Vendor).credentials, Some(rotated));

	let missing = store
		.compare_and_swap_refresh(PrincipalScope::Admin, "refresh-old", initial)
		.await
		.expect("CAS should complete for empty scopes.");

	assert_eq!(missing, CompareAndSwapOutcome::Missing);
	assert!(store.entry(PrincipalScope::Admin).is_empty());
}

#[tokio::test]
async fn concurrent_cas_allows_single_winner() {
	let store = MemoryStore::default();
	let base = CredentialPair::new("access-base", "refresh-base");

	store
		.set_credentials(PrincipalScope::Vendor, base.clone())
		.await
		.expect("Storing base credentials should succeed.");

	let store_a = store.clone();
	let store_b = store.clone();
	let base_a = base.clone();
	let base_b = base;
	let task_a = tokio::spawn(async move {
		store_a
			.compare_and_swap_refresh(
				PrincipalScope::Vendor,
				"refresh-base",
				base_a.rotate("access-a", Some("refresh-a".into())),
			)
			.await
			.expect("CAS task A should complete successfully.")
	});
	let task_b = tokio::spawn(async move {
		store_b
			.compare_and_swap_refresh(
				PrincipalScope::Vendor,
				"refresh-base",
				base_b.rotate("access-b", Some("refresh-b".into())),
			)
			.await
			.expect("CAS task B should complete successfully.")
	});
	let (outcome_a, outcome_b) = tokio::join!(task_a, task_b);
	let outcomes = [
		outcome_a.expect("CAS task A should not panic."),
		outcome_b.expect("CAS task B should not panic."),
	];
	let successes =
		outcomes.iter().filter(|outcome| matches!(outcome, CompareAndSwapOutcome::Updated)).count();

	assert_eq!(successes, 1, "only one CAS should succeed");

	let final_refresh = store
		.refresh_token(PrincipalScope::Vendor)
		.await
		.expect("Fetching the final refresh token should succeed.")
		.expect("Final credentials should remain present.");

	assert!(matches!(final_refresh.expose(), "refresh-a" | "refresh-b"));
}
