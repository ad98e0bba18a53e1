//! Denormalized identity snapshots cached next to credentials.

// self
use crate::{_prelude::*, auth::UserId};

/// Copy of the authenticated principal used for network-free UI decisions.
///
/// The snapshot is not kept in sync with the server; it changes only when a caller signs in
/// again or reloads the profile explicitly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySnapshot {
	/// Account identifier.
	#[serde(alias = "_id")]
	pub id: UserId,
	/// Display name.
	#[serde(default)]
	pub name: String,
	/// Login email.
	pub email: String,
	/// Role or account type label, when the API provides one.
	#[serde(default, alias = "type")]
	pub role: Option<String>,
	/// Whether the email address was confirmed.
	#[serde(default, alias = "isEmailVerified")]
	pub email_verified: bool,
	/// Whether the account passed back-office verification.
	#[serde(default, alias = "isVerified")]
	pub verified: bool,
	/// Instant the snapshot was captured locally.
	#[serde(default = "OffsetDateTime::now_utc", with = "time::serde::rfc3339")]
	pub captured_at: OffsetDateTime,
}
impl IdentitySnapshot {
	/// Creates an unverified snapshot captured now.
	pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>) -> Self {
		Self {
			id,
			name: name.into(),
			email: email.into(),
			role: None,
			email_verified: false,
			verified: false,
			captured_at: OffsetDateTime::now_utc(),
		}
	}

	/// Sets the role label.
	pub fn with_role(mut self, role: impl Into<String>) -> Self {
		self.role = Some(role.into());

		self
	}

	/// Sets both verification flags.
	pub fn with_verification(mut self, email_verified: bool, verified: bool) -> Self {
		self.email_verified = email_verified;
		self.verified = verified;

		self
	}

	/// Returns `true` if the snapshot carries the provided role (case-insensitive).
	pub fn has_role(&self, role: &str) -> bool {
		self.role.as_deref().is_some_and(|own| own.eq_ignore_ascii_case(role))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn deserializes_api_user_objects() {
		let payload = r#"{
			"_id": "66a0f3",
			"name": "Ada Store",
			"email": "ada@example.com",
			"type": "vendor",
			"isEmailVerified": true,
			"isVerified": false
		}"#;
		let identity: IdentitySnapshot =
			serde_json::from_str(payload).expect("API user object should deserialize.");

		assert_eq!(identity.id.as_ref(), "66a0f3");
		assert!(identity.has_role("VENDOR"));
		assert!(identity.email_verified);
		assert!(!identity.verified);
	}

	#[test]
	fn snapshot_survives_storage_round_trip() {
		let identity = IdentitySnapshot::new(
			UserId::new("1").expect("User fixture should be valid."),
			"Root",
			"root@example.com",
		)
		.with_role("super_admin")
		.with_verification(true, true);
		let json = serde_json::to_string(&identity).expect("Snapshot should serialize.");
		let restored: IdentitySnapshot =
			serde_json::from_str(&json).expect("Snapshot should deserialize.");

		assert_eq!(restored.id, identity.id);
		assert_eq!(restored.role.as_deref(), Some("super_admin"));
		assert_eq!(restored.captured_at.unix_timestamp(), identity.captured_at.unix_timestamp());
	}
}
