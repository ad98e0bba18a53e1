//! Access + refresh credential pairs owned by a single principal scope.

// self
use crate::{_prelude::*, auth::token::secret::TokenSecret};

/// Bearer credentials issued by sign-in or refresh.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
	/// Access token attached to outgoing requests.
	pub access_token: TokenSecret,
	/// Refresh token exchanged for a new access token on 401.
	pub refresh_token: TokenSecret,
	/// Instant the pair was stored locally.
	#[serde(with = "time::serde::rfc3339")]
	pub issued_at: OffsetDateTime,
}
impl CredentialPair {
	/// Creates a pair stamped with the current clock.
	pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: TokenSecret::new(refresh_token),
			issued_at: OffsetDateTime::now_utc(),
		}
	}

	/// Overrides the issued-at instant.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = instant;

		self
	}

	/// Produces the pair that follows a refresh.
	///
	/// Refresh endpoints may omit a new refresh token; the current one stays valid then.
	pub fn rotate(&self, access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: refresh_token
				.map(TokenSecret::new)
				.unwrap_or_else(|| self.refresh_token.clone()),
			issued_at: OffsetDateTime::now_utc(),
		}
	}
}
impl Debug for CredentialPair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialPair")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &"<redacted>")
			.field("issued_at", &self.issued_at)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn rotation_keeps_refresh_token_when_omitted() {
		let pair = CredentialPair::new("access-1", "refresh-1")
			.issued_at(macros::datetime!(2025-01-01 00:00 UTC));
		let kept = pair.rotate("access-2", None);
		let replaced = pair.rotate("access-3", Some("refresh-3".into()));

		assert_eq!(kept.access_token.expose(), "access-2");
		assert_eq!(kept.refresh_token.expose(), "refresh-1");
		assert_eq!(replaced.refresh_token.expose(), "refresh-3");
		assert!(kept.issued_at > pair.issued_at);
	}

	#[test]
	fn debug_output_redacts_both_tokens() {
		let rendered = format!("{:?}", CredentialPair::new("access-secret", "refresh-secret"));

		assert!(!rendered.contains("access-secret"));
		assert!(!rendered.contains("refresh-secret"));
	}
}
