//! Principal scopes that partition credential and identity state.

// self
use crate::_prelude::*;

/// Error returned when parsing an unknown scope label.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown principal scope `{0}`.")]
pub struct UnknownScope(pub String);

/// One of the two independent back-office principals.
///
/// Every credential pair, identity snapshot, refresh gate, and login route is keyed by a scope;
/// nothing is shared between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalScope {
	/// Platform administrators.
	Admin,
	/// Marketplace vendors.
	Vendor,
}
impl PrincipalScope {
	/// All scopes in a stable order.
	pub const ALL: [Self; 2] = [Self::Admin, Self::Vendor];

	/// Returns a stable label suitable for storage keys, span fields, or metric labels.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Admin => "admin",
			Self::Vendor => "vendor",
		}
	}

	/// Returns the other scope.
	pub const fn other(self) -> Self {
		match self {
			Self::Admin => Self::Vendor,
			Self::Vendor => Self::Admin,
		}
	}
}
impl Display for PrincipalScope {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for PrincipalScope {
	type Err = UnknownScope;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"admin" => Ok(Self::Admin),
			"vendor" => Ok(Self::Vendor),
			other => Err(UnknownScope(other.to_owned())),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn labels_round_trip() {
		for scope in PrincipalScope::ALL {
			assert_eq!(scope.as_str().parse::<PrincipalScope>(), Ok(scope));
			assert_ne!(scope.other(), scope);
		}

		assert_eq!("Admin".parse::<PrincipalScope>(), Err(UnknownScope("Admin".into())));
		assert_eq!(
			serde_json::to_string(&PrincipalScope::Vendor).expect("Scope should serialize."),
			"\"vendor\""
		);
	}
}
