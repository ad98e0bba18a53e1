//! Auth-domain identifiers, principal scopes, identity snapshots, and token models.

pub mod id;
pub mod identity;
pub mod scope;
pub mod token;

pub use id::*;
pub use identity::*;
pub use scope::*;
pub use token::{pair::*, secret::*};
