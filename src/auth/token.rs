//! Credential models kept per principal scope.

pub mod pair;
pub mod secret;
