//! Authenticated REST client for multi-tenant back-offices: per-scope token stores, single-flight
//! refresh, and session termination in one crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod obs;
pub mod resolve;
pub mod session;
pub mod store;
pub mod transport;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::ApiClient,
		config::ClientConfig,
		session::{Navigator, RecordingNavigator},
		store::{MemoryStore, TokenStore},
		transport::ReqwestTransport,
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = ApiClient<ReqwestTransport>;

	/// Handles returned by [`build_reqwest_test_client`] so tests can seed and inspect state.
	#[derive(Debug)]
	pub struct TestHarness {
		/// Client under test.
		pub client: ReqwestTestClient,
		/// Backing store shared with the client.
		pub store: Arc<MemoryStore>,
		/// Navigator shared with the client.
		pub navigator: Arc<RecordingNavigator>,
	}

	/// Constructs an [`ApiClient`] backed by an in-memory store, a recording navigator, and the
	/// reqwest transport used across integration tests.
	pub fn build_reqwest_test_client(base_url: &str) -> TestHarness {
		let config = ClientConfig::builder(
			Url::parse(base_url).expect("Mock server URL should parse successfully."),
		)
		.build()
		.expect("Default client configuration should be valid.");
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn TokenStore> = store_backend.clone();
		let navigator_backend = Arc::new(RecordingNavigator::default());
		let navigator: Arc<dyn Navigator> = navigator_backend.clone();
		let client =
			ApiClient::with_transport(config, store, navigator, ReqwestTransport::default());

		TestHarness { client, store: store_backend, navigator: navigator_backend }
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap, VecDeque},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use http::{HeaderMap, Method, StatusCode};
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use {http, url};
#[cfg(test)] use {color_eyre as _, httpmock as _};
