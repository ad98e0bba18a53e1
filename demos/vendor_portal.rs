//! Walks a vendor session through sign-in, a transparent token refresh, and termination against
//! a mock back-office API.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// self
use backoffice_client::{
	auth::PrincipalScope,
	client::ApiClient,
	config::ClientConfig,
	session::{Navigator, RecordingNavigator},
	store::{MemoryStore, TokenStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let login = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/vendor/login");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"data": {
					"accessToken": "access-expired",
					"refreshToken": "refresh-1",
					"vendor": {
						"_id": "vendor-7",
						"name": "Acme Supplies",
						"email": "owner@acme.test"
					}
				}
			}));
		})
		.await;
	let expired = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/vendor/wallet")
				.header("authorization", "Bearer access-expired");
			then.status(401).body("{\"message\":\"Token expired\"}");
		})
		.await;
	let wallet = server
		.mock_async(|when, then| {
			when.method(GET).path("/vendor/wallet").header("authorization", "Bearer access-2");
			then.status(200)
				.header("content-type", "application/json")
				.json_body(json!({ "data": { "balance": 1250, "currency": "USD" } }));
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(200).header("content-type", "application/json").json_body(json!({
				"data": { "accessToken": "access-2", "refreshToken": "refresh-2" }
			}));
		})
		.await;
	let config = ClientConfig::builder(Url::parse(&server.base_url())?).build()?;
	let store: Arc<dyn TokenStore> = Arc::new(MemoryStore::default());
	let navigator = Arc::new(RecordingNavigator::at("/vendor/login"));
	let client = ApiClient::new(config, store, navigator.clone() as Arc<dyn Navigator>);
	let grant = client
		.sign_in(
			PrincipalScope::Vendor,
			"/auth/vendor/login",
			&json!({ "email": "owner@acme.test", "password": "hunter2" }),
		)
		.await?;

	println!("Signed in as {:?}.", grant.user.map(|user| user.name));

	navigator.navigate("/vendor/wallet");

	let balance: serde_json::Value = client.get("/vendor/wallet").await?;

	println!("Wallet balance after a transparent refresh: {balance}.");
	println!("Refresh calls issued: {}.", client.refresh_metrics.attempts());

	client.terminator().terminate(PrincipalScope::Vendor).await?;

	println!("Redirects issued: {:?}.", navigator.redirects());

	login.assert_async().await;
	expired.assert_async().await;
	refresh.assert_async().await;
	wallet.assert_async().await;

	Ok(())
}
