// crates.io
use httpmock::prelude::*;
// self
use rainroute_api::{
	_preludet::*,
	client::{ApiClient, ReqwestApiClient},
	config::ClientConfig,
	credential::{Credential, CredentialStore, MemoryCredentialStore},
	request::ApiRequest,
};

const ROUTES_JSON: &str = "[{\"id\":1,\"name\":\"Home to office\",\"rain_risk\":0.8}]";

fn client_for(server: &MockServer, store: MemoryCredentialStore) -> ReqwestApiClient {
	finish_test_client(test_client_builder(&server.url("/api/v1")).credential_store(store))
}

#[tokio::test]
async fn stored_credential_is_sent_as_bearer_header() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/routes").header("authorization", "Bearer abc123");
			then.status(200).header("content-type", "application/json").body(ROUTES_JSON);
		})
		.await;
	let client = client_for(&server, MemoryCredentialStore::with_credential("abc123"));
	let routes: serde_json::Value =
		client.get_json("/routes").await.expect("Authenticated route listing should succeed.");

	assert_eq!(routes[0]["name"], "Home to office");

	mock.assert_async().await;
}

#[tokio::test]
async fn anonymous_call_carries_no_authorization_header() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v1/forecast")
				.header_missing("authorization")
				.header("content-type", "application/json");
			then.status(200).header("content-type", "application/json").body("{\"rain\":false}");
		})
		.await;
	let client = client_for(&server, MemoryCredentialStore::default());
	let response = client
		.send(ApiRequest::get("/forecast"))
		.await
		.expect("Anonymous access should succeed when the backend allows it.");

	assert_eq!(response.status, StatusCode::OK);

	mock.assert_async().await;
}

#[tokio::test]
async fn credential_rotation_is_visible_on_the_next_call() {
	let server = MockServer::start_async().await;
	let first = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/me").header("authorization", "Bearer first-token");
			then.status(200).body("{\"user\":\"ana\"}");
		})
		.await;
	let second = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/me").header("authorization", "Bearer second-token");
			then.status(200).body("{\"user\":\"ana\"}");
		})
		.await;
	let store = MemoryCredentialStore::with_credential("first-token");
	let client = client_for(&server, store.clone());

	client.send(ApiRequest::get("/me")).await.expect("First call should succeed.");
	store.save(Credential::new("second-token")).expect("Memory saves never fail.");
	client.send(ApiRequest::get("/me")).await.expect("Second call should succeed.");

	first.assert_calls_async(1).await;
	second.assert_calls_async(1).await;
}

#[tokio::test]
async fn caller_supplied_authorization_is_overwritten() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/alerts").header("authorization", "Bearer abc123");
			then.status(201).body("{\"id\":3}");
		})
		.await;
	let client = client_for(&server, MemoryCredentialStore::with_credential("abc123"));
	let request = ApiRequest::post("/alerts")
		.header("authorization", "Bearer stale")
		.expect("Fixture header should be valid.")
		.json(&serde_json::json!({ "route_id": 1, "threshold": 0.5 }))
		.expect("Alert payload should serialize.");

	client.send(request).await.expect("Alert creation should succeed.");

	mock.assert_async().await;
}

#[tokio::test]
async fn clones_share_store_and_pipeline() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/api/v1/routes/7").header("authorization", "Bearer shared");
			then.status(204);
		})
		.await;
	let store = MemoryCredentialStore::default();
	let client = client_for(&server, store.clone());
	let clone = client.clone();

	store.save(Credential::new("shared")).expect("Memory saves never fail.");

	let response = clone.delete("/routes/7").await.expect("Delete through a clone should succeed.");

	assert_eq!(response.status, StatusCode::NO_CONTENT);
	assert!(response.body.is_empty());
	assert_eq!(
		store.read().expect("Memory reads never fail.").credential().map(Credential::expose),
		Some("shared"),
	);

	mock.assert_async().await;
}

#[test]
fn default_base_address_resolves_routes_path() {
	let config = ClientConfig::from_lookup(|_| None);
	let client = ApiClient::builder(config).build();

	assert_eq!(
		client.config().resolve("/routes").expect("Default base should join.").as_str(),
		"http://localhost:8000/api/v1/routes",
	);
}
