// std
use std::{env, fs, path::PathBuf, process};
// crates.io
use httpmock::prelude::*;
// self
use rainroute_api::{
	_preludet::*,
	credential::{Credential, CredentialLookup, CredentialStore, FileCredentialStore},
	request::ApiRequest,
};

fn temp_path(label: &str) -> PathBuf {
	let unique = format!(
		"rainroute_api_it_{label}_{}_{}.json",
		process::id(),
		OffsetDateTime::now_utc().unix_timestamp_nanos(),
	);

	env::temp_dir().join(unique)
}

#[tokio::test]
async fn file_store_login_in_another_handle_authenticates_next_call() {
	let server = MockServer::start_async().await;
	let anonymous = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/routes").header_missing("authorization");
			then.status(200).body("[]");
		})
		.await;
	let authed = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/routes").header("authorization", "Bearer from-login");
			then.status(200).body("[]");
		})
		.await;
	let path = temp_path("login");
	let client_store = FileCredentialStore::open(&path).expect("Failed to open client store.");
	let login_store = FileCredentialStore::open(&path).expect("Failed to open login store.");
	let client = finish_test_client(
		test_client_builder(&server.url("/api/v1")).credential_store(client_store),
	);

	client.send(ApiRequest::get("/routes")).await.expect("Anonymous call should succeed.");
	login_store.save(Credential::new("from-login")).expect("Login should persist the token.");
	client.send(ApiRequest::get("/routes")).await.expect("Authenticated call should succeed.");

	anonymous.assert_calls_async(1).await;
	authed.assert_calls_async(1).await;

	fs::remove_file(&path).unwrap_or_else(|e| {
		panic!("Failed to remove temporary credential file {}: {e}", path.display())
	});
}

#[tokio::test]
async fn corrupt_file_store_blocks_the_request() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.path("/api/v1/routes");
			then.status(200);
		})
		.await;
	let path = temp_path("corrupt");

	fs::write(&path, b"{\"token\":").expect("Failed to seed corrupt credential file.");

	let store = FileCredentialStore::open(&path).expect("Opening does not parse the file.");
	let client =
		finish_test_client(test_client_builder(&server.url("/api/v1")).credential_store(store));
	let err = client
		.send(ApiRequest::get("/routes"))
		.await
		.expect_err("A corrupt store must fail the call before dispatch.");

	assert!(matches!(err, Error::Credential(_)), "{err:?}");

	mock.assert_calls_async(0).await;

	fs::remove_file(&path).unwrap_or_else(|e| {
		panic!("Failed to remove temporary credential file {}: {e}", path.display())
	});
}

#[tokio::test]
async fn unauthorized_clears_only_the_token_slot() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/v1/me");
			then.status(401);
		})
		.await;
	let path = temp_path("clear");

	fs::write(&path, br#"{"token":"stale","locale":"es-CO"}"#)
		.expect("Failed to seed credential file.");

	let store = FileCredentialStore::open(&path).expect("Failed to open credential file.");
	let client = finish_test_client(
		test_client_builder(&server.url("/api/v1")).credential_store(store.clone()),
	);
	let err = client.send(ApiRequest::get("/me")).await.expect_err("401 must fail.");

	assert!(err.is_unauthorized());
	assert_eq!(store.read().expect("Cleared file should read."), CredentialLookup::Absent);

	let remaining: BTreeMap<String, String> = serde_json::from_slice(
		&fs::read(&path).expect("Credential file should still exist."),
	)
	.expect("Credential file should remain valid JSON.");

	assert_eq!(remaining.get("locale").map(String::as_str), Some("es-CO"));
	assert!(!remaining.contains_key("token"));

	fs::remove_file(&path).unwrap_or_else(|e| {
		panic!("Failed to remove temporary credential file {}: {e}", path.display())
	});
}
