//! Lists the signed-in user's saved routes from the configured backend.
//!
//! 1. Set `RAINROUTE_API_URL` (or `NEXT_PUBLIC_API_URL`) to override the local default.
//! 2. Put a bearer token under the `"token"` key of the JSON file named by `RAINROUTE_CREDENTIALS`
//!    (defaults to `rainroute-credentials.json` in the working directory).
//! 3. Run `cargo run --example fetch_routes`.

// std
use std::env;
// crates.io
use color_eyre::Result;
use serde::Deserialize;
// self
use rainroute_api::{
	client::ApiClient,
	config::ClientConfig,
	credential::FileCredentialStore,
	session::{SessionEvent, UnauthorizedPolicy},
};

#[derive(Debug, Deserialize)]
struct SavedRoute {
	id: u64,
	name: String,
	#[serde(default)]
	rain_risk: Option<f32>,
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let credentials =
		env::var("RAINROUTE_CREDENTIALS").unwrap_or_else(|_| "rainroute-credentials.json".into());
	let store = FileCredentialStore::open(credentials)?;
	let client = ApiClient::builder(ClientConfig::from_env())
		.credential_store(store)
		.unauthorized_policy(UnauthorizedPolicy::ClearCredential)
		.session_listener(|event: &SessionEvent| match event {
			SessionEvent::Expired { cleared } => {
				println!("Session expired (stored token cleared: {cleared}).");
				println!("Please sign in again.");
			},
		})
		.build();

	println!("Calling {}.", client.config().base_url);

	match client.get_json::<Vec<SavedRoute>>("/routes").await {
		Ok(routes) =>
			for route in routes {
				let risk =
					route.rain_risk.map_or_else(|| "n/a".into(), |r| format!("{:.0}%", r * 100.));

				println!("#{} {} (rain risk {risk})", route.id, route.name);
			},
		Err(e) if e.is_unauthorized() => println!("The backend rejected the stored token."),
		Err(e) => return Err(e.into()),
	}

	Ok(())
}
