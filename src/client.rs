//! The shared backend client and its builder.

// self
use crate::{
	_prelude::*,
	auth::BearerAuth,
	config::ClientConfig,
	credential::{CredentialStore, NoCredentialStore},
	http::ApiTransport,
	obs::{self, CallOutcome, CallSpan},
	pipeline::{Pipeline, RequestInterceptor, ResponseInterceptor},
	request::{ApiRequest, PreparedRequest},
	response::{self, ApiResponse, Outcome},
	session::{SessionGuard, SessionListener, UnauthorizedPolicy},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestTransport>;

/// Authenticated backend client running every call through the interceptor pipeline.
///
/// Configuration, transport, and pipeline are shared behind `Arc`, so cloning is cheap and every
/// clone behaves identically. Applications build one client at startup and hand clones to each
/// feature instead of reaching for a global.
pub struct ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	config: Arc<ClientConfig>,
	transport: Arc<T>,
	pipeline: Arc<Pipeline>,
}
impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Transport configuration shared by every call.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Installed interceptor stages.
	pub fn pipeline(&self) -> &Pipeline {
		&self.pipeline
	}

	/// Underlying transport.
	pub fn transport(&self) -> &T {
		&self.transport
	}

	/// Sends `request` through the pipeline.
	///
	/// Outbound stages run first, then the transport, then inbound stages, and only then does the
	/// caller see the outcome. Non-2xx responses come back as errors; 401 is reported as
	/// [`Error::Unauthorized`] after the session policy has run.
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		let span = CallSpan::new(&request.method, &request.path);
		let method = request.method.clone();

		obs::record_call_outcome(&method, CallOutcome::Attempt);

		let outcome = span
			.instrument(async move {
				let (extensions, outcome) = self.dispatch(request).await;

				self.pipeline.run_after_receive(&outcome, &extensions);

				outcome
			})
			.await;

		obs::record_call_outcome(&method, CallOutcome::of(&outcome));

		outcome
	}

	async fn dispatch(&self, mut request: ApiRequest) -> (Extensions, Outcome) {
		let staged = self.pipeline.run_before_send(&mut request);
		let extensions = std::mem::take(&mut request.extensions);
		let outcome = match staged {
			Ok(()) => self.execute(request).await,
			Err(e) => Err(e),
		};

		(extensions, outcome)
	}

	async fn execute(&self, request: ApiRequest) -> Outcome {
		let prepared = PreparedRequest::prepare(&self.config, request)?;
		let response = self.transport.send(prepared).await?;

		response.into_outcome()
	}

	/// `GET path` and decode the JSON body.
	pub async fn get_json<R>(&self, path: &str) -> Result<R>
	where
		R: DeserializeOwned,
	{
		let response = self.send(ApiRequest::get(path)).await?;

		response::decode_json_or_null(&response)
	}

	/// `POST path` with a JSON body and decode the JSON reply.
	pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		let response = self.send(ApiRequest::post(path).json(body)?).await?;

		response::decode_json_or_null(&response)
	}

	/// `PUT path` with a JSON body and decode the JSON reply.
	pub async fn put_json<B, R>(&self, path: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		let response = self.send(ApiRequest::put(path).json(body)?).await?;

		response::decode_json_or_null(&response)
	}

	/// `PATCH path` with a JSON body and decode the JSON reply.
	pub async fn patch_json<B, R>(&self, path: &str, body: &B) -> Result<R>
	where
		B: ?Sized + Serialize,
		R: DeserializeOwned,
	{
		let response = self.send(ApiRequest::patch(path).json(body)?).await?;

		response::decode_json_or_null(&response)
	}

	/// `DELETE path`, returning the raw response.
	pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
		self.send(ApiRequest::delete(path)).await
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestTransport> {
	/// Starts building a client for `config`.
	///
	/// Use [`ApiClientBuilder::build_with_transport`] on the result to swap in another transport.
	pub fn builder(config: ClientConfig) -> ApiClientBuilder {
		ApiClientBuilder::new(config)
	}

	/// Builds a reqwest-backed client from the process environment, authenticated by `store`.
	pub fn from_env(store: impl 'static + CredentialStore) -> Self {
		Self::builder(ClientConfig::from_env()).credential_store(store).build()
	}
}
impl<T> Clone for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn clone(&self) -> Self {
		Self {
			config: Arc::clone(&self.config),
			transport: Arc::clone(&self.transport),
			pipeline: Arc::clone(&self.pipeline),
		}
	}
}
impl<T> Debug for ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("pipeline", &self.pipeline)
			.finish()
	}
}

/// Assembles an [`ApiClient`] and composes its pipeline.
///
/// The built-in stages always come first: [`BearerAuth`] opens the outbound list and
/// [`SessionGuard`] opens the inbound list. Custom stages follow in registration order.
pub struct ApiClientBuilder {
	config: ClientConfig,
	store: Arc<dyn CredentialStore>,
	policy: UnauthorizedPolicy,
	listeners: Vec<Arc<dyn SessionListener>>,
	before_send: Vec<Arc<dyn RequestInterceptor>>,
	after_receive: Vec<Arc<dyn ResponseInterceptor>>,
}
impl ApiClientBuilder {
	/// Creates a builder with no credential store and the default session policy.
	pub fn new(config: ClientConfig) -> Self {
		Self {
			config,
			store: Arc::new(NoCredentialStore),
			policy: UnauthorizedPolicy::default(),
			listeners: Vec::new(),
			before_send: Vec::new(),
			after_receive: Vec::new(),
		}
	}

	/// Store the bearer credential is read from (and cleared in, per policy).
	pub fn credential_store(mut self, store: impl 'static + CredentialStore) -> Self {
		self.store = Arc::new(store);

		self
	}

	/// Same as [`credential_store`](Self::credential_store) for an already shared store.
	pub fn shared_credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
		self.store = store;

		self
	}

	/// Local reaction to 401 responses.
	pub fn unauthorized_policy(mut self, policy: UnauthorizedPolicy) -> Self {
		self.policy = policy;

		self
	}

	/// Registers a listener for session events.
	pub fn session_listener(mut self, listener: impl 'static + SessionListener) -> Self {
		self.listeners.push(Arc::new(listener));

		self
	}

	/// Appends a custom outbound stage after the built-in ones.
	pub fn before_send(mut self, stage: impl 'static + RequestInterceptor) -> Self {
		self.before_send.push(Arc::new(stage));

		self
	}

	/// Appends a custom inbound stage after the built-in ones.
	pub fn after_receive(mut self, stage: impl 'static + ResponseInterceptor) -> Self {
		self.after_receive.push(Arc::new(stage));

		self
	}

	/// Finishes the client on a caller-provided transport.
	pub fn build_with_transport<T>(self, transport: T) -> ApiClient<T>
	where
		T: ApiTransport,
	{
		self.build_with_shared_transport(Arc::new(transport))
	}

	/// Finishes the client on a transport that is already shared elsewhere.
	pub fn build_with_shared_transport<T>(self, transport: Arc<T>) -> ApiClient<T>
	where
		T: ?Sized + ApiTransport,
	{
		let Self { config, store, policy, listeners, before_send, after_receive } = self;
		let guard = listeners
			.into_iter()
			.fold(SessionGuard::new(policy, store.clone()), SessionGuard::with_listener);
		let mut pipeline = Pipeline::default()
			.with_before_send(Arc::new(BearerAuth::new(store)))
			.with_after_receive(Arc::new(guard));

		pipeline = before_send.into_iter().fold(pipeline, Pipeline::with_before_send);
		pipeline = after_receive.into_iter().fold(pipeline, Pipeline::with_after_receive);

		ApiClient {
			config: Arc::new(config),
			transport,
			pipeline: Arc::new(pipeline),
		}
	}

	/// Finishes the client on a default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn build(self) -> ApiClient<ReqwestTransport> {
		self.build_with_transport(ReqwestTransport::default())
	}
}
impl Debug for ApiClientBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClientBuilder")
			.field("config", &self.config)
			.field("policy", &self.policy)
			.field("listeners", &self.listeners.len())
			.field("before_send", &self.before_send.len())
			.field("after_receive", &self.after_receive.len())
			.finish()
	}
}
