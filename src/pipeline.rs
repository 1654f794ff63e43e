//! Ordered interceptor pipeline wrapped around every transport call.
//!
//! A [`Pipeline`] holds two lists of named stages fixed at client construction:
//!
//! - [`RequestInterceptor`] stages run in order before dispatch and may mutate the request. The
//!   first failing stage aborts the call; later stages and the transport are skipped.
//! - [`ResponseInterceptor`] stages run in order after the outcome is known. They receive the
//!   outcome by shared reference, so they can react to it but can never turn a failure into a
//!   success or alter what the caller receives. They also see the request extensions left by
//!   outbound stages, e.g. the credential that was attached.

// self
use crate::{_prelude::*, request::ApiRequest, response::Outcome};

/// Stage executed before a request is dispatched.
pub trait RequestInterceptor
where
	Self: Send + Sync,
{
	/// Stable stage name used in diagnostics.
	fn name(&self) -> &'static str;

	/// Mutates `request` in place; an error prevents the request from being sent.
	fn before_send(&self, request: &mut ApiRequest) -> Result<()>;
}

/// Stage executed after an outcome is known.
pub trait ResponseInterceptor
where
	Self: Send + Sync,
{
	/// Stable stage name used in diagnostics.
	fn name(&self) -> &'static str;

	/// Observes the outcome of a call, success or failure.
	///
	/// `extensions` are the request extensions as the outbound stages left them.
	fn after_receive(&self, outcome: &Outcome, extensions: &Extensions);
}

/// Deterministically ordered interceptor stages.
#[derive(Clone, Default)]
pub struct Pipeline {
	before_send: Vec<Arc<dyn RequestInterceptor>>,
	after_receive: Vec<Arc<dyn ResponseInterceptor>>,
}
impl Pipeline {
	/// Appends an outbound stage.
	pub fn with_before_send(mut self, stage: Arc<dyn RequestInterceptor>) -> Self {
		self.before_send.push(stage);

		self
	}

	/// Appends an inbound stage.
	pub fn with_after_receive(mut self, stage: Arc<dyn ResponseInterceptor>) -> Self {
		self.after_receive.push(stage);

		self
	}

	/// Outbound stage names in execution order.
	pub fn before_send_names(&self) -> Vec<&'static str> {
		self.before_send.iter().map(|stage| stage.name()).collect()
	}

	/// Inbound stage names in execution order.
	pub fn after_receive_names(&self) -> Vec<&'static str> {
		self.after_receive.iter().map(|stage| stage.name()).collect()
	}

	/// Runs every outbound stage, stopping at the first failure.
	pub fn run_before_send(&self, request: &mut ApiRequest) -> Result<()> {
		for stage in &self.before_send {
			stage.before_send(request)?;
		}

		Ok(())
	}

	/// Runs every inbound stage.
	pub fn run_after_receive(&self, outcome: &Outcome, extensions: &Extensions) {
		for stage in &self.after_receive {
			stage.after_receive(outcome, extensions);
		}
	}
}
impl Debug for Pipeline {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Pipeline")
			.field("before_send", &self.before_send_names())
			.field("after_receive", &self.after_receive_names())
			.finish()
	}
}
