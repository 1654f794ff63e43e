//! Optional observability helpers for client calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `rainroute_api.call` with the `method` and
//!   `path` fields, plus events for configuration fallbacks and session expiry.
//! - Enable `metrics` to increment the `rainroute_api_call_total` counter for every
//!   attempt/success/failure/unauthorized outcome, labeled by `method` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to [`ApiClient::send`](crate::client::ApiClient::send).
	Attempt,
	/// A 2xx response reached the caller.
	Success,
	/// Any failure other than a 401 reached the caller.
	Failure,
	/// A 401 reached the caller.
	Unauthorized,
}
impl CallOutcome {
	/// Classifies a finished call.
	pub fn of<T>(result: &Result<T>) -> Self {
		match result {
			Ok(_) => Self::Success,
			Err(e) if e.is_unauthorized() => Self::Unauthorized,
			Err(_) => Self::Failure,
		}
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
			CallOutcome::Unauthorized => "unauthorized",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
