//! Inbound stage applying the session policy to unauthorized outcomes.

// self
use crate::{
	_prelude::*,
	auth::AttachedCredential,
	credential::{ClearOutcome, Credential, CredentialStore},
	pipeline::ResponseInterceptor,
	response::Outcome,
};

/// What the client does locally when the backend answers 401.
///
/// The failure itself always reaches the caller; the policy only decides the side effects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnauthorizedPolicy {
	/// Log the rejection and do nothing else.
	Observe,
	/// Notify session listeners but keep the stored credential.
	Notify,
	/// Clear the rejected credential, then notify session listeners.
	///
	/// Only the credential the rejected request carried is removed. When a login has already
	/// stored a different one, it is kept and no event is sent.
	#[default]
	ClearCredential,
}

/// Session lifecycle signal delivered to [`SessionListener`]s.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
	/// The backend rejected the credential.
	Expired {
		/// Whether the stored credential was removed.
		cleared: bool,
	},
}

/// Receives session lifecycle signals, e.g. to route the UI back to the login screen.
pub trait SessionListener
where
	Self: Send + Sync,
{
	/// Handles one event. Runs inline on the calling task, so keep it short.
	fn on_session_event(&self, event: &SessionEvent);
}
impl<F> SessionListener for F
where
	F: Fn(&SessionEvent) + Send + Sync,
{
	fn on_session_event(&self, event: &SessionEvent) {
		self(event)
	}
}

/// Applies an [`UnauthorizedPolicy`] to every 401 outcome.
#[derive(Clone)]
pub struct SessionGuard {
	policy: UnauthorizedPolicy,
	store: Arc<dyn CredentialStore>,
	listeners: Vec<Arc<dyn SessionListener>>,
}
impl SessionGuard {
	/// Stage name reported by [`ResponseInterceptor::name`].
	pub const NAME: &'static str = "session_guard";

	/// Creates the stage for `policy` acting on `store`.
	pub fn new(policy: UnauthorizedPolicy, store: Arc<dyn CredentialStore>) -> Self {
		Self { policy, store, listeners: Vec::new() }
	}

	/// Registers a listener; listeners are notified in registration order.
	pub fn with_listener(mut self, listener: Arc<dyn SessionListener>) -> Self {
		self.listeners.push(listener);

		self
	}

	/// Active policy.
	pub fn policy(&self) -> UnauthorizedPolicy {
		self.policy
	}

	/// Returns whether the credential was cleared, or `None` when a newer one replaced it.
	fn clear_rejected(&self, rejected: &Credential) -> Option<bool> {
		match self.store.clear_if(rejected) {
			Ok(ClearOutcome::Cleared) => {
				#[cfg(feature = "tracing")]
				tracing::info!("stored credential cleared after unauthorized response");

				Some(true)
			},
			Ok(ClearOutcome::Missing) => Some(false),
			Ok(ClearOutcome::Mismatch) => {
				#[cfg(feature = "tracing")]
				tracing::debug!("stored credential changed while the request was in flight; kept");

				None
			},
			Err(e) => {
				#[cfg(feature = "tracing")]
				tracing::warn!(error = %e, "failed to clear stored credential");
				#[cfg(not(feature = "tracing"))]
				let _ = e;

				Some(false)
			},
		}
	}

	fn notify(&self, event: SessionEvent) {
		for listener in &self.listeners {
			listener.on_session_event(&event);
		}
	}
}
impl ResponseInterceptor for SessionGuard {
	fn name(&self) -> &'static str {
		Self::NAME
	}

	fn after_receive(&self, outcome: &Outcome, extensions: &Extensions) {
		let Err(Error::Unauthorized(_failure)) = outcome else {
			return;
		};

		#[cfg(feature = "tracing")]
		tracing::debug!(policy = ?self.policy, status = _failure.status, "unauthorized response");

		match self.policy {
			UnauthorizedPolicy::Observe => {},
			UnauthorizedPolicy::Notify => self.notify(SessionEvent::Expired { cleared: false }),
			UnauthorizedPolicy::ClearCredential => {
				let cleared = match extensions.get::<AttachedCredential>() {
					Some(AttachedCredential(rejected)) => self.clear_rejected(rejected),
					None => Some(false),
				};

				if let Some(cleared) = cleared {
					self.notify(SessionEvent::Expired { cleared });
				}
			},
		}
	}
}
impl Debug for SessionGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionGuard")
			.field("policy", &self.policy)
			.field("listeners", &self.listeners.len())
			.finish()
	}
}
