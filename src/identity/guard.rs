//! Route guard: gate access to a protected view on session state.
//!
//! The guard is a pure read of the current session status; transitions
//! (loading resolving to a session or to nothing) are driven by the session
//! provider, never by the guard. No redirects, no polling.

use super::claims::SessionClaims;

/// Externally-driven session status as seen by one request/view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Status not resolved yet; render a waiting indicator, never content.
    Loading,
    Unauthenticated,
    Authenticated(SessionClaims),
}

/// What the caller should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Neutral waiting indicator.
    Waiting,
    /// Caller-supplied fallback, or the default sign-in/sign-up prompt.
    Fallback,
    /// The protected content itself.
    Content,
}

#[derive(Debug, Clone, Copy)]
pub struct RouteGuard {
    pub require_auth: bool,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self { require_auth: true }
    }
}

impl RouteGuard {
    pub fn public() -> Self {
        Self { require_auth: false }
    }

    pub fn decide(&self, status: &SessionStatus) -> GuardDecision {
        match status {
            SessionStatus::Loading => GuardDecision::Waiting,
            SessionStatus::Unauthenticated if self.require_auth => GuardDecision::Fallback,
            _ => GuardDecision::Content,
        }
    }
}
