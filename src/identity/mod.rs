//! Central identity and session management for OtoGift sign-up and sign-in.
//! Keep the public surface thin and split implementation across sub-modules.

mod model;
mod store;
mod register;
mod provider;
mod claims;
mod session;
mod guard;

pub use model::{Identity, IdentityView, Origin};
pub use store::{IdentityStore, InsertError, MemoryIdentityStore, SharedStore};
pub use register::{RegisterError, Registration, RegistrationService};
pub use provider::{AuthAdapter, AuthOutcome, FederatedAssertion, SignIn};
pub use claims::SessionClaims;
pub use session::{Session, SessionManager, SessionToken};
pub use guard::{GuardDecision, RouteGuard, SessionStatus};
