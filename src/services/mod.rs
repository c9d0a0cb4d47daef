pub mod identity_service;
pub mod session_bootstrap;

pub use identity_service::IdentityService;
pub use session_bootstrap::{BootstrapSource, LoadOutcome, LoadState, SessionBootstrapper};
