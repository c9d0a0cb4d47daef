//! Domain models for the identity layer.
//!
//! `User` is the only persisted entity; the session types are read-only
//! views of what the bootstrap endpoints return.

pub mod session;
pub mod user;

pub use session::{Activity, Friend, Pot, SessionData};
pub use user::{FieldPatch, ProfileUpdate, User, UserRow};
