pub mod api;
pub mod extraction;
pub mod roles;
pub mod session;
pub mod usage;

pub use session::{RequestOutcome, Session, SessionError, SessionOptions};
