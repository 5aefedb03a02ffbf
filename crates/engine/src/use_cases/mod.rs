//! Use cases - orchestration around the character builder.

mod builder_session;

pub use builder_session::{BuilderSession, SessionError};
