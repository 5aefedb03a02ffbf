//! CharBldr Engine library.
//!
//! ## Structure
//!
//! - `use_cases/` - Builder sessions and the hand-off to persistence
//! - `infrastructure/` - Configuration, catalog loading, ports and adapters
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
