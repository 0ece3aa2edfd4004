//! anidex-core: catalog, intake, and persistence for the anidex site.
//!
//! Everything here is independent of HTTP. The server crate wires these
//! pieces into axum handlers; tests can drive them directly against a
//! temporary data directory.

pub mod captcha;
pub mod catalog;
pub mod config;
pub mod cover;
pub mod error;
pub mod intake;
pub mod ratelimit;
pub mod records;
pub mod store;

// Re-export the most commonly used items at the crate root.
pub use catalog::{AnimeEntry, Catalog};
pub use config::Config;
pub use cover::CoverResolver;
pub use error::{Error, Result};
pub use intake::{IntakeForm, IntakeKind, IntakeService, Rejection};
pub use store::RecordStore;
