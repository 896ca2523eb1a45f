//! Durable collaborators for the groupbridge sync engine.
//!
//! - [`SqliteLinkRegistry`]: group links in a SQLite file, 1:1 enforced by
//!   UNIQUE columns on both sides
//! - [`FileSettings`]: installation settings read from a TOML file and
//!   exposed under dotted keys (`[buddypress] enabled = true` becomes
//!   `buddypress.enabled`)

mod error;
mod link_store;
mod settings;

pub use error::{StoreError, StoreResult};
pub use link_store::SqliteLinkRegistry;
pub use settings::FileSettings;
