//! Derived-parameter expression engine and identity-preserving query layer
//! for exploring galaxy catalogs.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod data;
pub mod describe;
pub mod error;
pub mod expr;
pub mod query;
pub mod state;

pub use config::ExplorerConfig;
pub use error::{QueryError, Result};
pub use query::{Catalog, QueryContext};
pub use state::Session;
