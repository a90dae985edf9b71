//! Configuration module for atlasmesh
//!
//! Provides types and parsing for `atlasmesh.toml` conversion settings.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
