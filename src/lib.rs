//! Local-first content engine for a personal art portfolio: a blog and
//! a gallery backed by an embedded key-value store, seeded from static
//! JSON and edited through the admin CLI.

pub mod collection;
pub mod editor;
pub mod environment;
pub mod error;
pub mod image;
pub mod manifest;
pub mod model;
pub mod persist;
pub mod render;
pub mod slug;
pub mod store;
pub mod workspace;

pub use error::{Error, Result};
