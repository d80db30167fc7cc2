//! Data-access core for the Vireo short-video client.
//!
//! Wraps a hosted document/file/identity backend behind the [`store`] traits
//! and layers the social-graph, like-graph, and post-lifecycle rules on top.
//! UI shells call into the [`services`] and render whatever comes back;
//! nothing in this crate holds authoritative local state — every read goes
//! back to the store.

pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::{ClientError, Result};
