//! blame-lens - blame parsing and per-file caching for editor integrations
//!
//! The host editor supplies raw blame text through a [`git::BlameSource`],
//! reports document edits and closes as [`git::HostEvent`]s, and asks for the
//! blame of its visible ranges.
//!
//! - [`git`]: parser, source trait, memoizing store, host events
//! - [`models`]: commit/line records and host ranges
//! - [`resource`]: identifiers for blame documents the host displays
//! - [`config`]: scheme and date presentation settings

pub mod config;
pub mod error;
pub mod git;
pub mod models;
pub mod resource;

pub use config::LensConfig;
pub use error::{BlameError, Result};
