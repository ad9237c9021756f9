//! Core domain + application logic for the relay bot.
//!
//! This crate is intentionally framework-agnostic. The chat platform and the
//! completion API live behind ports (traits) implemented in adapter crates.

pub mod accounts;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod messaging;
pub mod model;
pub mod relay;
pub mod stats;

pub use errors::{Error, Result};
