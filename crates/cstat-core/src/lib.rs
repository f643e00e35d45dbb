//! Core domain + application logic for the container payment status bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and Google Sheets
//! live behind ports (traits) implemented in adapter crates.

pub mod config;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod intent;
pub mod logging;
pub mod messaging;
pub mod ports;
pub mod repository;
pub mod router;
pub mod status;

pub use errors::{Error, Result};
