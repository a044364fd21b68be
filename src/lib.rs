//! Agora Backend Library
//!
//! Core components for a social content service: the document store, the
//! credential and token subsystem, and the vote ledger, plus the thin HTTP
//! glue over them.

pub mod api;
pub mod auth;
pub mod error;
pub mod service;
pub mod store;
pub mod votes;

pub use error::{Error, Result};
