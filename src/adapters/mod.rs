//! Adapters layer: Concrete implementations of ports.
//!
//! - `http`: reqwest client for the resuscitation engine
//! - `sanitize`: credential and identifier filtering for logs

pub mod http;
pub mod sanitize;

pub use http::HttpEngine;
