//! Core types and calculators for the Tandem widget data pipeline.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod distance;
pub mod error;
pub mod gateway;
pub mod geo;
pub mod relationship;
pub mod schedule;
pub mod snapshot;
pub mod state;
pub mod store;

pub use error::{Error, Result};
