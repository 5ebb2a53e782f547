//! HTTPS implementation of the partner gateway.
//!
//! Two independent remote lookups against the couples backend: the partner's
//! profile and their last shared location. Each is bounded by the client
//! timeout and neither can fail the other; the repository joins them in
//! parallel and tolerates either side going missing.

mod client;
mod wire;

pub mod error;

pub use client::{GatewayConfig, HttpPartnerGateway};
pub use error::{Error, Result};

#[cfg(test)]
mod tests;
