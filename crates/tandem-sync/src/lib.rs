//! Orchestration layer for the Tandem widget pipeline.
//!
//! [`WidgetDataRepository`] owns the single source of truth: it merges local
//! user state, the partner gateway, and the two calculators into one
//! immutable snapshot, persists it atomically, and publishes it on a watch
//! channel. [`RefreshScheduler`] drives the repository on an adaptive
//! cadence.
//!
//! Both are explicit, constructor-injected instances with a defined
//! lifecycle — nothing in this crate is a global.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
#![allow(async_fn_in_trait)]

pub mod error;
pub mod repository;
pub mod scheduler;

pub use error::RefreshError;
pub use repository::{RepositoryConfig, WidgetDataRepository};
pub use scheduler::{
  ConstraintProbe, NoConstraints, RefreshDriver, RefreshScheduler,
  SchedulerConfig,
};
