//! Startup, wiring and shutdown of the stores and services.
//!
//! - [`MarketplaceSystem`]: spawns every store actor and builds the services on top
//! - [`seed`]: demo data for local runs
//! - [`tracing`]: log subscriber setup

pub mod seed;
pub mod system;
pub mod tracing;

pub use seed::{seed_demo, DemoData};
pub use system::{LifecycleError, MarketplaceSystem};
