//! # Logging
//!
//! [`setup_tracing`] installs a compact `tracing` subscriber filtered by
//! `RUST_LOG` (default `info`). Module paths are hidden; the store actors
//! attach `entity_type` and the entity id instead.
//!
//! ```bash
//! RUST_LOG=debug marketplace-orders                 # full payloads at entry points
//! RUST_LOG=info,tower_http=debug marketplace-orders # plus per-request spans
//! ```
//!
//! A refund approval at `info` reads roughly:
//!
//! ```text
//! INFO Action ok entity_type="Order" id=LM-2401-AB12
//! INFO approve_refund{user=user_1}: Refund approved order=LM-2401-AB12 transaction=rf_... amount=129.50
//! ```

use tracing_subscriber::EnvFilter;

pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
