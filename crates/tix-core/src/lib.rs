//! tix-core library.
//!
//! Ticket model, the grouping and sort engines, the view model builder, and
//! the session state machine that ties them to a data source and a
//! persisted grouping preference.
//!
//! # Conventions
//!
//! - **Errors**: module-level `thiserror` enums, each mapped to a stable
//!   [`error::ErrorCode`]. `anyhow::Result` only where context chaining is
//!   the point (config loading).
//! - **Logging**: `tracing` macros (`info!`, `warn!`, `error!`, `debug!`).

pub mod aggregate;
pub mod config;
pub mod error;
pub mod model;
pub mod prefs;
pub mod repository;
pub mod session;
pub mod sort;
pub mod source;
pub mod view;
