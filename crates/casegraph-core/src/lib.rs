//! casegraph-core library.
//!
//! Case records live in a `SQLite` [`store::CaseStore`]; [`graph::CaseGraph`]
//! links cases that share an attribute value; [`manager::CaseManager`] turns
//! view actions into store and graph calls.
//!
//! # Conventions
//!
//! - **Errors**: library calls return [`error::CaseError`]; view-facing
//!   manager calls return `anyhow::Result` because views bring their own
//!   errors.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod db;
pub mod error;
pub mod graph;
pub mod manager;
pub mod model;
pub mod store;

pub use error::CaseError;
pub use graph::CaseGraph;
pub use manager::{CaseManager, CaseView, Notice, NoticeLevel, Outcome};
pub use model::{Case, CaseField, CaseFields, CaseId};
pub use store::CaseStore;
