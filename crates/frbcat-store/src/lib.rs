//! SQLite backend for the FRB catalog.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Each notice is applied inside
//! one transaction: it is either fully catalogued or leaves no trace.

mod ingest;
mod retract;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use ingest::IngestedIds;
pub use retract::{RemoveOutcome, RemovedLevels, RetractOutcome};
pub use store::{
  CatalogStore, MeasuredEvent, Outcome, RetractionPolicy, TableCounts,
};
