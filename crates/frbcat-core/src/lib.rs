//! Core types for the FRB transient-notice catalog.
//!
//! This crate is deliberately free of XML and database dependencies: the
//! wire format and the storage backend both plug into the types defined
//! here.

pub mod catalog;
pub mod coords;
pub mod error;
pub mod event;
pub mod mapping;
pub mod notice;
pub mod plan;

pub use error::{Error, Result};
