//! Error types for `frbcat-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The notice cites a prior event with a relation the catalog does not
  /// recognise. Nothing is written.
  #[error("unrecognised event relation: {0:?}")]
  Classification(String),

  #[error("malformed sexagesimal coordinate: {0:?}")]
  Coordinate(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
