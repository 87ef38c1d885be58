//! Error types for `frbcat-voevent`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("malformed XML: {0}")]
  Xml(String),

  #[error("document root is not a VOEvent packet")]
  NotVoEvent,

  #[error("VOEvent packet carries no ivorn attribute")]
  MissingIvorn,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
