//! Error type for `frbcat-store`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] frbcat_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  /// A hierarchy row could neither be inserted nor resolved against an
  /// existing row. Nothing from the notice is kept.
  #[error("hierarchy integrity violation at {0}")]
  Integrity(String),

  /// The notice's measured event is already catalogued and the notice does
  /// not supersede it. Redelivery, not corruption.
  #[error("duplicate delivery of {0}")]
  Duplicate(String),

  /// A retraction or removal arrived without a cited prior event.
  #[error("notice cites no prior event")]
  MissingCitation,
}

impl Error {
  /// Whether this error is a benign redelivery rather than a failure.
  pub fn is_duplicate(&self) -> bool {
    matches!(self, Self::Duplicate(_))
  }

  /// Smuggle a domain error out of a `tokio_rusqlite` call closure.
  pub(crate) fn into_call(self) -> tokio_rusqlite::Error {
    match self {
      Self::Sqlite(e) => tokio_rusqlite::Error::Rusqlite(e),
      other => tokio_rusqlite::Error::Other(Box::new(other)),
    }
  }

  /// Recover a smuggled domain error on the caller side.
  pub(crate) fn from_call(err: tokio_rusqlite::Error) -> Self {
    match err {
      tokio_rusqlite::Error::Other(inner) => match inner.downcast::<Self>() {
        Ok(domain) => *domain,
        Err(other) => Self::Database(tokio_rusqlite::Error::Other(other)),
      },
      other => Self::Database(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
