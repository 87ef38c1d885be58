//! Event-type classification of an inbound notice.
//!
//! A notice without a citation announces a new detection. A notice that
//! cites a prior identifier declares how it relates to it: a confirming
//! follow-up, a superseding correction, or a retraction.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// How a notice relates to previously delivered notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
  /// First notice for a detection; carries no citation.
  New,
  /// Confirming observation of an already-catalogued source.
  Followup,
  /// In-place correction of a previously stored measured event.
  Supersedes,
  /// Withdrawal of a previously stored measured event.
  Retraction,
}

/// The citation block of a notice: a relation plus the cited identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
  pub relation: String,
  pub ivorn:    Option<String>,
}

impl EventType {
  /// Classify a notice from its citation. Absence of a citation means the
  /// notice is new; an unknown relation string is a classification error.
  pub fn classify(citation: Option<&Citation>) -> Result<Self> {
    match citation {
      None => Ok(Self::New),
      Some(c) => match c.relation.as_str() {
        "followup" => Ok(Self::Followup),
        "supersedes" => Ok(Self::Supersedes),
        "retraction" => Ok(Self::Retraction),
        other => Err(Error::Classification(other.to_owned())),
      },
    }
  }

  pub fn is_supersedes(self) -> bool {
    matches!(self, Self::Supersedes)
  }
}
