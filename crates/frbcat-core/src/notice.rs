//! The abstract surface of an inbound transient notice.
//!
//! Ingestion never touches the wire format directly. A decoded notice is
//! exposed through [`NoticeSource`], and the mapping layer pulls typed
//! column values out of it.

use serde::{Deserialize, Serialize};

use crate::event::Citation;

/// A typed value bound for a catalog column.
///
/// The untagged serde representation lets mappings and fixtures spell
/// values naturally in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnValue {
  Integer(i64),
  Real(f64),
  Bool(bool),
  Text(String),
}

impl ColumnValue {
  /// Parse a raw notice string into the narrowest type that fits. Integers
  /// are preferred over reals, and anything non-numeric stays text.
  pub fn from_raw(raw: &str) -> Self {
    let trimmed = raw.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
      Self::Integer(i)
    } else if let Ok(f) = trimmed.parse::<f64>() {
      Self::Real(f)
    } else {
      Self::Text(trimmed.to_owned())
    }
  }

  /// Render the value as it appears inside a composed identifier.
  pub fn render(&self) -> String {
    match self {
      Self::Integer(i) => i.to_string(),
      Self::Real(f) => f.to_string(),
      Self::Bool(b) => (*b as i64).to_string(),
      Self::Text(s) => s.clone(),
    }
  }

  /// The inner text, if this is a text value.
  pub fn as_text(&self) -> Option<&str> {
    match self {
      Self::Text(s) => Some(s),
      _ => None,
    }
  }

  /// True for an empty or whitespace-only text value. Such values are
  /// treated as absent by the plan builder.
  pub fn is_empty_text(&self) -> bool {
    matches!(self, Self::Text(s) if s.trim().is_empty())
  }
}

/// Which component of a reported sky position an extraction targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionCoord {
  /// Right ascension.
  Ra,
  /// Declination.
  Dec,
  /// Positional error radius.
  Err,
}

/// Read access to one decoded notice, independent of wire format.
///
/// All accessors return `None` when the notice simply does not carry the
/// field; parse failures surface earlier, when the notice is decoded.
pub trait NoticeSource {
  /// Attribute of the notice root element, e.g. its identifier.
  fn attribute(&self, name: &str) -> Option<String>;

  /// Value of a named parameter inside a named group.
  fn param_value(&self, group: &str, name: &str) -> Option<String>;

  /// Human-readable description attached to a parameter, if any.
  fn param_description(&self, group: &str, name: &str) -> Option<String>;

  /// The observation timestamp, normalised to `YYYY-MM-DD HH:MM:SS`.
  fn iso_timestamp(&self) -> Option<String>;

  /// A timestamp under the authorship section, normalised like
  /// [`Self::iso_timestamp`].
  fn author_timestamp(&self, path: &str) -> Option<String>;

  /// Text content of an element addressed by its dotted path from the root.
  fn document(&self, path: &str) -> Option<String>;

  /// A component of the reported sky position, converted to the catalog's
  /// coordinate convention.
  fn position(&self, coord: PositionCoord) -> Option<ColumnValue>;

  /// The issuer's importance rating, if present.
  fn importance(&self) -> Option<f64>;

  /// The notice verbatim as received.
  fn raw_document(&self) -> &str;

  /// The citation block, if the notice cites a prior event.
  fn citation(&self) -> Option<Citation>;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn raw_parsing_prefers_the_narrowest_type() {
    assert_eq!(ColumnValue::from_raw("42"), ColumnValue::Integer(42));
    assert_eq!(ColumnValue::from_raw("1.5"), ColumnValue::Real(1.5));
    assert_eq!(
      ColumnValue::from_raw(" PARKES "),
      ColumnValue::Text("PARKES".to_owned())
    );
  }

  #[test]
  fn rendering_matches_identifier_composition() {
    assert_eq!(ColumnValue::Integer(7).render(), "7");
    assert_eq!(ColumnValue::Real(2.5).render(), "2.5");
    assert_eq!(ColumnValue::Bool(true).render(), "1");
    assert_eq!(ColumnValue::Text("HTRU".to_owned()).render(), "HTRU");
  }

  #[test]
  fn empty_text_is_recognised() {
    assert!(ColumnValue::from_raw("   ").is_empty_text());
    assert!(!ColumnValue::from_raw("x").is_empty_text());
    assert!(!ColumnValue::Integer(0).is_empty_text());
  }
}
