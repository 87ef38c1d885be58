//! [`NoticeSource`] implementation for decoded VOEvent packets.

use chrono::NaiveDateTime;
use frbcat_core::{
  coords,
  event::Citation,
  notice::{ColumnValue, NoticeSource, PositionCoord},
};

use crate::parse::VoEvent;

const TIMESTAMP_FORMATS: [&str; 4] = [
  "%Y-%m-%dT%H:%M:%S%.f",
  "%Y-%m-%dT%H:%M:%S",
  "%Y-%m-%d %H:%M:%S%.f",
  "%Y-%m-%d %H:%M:%S",
];

/// Normalise a packet timestamp to `YYYY-MM-DD HH:MM:SS`, dropping
/// fractional seconds. Unparseable values pass through trimmed.
fn normalise_timestamp(raw: &str) -> String {
  let trimmed = raw.trim();
  for format in TIMESTAMP_FORMATS {
    if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, format) {
      return ts.format("%Y-%m-%d %H:%M:%S").to_string();
    }
  }
  trimmed.to_owned()
}

impl VoEvent {
  fn coordinate(&self, raw: Option<&String>) -> Option<ColumnValue> {
    let raw = raw?;
    // Decimal-degree positions are stored in the catalog's sexagesimal
    // convention; anything else is taken as already sexagesimal.
    if self.position_unit.as_deref() == Some("deg")
      && let Ok(dd) = raw.trim().parse::<f64>()
    {
      return Some(ColumnValue::Text(coords::decdeg_to_dms(dd)));
    }
    Some(ColumnValue::Text(raw.trim().to_owned()))
  }
}

impl NoticeSource for VoEvent {
  fn attribute(&self, name: &str) -> Option<String> {
    self.attributes.get(name).cloned()
  }

  fn param_value(&self, group: &str, name: &str) -> Option<String> {
    self.param(group, name).and_then(|p| p.value.clone())
  }

  fn param_description(&self, group: &str, name: &str) -> Option<String> {
    self.param(group, name).and_then(|p| p.description.clone())
  }

  fn iso_timestamp(&self) -> Option<String> {
    self.iso_time.as_deref().map(normalise_timestamp)
  }

  fn author_timestamp(&self, path: &str) -> Option<String> {
    self.texts.get(path).map(|t| normalise_timestamp(t))
  }

  fn document(&self, path: &str) -> Option<String> {
    self.texts.get(path).cloned()
  }

  fn position(&self, coord: PositionCoord) -> Option<ColumnValue> {
    match coord {
      PositionCoord::Ra => self.coordinate(self.c1.as_ref()),
      PositionCoord::Dec => self.coordinate(self.c2.as_ref()),
      PositionCoord::Err => {
        self.error_radius.as_ref().map(|e| ColumnValue::from_raw(e))
      }
    }
  }

  fn importance(&self) -> Option<f64> {
    self.importance
  }

  fn raw_document(&self) -> &str {
    &self.raw
  }

  fn citation(&self) -> Option<Citation> {
    self.cited.as_ref().map(|(relation, ivorn)| Citation {
      relation: relation.clone(),
      ivorn:    ivorn.clone(),
    })
  }
}
