//! Sexagesimal ↔ decimal-degree coordinate conversion.
//!
//! The catalog stores right ascension and declination as `D:M:S` strings;
//! notices may carry either form.

use crate::{Error, Result};

/// Decimal degrees → `D:M:S`, seconds truncated, sign carried on the
/// degrees component.
pub fn decdeg_to_dms(dd: f64) -> String {
  let negative = dd < 0.0;
  let total_seconds = dd.abs() * 3600.0;
  let minutes = (total_seconds / 60.0).floor();
  let seconds = total_seconds - minutes * 60.0;
  let degrees = (minutes / 60.0).floor();
  let minutes = minutes - degrees * 60.0;
  let sign = if negative { "-" } else { "" };
  format!("{sign}{}:{}:{}", degrees as i64, minutes as i64, seconds as i64)
}

/// `D:M:S` → decimal degrees. A leading `-` applies to the whole value, not
/// only the degrees component.
pub fn dms_to_decdeg(dms: &str) -> Result<f64> {
  let trimmed = dms.trim();
  let (negative, unsigned) = match trimmed.strip_prefix('-') {
    Some(rest) => (true, rest),
    None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
  };

  let mut parts = unsigned.splitn(3, ':');
  let bad = || Error::Coordinate(dms.to_owned());
  let degrees: f64 = parts.next().ok_or_else(bad)?.trim().parse().map_err(|_| bad())?;
  let minutes: f64 = parts.next().ok_or_else(bad)?.trim().parse().map_err(|_| bad())?;
  let seconds: f64 = parts.next().ok_or_else(bad)?.trim().parse().map_err(|_| bad())?;

  let magnitude = degrees + minutes / 60.0 + seconds / 3600.0;
  Ok(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn degrees_to_sexagesimal() {
    assert_eq!(decdeg_to_dms(50.8), "50:48:0");
    assert_eq!(decdeg_to_dms(-4.5), "-4:30:0");
    assert_eq!(decdeg_to_dms(0.0), "0:0:0");
  }

  #[test]
  fn sexagesimal_to_degrees() {
    assert!((dms_to_decdeg("50:48:0").unwrap() - 50.8).abs() < 1e-9);
    assert!((dms_to_decdeg("-4:30:0").unwrap() + 4.5).abs() < 1e-9);
  }

  #[test]
  fn round_trip() {
    for dd in [19.114722, -40.620556, 0.25] {
      let back = dms_to_decdeg(&decdeg_to_dms(dd)).unwrap();
      // seconds are truncated to whole units on the way out
      assert!((back - dd).abs() < 1.0 / 3600.0);
    }
  }

  #[test]
  fn sign_applies_to_minutes_and_seconds_too() {
    let v = dms_to_decdeg("-40:37:14").unwrap();
    assert!(v < -40.0 && v > -41.0);
  }

  #[test]
  fn garbage_is_rejected() {
    assert!(dms_to_decdeg("not a coordinate").is_err());
    assert!(dms_to_decdeg("12:34").is_err());
  }
}
