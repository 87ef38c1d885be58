//! Declarative notice-to-catalog column mapping.
//!
//! A [`Mapping`] says, for every hierarchy table, which columns exist and
//! how each one is pulled out of a decoded notice. The built-in mapping
//! reproduces the VOEvent vocabulary the catalog was built around, and a
//! custom mapping can be loaded from JSON to ingest differently-shaped
//! feeds without touching the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
  catalog::Table,
  notice::PositionCoord,
  Result,
};

fn default_threshold() -> f64 {
  0.95
}

/// How one column's value is extracted from a notice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionKind {
  /// Attribute of the notice root element.
  Attribute { name: String },
  /// Named parameter in a named group.
  Param { group: String, name: String },
  /// The observation timestamp.
  IsoTimestamp,
  /// A timestamp under the authorship section.
  AuthorTimestamp { path: String },
  /// The notice verbatim.
  RawDocument,
  /// A component of the reported sky position.
  Position { coord: PositionCoord },
  /// Boolean derived from the issuer's importance rating.
  ImportanceThreshold {
    #[serde(default = "default_threshold")]
    threshold: f64,
  },
  /// Text content of an element addressed by dotted path.
  Document { path: String },
}

/// One column of one table and its extraction rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingEntry {
  /// Catalog column the extracted value lands in.
  pub column:      String,
  #[serde(flatten)]
  pub kind:        ExtractionKind,
  /// Advisory flag mirrored from the table descriptor; the descriptor is
  /// authoritative for the required-set check.
  #[serde(default)]
  pub required:    bool,
  /// When set, the parameter's free-text description is appended to the
  /// table's notes rather than discarded.
  #[serde(default)]
  pub description: bool,
}

/// The full per-table column mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mapping(BTreeMap<Table, Vec<MappingEntry>>);

impl Mapping {
  /// Entries for one table; tables absent from the mapping have none.
  pub fn entries(&self, table: Table) -> &[MappingEntry] {
    self.0.get(&table).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Load a mapping from its JSON representation.
  pub fn from_json(json: &str) -> Result<Self> {
    Ok(serde_json::from_str(json)?)
  }

  /// The built-in VOEvent mapping.
  pub fn builtin() -> Self {
    let mut tables = BTreeMap::new();

    tables.insert(Table::Authors, vec![
      doc("ivorn", "Who.AuthorIVORN", true),
      doc("title", "Who.Author.title", false),
      doc("short_name", "Who.Author.shortName", false),
      doc("logo_url", "Who.Author.logoURL", false),
      doc("contact_name", "Who.Author.contactName", false),
      doc("contact_email", "Who.Author.contactEmail", false),
      doc("contact_phone", "Who.Author.contactPhone", false),
    ]);

    tables.insert(Table::Frbs, vec![
      param("name", "event parameters", "name", true),
      MappingEntry {
        column:      "utc".to_owned(),
        kind:        ExtractionKind::IsoTimestamp,
        required:    true,
        description: false,
      },
    ]);

    tables.insert(Table::Observations, vec![
      param("telescope", "observatory parameters", "telescope", true),
      MappingEntry {
        column:      "utc".to_owned(),
        kind:        ExtractionKind::IsoTimestamp,
        required:    false,
        description: false,
      },
      param("data_link", "event parameters", "data_link", false),
      MappingEntry {
        column:      "verified".to_owned(),
        kind:        ExtractionKind::ImportanceThreshold { threshold: 0.95 },
        required:    true,
        description: false,
      },
    ]);

    tables.insert(Table::RadioObservationsParams, vec![
      MappingEntry {
        column:      "raj".to_owned(),
        kind:        ExtractionKind::Position { coord: PositionCoord::Ra },
        required:    true,
        description: false,
      },
      MappingEntry {
        column:      "decj".to_owned(),
        kind:        ExtractionKind::Position { coord: PositionCoord::Dec },
        required:    true,
        description: false,
      },
      param("sampling_time", "observatory parameters", "sampling_time", false),
      param("bandwidth", "observatory parameters", "bandwidth", false),
      param(
        "centre_frequency",
        "observatory parameters",
        "centre_frequency",
        false,
      ),
      param("npol", "observatory parameters", "npol", false),
      param(
        "bits_per_sample",
        "observatory parameters",
        "bits_per_sample",
        false,
      ),
      param("gain", "observatory parameters", "gain", false),
      param("tsys", "observatory parameters", "tsys", false),
      param("backend", "observatory parameters", "backend", false),
      described("beam", "observatory parameters", "beam"),
      param("gl", "event parameters", "gl", false),
      param("gb", "event parameters", "gb", false),
      param("mw_dm_limit", "event parameters", "mw_dm_limit", false),
      param("receiver", "observatory parameters", "receiver", false),
      param(
        "channel_bandwidth",
        "observatory parameters",
        "channel_bandwidth",
        false,
      ),
      param(
        "pointing_error",
        "observatory parameters",
        "pointing_error",
        false,
      ),
      param(
        "beam_semi_major_axis",
        "observatory parameters",
        "beam_semi_major_axis",
        false,
      ),
      param(
        "beam_semi_minor_axis",
        "observatory parameters",
        "beam_semi_minor_axis",
        false,
      ),
      param(
        "beam_rotation_angle",
        "observatory parameters",
        "beam_rotation_angle",
        false,
      ),
    ]);

    tables.insert(Table::RadioMeasuredParams, vec![
      MappingEntry {
        column:      "voevent_ivorn".to_owned(),
        kind:        ExtractionKind::Attribute { name: "ivorn".to_owned() },
        required:    true,
        description: false,
      },
      MappingEntry {
        column:      "voevent_xml".to_owned(),
        kind:        ExtractionKind::RawDocument,
        required:    true,
        description: false,
      },
      param("dm", "event parameters", "dm", true),
      param("dm_error", "event parameters", "dm_error", false),
      param("snr", "event parameters", "snr", true),
      param("width", "event parameters", "width", true),
      param("width_error_upper", "event parameters", "width_error_upper", false),
      param("width_error_lower", "event parameters", "width_error_lower", false),
      param("flux", "event parameters", "flux", false),
      param("flux_error_upper", "event parameters", "flux_error_upper", false),
      param("flux_error_lower", "event parameters", "flux_error_lower", false),
      param(
        "flux_calibrated",
        "event parameters",
        "flux_calibrated",
        false,
      ),
      param("dm_index", "advanced parameters", "dm_index", false),
      param(
        "dm_index_error",
        "advanced parameters",
        "dm_index_error",
        false,
      ),
      param("scattering_index", "advanced parameters", "scattering_index", false),
      param(
        "scattering_index_error",
        "advanced parameters",
        "scattering_index_error",
        false,
      ),
      param("scattering_time", "advanced parameters", "scattering_time", false),
      param(
        "scattering_time_error",
        "advanced parameters",
        "scattering_time_error",
        false,
      ),
      described("scattering", "advanced parameters", "scattering"),
      param(
        "dispersion_smearing",
        "advanced parameters",
        "dispersion_smearing",
        false,
      ),
      param(
        "linear_poln_frac",
        "advanced parameters",
        "linear_poln_frac",
        false,
      ),
      param(
        "linear_poln_frac_error",
        "advanced parameters",
        "linear_poln_frac_error",
        false,
      ),
      param(
        "circular_poln_frac",
        "advanced parameters",
        "circular_poln_frac",
        false,
      ),
      param(
        "circular_poln_frac_error",
        "advanced parameters",
        "circular_poln_frac_error",
        false,
      ),
      param("spectral_index", "advanced parameters", "spectral_index", false),
      param(
        "spectral_index_error",
        "advanced parameters",
        "spectral_index_error",
        false,
      ),
      param("z_phot", "advanced parameters", "z_phot", false),
      param("z_phot_error", "advanced parameters", "z_phot_error", false),
      param("z_spec", "advanced parameters", "z_spec", false),
      param("z_spec_error", "advanced parameters", "z_spec_error", false),
      described("redshift_inferred", "advanced parameters", "redshift_inferred"),
      described("redshift_host", "advanced parameters", "redshift_host"),
    ]);

    Mapping(tables)
  }
}

fn param(column: &str, group: &str, name: &str, required: bool) -> MappingEntry {
  MappingEntry {
    column: column.to_owned(),
    kind: ExtractionKind::Param {
      group: group.to_owned(),
      name:  name.to_owned(),
    },
    required,
    description: false,
  }
}

fn described(column: &str, group: &str, name: &str) -> MappingEntry {
  MappingEntry {
    column: column.to_owned(),
    kind: ExtractionKind::Param {
      group: group.to_owned(),
      name:  name.to_owned(),
    },
    required: false,
    description: true,
  }
}

fn doc(column: &str, path: &str, required: bool) -> MappingEntry {
  MappingEntry {
    column: column.to_owned(),
    kind: ExtractionKind::Document { path: path.to_owned() },
    required,
    description: false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::HIERARCHY;

  #[test]
  fn builtin_covers_every_hierarchy_table() {
    let mapping = Mapping::builtin();
    for desc in &HIERARCHY {
      assert!(
        !mapping.entries(desc.table).is_empty(),
        "no entries for {}",
        desc.name
      );
    }
  }

  #[test]
  fn builtin_can_satisfy_every_required_column() {
    let mapping = Mapping::builtin();
    for desc in &HIERARCHY {
      let entries = mapping.entries(desc.table);
      for col in desc.required {
        assert!(
          entries.iter().any(|e| e.column == *col),
          "{}.{col} has no extraction rule",
          desc.name
        );
      }
    }
  }

  #[test]
  fn mapping_round_trips_through_json() {
    let mapping = Mapping::builtin();
    let json = serde_json::to_string(&mapping).unwrap();
    let back = Mapping::from_json(&json).unwrap();
    assert_eq!(back, mapping);
  }

  #[test]
  fn custom_mapping_parses() {
    let json = r#"{
      "frbs": [
        { "column": "name", "kind": "param",
          "group": "event parameters", "name": "name", "required": true },
        { "column": "utc", "kind": "iso_timestamp" }
      ]
    }"#;
    let mapping = Mapping::from_json(json).unwrap();
    let entries = mapping.entries(Table::Frbs);
    assert_eq!(entries.len(), 2);
    assert!(matches!(entries[1].kind, ExtractionKind::IsoTimestamp));
    assert!(mapping.entries(Table::Authors).is_empty());
  }
}
