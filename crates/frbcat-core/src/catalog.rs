//! Descriptors for the five-level catalog hierarchy.
//!
//! Each table is described once — name, natural key, required columns,
//! notes side table — and the ingestion engine iterates the descriptors
//! generically instead of branching per table.

use serde::{Deserialize, Serialize};

/// The five primary catalog tables, in hierarchy (write) order.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Table {
  Authors,
  Frbs,
  Observations,
  RadioObservationsParams,
  RadioMeasuredParams,
}

/// Static description of one hierarchy table — everything the identity
/// resolver and hierarchy writer need to treat tables uniformly.
#[derive(Debug, Clone, Copy)]
pub struct TableDescriptor {
  pub table: Table,
  /// Table name in the relational store.
  pub name: &'static str,
  /// Columns whose combined value identifies a logical row independently of
  /// its generated id.
  pub natural_key: &'static [&'static str],
  /// Columns that must all be present before an insert is attempted; a row
  /// missing any of them can only be an update of an existing row.
  pub required: &'static [&'static str],
  /// Free-text notes side table, if the level has one.
  pub notes: Option<NotesTable>,
  /// Whether a supersedes notice rewrites this table in place. Authors are
  /// insert-or-fetch only.
  pub updatable: bool,
}

/// An append-only notes side table and its owning foreign-key column.
#[derive(Debug, Clone, Copy)]
pub struct NotesTable {
  pub name: &'static str,
  pub fk:   &'static str,
}

/// Hierarchy tables in the order the orchestrator writes them.
pub const HIERARCHY: [TableDescriptor; 5] = [
  TableDescriptor {
    table:       Table::Authors,
    name:        "authors",
    natural_key: &["ivorn"],
    required:    &["ivorn"],
    notes:       None,
    updatable:   false,
  },
  TableDescriptor {
    table:       Table::Frbs,
    name:        "frbs",
    natural_key: &["name"],
    required:    &["name", "utc"],
    notes:       Some(NotesTable { name: "frbs_notes", fk: "frb_id" }),
    updatable:   true,
  },
  TableDescriptor {
    table:       Table::Observations,
    name:        "observations",
    natural_key: &["frb_id", "telescope", "utc"],
    required:    &["telescope", "verified"],
    notes:       Some(NotesTable { name: "observations_notes", fk: "obs_id" }),
    updatable:   true,
  },
  TableDescriptor {
    table:       Table::RadioObservationsParams,
    name:        "radio_observations_params",
    natural_key: &["obs_id", "settings_id"],
    required:    &["raj", "decj"],
    notes:       Some(NotesTable {
      name: "radio_observations_params_notes",
      fk:   "rop_id",
    }),
    updatable:   true,
  },
  TableDescriptor {
    table:       Table::RadioMeasuredParams,
    name:        "radio_measured_params",
    natural_key: &["voevent_ivorn"],
    required:    &["voevent_ivorn", "voevent_xml", "dm", "snr", "width"],
    notes:       Some(NotesTable {
      name: "radio_measured_params_notes",
      fk:   "rmp_id",
    }),
    updatable:   true,
  },
];

impl Table {
  pub fn descriptor(self) -> &'static TableDescriptor {
    &HIERARCHY[self as usize]
  }
}
