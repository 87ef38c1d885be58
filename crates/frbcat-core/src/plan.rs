//! Building an [`IngestPlan`] from a decoded notice.
//!
//! The plan is the engine's intermediate representation: per hierarchy
//! table, the columns the notice actually carried, already typed and
//! normalised, plus any free-text notes. The storage layer consumes plans
//! without ever seeing the wire format.

use serde::{Deserialize, Serialize};

use crate::{
  catalog::{Table, HIERARCHY},
  event::EventType,
  mapping::{ExtractionKind, Mapping, MappingEntry},
  notice::{ColumnValue, NoticeSource},
  Result,
};

/// One free-text note destined for a table's notes side table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotePlan {
  pub last_modified: Option<String>,
  pub author:        Option<String>,
  pub note:          String,
}

/// Extracted column values for one hierarchy table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePlan {
  pub table:   Table,
  pub columns: Vec<String>,
  pub values:  Vec<ColumnValue>,
  #[serde(default)]
  pub notes:   Vec<NotePlan>,
}

impl TablePlan {
  pub fn empty(table: Table) -> Self {
    Self { table, columns: Vec::new(), values: Vec::new(), notes: Vec::new() }
  }

  pub fn push(&mut self, column: impl Into<String>, value: ColumnValue) {
    self.columns.push(column.into());
    self.values.push(value);
  }

  /// Value of a named column, if the notice carried it.
  pub fn value(&self, column: &str) -> Option<&ColumnValue> {
    self
      .columns
      .iter()
      .position(|c| c == column)
      .map(|i| &self.values[i])
  }
}

/// Everything the storage layer needs to apply one notice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestPlan {
  pub event_type: EventType,
  /// The cited prior identifier, when the notice carries a citation.
  pub citation:   Option<String>,
  pub tables:     Vec<TablePlan>,
}

impl IngestPlan {
  /// The plan for one table, or an empty plan if the notice carried
  /// nothing for it.
  pub fn table(&self, table: Table) -> TablePlan {
    self
      .tables
      .iter()
      .find(|t| t.table == table)
      .cloned()
      .unwrap_or_else(|| TablePlan::empty(table))
  }
}

/// Extract every mapped column from `source` and classify the notice.
///
/// Absent and empty-text values are dropped, so a plan only ever names
/// columns the notice actually populated. For a superseding notice the
/// cited identifier replaces the notice's own at the measured-event level,
/// which is what makes the update land on the original row.
pub fn build_plan(
  source: &dyn NoticeSource,
  mapping: &Mapping,
) -> Result<IngestPlan> {
  let citation = source.citation();
  let event_type = EventType::classify(citation.as_ref())?;
  let cited_ivorn = citation.and_then(|c| c.ivorn);

  let mut tables = Vec::with_capacity(HIERARCHY.len());
  for desc in &HIERARCHY {
    let mut plan = TablePlan::empty(desc.table);
    for entry in mapping.entries(desc.table) {
      let value = extract(source, entry);
      let Some(value) = value else { continue };
      if value.is_empty_text() {
        continue;
      }

      // A superseding notice must address the row it corrects, so the
      // cited identifier stands in for the notice's own.
      let value = if desc.table == Table::RadioMeasuredParams
        && entry.column == "voevent_ivorn"
        && event_type.is_supersedes()
        && let Some(cited) = &cited_ivorn
      {
        ColumnValue::Text(cited.clone())
      } else {
        value
      };

      if entry.description
        && let ExtractionKind::Param { group, name } = &entry.kind
        && let Some(text) = source.param_description(group, name)
        && !text.trim().is_empty()
      {
        plan.notes.push(NotePlan {
          last_modified: source.author_timestamp("Who.Date"),
          author:        source.document("Who.Author.contactName"),
          note:          format!("[{name}] {}", text.trim()),
        });
      }

      plan.push(&entry.column, value);
    }
    tables.push(plan);
  }

  Ok(IngestPlan { event_type, citation: cited_ivorn, tables })
}

fn extract(
  source: &dyn NoticeSource,
  entry: &MappingEntry,
) -> Option<ColumnValue> {
  match &entry.kind {
    ExtractionKind::Attribute { name } => {
      source.attribute(name).map(ColumnValue::Text)
    }
    ExtractionKind::Param { group, name } => {
      source.param_value(group, name).map(|v| ColumnValue::from_raw(&v))
    }
    ExtractionKind::IsoTimestamp => {
      source.iso_timestamp().map(ColumnValue::Text)
    }
    ExtractionKind::AuthorTimestamp { path } => {
      source.author_timestamp(path).map(ColumnValue::Text)
    }
    ExtractionKind::RawDocument => {
      Some(ColumnValue::Text(source.raw_document().to_owned()))
    }
    ExtractionKind::Position { coord } => source.position(*coord),
    ExtractionKind::ImportanceThreshold { threshold } => Some(
      ColumnValue::Bool(source.importance().is_some_and(|i| i >= *threshold)),
    ),
    ExtractionKind::Document { path } => {
      source.document(path).map(ColumnValue::Text)
    }
  }
}
