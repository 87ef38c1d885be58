//! The hierarchy writer: applies one [`IngestPlan`] inside a transaction.
//!
//! Every level follows the same insert-or-resolve routine, driven by the
//! table descriptors. An `Err` return rolls the whole transaction back, so
//! a notice is either fully catalogued or leaves no trace.

use frbcat_core::{
  catalog::{Table, TableDescriptor},
  notice::ColumnValue,
  plan::{IngestPlan, NotePlan, TablePlan},
};
use rusqlite::{params, params_from_iter, types::Value, OptionalExtension as _, Transaction};

use crate::{Error, Result};

/// Ids of the hierarchy rows a notice landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestedIds {
  pub author_id: i64,
  pub frb_id:    i64,
  pub obs_id:    i64,
  pub rop_id:    i64,
  pub rmp_id:    i64,
}

/// One resolved hierarchy row and whether this notice created it.
#[derive(Debug, Clone, Copy)]
struct Written {
  id:       i64,
  inserted: bool,
}

fn to_sql_value(value: &ColumnValue) -> Value {
  match value {
    ColumnValue::Integer(i) => Value::Integer(*i),
    ColumnValue::Real(f) => Value::Real(*f),
    ColumnValue::Bool(b) => Value::Integer(*b as i64),
    ColumnValue::Text(s) => Value::Text(s.clone()),
  }
}

/// Walk the hierarchy top-down, writing one row per level and threading
/// each generated id into the child's foreign-key column.
pub(crate) fn apply_plan(
  tx: &Transaction<'_>,
  plan: &IngestPlan,
) -> Result<IngestedIds> {
  let supersedes = plan.event_type.is_supersedes();

  let authors = plan.table(Table::Authors);
  let author = write_row(tx, Table::Authors.descriptor(), &authors, false)?;

  let mut frbs = plan.table(Table::Frbs);
  frbs.push("author_id", ColumnValue::Integer(author.id));
  let frb = write_row(tx, Table::Frbs.descriptor(), &frbs, supersedes)?;

  let mut observations = plan.table(Table::Observations);
  observations.push("frb_id", ColumnValue::Integer(frb.id));
  observations.push("author_id", ColumnValue::Integer(author.id));
  let obs =
    write_row(tx, Table::Observations.descriptor(), &observations, supersedes)?;

  let mut rop = plan.table(Table::RadioObservationsParams);
  rop.push("obs_id", ColumnValue::Integer(obs.id));
  rop.push("author_id", ColumnValue::Integer(author.id));
  let settings = settings_id(&observations, &rop);
  rop.push("settings_id", ColumnValue::Text(settings));
  let rop_row = write_row(
    tx,
    Table::RadioObservationsParams.descriptor(),
    &rop,
    supersedes,
  )?;

  let mut rmp = plan.table(Table::RadioMeasuredParams);
  rmp.push("rop_id", ColumnValue::Integer(rop_row.id));
  rmp.push("author_id", ColumnValue::Integer(author.id));
  let rmp_desc = Table::RadioMeasuredParams.descriptor();

  // An already-catalogued measured event means redelivery unless the
  // notice explicitly supersedes it.
  if !supersedes
    && let Some(ivorn) = rmp.value("voevent_ivorn").and_then(ColumnValue::as_text)
    && resolve_by_natural_key(tx, rmp_desc, &rmp)?.is_some()
  {
    return Err(Error::Duplicate(ivorn.to_owned()));
  }

  let rmp_row = write_row(tx, rmp_desc, &rmp, supersedes)?;
  if rmp_row.inserted {
    assign_rank(tx, frb.id, rmp_row.id)?;
  }

  write_notes(tx, Table::Frbs.descriptor(), frb.id, &frbs.notes)?;
  write_notes(tx, Table::Observations.descriptor(), obs.id, &observations.notes)?;
  write_notes(
    tx,
    Table::RadioObservationsParams.descriptor(),
    rop_row.id,
    &rop.notes,
  )?;
  write_notes(tx, rmp_desc, rmp_row.id, &rmp.notes)?;

  Ok(IngestedIds {
    author_id: author.id,
    frb_id:    frb.id,
    obs_id:    obs.id,
    rop_id:    rop_row.id,
    rmp_id:    rmp_row.id,
  })
}

/// Observation-settings identity: the observation's telescope and time
/// joined with the pointing. Absent components render empty so the key is
/// stable for a given notice shape.
fn settings_id(observations: &TablePlan, rop: &TablePlan) -> String {
  let component = |plan: &TablePlan, column: &str| {
    plan.value(column).map(ColumnValue::render).unwrap_or_default()
  };
  format!(
    "{};{};{};{}",
    component(observations, "telescope"),
    component(observations, "utc"),
    component(rop, "raj"),
    component(rop, "decj"),
  )
}

/// Insert-or-resolve one level. A complete row is inserted; a conflicting
/// or incomplete row resolves to the existing row via its natural key, and
/// a superseding notice then rewrites that row in place.
fn write_row(
  tx: &Transaction<'_>,
  desc: &TableDescriptor,
  plan: &TablePlan,
  supersedes: bool,
) -> Result<Written> {
  let complete = desc.required.iter().all(|c| plan.value(c).is_some());
  if complete
    && let Some(id) = insert_row(tx, desc, plan)?
  {
    return Ok(Written { id, inserted: true });
  }

  let Some(id) = resolve_by_natural_key(tx, desc, plan)? else {
    return Err(Error::Integrity(desc.name.to_owned()));
  };

  if supersedes && desc.updatable {
    update_row(tx, desc, plan, id)?;
  }
  Ok(Written { id, inserted: false })
}

fn insert_row(
  tx: &Transaction<'_>,
  desc: &TableDescriptor,
  plan: &TablePlan,
) -> Result<Option<i64>> {
  let placeholders =
    (1..=plan.columns.len()).map(|i| format!("?{i}")).collect::<Vec<_>>();
  let sql = format!(
    "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT DO NOTHING RETURNING id",
    desc.name,
    plan.columns.join(", "),
    placeholders.join(", "),
  );
  let id = tx
    .query_row(
      &sql,
      params_from_iter(plan.values.iter().map(to_sql_value)),
      |r| r.get(0),
    )
    .optional()?;
  Ok(id)
}

fn resolve_by_natural_key(
  tx: &Transaction<'_>,
  desc: &TableDescriptor,
  plan: &TablePlan,
) -> Result<Option<i64>> {
  let mut clauses = Vec::with_capacity(desc.natural_key.len());
  let mut values = Vec::with_capacity(desc.natural_key.len());
  for (i, column) in desc.natural_key.iter().enumerate() {
    let Some(value) = plan.value(column) else {
      // Without a full natural key the row cannot be matched to anything.
      return Ok(None);
    };
    clauses.push(format!("{column} = ?{}", i + 1));
    values.push(to_sql_value(value));
  }
  let sql = format!(
    "SELECT id FROM {} WHERE {}",
    desc.name,
    clauses.join(" AND "),
  );
  let id = tx
    .query_row(&sql, params_from_iter(values), |r| r.get(0))
    .optional()?;
  Ok(id)
}

/// Rewrite every non-key column the notice carried on an existing row.
fn update_row(
  tx: &Transaction<'_>,
  desc: &TableDescriptor,
  plan: &TablePlan,
  id: i64,
) -> Result<()> {
  let mut sets = Vec::new();
  let mut values = Vec::new();
  for (column, value) in plan.columns.iter().zip(&plan.values) {
    if desc.natural_key.contains(&column.as_str()) {
      continue;
    }
    values.push(to_sql_value(value));
    sets.push(format!("{column} = ?{}", values.len()));
  }
  if sets.is_empty() {
    return Ok(());
  }
  values.push(Value::Integer(id));
  let sql = format!(
    "UPDATE {} SET {} WHERE id = ?{}",
    desc.name,
    sets.join(", "),
    values.len(),
  );
  tx.execute(&sql, params_from_iter(values))?;
  Ok(())
}

/// Detection order within a source, 1-based. Assigned once, when the
/// measured event is genuinely inserted; superseding rewrites keep the
/// original rank.
fn assign_rank(tx: &Transaction<'_>, frb_id: i64, rmp_id: i64) -> Result<()> {
  tx.execute(
    "UPDATE radio_measured_params SET rank = (
       SELECT COALESCE(MAX(r.rank), 0) + 1
       FROM radio_measured_params r
       JOIN radio_observations_params p ON r.rop_id = p.id
       JOIN observations o ON p.obs_id = o.id
       WHERE o.frb_id = ?1 AND r.id <> ?2
     )
     WHERE id = ?2",
    params![frb_id, rmp_id],
  )?;
  Ok(())
}

/// Append the plan's notes to the level's notes table, skipping notes the
/// row already carries so redeliveries and follow-ups stay tidy.
fn write_notes(
  tx: &Transaction<'_>,
  desc: &TableDescriptor,
  row_id: i64,
  notes: &[NotePlan],
) -> Result<()> {
  let Some(table) = desc.notes else {
    return Ok(());
  };
  let sql = format!(
    "INSERT INTO {name} ({fk}, last_modified, author, note)
     SELECT ?1, ?2, ?3, ?4
     WHERE NOT EXISTS (
       SELECT 1 FROM {name} WHERE {fk} = ?1 AND note = ?4
     )",
    name = table.name,
    fk = table.fk,
  );
  for note in notes {
    tx.execute(&sql, params![row_id, note.last_modified, note.author, note.note])?;
  }
  Ok(())
}
