//! Retraction handling: flag-clearing and full cascade removal.
//!
//! The default policy keeps the retracted data but clears the observation's
//! `detected` and `verified` flags, so the event drops out of the public
//! catalog while staying auditable. Removal walks the hierarchy bottom-up
//! and deletes each ancestor only once it has no remaining children.

use rusqlite::{params, OptionalExtension as _, Transaction};

use crate::Result;

/// Result of a flag-clearing retraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetractOutcome {
  /// The cited event was found; its observation's flags are now cleared.
  Cleared { obs_id: i64 },
  /// The cited identifier is not in the catalog. Nothing changed.
  NotFound,
}

/// Which hierarchy levels a cascade removal actually deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemovedLevels {
  pub measured_event: bool,
  pub observation_params: bool,
  pub observation: bool,
  pub frb: bool,
}

/// Result of a cascade removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
  Removed(RemovedLevels),
  /// The cited identifier is not in the catalog. Nothing changed.
  NotFound,
}

/// Clear `detected` and `verified` on the observation behind the cited
/// measured event.
pub(crate) fn retract(
  tx: &Transaction<'_>,
  cited: &str,
) -> Result<RetractOutcome> {
  let obs_id: Option<i64> = tx
    .query_row(
      "SELECT o.id
       FROM observations o
       JOIN radio_observations_params rop ON rop.obs_id = o.id
       JOIN radio_measured_params rmp ON rmp.rop_id = rop.id
       WHERE rmp.voevent_ivorn = ?1",
      params![cited],
      |r| r.get(0),
    )
    .optional()?;

  let Some(obs_id) = obs_id else {
    return Ok(RetractOutcome::NotFound);
  };

  tx.execute(
    "UPDATE observations SET detected = 0, verified = 0 WHERE id = ?1",
    params![obs_id],
  )?;
  Ok(RetractOutcome::Cleared { obs_id })
}

/// Delete the cited measured event and every ancestor it leaves childless.
/// Authors and publications are never deleted; only the link rows tying
/// them to the removed event go.
pub(crate) fn remove(
  tx: &Transaction<'_>,
  cited: &str,
) -> Result<RemoveOutcome> {
  let row: Option<(i64, i64)> = tx
    .query_row(
      "SELECT id, rop_id FROM radio_measured_params
       WHERE voevent_ivorn = ?1",
      params![cited],
      |r| Ok((r.get(0)?, r.get(1)?)),
    )
    .optional()?;

  let Some((rmp_id, rop_id)) = row else {
    return Ok(RemoveOutcome::NotFound);
  };

  let mut removed = RemovedLevels::default();
  remove_measured_event(tx, rmp_id)?;
  removed.measured_event = true;

  if !has_children(
    tx,
    "radio_measured_params",
    "rop_id",
    rop_id,
  )? {
    let obs_id: i64 = tx.query_row(
      "SELECT obs_id FROM radio_observations_params WHERE id = ?1",
      params![rop_id],
      |r| r.get(0),
    )?;
    tx.execute(
      "DELETE FROM radio_observations_params_notes WHERE rop_id = ?1",
      params![rop_id],
    )?;
    tx.execute(
      "DELETE FROM radio_observations_params_have_publications
       WHERE rop_id = ?1",
      params![rop_id],
    )?;
    tx.execute(
      "DELETE FROM radio_observations_params WHERE id = ?1",
      params![rop_id],
    )?;
    removed.observation_params = true;

    if !has_children(tx, "radio_observations_params", "obs_id", obs_id)? {
      let frb_id: i64 = tx.query_row(
        "SELECT frb_id FROM observations WHERE id = ?1",
        params![obs_id],
        |r| r.get(0),
      )?;
      tx.execute(
        "DELETE FROM observations_notes WHERE obs_id = ?1",
        params![obs_id],
      )?;
      tx.execute(
        "DELETE FROM observations_have_publications WHERE obs_id = ?1",
        params![obs_id],
      )?;
      tx.execute("DELETE FROM observations WHERE id = ?1", params![obs_id])?;
      removed.observation = true;

      if !has_children(tx, "observations", "frb_id", frb_id)? {
        tx.execute(
          "DELETE FROM frbs_notes WHERE frb_id = ?1",
          params![frb_id],
        )?;
        tx.execute(
          "DELETE FROM frbs_have_publications WHERE frb_id = ?1",
          params![frb_id],
        )?;
        tx.execute("DELETE FROM frbs WHERE id = ?1", params![frb_id])?;
        removed.frb = true;
      }
    }
  }

  Ok(RemoveOutcome::Removed(removed))
}

fn has_children(
  tx: &Transaction<'_>,
  table: &str,
  fk: &str,
  parent_id: i64,
) -> Result<bool> {
  let count: i64 = tx.query_row(
    &format!("SELECT COUNT(*) FROM {table} WHERE {fk} = ?1"),
    params![parent_id],
    |r| r.get(0),
  )?;
  Ok(count > 0)
}

fn remove_measured_event(tx: &Transaction<'_>, rmp_id: i64) -> Result<()> {
  tx.execute(
    "DELETE FROM radio_measured_params_notes WHERE rmp_id = ?1",
    params![rmp_id],
  )?;
  tx.execute(
    "DELETE FROM radio_measured_params_have_publications WHERE rmp_id = ?1",
    params![rmp_id],
  )?;

  // Images belong to a single event; once the link set is gone any image
  // no longer referenced goes with it.
  let image_ids: Vec<i64> = tx
    .prepare(
      "SELECT radio_image_id FROM radio_images_have_radio_measured_params
       WHERE rmp_id = ?1",
    )?
    .query_map(params![rmp_id], |r| r.get(0))?
    .collect::<std::result::Result<_, _>>()?;
  tx.execute(
    "DELETE FROM radio_images_have_radio_measured_params WHERE rmp_id = ?1",
    params![rmp_id],
  )?;
  for image_id in image_ids {
    tx.execute(
      "DELETE FROM radio_images
       WHERE id = ?1 AND NOT EXISTS (
         SELECT 1 FROM radio_images_have_radio_measured_params
         WHERE radio_image_id = ?1
       )",
      params![image_id],
    )?;
  }

  tx.execute(
    "DELETE FROM radio_measured_params WHERE id = ?1",
    params![rmp_id],
  )?;
  Ok(())
}
