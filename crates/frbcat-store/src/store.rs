//! [`CatalogStore`] — the SQLite-backed FRB catalog.

use std::path::Path;

use rusqlite::{params, OptionalExtension as _};
use tracing::{info, warn};

use frbcat_core::{event::EventType, plan::IngestPlan};

use crate::{
  ingest::{self, IngestedIds},
  retract::{self, RemoveOutcome, RetractOutcome},
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An FRB catalog backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct CatalogStore {
  conn: tokio_rusqlite::Connection,
}

/// What to do with the catalogued data when a retraction arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetractionPolicy {
  /// Keep the rows, clear the observation's `detected`/`verified` flags.
  #[default]
  Flag,
  /// Delete the measured event and every ancestor it leaves childless.
  Remove,
}

/// Result of applying one notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  Ingested(IngestedIds),
  Retracted(RetractOutcome),
  Removed(RemoveOutcome),
}

/// Row counts of the five hierarchy tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableCounts {
  pub authors:                   i64,
  pub frbs:                      i64,
  pub observations:              i64,
  pub radio_observations_params: i64,
  pub radio_measured_params:     i64,
}

/// One catalogued measured event, as read back by its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredEvent {
  pub id:     i64,
  pub rop_id: i64,
  pub dm:     f64,
  pub snr:    f64,
  pub width:  f64,
  pub rank:   Option<i64>,
}

impl CatalogStore {
  /// Open (or create) a catalog at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory catalog — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Apply one notice according to its event type. Retractions dispatch on
  /// `policy`; everything else goes through the hierarchy writer.
  pub async fn apply(
    &self,
    plan: IngestPlan,
    policy: RetractionPolicy,
  ) -> Result<Outcome> {
    match plan.event_type {
      EventType::Retraction => {
        let cited = plan.citation.ok_or(Error::MissingCitation)?;
        match policy {
          RetractionPolicy::Flag => {
            Ok(Outcome::Retracted(self.retract(&cited).await?))
          }
          RetractionPolicy::Remove => {
            Ok(Outcome::Removed(self.remove(&cited).await?))
          }
        }
      }
      _ => Ok(Outcome::Ingested(self.ingest(plan).await?)),
    }
  }

  /// Write one non-retraction notice into the hierarchy, atomically.
  pub async fn ingest(&self, plan: IngestPlan) -> Result<IngestedIds> {
    let event_type = plan.event_type;
    let ids = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let ids = ingest::apply_plan(&tx, &plan).map_err(Error::into_call)?;
        tx.commit()?;
        Ok(ids)
      })
      .await
      .map_err(Error::from_call)?;
    info!(?event_type, rmp_id = ids.rmp_id, "notice catalogued");
    Ok(ids)
  }

  /// Clear the observation flags behind `cited`. Unknown identifiers are a
  /// no-op: the event may have been removed already.
  pub async fn retract(&self, cited: &str) -> Result<RetractOutcome> {
    let cited_owned = cited.to_owned();
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let outcome =
          retract::retract(&tx, &cited_owned).map_err(Error::into_call)?;
        tx.commit()?;
        Ok(outcome)
      })
      .await
      .map_err(Error::from_call)?;
    match outcome {
      RetractOutcome::Cleared { obs_id } => {
        info!(cited, obs_id, "event retracted");
      }
      RetractOutcome::NotFound => {
        warn!(cited, "retraction cites an unknown event; nothing to do");
      }
    }
    Ok(outcome)
  }

  /// Cascade-remove the measured event behind `cited`.
  pub async fn remove(&self, cited: &str) -> Result<RemoveOutcome> {
    let cited_owned = cited.to_owned();
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let outcome =
          retract::remove(&tx, &cited_owned).map_err(Error::into_call)?;
        tx.commit()?;
        Ok(outcome)
      })
      .await
      .map_err(Error::from_call)?;
    match outcome {
      RemoveOutcome::Removed(levels) => {
        info!(cited, ?levels, "event removed");
      }
      RemoveOutcome::NotFound => {
        warn!(cited, "removal cites an unknown event; nothing to do");
      }
    }
    Ok(outcome)
  }

  /// Row counts across the hierarchy.
  pub async fn counts(&self) -> Result<TableCounts> {
    let counts = self
      .conn
      .call(|conn| {
        let count = |table: &str| -> rusqlite::Result<i64> {
          conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| {
            r.get(0)
          })
        };
        Ok(TableCounts {
          authors:                   count("authors")?,
          frbs:                      count("frbs")?,
          observations:              count("observations")?,
          radio_observations_params: count("radio_observations_params")?,
          radio_measured_params:     count("radio_measured_params")?,
        })
      })
      .await?;
    Ok(counts)
  }

  /// Read back one measured event by its identifier.
  pub async fn measured_event(
    &self,
    ivorn: &str,
  ) -> Result<Option<MeasuredEvent>> {
    let ivorn = ivorn.to_owned();
    let event = self
      .conn
      .call(move |conn| {
        let event = conn
          .query_row(
            "SELECT id, rop_id, dm, snr, width, rank
             FROM radio_measured_params WHERE voevent_ivorn = ?1",
            params![ivorn],
            |r| {
              Ok(MeasuredEvent {
                id:     r.get(0)?,
                rop_id: r.get(1)?,
                dm:     r.get(2)?,
                snr:    r.get(3)?,
                width:  r.get(4)?,
                rank:   r.get(5)?,
              })
            },
          )
          .optional()?;
        Ok(event)
      })
      .await?;
    Ok(event)
  }

  /// `(detected, verified)` of the observation behind a measured event.
  pub async fn observation_flags(
    &self,
    ivorn: &str,
  ) -> Result<Option<(bool, bool)>> {
    let ivorn = ivorn.to_owned();
    let flags = self
      .conn
      .call(move |conn| {
        let flags = conn
          .query_row(
            "SELECT o.detected, o.verified
             FROM observations o
             JOIN radio_observations_params rop ON rop.obs_id = o.id
             JOIN radio_measured_params rmp ON rmp.rop_id = rop.id
             WHERE rmp.voevent_ivorn = ?1",
            params![ivorn],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;
        Ok(flags)
      })
      .await?;
    Ok(flags)
  }

  /// Observation-settings notes attached to a measured event's pointing.
  pub async fn event_notes(&self, ivorn: &str) -> Result<Vec<String>> {
    let ivorn = ivorn.to_owned();
    let notes = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT n.note
           FROM radio_observations_params_notes n
           JOIN radio_measured_params rmp ON rmp.rop_id = n.rop_id
           WHERE rmp.voevent_ivorn = ?1
           ORDER BY n.id",
        )?;
        let notes = stmt
          .query_map(params![ivorn], |r| r.get(0))?
          .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(notes)
      })
      .await?;
    Ok(notes)
  }
}
