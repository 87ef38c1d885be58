//! `frbcat` — command-line front end for the FRB catalog.
//!
//! Reads `frbcat.toml` (or the path specified with `--config`), opens the
//! SQLite catalog, and applies VOEvent packets to it.
//!
//! ```
//! frbcat ingest packet.xml
//! frbcat retract 'ivo://au.csiro.parkes/frb#FRB140514'
//! frbcat counts
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

use frbcat_core::{mapping::Mapping, plan::build_plan};
use frbcat_store::{CatalogStore, Outcome, RetractionPolicy};
use frbcat_voevent::VoEvent;

#[derive(Parser)]
#[command(author, version, about = "FRB transient-notice catalog")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "frbcat.toml")]
  config: PathBuf,

  /// Catalog database path; overrides the config file.
  #[arg(long)]
  db: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Decode a VOEvent packet and apply it to the catalog.
  Ingest {
    /// Path to the VOEvent XML file.
    file: PathBuf,

    /// JSON column mapping to use instead of the built-in one.
    #[arg(long)]
    mapping: Option<PathBuf>,

    /// What to do with catalogued data when the packet is a retraction.
    #[arg(long, value_enum, default_value_t = PolicyArg::Flag)]
    on_retraction: PolicyArg,
  },

  /// Clear the observation flags behind a catalogued event.
  Retract {
    /// The `voevent_ivorn` of the event to retract.
    ivorn: String,
  },

  /// Delete an event and every ancestor it leaves childless.
  Remove {
    /// The `voevent_ivorn` of the event to remove.
    ivorn: String,
  },

  /// Print row counts for the hierarchy tables.
  Counts,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
  Flag,
  Remove,
}

impl From<PolicyArg> for RetractionPolicy {
  fn from(arg: PolicyArg) -> Self {
    match arg {
      PolicyArg::Flag => Self::Flag,
      PolicyArg::Remove => Self::Remove,
    }
  }
}

/// Shape of `frbcat.toml`.
#[derive(Debug, Deserialize)]
struct Settings {
  #[serde(default = "default_db_path")]
  db_path: PathBuf,
}

fn default_db_path() -> PathBuf {
  PathBuf::from("frbcat.db")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("FRBCAT"))
    .build()
    .context("failed to read config file")?;
  let settings: Settings = settings
    .try_deserialize()
    .context("failed to deserialise settings")?;

  let db_path =
    expand_tilde(cli.db.as_deref().unwrap_or(&settings.db_path));
  let store = CatalogStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open catalog at {db_path:?}"))?;

  match cli.command {
    Command::Ingest { file, mapping, on_retraction } => {
      ingest(&store, &file, mapping.as_deref(), on_retraction.into()).await?;
    }
    Command::Retract { ivorn } => {
      store.retract(&ivorn).await?;
    }
    Command::Remove { ivorn } => {
      store.remove(&ivorn).await?;
    }
    Command::Counts => {
      let counts = store.counts().await?;
      println!("authors                    {}", counts.authors);
      println!("frbs                       {}", counts.frbs);
      println!("observations               {}", counts.observations);
      println!(
        "radio_observations_params  {}",
        counts.radio_observations_params
      );
      println!(
        "radio_measured_params      {}",
        counts.radio_measured_params
      );
    }
  }

  Ok(())
}

async fn ingest(
  store: &CatalogStore,
  file: &Path,
  mapping_path: Option<&Path>,
  policy: RetractionPolicy,
) -> anyhow::Result<()> {
  let xml = std::fs::read_to_string(file)
    .with_context(|| format!("reading packet {}", file.display()))?;
  let packet = VoEvent::parse(&xml)
    .with_context(|| format!("decoding packet {}", file.display()))?;

  let mapping = load_mapping(mapping_path)?;
  let plan = build_plan(&packet, &mapping).context("building ingest plan")?;

  match store.apply(plan, policy).await {
    Ok(Outcome::Ingested(ids)) => {
      info!(rmp_id = ids.rmp_id, "packet catalogued");
    }
    Ok(Outcome::Retracted(_) | Outcome::Removed(_)) => {}
    // Redelivered packets are routine on a broker feed, not a failure.
    Err(e) if e.is_duplicate() => {
      info!("already catalogued: {e}");
    }
    Err(e) => return Err(e.into()),
  }
  Ok(())
}

fn load_mapping(path: Option<&Path>) -> anyhow::Result<Mapping> {
  let Some(path) = path else {
    return Ok(Mapping::builtin());
  };
  let raw = std::fs::read_to_string(path)
    .with_context(|| format!("reading mapping {}", path.display()))?;
  Mapping::from_json(&raw)
    .with_context(|| format!("parsing mapping {}", path.display()))
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
