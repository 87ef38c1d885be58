//! SQL schema for the FRB catalog store.
//!
//! Executed once at connection startup. The five hierarchy tables carry a
//! generated integer id plus a UNIQUE constraint over their natural key,
//! which is what lets the writer use `ON CONFLICT DO NOTHING` as its
//! insert-or-resolve primitive.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS authors (
    id            INTEGER PRIMARY KEY,
    ivorn         TEXT NOT NULL UNIQUE,
    title         TEXT,
    short_name    TEXT,
    logo_url      TEXT,
    contact_name  TEXT,
    contact_email TEXT,
    contact_phone TEXT,
    other_information TEXT
);

-- Curated literature references; populated by curators, never by
-- notice ingestion. Removal only ever deletes the link rows.
CREATE TABLE IF NOT EXISTS publications (
    id        INTEGER PRIMARY KEY,
    type      TEXT,
    reference TEXT NOT NULL,
    link      TEXT
);

CREATE TABLE IF NOT EXISTS frbs (
    id        INTEGER PRIMARY KEY,
    author_id INTEGER NOT NULL REFERENCES authors(id),
    name      TEXT NOT NULL UNIQUE,
    utc       TEXT NOT NULL,
    private   INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS frbs_have_publications (
    frb_id INTEGER NOT NULL REFERENCES frbs(id),
    pub_id INTEGER NOT NULL REFERENCES publications(id),
    PRIMARY KEY (frb_id, pub_id)
);

CREATE TABLE IF NOT EXISTS frbs_notes (
    id            INTEGER PRIMARY KEY,
    frb_id        INTEGER NOT NULL REFERENCES frbs(id),
    last_modified TEXT,
    author        TEXT,
    note          TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS observations (
    id        INTEGER PRIMARY KEY,
    frb_id    INTEGER NOT NULL REFERENCES frbs(id),
    author_id INTEGER NOT NULL REFERENCES authors(id),
    type      TEXT,
    telescope TEXT NOT NULL,
    utc       TEXT,
    data_link TEXT,
    detected  INTEGER NOT NULL DEFAULT 1,
    verified  INTEGER NOT NULL DEFAULT 0,
    UNIQUE (frb_id, telescope, utc)
);

CREATE TABLE IF NOT EXISTS observations_have_publications (
    obs_id INTEGER NOT NULL REFERENCES observations(id),
    pub_id INTEGER NOT NULL REFERENCES publications(id),
    PRIMARY KEY (obs_id, pub_id)
);

CREATE TABLE IF NOT EXISTS observations_notes (
    id            INTEGER PRIMARY KEY,
    obs_id        INTEGER NOT NULL REFERENCES observations(id),
    last_modified TEXT,
    author        TEXT,
    note          TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS radio_observations_params (
    id                   INTEGER PRIMARY KEY,
    obs_id               INTEGER NOT NULL REFERENCES observations(id),
    author_id            INTEGER NOT NULL REFERENCES authors(id),
    settings_id          TEXT NOT NULL,
    raj                  TEXT NOT NULL,
    decj                 TEXT NOT NULL,
    gl                   REAL,
    gb                   REAL,
    receiver             TEXT,
    backend              TEXT,
    beam                 TEXT,
    beam_semi_major_axis REAL,
    beam_semi_minor_axis REAL,
    beam_rotation_angle  REAL,
    pointing_error       REAL,
    sampling_time        REAL,
    bandwidth            REAL,
    centre_frequency     REAL,
    channel_bandwidth    REAL,
    npol                 INTEGER,
    bits_per_sample      INTEGER,
    gain                 REAL,
    tsys                 REAL,
    mw_dm_limit          REAL,
    UNIQUE (obs_id, settings_id)
);

CREATE TABLE IF NOT EXISTS radio_observations_params_have_publications (
    rop_id INTEGER NOT NULL REFERENCES radio_observations_params(id),
    pub_id INTEGER NOT NULL REFERENCES publications(id),
    PRIMARY KEY (rop_id, pub_id)
);

CREATE TABLE IF NOT EXISTS radio_observations_params_notes (
    id            INTEGER PRIMARY KEY,
    rop_id        INTEGER NOT NULL REFERENCES radio_observations_params(id),
    last_modified TEXT,
    author        TEXT,
    note          TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS radio_measured_params (
    id                       INTEGER PRIMARY KEY,
    rop_id                   INTEGER NOT NULL
                             REFERENCES radio_observations_params(id),
    author_id                INTEGER NOT NULL REFERENCES authors(id),
    voevent_ivorn            TEXT NOT NULL UNIQUE,
    voevent_xml              TEXT NOT NULL,
    dm                       REAL NOT NULL,
    dm_error                 REAL,
    snr                      REAL NOT NULL,
    width                    REAL NOT NULL,
    width_error_upper        REAL,
    width_error_lower        REAL,
    flux                     REAL,
    flux_prefix              TEXT,
    flux_error_upper         REAL,
    flux_error_lower         REAL,
    flux_calibrated          INTEGER,
    dm_index                 REAL,
    dm_index_error           REAL,
    scattering_index         REAL,
    scattering_index_error   REAL,
    scattering_time          REAL,
    scattering_time_error    REAL,
    scattering               REAL,
    dispersion_smearing      REAL,
    linear_poln_frac         REAL,
    linear_poln_frac_error   REAL,
    circular_poln_frac       REAL,
    circular_poln_frac_error REAL,
    spectral_index           REAL,
    spectral_index_error     REAL,
    z_phot                   REAL,
    z_phot_error             REAL,
    z_spec                   REAL,
    z_spec_error             REAL,
    redshift_inferred        REAL,
    redshift_host            REAL,
    rank                     INTEGER
);

CREATE TABLE IF NOT EXISTS radio_measured_params_notes (
    id            INTEGER PRIMARY KEY,
    rmp_id        INTEGER NOT NULL REFERENCES radio_measured_params(id),
    last_modified TEXT,
    author        TEXT,
    note          TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS radio_measured_params_have_publications (
    rmp_id INTEGER NOT NULL REFERENCES radio_measured_params(id),
    pub_id INTEGER NOT NULL REFERENCES publications(id),
    PRIMARY KEY (rmp_id, pub_id)
);

CREATE TABLE IF NOT EXISTS radio_images (
    id      INTEGER PRIMARY KEY,
    title   TEXT,
    caption TEXT,
    image   BLOB
);

CREATE TABLE IF NOT EXISTS radio_images_have_radio_measured_params (
    radio_image_id INTEGER NOT NULL REFERENCES radio_images(id),
    rmp_id         INTEGER NOT NULL REFERENCES radio_measured_params(id),
    PRIMARY KEY (radio_image_id, rmp_id)
);

CREATE INDEX IF NOT EXISTS observations_frb_idx ON observations(frb_id);
CREATE INDEX IF NOT EXISTS rop_obs_idx
    ON radio_observations_params(obs_id);
CREATE INDEX IF NOT EXISTS rmp_rop_idx ON radio_measured_params(rop_id);

PRAGMA user_version = 1;
";
