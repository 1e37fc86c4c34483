//! Multi-state business registry lookup.
//!
//! Queries the public business registries of several U.S. states with one
//! search term and produces a single keyed JSON report.
//!
//! ## Layers
//!
//! - `infrastructure` / `browser`: page driver and browser session lifecycle,
//!   no domain knowledge.
//! - `models`: search criteria, the canonical record and its normalization,
//!   per-source results and the dispatch report.
//! - `services`: the disambiguation engine shared by every multi-row source.
//! - `captcha`: the audio challenge solver and its transcription pipeline.
//! - `adapters`: the source contract, the registry and the generic
//!   subprocess adapter.
//! - `sources`: one module per integrated state registry.
//! - `orchestrator`: concurrent dispatch and the application front door.
//!
//! Lower layers never reach up; adapters are the only code that touches a
//! concrete site.
//!
//! ## Runtime prerequisites
//!
//! Some sources shell out to external programs; a missing one surfaces as a
//! `dependency missing` failure for that source only.
//!
//! - Chromium (downloaded or local) for the browser-driven sources.
//! - `ffmpeg` on `PATH` for audio-challenge decoding.
//! - `node` on `PATH` plus the `SearchKS.js` scraper in the scripts
//!   directory (`SCRIPTS_DIR`, default `scripts/`) for Kansas; see
//!   `scripts/README.md` for the script contract.
//! - With the `vosk` feature: libvosk and the `vosk-model-small-en-us-0.15`
//!   model directory (`VOSK_MODEL_DIR`).

pub mod adapters;
pub mod browser;
pub mod captcha;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod sources;
pub mod utils;

pub use adapters::{SourceAdapter, SourceRegistry};
pub use config::Config;
pub use error::{AppError, ErrorKind, Result};
pub use models::{CanonicalRecord, DispatchReport, SearchCriteria, SourceResult};
pub use orchestrator::{dispatch, App};
