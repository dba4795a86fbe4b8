//! `nodedir` - A participant directory with an admin console
//!
//! This library keeps a directory of event participants ("identity nodes")
//! in named key/value slots, filters and renders it, and offers gated
//! administration: manual edits and bulk spreadsheet import with a per-row
//! outcome log.
//!
//! The admin access code is a convenience gate only. It is not a security
//! boundary; see [`admin`].

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod admin;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod logging;
pub mod media;
pub mod model;
pub mod storage;
pub mod store;
pub mod view;

pub use admin::{AccessGate, AdminConsole, ImageInput, ParticipantForm};
pub use config::Config;
pub use error::{Error, Result};
pub use filter::{filter_participants, DirectoryQuery};
pub use ingest::{ColumnMapping, ImportReport, Ingestor, Sheet, TargetField};
pub use logging::init_logging;
pub use media::ImagePolicy;
pub use model::{Country, NewParticipant, Participant, ParticipantPatch};
pub use storage::{KeyValueStore, MemoryBackend, SqliteBackend, StorageStats};
pub use store::{RecordSink, RecordStore, Theme};
