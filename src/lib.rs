#![forbid(unsafe_code)]
//! Quart — gestion de plannings de quarts sur SQLite, exposée en HTTP.
//!
//! - Magasin SQLite (rusqlite, bundled), filtres structurés.
//! - Détection de chevauchements, politique de bornes configurable.
//! - Publication par semaine (lundi → dimanche), irréversible.
//! - API JSON minimaliste ; import/export CSV.

pub mod api;
pub mod io;
pub mod model;
pub mod service;
pub mod store;
pub mod week;

pub use model::{Shift, ShiftDraft, ShiftId, ShiftPatch};
pub use service::{overlaps, OverlapPolicy, ShiftError, ShiftQuery, ShiftService};
pub use store::{Cond, Page, ShiftChanges, ShiftFilter, ShiftStore, SqliteStore};
pub use week::{week_range_for, WeekRange};
