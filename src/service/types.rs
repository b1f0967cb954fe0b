use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

/// Politique de chevauchement aux bornes des créneaux.
///
/// `Strict` traite les intervalles comme semi-ouverts : deux quarts qui se
/// touchent (fin de l'un = début de l'autre) ne sont pas en conflit.
/// `Inclusive` compte aussi les bornes qui se touchent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    #[default]
    Strict,
    Inclusive,
}

/// Critères de recherche côté API. `week_id` est traduit en intervalle de
/// dates via le calcul de fenêtre hebdomadaire et prime sur `date`.
#[derive(Debug, Clone, Default)]
pub struct ShiftQuery {
    pub week_id: Option<NaiveDate>,
    pub date: Option<NaiveDate>,
    pub name: Option<String>,
    pub is_published: Option<bool>,
}

#[derive(Error, Debug)]
pub enum ShiftError {
    #[error("shift on {date} from {start_time} until {end_time} already exists / overlapping")]
    Overlapping {
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    },
    #[error("this shift is already published")]
    AlreadyPublished,
    #[error("unknown shift: {0}")]
    NotFound(String),
    #[error("invalid time range: end must be after start")]
    InvalidTimeRange,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}
