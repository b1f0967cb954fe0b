use super::OverlapPolicy;
use crate::model::ShiftId;
use crate::store::{Cond, ShiftFilter};
use chrono::{NaiveDate, NaiveTime};

/// Vrai si deux créneaux d'une même date se chevauchent selon la politique.
pub fn overlaps(
    policy: OverlapPolicy,
    a_start: NaiveTime,
    a_end: NaiveTime,
    b_start: NaiveTime,
    b_end: NaiveTime,
) -> bool {
    match policy {
        OverlapPolicy::Strict => a_start < b_end && b_start < a_end,
        OverlapPolicy::Inclusive => a_start <= b_end && b_start <= a_end,
    }
}

/// Filtre magasin sélectionnant les quarts en conflit avec le candidat
/// `[start, end)` du jour `date`, en excluant éventuellement un id (cas de
/// la mise à jour d'un quart existant).
pub(super) fn overlap_filter(
    policy: OverlapPolicy,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    exclude: Option<&ShiftId>,
) -> ShiftFilter {
    let (start_cond, end_cond) = match policy {
        OverlapPolicy::Strict => (Cond::Lt(end), Cond::Gt(start)),
        OverlapPolicy::Inclusive => (Cond::Lte(end), Cond::Gte(start)),
    };
    ShiftFilter {
        id: exclude.map(|id| Cond::Ne(id.clone())),
        date: Some(Cond::Eq(date)),
        start_time: Some(start_cond),
        end_time: Some(end_cond),
        ..ShiftFilter::default()
    }
}
