mod overlap;
mod types;

pub use overlap::overlaps;
pub use types::{OverlapPolicy, ShiftError, ShiftQuery};

use crate::model::{Shift, ShiftDraft, ShiftId, ShiftPatch};
use crate::store::{Cond, Page, ShiftChanges, ShiftFilter, ShiftStore};
use crate::week::{week_range_for, WeekRange};
use chrono::{NaiveDate, NaiveTime};
use tracing::info;

/// Service des quarts : orchestre validation, fenêtres hebdomadaires et
/// accès magasin. Le magasin est injecté à la construction.
pub struct ShiftService<S: ShiftStore> {
    store: S,
    policy: OverlapPolicy,
}

impl<S: ShiftStore> ShiftService<S> {
    pub fn new(store: S) -> Self {
        Self::with_policy(store, OverlapPolicy::default())
    }

    pub fn with_policy(store: S, policy: OverlapPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Liste filtrée ; `week_id` devient un intervalle de dates.
    pub fn find(&self, query: &ShiftQuery, page: Page) -> Result<(Vec<Shift>, u64), ShiftError> {
        info!("find shifts");
        Ok(self.store.find(&query_filter(query), page)?)
    }

    pub fn find_one(&self, filter: &ShiftFilter) -> Result<Option<Shift>, ShiftError> {
        Ok(self.store.find_one(filter)?)
    }

    pub fn find_by_id(&self, id: &ShiftId) -> Result<Shift, ShiftError> {
        info!(id = id.as_str(), "find shift by id");
        self.store
            .find_by_id(id)?
            .ok_or_else(|| ShiftError::NotFound(id.as_str().to_string()))
    }

    pub fn find_by_ids(&self, ids: &[ShiftId]) -> Result<Vec<Shift>, ShiftError> {
        Ok(self.store.find_by_ids(ids)?)
    }

    /// Quarts persistés en conflit avec le candidat, selon la politique.
    pub fn find_overlapping(
        &self,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        exclude: Option<&ShiftId>,
    ) -> Result<Vec<Shift>, ShiftError> {
        let filter = overlap::overlap_filter(self.policy, date, start, end, exclude);
        let (shifts, _) = self.store.find(&filter, Page::default())?;
        Ok(shifts)
    }

    pub fn has_overlap(
        &self,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        exclude: Option<&ShiftId>,
    ) -> Result<bool, ShiftError> {
        Ok(!self.find_overlapping(date, start, end, exclude)?.is_empty())
    }

    /// Crée un quart non publié. Refuse les semaines déjà publiées et les
    /// chevauchements ; aucune écriture n'a lieu avant que tout passe.
    pub fn create(&self, draft: ShiftDraft) -> Result<Shift, ShiftError> {
        info!(name = %draft.name, date = %draft.date, "create shift");
        let shift = Shift::new(draft.name, draft.date, draft.start_time, draft.end_time)
            .map_err(|_| ShiftError::InvalidTimeRange)?;
        if self.is_week_published(shift.date)? {
            return Err(ShiftError::AlreadyPublished);
        }
        self.reject_overlap(shift.date, shift.start_time, shift.end_time, None)?;
        Ok(self.store.create(&shift)?)
    }

    /// Mise à jour partielle. Le quart effectif (patch appliqué sur
    /// l'existant) repasse toutes les validations, l'id cible exclu de la
    /// recherche de conflit.
    pub fn update_by_id(&self, id: &ShiftId, patch: ShiftPatch) -> Result<Shift, ShiftError> {
        info!(id = id.as_str(), "update shift by id");
        let current = self
            .store
            .find_by_id(id)?
            .ok_or_else(|| ShiftError::NotFound(id.as_str().to_string()))?;
        if current.is_published {
            return Err(ShiftError::AlreadyPublished);
        }

        let date = patch.date.unwrap_or(current.date);
        let start = patch.start_time.unwrap_or(current.start_time);
        let end = patch.end_time.unwrap_or(current.end_time);
        if end <= start {
            return Err(ShiftError::InvalidTimeRange);
        }
        if self.is_week_published(date)? {
            return Err(ShiftError::AlreadyPublished);
        }
        self.reject_overlap(date, start, end, Some(id))?;

        self.store
            .update_by_id(id, &ShiftChanges::from(patch))?
            .ok_or_else(|| ShiftError::NotFound(id.as_str().to_string()))
    }

    /// Supprime un quart non publié.
    pub fn delete_by_id(&self, id: &ShiftId) -> Result<u64, ShiftError> {
        info!(id = id.as_str(), "delete shift by id");
        let shift = self
            .store
            .find_by_id(id)?
            .ok_or_else(|| ShiftError::NotFound(id.as_str().to_string()))?;
        if shift.is_published {
            return Err(ShiftError::AlreadyPublished);
        }
        Ok(self.store.delete_by_ids(std::slice::from_ref(id))?)
    }

    /// Suppression en lot ; refusée en bloc si un seul quart est publié.
    pub fn delete_by_ids(&self, ids: &[ShiftId]) -> Result<u64, ShiftError> {
        info!(count = ids.len(), "delete shifts by ids");
        let shifts = self.store.find_by_ids(ids)?;
        if shifts.iter().any(|s| s.is_published) {
            return Err(ShiftError::AlreadyPublished);
        }
        Ok(self.store.delete_by_ids(ids)?)
    }

    /// Publie d'un bloc tous les quarts de la semaine de `week_id`.
    /// Refuse si la fenêtre contient déjà un quart publié : pas de
    /// republication, pas de publication partielle.
    pub fn publish_week(&self, week_id: NaiveDate) -> Result<Vec<Shift>, ShiftError> {
        info!(%week_id, "publish shifts by week");
        let window = week_range_for(week_id);
        if self.window_published(window)? {
            return Err(ShiftError::AlreadyPublished);
        }
        let filter = ShiftFilter {
            date: Some(Cond::Between(window.first_day, window.last_day)),
            ..ShiftFilter::default()
        };
        let (shifts, _) = self.store.update_by_filter(&filter, &ShiftChanges::publish())?;
        Ok(shifts)
    }

    /// Vrai si la semaine contenant `date` a déjà été publiée.
    pub fn is_week_published(&self, date: NaiveDate) -> Result<bool, ShiftError> {
        self.window_published(week_range_for(date))
    }

    fn window_published(&self, window: WeekRange) -> Result<bool, ShiftError> {
        let filter = ShiftFilter {
            date: Some(Cond::Between(window.first_day, window.last_day)),
            is_published: Some(true),
            ..ShiftFilter::default()
        };
        Ok(self.store.find_one(&filter)?.is_some())
    }

    fn reject_overlap(
        &self,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        exclude: Option<&ShiftId>,
    ) -> Result<(), ShiftError> {
        if let Some(conflict) = self.find_overlapping(date, start, end, exclude)?.first() {
            return Err(ShiftError::Overlapping {
                date: conflict.date,
                start_time: conflict.start_time,
                end_time: conflict.end_time,
            });
        }
        Ok(())
    }
}

fn query_filter(query: &ShiftQuery) -> ShiftFilter {
    let date = match (query.week_id, query.date) {
        (Some(week), _) => {
            let window = week_range_for(week);
            Some(Cond::Between(window.first_day, window.last_day))
        }
        (None, Some(date)) => Some(Cond::Eq(date)),
        (None, None) => None,
    };
    ShiftFilter {
        name: query.name.clone().map(Cond::Eq),
        date,
        is_published: query.is_published,
        ..ShiftFilter::default()
    }
}
