mod sqlite;

pub use sqlite::SqliteStore;

use crate::model::{Shift, ShiftId, ShiftPatch};
use chrono::{NaiveDate, NaiveTime};

/// Opérateur de comparaison appliqué à un champ de filtre.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cond<T> {
    Eq(T),
    Ne(T),
    Lt(T),
    Lte(T),
    Gt(T),
    Gte(T),
    /// Bornes incluses.
    Between(T, T),
    In(Vec<T>),
}

/// Filtre structuré sur les quarts. Les champs renseignés sont combinés
/// en conjonction (AND).
#[derive(Debug, Clone, Default)]
pub struct ShiftFilter {
    pub id: Option<Cond<ShiftId>>,
    pub name: Option<Cond<String>>,
    pub date: Option<Cond<NaiveDate>>,
    pub start_time: Option<Cond<NaiveTime>>,
    pub end_time: Option<Cond<NaiveTime>>,
    pub is_published: Option<bool>,
}

/// Pagination optionnelle d'une requête de liste.
#[derive(Debug, Clone, Copy, Default)]
pub struct Page {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Changements partiels côté magasin. Contrairement à [`ShiftPatch`],
/// porte `is_published` : réservé au service pour la publication.
#[derive(Debug, Clone, Default)]
pub struct ShiftChanges {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub is_published: Option<bool>,
}

impl From<ShiftPatch> for ShiftChanges {
    fn from(patch: ShiftPatch) -> Self {
        Self {
            name: patch.name,
            date: patch.date,
            start_time: patch.start_time,
            end_time: patch.end_time,
            is_published: None,
        }
    }
}

impl ShiftChanges {
    /// Publication : ne touche que le drapeau.
    pub fn publish() -> Self {
        Self {
            is_published: Some(true),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.date.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.is_published.is_none()
    }
}

/// Accès persistant aux quarts.
pub trait ShiftStore {
    /// Liste filtrée et paginée ; renvoie aussi le total hors pagination.
    fn find(&self, filter: &ShiftFilter, page: Page) -> anyhow::Result<(Vec<Shift>, u64)>;
    /// Premier quart correspondant au filtre, s'il existe.
    fn find_one(&self, filter: &ShiftFilter) -> anyhow::Result<Option<Shift>>;
    fn find_by_id(&self, id: &ShiftId) -> anyhow::Result<Option<Shift>>;
    fn find_by_ids(&self, ids: &[ShiftId]) -> anyhow::Result<Vec<Shift>>;
    /// Insère un quart déjà construit (l'id vient de l'appelant).
    fn create(&self, shift: &Shift) -> anyhow::Result<Shift>;
    /// Applique `changes` puis relit la ligne ; `None` si l'id est inconnu.
    fn update_by_id(&self, id: &ShiftId, changes: &ShiftChanges)
        -> anyhow::Result<Option<Shift>>;
    /// Mise à jour en masse ; renvoie les lignes correspondant au filtre
    /// après application.
    fn update_by_filter(
        &self,
        filter: &ShiftFilter,
        changes: &ShiftChanges,
    ) -> anyhow::Result<(Vec<Shift>, u64)>;
    /// Supprime les ids donnés ; renvoie le nombre de lignes effacées.
    fn delete_by_ids(&self, ids: &[ShiftId]) -> anyhow::Result<u64>;
}
