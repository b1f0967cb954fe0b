use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Fenêtre hebdomadaire, bornes incluses (`[first_day, last_day]`, 7 jours).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRange {
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
}

impl WeekRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first_day <= date && date <= self.last_day
    }
}

/// Calcule la fenêtre hebdomadaire ancrée au lundi pour `date`.
///
/// La date est d'abord décalée d'un jour, puis ramenée au lundi de la
/// semaine (débutant dimanche) de la date décalée. Conséquence assumée :
/// un samedi ou un dimanche bascule dans la fenêtre de la semaine
/// suivante, qui ne le contient pas.
pub fn week_range_for(date: NaiveDate) -> WeekRange {
    let shifted = date + Duration::days(1);
    let to_monday = 1 - i64::from(shifted.weekday().num_days_from_sunday());
    let first_day = shifted + Duration::days(to_monday);
    WeekRange {
        first_day,
        last_day: first_day + Duration::days(6),
    }
}
