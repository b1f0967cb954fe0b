use super::{Cond, Page, ShiftChanges, ShiftFilter, ShiftStore};
use crate::model::{Shift, ShiftId};
use anyhow::Context;
use chrono::{NaiveDate, NaiveTime};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS shifts (
    id           TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    date         TEXT NOT NULL,
    start_time   TEXT NOT NULL,
    end_time     TEXT NOT NULL,
    is_published INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_shifts_date ON shifts(date);
";

/// Magasin SQLite (fichier unique ou mémoire). Les dates et heures sont
/// stockées en texte ISO : l'ordre lexicographique vaut l'ordre temporel.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Ouvre (et initialise si besoin) la base au chemin donné.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("opening {}", path.as_ref().display()))?;
        Self::init(conn)
    }

    /// Base en mémoire, surtout utile aux tests.
    pub fn open_in_memory() -> anyhow::Result<Self> {
        Self::init(Connection::open_in_memory().context("opening in-memory db")?)
    }

    fn init(conn: Connection) -> anyhow::Result<Self> {
        conn.execute_batch(SCHEMA).context("creating schema")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("store mutex poisoned"))
    }
}

fn date_text(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

fn time_text(t: NaiveTime) -> String {
    t.format("%H:%M:%S").to_string()
}

fn row_to_shift(row: &Row<'_>) -> rusqlite::Result<Shift> {
    let parse_err = |idx: usize, e: chrono::ParseError| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    };
    let date: String = row.get(2)?;
    let start: String = row.get(3)?;
    let end: String = row.get(4)?;
    Ok(Shift {
        id: ShiftId::new(row.get::<_, String>(0)?),
        name: row.get(1)?,
        date: NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| parse_err(2, e))?,
        start_time: NaiveTime::parse_from_str(&start, "%H:%M:%S").map_err(|e| parse_err(3, e))?,
        end_time: NaiveTime::parse_from_str(&end, "%H:%M:%S").map_err(|e| parse_err(4, e))?,
        is_published: row.get::<_, i64>(5)? != 0,
    })
}

fn push_cond<T>(
    column: &str,
    cond: &Cond<T>,
    clauses: &mut Vec<String>,
    params: &mut Vec<Value>,
    to_value: impl Fn(&T) -> Value,
) {
    match cond {
        Cond::Eq(v) => {
            clauses.push(format!("{column} = ?"));
            params.push(to_value(v));
        }
        Cond::Ne(v) => {
            clauses.push(format!("{column} <> ?"));
            params.push(to_value(v));
        }
        Cond::Lt(v) => {
            clauses.push(format!("{column} < ?"));
            params.push(to_value(v));
        }
        Cond::Lte(v) => {
            clauses.push(format!("{column} <= ?"));
            params.push(to_value(v));
        }
        Cond::Gt(v) => {
            clauses.push(format!("{column} > ?"));
            params.push(to_value(v));
        }
        Cond::Gte(v) => {
            clauses.push(format!("{column} >= ?"));
            params.push(to_value(v));
        }
        Cond::Between(lo, hi) => {
            clauses.push(format!("{column} BETWEEN ? AND ?"));
            params.push(to_value(lo));
            params.push(to_value(hi));
        }
        Cond::In(values) => {
            if values.is_empty() {
                clauses.push("1 = 0".to_string());
                return;
            }
            let marks = vec!["?"; values.len()].join(", ");
            clauses.push(format!("{column} IN ({marks})"));
            params.extend(values.iter().map(to_value));
        }
    }
}

/// Traduit le filtre en clause WHERE + paramètres positionnels.
fn where_clause(filter: &ShiftFilter) -> (String, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut params = Vec::new();

    if let Some(cond) = &filter.id {
        push_cond("id", cond, &mut clauses, &mut params, |id| {
            Value::Text(id.as_str().to_string())
        });
    }
    if let Some(cond) = &filter.name {
        push_cond("name", cond, &mut clauses, &mut params, |n| {
            Value::Text(n.clone())
        });
    }
    if let Some(cond) = &filter.date {
        push_cond("date", cond, &mut clauses, &mut params, |d| {
            Value::Text(date_text(*d))
        });
    }
    if let Some(cond) = &filter.start_time {
        push_cond("start_time", cond, &mut clauses, &mut params, |t| {
            Value::Text(time_text(*t))
        });
    }
    if let Some(cond) = &filter.end_time {
        push_cond("end_time", cond, &mut clauses, &mut params, |t| {
            Value::Text(time_text(*t))
        });
    }
    if let Some(published) = filter.is_published {
        clauses.push("is_published = ?".to_string());
        params.push(Value::Integer(i64::from(published)));
    }

    if clauses.is_empty() {
        (String::new(), params)
    } else {
        (format!(" WHERE {}", clauses.join(" AND ")), params)
    }
}

fn set_clause(changes: &ShiftChanges) -> (String, Vec<Value>) {
    let mut sets = Vec::new();
    let mut params = Vec::new();
    if let Some(name) = &changes.name {
        sets.push("name = ?");
        params.push(Value::Text(name.clone()));
    }
    if let Some(date) = changes.date {
        sets.push("date = ?");
        params.push(Value::Text(date_text(date)));
    }
    if let Some(start) = changes.start_time {
        sets.push("start_time = ?");
        params.push(Value::Text(time_text(start)));
    }
    if let Some(end) = changes.end_time {
        sets.push("end_time = ?");
        params.push(Value::Text(time_text(end)));
    }
    if let Some(published) = changes.is_published {
        sets.push("is_published = ?");
        params.push(Value::Integer(i64::from(published)));
    }
    (sets.join(", "), params)
}

const SELECT: &str = "SELECT id, name, date, start_time, end_time, is_published FROM shifts";

impl ShiftStore for SqliteStore {
    fn find(&self, filter: &ShiftFilter, page: Page) -> anyhow::Result<(Vec<Shift>, u64)> {
        debug!("find shifts");
        let conn = self.lock()?;
        let (where_sql, params) = where_clause(filter);

        let total: u64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM shifts{where_sql}"),
                params_from_iter(params.iter().cloned()),
                |row| row.get(0),
            )
            .context("counting shifts")?;

        let mut sql = format!("{SELECT}{where_sql} ORDER BY date, start_time, id");
        match (page.limit, page.offset) {
            (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
            (None, None) => {}
        }

        let mut stmt = conn.prepare(&sql).context("preparing find")?;
        let rows = stmt
            .query_map(params_from_iter(params.into_iter()), row_to_shift)
            .context("querying shifts")?;
        let mut shifts = Vec::new();
        for row in rows {
            shifts.push(row.context("reading shift row")?);
        }
        Ok((shifts, total))
    }

    fn find_one(&self, filter: &ShiftFilter) -> anyhow::Result<Option<Shift>> {
        debug!("find one shift");
        let conn = self.lock()?;
        let (where_sql, params) = where_clause(filter);
        let sql = format!("{SELECT}{where_sql} ORDER BY date, start_time, id LIMIT 1");
        conn.query_row(&sql, params_from_iter(params.into_iter()), row_to_shift)
            .optional()
            .context("querying one shift")
    }

    fn find_by_id(&self, id: &ShiftId) -> anyhow::Result<Option<Shift>> {
        debug!(id = id.as_str(), "find shift by id");
        let conn = self.lock()?;
        conn.query_row(
            &format!("{SELECT} WHERE id = ?"),
            [id.as_str()],
            row_to_shift,
        )
        .optional()
        .context("querying shift by id")
    }

    fn find_by_ids(&self, ids: &[ShiftId]) -> anyhow::Result<Vec<Shift>> {
        debug!(count = ids.len(), "find shifts by ids");
        let filter = ShiftFilter {
            id: Some(Cond::In(ids.to_vec())),
            ..ShiftFilter::default()
        };
        let (shifts, _) = self.find(&filter, Page::default())?;
        Ok(shifts)
    }

    fn create(&self, shift: &Shift) -> anyhow::Result<Shift> {
        debug!(id = shift.id.as_str(), "create shift");
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO shifts (id, name, date, start_time, end_time, is_published)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                shift.id.as_str(),
                shift.name,
                date_text(shift.date),
                time_text(shift.start_time),
                time_text(shift.end_time),
                i64::from(shift.is_published),
            ],
        )
        .context("inserting shift")?;
        Ok(shift.clone())
    }

    fn update_by_id(
        &self,
        id: &ShiftId,
        changes: &ShiftChanges,
    ) -> anyhow::Result<Option<Shift>> {
        debug!(id = id.as_str(), "update shift by id");
        if !changes.is_empty() {
            let conn = self.lock()?;
            let (set_sql, mut params) = set_clause(changes);
            params.push(Value::Text(id.as_str().to_string()));
            conn.execute(
                &format!("UPDATE shifts SET {set_sql} WHERE id = ?"),
                params_from_iter(params.into_iter()),
            )
            .context("updating shift")?;
        }
        self.find_by_id(id)
    }

    fn update_by_filter(
        &self,
        filter: &ShiftFilter,
        changes: &ShiftChanges,
    ) -> anyhow::Result<(Vec<Shift>, u64)> {
        debug!("update shifts by filter");
        if !changes.is_empty() {
            let conn = self.lock()?;
            let (set_sql, mut params) = set_clause(changes);
            let (where_sql, where_params) = where_clause(filter);
            params.extend(where_params);
            conn.execute(
                &format!("UPDATE shifts SET {set_sql}{where_sql}"),
                params_from_iter(params.into_iter()),
            )
            .context("updating shifts")?;
        }
        // Relit avec le même filtre, comme l'appelant s'y attend.
        self.find(filter, Page::default())
    }

    fn delete_by_ids(&self, ids: &[ShiftId]) -> anyhow::Result<u64> {
        debug!(count = ids.len(), "delete shifts by ids");
        if ids.is_empty() {
            return Ok(0);
        }
        let conn = self.lock()?;
        let marks = vec!["?"; ids.len()].join(", ");
        let deleted = conn
            .execute(
                &format!("DELETE FROM shifts WHERE id IN ({marks})"),
                params_from_iter(ids.iter().map(|id| id.as_str())),
            )
            .context("deleting shifts")?;
        Ok(deleted as u64)
    }
}
