use crate::model::{Shift, ShiftDraft};
use anyhow::Context;
use chrono::{NaiveDate, NaiveTime};
use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;

/// Import de quarts depuis CSV : header `name,date,start,end`.
///
/// Renvoie des brouillons : la validation (bornes, chevauchements,
/// semaines publiées) reste l'affaire du service, ligne par ligne.
pub fn import_shifts_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<ShiftDraft>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim().to_string();
        let date = rec.get(1).context("missing date")?.trim();
        let start = rec.get(2).context("missing start")?.trim();
        let end = rec.get(3).context("missing end")?.trim();
        out.push(ShiftDraft {
            name,
            date: parse_date(date)?,
            start_time: parse_time(start)?,
            end_time: parse_time(end)?,
        });
    }
    Ok(out)
}

fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}

fn parse_time(raw: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .with_context(|| format!("invalid time: {raw}"))
}

/// Export CSV des quarts : header `id,name,date,start,end,is_published`.
pub fn export_shifts_csv<P: AsRef<Path>>(path: P, shifts: &[Shift]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["id", "name", "date", "start", "end", "is_published"])?;
    for s in shifts {
        w.write_record([
            s.id.as_str(),
            s.name.as_str(),
            &s.date.format("%Y-%m-%d").to_string(),
            &s.start_time.format("%H:%M:%S").to_string(),
            &s.end_time.format("%H:%M:%S").to_string(),
            if s.is_published { "true" } else { "false" },
        ])?;
    }
    w.flush()?;
    Ok(())
}
