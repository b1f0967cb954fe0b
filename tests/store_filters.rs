#![forbid(unsafe_code)]
use chrono::{NaiveDate, NaiveTime};
use quart::{Cond, Page, Shift, ShiftChanges, ShiftFilter, ShiftStore, SqliteStore};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn shift(name: &str, d: NaiveDate, start: NaiveTime, end: NaiveTime) -> Shift {
    Shift::new(name.to_string(), d, start, end).unwrap()
}

fn seeded() -> (SqliteStore, Vec<Shift>) {
    let store = SqliteStore::open_in_memory().unwrap();
    let mut shifts = Vec::new();
    for (name, d, start, end) in [
        ("a", date(2024, 3, 4), time(9, 0), time(12, 0)),
        ("b", date(2024, 3, 4), time(13, 0), time(17, 0)),
        ("c", date(2024, 3, 6), time(9, 0), time(17, 0)),
        ("d", date(2024, 3, 11), time(9, 0), time(17, 0)),
        ("e", date(2024, 3, 12), time(9, 0), time(17, 0)),
    ] {
        shifts.push(store.create(&shift(name, d, start, end)).unwrap());
    }
    (store, shifts)
}

#[test]
fn find_orders_by_date_then_start_time() {
    let (store, _) = seeded();
    let (all, total) = store.find(&ShiftFilter::default(), Page::default()).unwrap();
    assert_eq!(total, 5);
    let names: Vec<&str> = all.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["a", "b", "c", "d", "e"]);
}

#[test]
fn pagination_slices_but_reports_full_total() {
    let (store, _) = seeded();
    let page = Page {
        limit: Some(2),
        offset: Some(2),
    };
    let (slice, total) = store.find(&ShiftFilter::default(), page).unwrap();
    assert_eq!(total, 5);
    let names: Vec<&str> = slice.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["c", "d"]);
}

#[test]
fn offset_without_limit() {
    let (store, _) = seeded();
    let page = Page {
        limit: None,
        offset: Some(3),
    };
    let (slice, total) = store.find(&ShiftFilter::default(), page).unwrap();
    assert_eq!(total, 5);
    assert_eq!(slice.len(), 2);
}

#[test]
fn in_set_and_not_equal_conditions() {
    let (store, shifts) = seeded();

    let filter = ShiftFilter {
        id: Some(Cond::In(vec![shifts[0].id.clone(), shifts[2].id.clone()])),
        ..ShiftFilter::default()
    };
    let (found, total) = store.find(&filter, Page::default()).unwrap();
    assert_eq!(total, 2);
    assert_eq!(found.len(), 2);

    let filter = ShiftFilter {
        id: Some(Cond::Ne(shifts[0].id.clone())),
        ..ShiftFilter::default()
    };
    let (_, total) = store.find(&filter, Page::default()).unwrap();
    assert_eq!(total, 4);
}

#[test]
fn empty_in_set_matches_nothing() {
    let (store, _) = seeded();
    let filter = ShiftFilter {
        id: Some(Cond::In(Vec::new())),
        ..ShiftFilter::default()
    };
    let (found, total) = store.find(&filter, Page::default()).unwrap();
    assert!(found.is_empty());
    assert_eq!(total, 0);
}

#[test]
fn between_is_inclusive_on_dates() {
    let (store, _) = seeded();
    let filter = ShiftFilter {
        date: Some(Cond::Between(date(2024, 3, 4), date(2024, 3, 11))),
        ..ShiftFilter::default()
    };
    let (found, _) = store.find(&filter, Page::default()).unwrap();
    let names: Vec<&str> = found.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["a", "b", "c", "d"]);
}

#[test]
fn time_comparisons_respect_clock_order() {
    let (store, _) = seeded();
    // end_time > 12:00 sur le 4 mars : seul « b » finit après midi.
    let filter = ShiftFilter {
        date: Some(Cond::Eq(date(2024, 3, 4))),
        end_time: Some(Cond::Gt(time(12, 0))),
        ..ShiftFilter::default()
    };
    let (found, _) = store.find(&filter, Page::default()).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "b");
}

#[test]
fn find_one_returns_first_in_order() {
    let (store, _) = seeded();
    let found = store.find_one(&ShiftFilter::default()).unwrap().unwrap();
    assert_eq!(found.name, "a");

    let none = store
        .find_one(&ShiftFilter {
            name: Some(Cond::Eq("zzz".to_string())),
            ..ShiftFilter::default()
        })
        .unwrap();
    assert!(none.is_none());
}

#[test]
fn update_by_filter_returns_rows_after_update() {
    let (store, _) = seeded();
    let filter = ShiftFilter {
        date: Some(Cond::Between(date(2024, 3, 4), date(2024, 3, 10))),
        ..ShiftFilter::default()
    };
    let (updated, total) = store
        .update_by_filter(&filter, &ShiftChanges::publish())
        .unwrap();
    assert_eq!(total, 3);
    assert!(updated.iter().all(|s| s.is_published));

    // hors fenêtre : intacts
    let (rest, _) = store
        .find(
            &ShiftFilter {
                is_published: Some(false),
                ..ShiftFilter::default()
            },
            Page::default(),
        )
        .unwrap();
    assert_eq!(rest.len(), 2);
}

#[test]
fn update_by_id_patches_and_rereads() {
    let (store, shifts) = seeded();
    let changes = ShiftChanges {
        name: Some("renamed".to_string()),
        ..ShiftChanges::default()
    };
    let updated = store
        .update_by_id(&shifts[0].id, &changes)
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "renamed");
    assert_eq!(updated.start_time, shifts[0].start_time);
}

#[test]
fn update_by_id_unknown_is_none() {
    let (store, _) = seeded();
    let changes = ShiftChanges {
        name: Some("renamed".to_string()),
        ..ShiftChanges::default()
    };
    assert!(store
        .update_by_id(&quart::ShiftId::new("missing"), &changes)
        .unwrap()
        .is_none());
}

#[test]
fn delete_by_ids_reports_count() {
    let (store, shifts) = seeded();
    assert_eq!(store.delete_by_ids(&[]).unwrap(), 0);
    let ids = [shifts[0].id.clone(), shifts[1].id.clone()];
    assert_eq!(store.delete_by_ids(&ids).unwrap(), 2);
    // déjà supprimés : plus rien à effacer
    assert_eq!(store.delete_by_ids(&ids).unwrap(), 0);
}

#[test]
fn duplicate_id_insert_is_a_store_error() {
    let (store, shifts) = seeded();
    assert!(store.create(&shifts[0]).is_err());
}

#[test]
fn reopening_a_file_keeps_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shifts.db");

    let store = SqliteStore::open(&path).unwrap();
    store
        .create(&shift("persisted", date(2024, 3, 4), time(9, 0), time(12, 0)))
        .unwrap();
    drop(store);

    let reopened = SqliteStore::open(&path).unwrap();
    let (rows, total) = reopened
        .find(&ShiftFilter::default(), Page::default())
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].name, "persisted");
}
