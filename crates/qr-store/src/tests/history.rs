use super::test_db;
use crate::{DbError, HISTORY_LIMIT, NewHistoryEntry, StoredSettings};

fn entry(payload: &str) -> NewHistoryEntry {
    NewHistoryEntry {
        kind: "text".into(),
        payload: payload.into(),
        settings: StoredSettings::default(),
        preview: None,
    }
}

#[test]
fn test_save_and_get_newest_first() {
    let db = test_db();
    let first = db.save_history(entry("one")).unwrap();
    db.save_history(entry("two")).unwrap();

    let history = db.get_history().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].payload, "two");
    assert_eq!(history[1].payload, "one");
    assert_eq!(history[1].id, first.id);
    assert!(first.timestamp > 0);
}

#[test]
fn test_history_is_capped() {
    let db = test_db();
    for i in 0..HISTORY_LIMIT + 5 {
        db.save_history(entry(&format!("item {i}"))).unwrap();
    }

    let history = db.get_history().unwrap();
    assert_eq!(history.len(), HISTORY_LIMIT);
    assert_eq!(history[0].payload, format!("item {}", HISTORY_LIMIT + 4));
    assert_eq!(history[HISTORY_LIMIT - 1].payload, "item 5");
}

#[test]
fn test_delete_and_clear() {
    let db = test_db();
    let a = db.save_history(entry("a")).unwrap();
    db.save_history(entry("b")).unwrap();

    db.delete_history(&a.id).unwrap();
    let history = db.get_history().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].payload, "b");

    db.clear_history().unwrap();
    assert!(db.get_history().unwrap().is_empty());
}

#[test]
fn test_settings_survive_storage() {
    let db = test_db();
    let mut e = entry("colored");
    e.settings.foreground_color = "#ff0000".into();
    e.settings.error_correction = "H".into();
    let preview = "data:image/png;base64,AAAA";
    e.preview = Some(preview.into());
    db.save_history(e).unwrap();

    let stored = &db.get_history().unwrap()[0];
    assert_eq!(stored.settings.foreground_color, "#ff0000");
    assert_eq!(stored.settings.error_correction, "H");
    assert_eq!(stored.preview.as_deref(), Some(preview));
}

#[test]
fn test_export_then_import_preserves_order() {
    let db = test_db();
    db.save_history(entry("old")).unwrap();
    db.save_history(entry("new")).unwrap();
    let exported = db.export_history().unwrap();
    assert!(exported.starts_with("[\n"));
    assert!(exported.contains("\"type\": \"text\""));

    let other = test_db();
    other.save_history(entry("discarded")).unwrap();
    assert_eq!(other.import_history(&exported).unwrap(), 2);

    let history = other.get_history().unwrap();
    let payloads: Vec<_> = history.iter().map(|h| h.payload.as_str()).collect();
    assert_eq!(payloads, vec!["new", "old"]);
    assert_eq!(history, db.get_history().unwrap());
}

#[test]
fn test_import_rejects_non_array() {
    let db = test_db();
    db.save_history(entry("kept")).unwrap();

    let err = db.import_history("{\"id\": \"x\"}").unwrap_err();
    assert!(matches!(err, DbError::InvalidData(_)));

    let err = db.import_history("not json").unwrap_err();
    assert!(matches!(err, DbError::Json(_)));

    assert_eq!(db.get_history().unwrap().len(), 1);
}
