use super::test_db;
use crate::{DbError, StoredSettings};

#[test]
fn test_settings_upsert() {
    let db = test_db();
    assert_eq!(db.get_setting("theme").unwrap(), None);

    db.set_setting("theme", "light").unwrap();
    db.set_setting("theme", "dark").unwrap();
    assert_eq!(db.get_setting("theme").unwrap().as_deref(), Some("dark"));
}

#[test]
fn test_json_settings() {
    let db = test_db();
    let missing = db.get_json_setting::<StoredSettings>("generator").unwrap();
    assert_eq!(missing, None);

    let settings = StoredSettings {
        size: 512,
        ..StoredSettings::default()
    };
    db.set_json_setting("generator", &settings).unwrap();
    assert_eq!(
        db.get_json_setting::<StoredSettings>("generator").unwrap(),
        Some(settings)
    );

    db.set_setting("generator", "not json").unwrap();
    let err = db.get_json_setting::<StoredSettings>("generator").unwrap_err();
    assert!(matches!(err, DbError::Json(_)));
}

#[test]
fn test_migrations_are_idempotent() {
    let db = test_db();
    db.with_conn(|conn| crate::schema::run_migrations(conn))
        .unwrap();
    assert_eq!(db.get_templates().unwrap().len(), 4);
}

#[test]
fn test_ids_are_short_base36() {
    let id = crate::new_id();
    assert_eq!(id.len(), 9);
    let base36 = |c: char| c.is_ascii_digit() || c.is_ascii_lowercase();
    assert!(id.chars().all(base36));
    assert_ne!(id, crate::new_id());
}
