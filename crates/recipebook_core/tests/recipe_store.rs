use recipebook_core::db::migrations::latest_version;
use recipebook_core::db::open_db_in_memory;
use recipebook_core::{
    NewRecipe, RecipeFilter, RecipeStore, RecipeValidationError, SqliteRecipeStore, StoreError,
};
use rusqlite::Connection;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

fn draft(title: &str, ingredients: &[&str], tags: &[&str]) -> NewRecipe {
    NewRecipe {
        title: title.to_string(),
        ingredients: ingredients.iter().map(|item| item.to_string()).collect(),
        procedure: format!("Prepare the {title}."),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
    }
}

fn row_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn create_and_find_by_id_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecipeStore::try_new(&conn).unwrap();

    let recipe = draft("Omelette", &["egg", "butter", "egg"], &["breakfast", "quick"]);
    let id = store.create(&recipe).unwrap();
    assert!(!id.is_nil());

    let loaded = store.find_by_id(id).unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.title, "Omelette");
    assert_eq!(loaded.ingredients, vec!["egg", "butter", "egg"]);
    assert_eq!(loaded.procedure, "Prepare the Omelette.");
    assert_eq!(loaded.tags, vec!["breakfast", "quick"]);
    assert!(loaded.created_at > 0);
}

#[test]
fn create_assigns_distinct_ids() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecipeStore::try_new(&conn).unwrap();

    let first = store.create(&draft("Soup", &["water"], &[])).unwrap();
    let second = store.create(&draft("Soup", &["water"], &[])).unwrap();
    assert_ne!(first, second);
    assert_eq!(store.find_all().unwrap().len(), 2);
}

#[test]
fn find_by_id_returns_none_for_unknown_id() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecipeStore::try_new(&conn).unwrap();

    assert!(store.find_by_id(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn create_rejects_invalid_recipe_and_persists_nothing() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecipeStore::try_new(&conn).unwrap();

    let mut missing_procedure = draft("Toast", &["bread"], &[]);
    missing_procedure.procedure = "  ".to_string();
    let err = store.create(&missing_procedure).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(RecipeValidationError::MissingField("procedure"))
    ));

    let blank_tag = draft("Toast", &["bread"], &[""]);
    let err = store.create(&blank_tag).unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    assert_eq!(row_count(&conn, "recipes"), 0);
    assert_eq!(row_count(&conn, "recipe_ingredients"), 0);
    assert_eq!(row_count(&conn, "recipe_tags"), 0);
}

#[test]
fn created_at_has_millisecond_precision() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecipeStore::try_new(&conn).unwrap();

    let before = epoch_millis();
    let id = store.create(&draft("Toast", &["bread"], &[])).unwrap();
    let after = epoch_millis();

    let created_at = store.find_by_id(id).unwrap().unwrap().created_at;
    // Whole-second timestamps would fall up to 999 ms before `before`.
    assert!(
        created_at >= before - 2 && created_at <= after + 2,
        "created_at {created_at} outside [{before}, {after}]"
    );
}

fn epoch_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}

#[test]
fn find_all_orders_by_creation_time() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecipeStore::try_new(&conn).unwrap();

    let first = store.create(&draft("First", &["a"], &[])).unwrap();
    let second = store.create(&draft("Second", &["b"], &[])).unwrap();
    let third = store.create(&draft("Third", &["c"], &[])).unwrap();

    let ids: Vec<_> = store.find_all().unwrap().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![first, second, third]);

    conn.execute(
        "UPDATE recipes SET created_at = 1 WHERE uuid = ?1;",
        [third.to_string()],
    )
    .unwrap();
    let ids: Vec<_> = store.find_all().unwrap().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![third, first, second]);
}

#[test]
fn find_matching_with_all_equals_find_all() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecipeStore::try_new(&conn).unwrap();
    store.create(&draft("One", &["x"], &["t"])).unwrap();
    store.create(&draft("Two", &["y"], &[])).unwrap();

    assert_eq!(
        store.find_matching(&RecipeFilter::All).unwrap(),
        store.find_all().unwrap()
    );
}

#[test]
fn delete_by_id_reports_whether_a_record_was_removed() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecipeStore::try_new(&conn).unwrap();
    let kept = store.create(&draft("Kept", &["salt"], &["savory"])).unwrap();
    let removed = store
        .create(&draft("Removed", &["sugar", "cream"], &["dessert", "cold"]))
        .unwrap();

    assert!(store.delete_by_id(removed).unwrap());
    assert!(!store.delete_by_id(removed).unwrap());
    assert!(!store.delete_by_id(Uuid::new_v4()).unwrap());

    assert!(store.find_by_id(removed).unwrap().is_none());
    assert!(store.find_by_id(kept).unwrap().is_some());
    assert_eq!(row_count(&conn, "recipe_ingredients"), 1);
    assert_eq!(row_count(&conn, "recipe_tags"), 1);
}

#[test]
fn list_tags_returns_distinct_sorted_values() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecipeStore::try_new(&conn).unwrap();
    store
        .create(&draft("Cake", &["flour"], &["dessert", "baking"]))
        .unwrap();
    store
        .create(&draft("Pie", &["apple"], &["dessert", "Dessert"]))
        .unwrap();

    assert_eq!(
        store.list_tags().unwrap(),
        vec!["Dessert", "baking", "dessert"]
    );
}

#[test]
fn undecodable_persisted_id_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteRecipeStore::try_new(&conn).unwrap();
    conn.execute_batch(
        "INSERT INTO recipes (uuid, title, procedure) VALUES ('not-a-uuid', 'Broken', 'n/a');",
    )
    .unwrap();

    let err = store.find_all().unwrap_err();
    assert!(matches!(err, StoreError::InvalidData(_)));
}

#[test]
fn store_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteRecipeStore::try_new(&conn) {
        Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn store_rejects_connection_without_required_tables() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteRecipeStore::try_new(&conn),
        Err(StoreError::MissingRequiredTable("recipes"))
    ));
}

#[test]
fn store_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE recipes (
            uuid TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL,
            procedure TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    assert!(matches!(
        SqliteRecipeStore::try_new(&conn),
        Err(StoreError::MissingRequiredColumn {
            table: "recipes",
            column: "created_at"
        })
    ));
}
