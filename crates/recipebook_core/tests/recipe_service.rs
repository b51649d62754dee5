use recipebook_core::db::open_db_in_memory;
use recipebook_core::{
    split_tags, AddRecipeRequest, ListQuery, RecipeLookup, RecipeService, RecipeServiceError,
    RecipeStore, RecipeValidationError, SqliteRecipeStore,
};
use uuid::Uuid;

fn pancakes(tags: &str) -> AddRecipeRequest {
    AddRecipeRequest {
        title: Some("Pancakes".to_string()),
        ingredients: Some("flour, milk, egg".to_string()),
        procedure: Some("Whisk, rest, fry.".to_string()),
        tags: Some(tags.to_string()),
        ..AddRecipeRequest::default()
    }
}

#[test]
fn add_then_view_returns_normalized_tags() {
    let conn = open_db_in_memory().unwrap();
    let service = RecipeService::new(SqliteRecipeStore::try_new(&conn).unwrap());

    let raw_tags = " breakfast ,Sweet,, weekend , ";
    let id = service.add_recipe(pancakes(raw_tags)).unwrap();

    let RecipeLookup::Found(recipe) = service.view_recipe(&id.to_string()).unwrap() else {
        panic!("created recipe should be found");
    };
    assert_eq!(recipe.tags, split_tags(raw_tags));
    assert_eq!(recipe.tags, vec!["breakfast", "Sweet", "weekend"]);
    assert_eq!(recipe.ingredients, vec!["flour", "milk", "egg"]);
}

#[test]
fn add_without_tags_stores_empty_tag_list() {
    let conn = open_db_in_memory().unwrap();
    let service = RecipeService::new(SqliteRecipeStore::try_new(&conn).unwrap());

    let id = service
        .add_recipe(AddRecipeRequest {
            tags: None,
            ..pancakes("")
        })
        .unwrap();

    let recipe = service
        .view_recipe(&id.to_string())
        .unwrap()
        .into_option()
        .unwrap();
    assert!(recipe.tags.is_empty());
}

#[test]
fn add_rejects_each_missing_required_field() {
    let conn = open_db_in_memory().unwrap();
    let service = RecipeService::new(SqliteRecipeStore::try_new(&conn).unwrap());

    let cases = [
        (
            AddRecipeRequest {
                title: None,
                ..pancakes("x")
            },
            "title",
        ),
        (
            AddRecipeRequest {
                ingredients: Some("   ".to_string()),
                ..pancakes("x")
            },
            "ingredients",
        ),
        (
            AddRecipeRequest {
                procedure: None,
                ..pancakes("x")
            },
            "procedure",
        ),
    ];

    for (request, field) in cases {
        let err = service.add_recipe(request).unwrap_err();
        match err {
            RecipeServiceError::Validation(RecipeValidationError::MissingField(missing)) => {
                assert_eq!(missing, field)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    assert!(service
        .list_or_search(&ListQuery::default())
        .unwrap()
        .is_empty());
}

#[test]
fn add_drops_fields_outside_the_recipe_record() {
    let conn = open_db_in_memory().unwrap();
    let service = RecipeService::new(SqliteRecipeStore::try_new(&conn).unwrap());

    let request: AddRecipeRequest = serde_json::from_value(serde_json::json!({
        "title": "Shakshuka",
        "name": "Sam",
        "email": "sam@example.com",
        "description": "Family favourite",
        "ingredients": "egg\ntomato\npepper",
        "procedure": "Simmer sauce, poach eggs.",
        "tags": "brunch"
    }))
    .unwrap();
    let id = service.add_recipe(request).unwrap();

    let recipe = service
        .view_recipe(&id.to_string())
        .unwrap()
        .into_option()
        .unwrap();
    let json = serde_json::to_value(&recipe).unwrap();
    let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    assert_eq!(
        keys,
        vec!["created_at", "id", "ingredients", "procedure", "tags", "title"]
    );
    assert_eq!(recipe.ingredients, vec!["egg", "tomato", "pepper"]);
}

#[test]
fn delete_lifecycle_reports_outcomes_without_errors() {
    let conn = open_db_in_memory().unwrap();
    let service = RecipeService::new(SqliteRecipeStore::try_new(&conn).unwrap());
    let id = service.add_recipe(pancakes("breakfast")).unwrap().to_string();

    let confirmation = service.get_for_delete_confirmation(&id).unwrap();
    assert!(matches!(confirmation, RecipeLookup::Found(ref recipe) if recipe.title == "Pancakes"));

    assert!(service.delete_recipe(&id).unwrap());
    assert_eq!(
        service.get_for_delete_confirmation(&id).unwrap(),
        RecipeLookup::NotFound
    );
    assert!(!service.delete_recipe(&id).unwrap());
    assert!(!service.delete_recipe(&Uuid::new_v4().to_string()).unwrap());
}

#[test]
fn malformed_ids_resolve_to_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = RecipeService::new(SqliteRecipeStore::try_new(&conn).unwrap());
    service.add_recipe(pancakes("breakfast")).unwrap();

    for raw in ["", "42", "not-a-uuid", "00000000-0000-0000-0000-000000000000"] {
        assert_eq!(service.view_recipe(raw).unwrap(), RecipeLookup::NotFound);
        assert_eq!(
            service.get_for_delete_confirmation(raw).unwrap(),
            RecipeLookup::NotFound
        );
        assert!(!service.delete_recipe(raw).unwrap());
    }
    assert_eq!(service.list_or_search(&ListQuery::default()).unwrap().len(), 1);
}

#[test]
fn service_reads_are_never_cached() {
    let conn = open_db_in_memory().unwrap();
    let service = RecipeService::new(SqliteRecipeStore::try_new(&conn).unwrap());
    service.add_recipe(pancakes("breakfast")).unwrap();
    assert_eq!(service.list_tags().unwrap(), vec!["breakfast"]);

    let other_handle = SqliteRecipeStore::try_new(&conn).unwrap();
    let external = other_handle.find_all().unwrap()[0].id;
    other_handle.delete_by_id(external).unwrap();

    assert!(service
        .list_or_search(&ListQuery::default())
        .unwrap()
        .is_empty());
    assert!(service.list_tags().unwrap().is_empty());
}

#[test]
fn storage_failures_surface_as_store_unavailable() {
    let conn = open_db_in_memory().unwrap();
    let service = RecipeService::new(SqliteRecipeStore::try_new(&conn).unwrap());
    let id = service.add_recipe(pancakes("breakfast")).unwrap().to_string();

    conn.execute_batch("DROP TABLE recipe_tags;").unwrap();

    assert!(matches!(
        service.list_or_search(&ListQuery::default()),
        Err(RecipeServiceError::StoreUnavailable(_))
    ));
    assert!(matches!(
        service.search_by_tag("breakfast"),
        Err(RecipeServiceError::StoreUnavailable(_))
    ));
    assert!(matches!(
        service.view_recipe(&id),
        Err(RecipeServiceError::StoreUnavailable(_))
    ));
    assert!(matches!(
        service.add_recipe(pancakes("lunch")),
        Err(RecipeServiceError::StoreUnavailable(_))
    ));
    assert!(matches!(
        service.delete_recipe(&id),
        Err(RecipeServiceError::StoreUnavailable(_))
    ));
}
