//! Repository behaviour against a real SQLite file

mod common;

use std::time::Duration;

use catalogue_core::{
    AvailableItem, AvailableItemFilter, CatalogueError, Filters, Ingredient, IngredientFilter,
    ItemType, KnownItem, KnownItemFilter, LinkKey, Measurement, Metadata, Recipe,
    RecipeIngredient, RecipeIngredientFilter, Resource, Tag, TagFilter,
};
use chrono::{TimeZone, Timelike, Utc};
use rstest::rstest;

use common::{known_item, lettuce, open_with, seeded};

fn all() -> KnownItemFilter {
    KnownItemFilter::default()
}

fn ids(records: &[KnownItem]) -> Vec<i64> {
    records.iter().map(|r| r.id).collect()
}

fn recipe(name: &str) -> Recipe {
    Recipe {
        name: name.to_string(),
        description: "Family favourite".to_string(),
        cooking_steps: vec!["Prepare".into(), "Cook".into()],
        cook_time_minutes: 25,
        portions: 2,
        ..Default::default()
    }
}

fn ingredient(name: &str, tags: &[&str]) -> Ingredient {
    Ingredient {
        name: name.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_insert_get_update_conflict() {
    let catalogue = seeded().await;

    let inserted = catalogue.known_items.insert(lettuce()).await.unwrap();
    assert!(inserted.id >= 1);
    assert_eq!(inserted.version, 1);
    assert!(inserted.created_at > Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());

    let fetched = catalogue.known_items.get(inserted.id).await.unwrap();
    assert_eq!(fetched, inserted);
    assert_eq!(fetched.long_name, "Iceberg Lettuce");
    assert_eq!(fetched.container_size, 440);

    let mut resized = fetched.clone();
    resized.container_size = 450;
    let updated = catalogue.known_items.update(resized).await.unwrap();
    assert_eq!(updated.version, 2);

    let mut stale = fetched;
    stale.container_size = 460;
    let err = catalogue.known_items.update(stale).await.unwrap_err();
    assert!(matches!(err, CatalogueError::EditConflict));

    let stored = catalogue.known_items.get(inserted.id).await.unwrap();
    assert_eq!(stored.version, 2);
    assert_eq!(stored.container_size, 450);
}

#[tokio::test]
async fn test_versions_step_by_one() {
    let catalogue = seeded().await;
    let tag = catalogue
        .tags
        .insert(Tag {
            itemtype: 1,
            name: "leafy".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let first = catalogue
        .tags
        .update(Tag {
            name: "leafy greens".into(),
            ..tag.clone()
        })
        .await
        .unwrap();
    let second = catalogue
        .tags
        .update(Tag {
            name: "greens".into(),
            ..first.clone()
        })
        .await
        .unwrap();
    assert_eq!(first.version, 2);
    assert_eq!(second.version, 3);

    let err = catalogue.tags.update(first).await.unwrap_err();
    assert!(matches!(err, CatalogueError::EditConflict));
    assert_eq!(catalogue.tags.get(tag.id).await.unwrap().name, "greens");
}

#[tokio::test]
async fn test_update_of_deleted_record_conflicts() {
    let catalogue = seeded().await;
    let item = catalogue.known_items.insert(lettuce()).await.unwrap();
    catalogue.known_items.delete(item.id).await.unwrap();

    let err = catalogue.known_items.update(item).await.unwrap_err();
    assert!(matches!(err, CatalogueError::EditConflict));
}

#[tokio::test]
async fn test_deleted_record_is_not_found_twice() {
    let catalogue = seeded().await;
    let item = catalogue.known_items.insert(lettuce()).await.unwrap();
    catalogue.known_items.delete(item.id).await.unwrap();

    for _ in 0..2 {
        assert!(matches!(
            catalogue.known_items.get(item.id).await,
            Err(CatalogueError::NotFound)
        ));
        assert!(matches!(
            catalogue.known_items.delete(item.id).await,
            Err(CatalogueError::NotFound)
        ));
    }
}

#[rstest]
#[case(0)]
#[case(-3)]
#[tokio::test]
async fn test_invalid_identity_is_not_found(#[case] id: i64) {
    let catalogue = seeded().await;
    assert!(matches!(
        catalogue.known_items.get(id).await,
        Err(CatalogueError::NotFound)
    ));
    assert!(matches!(
        catalogue.known_items.delete(id).await,
        Err(CatalogueError::NotFound)
    ));
}

#[tokio::test]
async fn test_validation_runs_before_storage() {
    let catalogue = seeded().await;
    let invalid = KnownItem {
        long_name: String::new(),
        measurement: 9,
        tags: vec!["fresh".into(), "fresh".into()],
        ..lettuce()
    };

    match catalogue.known_items.insert(invalid).await {
        Err(CatalogueError::Validation(errors)) => {
            assert_eq!(errors.len(), 3);
            assert_eq!(errors.get("long_name"), Some("must be provided"));
            assert_eq!(errors.get("measurement"), Some("must not be greater than 6"));
            assert_eq!(errors.get("tags"), Some("must not contain duplicate values"));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }

    let page = catalogue
        .known_items
        .list(&all(), &Filters::default())
        .await
        .unwrap();
    assert!(page.records.is_empty());
}

#[tokio::test]
async fn test_foreign_key_violation_is_storage_error() {
    let catalogue = open_with(|_| {});
    let err = catalogue.known_items.insert(lettuce()).await.unwrap_err();
    assert!(matches!(err, CatalogueError::Storage(_)));
}

#[rstest]
#[case("created_at")]
#[case("-version")]
#[case("tags")]
#[case("long_name DESC")]
#[tokio::test]
async fn test_unlisted_sort_is_rejected(#[case] sort: &str) {
    let catalogue = seeded().await;
    catalogue.known_items.insert(lettuce()).await.unwrap();

    match catalogue
        .known_items
        .list(&all(), &Filters::new(1, 20, sort))
        .await
    {
        Err(CatalogueError::Validation(errors)) => {
            assert_eq!(errors.get("sort"), Some("invalid sort value"));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_page_past_end_is_empty() {
    let catalogue = seeded().await;
    for i in 0..3 {
        catalogue
            .known_items
            .insert(known_item(&format!("Item {}", i), "Item", 1))
            .await
            .unwrap();
    }

    let page = catalogue
        .known_items
        .list(&all(), &Filters::new(3, 2, "id"))
        .await
        .unwrap();
    assert!(page.records.is_empty());
    assert_eq!(page.metadata, Metadata::default());
}

#[tokio::test]
async fn test_pagination_metadata_and_tie_break() {
    let catalogue = seeded().await;
    let mut inserted = Vec::new();
    for size in [500, 250, 500, 100, 500] {
        let item = catalogue
            .known_items
            .insert(known_item("Rolled Oats", "Oats", size))
            .await
            .unwrap();
        inserted.push(item.id);
    }

    let first = catalogue
        .known_items
        .list(&all(), &Filters::new(1, 2, "-container_size"))
        .await
        .unwrap();
    assert_eq!(
        first.metadata,
        Metadata {
            current_page: 1,
            page_size: 2,
            first_page: 1,
            last_page: 3,
            total_records: 5,
        }
    );
    assert_eq!(ids(&first.records), vec![inserted[0], inserted[2]]);

    let second = catalogue
        .known_items
        .list(&all(), &Filters::new(2, 2, "-container_size"))
        .await
        .unwrap();
    assert_eq!(ids(&second.records), vec![inserted[4], inserted[1]]);

    let third = catalogue
        .known_items
        .list(&all(), &Filters::new(3, 2, "-container_size"))
        .await
        .unwrap();
    assert_eq!(ids(&third.records), vec![inserted[3]]);
    assert_eq!(third.metadata.current_page, 3);
}

#[tokio::test]
async fn test_repeated_listing_is_identical() {
    let catalogue = seeded().await;
    for name in ["Basmati Rice", "Brown Rice", "Arborio Rice"] {
        catalogue
            .known_items
            .insert(known_item(name, "Rice", 1000))
            .await
            .unwrap();
    }

    let filters = Filters::new(1, 10, "short_name");
    let first = catalogue.known_items.list(&all(), &filters).await.unwrap();
    let second = catalogue.known_items.list(&all(), &filters).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.records.len(), 3);
}

#[tokio::test]
async fn test_text_predicates() {
    let catalogue = seeded().await;
    let lettuce = catalogue.known_items.insert(lettuce()).await.unwrap();
    let romaine = catalogue
        .known_items
        .insert(known_item("Romaine Lettuce Hearts", "Romaine", 300))
        .await
        .unwrap();
    catalogue
        .known_items
        .insert(known_item("Whole Milk", "Milk", 1000))
        .await
        .unwrap();

    let by_words = catalogue
        .known_items
        .list(
            &KnownItemFilter {
                long_name: "LETTUCE".into(),
                ..all()
            },
            &Filters::default(),
        )
        .await
        .unwrap();
    assert_eq!(ids(&by_words.records), vec![lettuce.id, romaine.id]);

    let all_words = catalogue
        .known_items
        .list(
            &KnownItemFilter {
                long_name: "hearts lettuce".into(),
                ..all()
            },
            &Filters::default(),
        )
        .await
        .unwrap();
    assert_eq!(ids(&all_words.records), vec![romaine.id]);

    let partial_word = catalogue
        .known_items
        .list(
            &KnownItemFilter {
                long_name: "lett".into(),
                ..all()
            },
            &Filters::default(),
        )
        .await
        .unwrap();
    assert!(partial_word.records.is_empty());

    let substring = catalogue
        .known_items
        .list(
            &KnownItemFilter {
                short_name: "ETTU".into(),
                ..all()
            },
            &Filters::default(),
        )
        .await
        .unwrap();
    assert_eq!(ids(&substring.records), vec![lettuce.id]);

    let apples = catalogue
        .known_items
        .insert(known_item("Rote Äpfel", "ÄPFEL", 1000))
        .await
        .unwrap();
    let folded = catalogue
        .known_items
        .list(
            &KnownItemFilter {
                short_name: "äpfel".into(),
                ..all()
            },
            &Filters::default(),
        )
        .await
        .unwrap();
    assert_eq!(ids(&folded.records), vec![apples.id]);

    let folded_words = catalogue
        .known_items
        .list(
            &KnownItemFilter {
                long_name: "ÄPFEL".into(),
                ..all()
            },
            &Filters::default(),
        )
        .await
        .unwrap();
    assert_eq!(ids(&folded_words.records), vec![apples.id]);
}

#[tokio::test]
async fn test_equality_predicates_combine() {
    let catalogue = seeded().await;
    let grams = catalogue.known_items.insert(lettuce()).await.unwrap();
    catalogue
        .known_items
        .insert(KnownItem {
            measurement: 5,
            ..lettuce()
        })
        .await
        .unwrap();
    catalogue
        .known_items
        .insert(KnownItem {
            container_size: 200,
            ..lettuce()
        })
        .await
        .unwrap();

    let page = catalogue
        .known_items
        .list(
            &KnownItemFilter {
                measurement: 2,
                container_size: 440,
                ..all()
            },
            &Filters::default(),
        )
        .await
        .unwrap();
    assert_eq!(ids(&page.records), vec![grams.id]);
    assert_eq!(page.metadata.total_records, 1);
}

#[tokio::test]
async fn test_tag_superset() {
    let catalogue = seeded().await;
    let fresh = catalogue
        .ingredients
        .insert(ingredient("Spinach", &["fresh", "green"]))
        .await
        .unwrap();
    catalogue
        .ingredients
        .insert(ingredient("Peas", &["frozen"]))
        .await
        .unwrap();

    let page = catalogue
        .ingredients
        .list(
            &IngredientFilter {
                tags: vec!["fresh".into()],
                ..Default::default()
            },
            &Filters::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.records.len(), 1);
    assert_eq!(page.records[0].id, fresh.id);
    assert_eq!(page.records[0].tags, vec!["fresh", "green"]);

    let none = catalogue
        .ingredients
        .list(
            &IngredientFilter {
                tags: vec!["fresh".into(), "frozen".into()],
                ..Default::default()
            },
            &Filters::default(),
        )
        .await
        .unwrap();
    assert!(none.records.is_empty());
}

#[tokio::test]
async fn test_name_equality_is_exact() {
    let catalogue = seeded().await;
    let page = catalogue
        .tags
        .list(
            &TagFilter {
                name: "Fresh".into(),
                ..Default::default()
            },
            &Filters::default(),
        )
        .await
        .unwrap();
    assert!(page.records.is_empty());

    let vegetable = catalogue
        .item_types
        .list(
            &catalogue_core::ItemTypeFilter {
                name: "Vegetable".into(),
            },
            &Filters::default(),
        )
        .await
        .unwrap();
    assert_eq!(vegetable.records.len(), 1);
    assert_eq!(vegetable.records[0].id, 1);
}

#[tokio::test]
async fn test_expiration_filter() {
    let catalogue = seeded().await;
    let spring = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
    let summer = Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap();

    let yoghurt = catalogue
        .available_items
        .insert(AvailableItem {
            expiration_at: Some(summer),
            long_name: "Greek Yoghurt".into(),
            short_name: "Yoghurt".into(),
            item_type: 3,
            measurement: 1,
            container_size: 500,
            ..Default::default()
        })
        .await
        .unwrap();
    catalogue
        .available_items
        .insert(AvailableItem {
            expiration_at: Some(spring),
            long_name: "Cottage Cheese".into(),
            short_name: "Cheese".into(),
            item_type: 3,
            measurement: 1,
            container_size: 250,
            ..Default::default()
        })
        .await
        .unwrap();

    let fresh = catalogue
        .available_items
        .list(
            &AvailableItemFilter {
                expiration_at: Some(Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap()),
                ..Default::default()
            },
            &Filters::default(),
        )
        .await
        .unwrap();
    assert_eq!(fresh.records.len(), 1);
    assert_eq!(fresh.records[0], yoghurt);

    let by_expiry = catalogue
        .available_items
        .list(
            &AvailableItemFilter::default(),
            &Filters::new(1, 20, "-expiration_at"),
        )
        .await
        .unwrap();
    assert_eq!(by_expiry.records[0].id, yoghurt.id);
}

#[tokio::test]
async fn test_expiration_round_trips_at_stored_precision() {
    let catalogue = seeded().await;
    let expires = Utc
        .with_ymd_and_hms(2026, 9, 1, 12, 30, 0)
        .unwrap()
        .with_nanosecond(123_456_789)
        .unwrap();

    let milk = catalogue
        .available_items
        .insert(AvailableItem {
            expiration_at: Some(expires),
            long_name: "Whole Milk".into(),
            short_name: "Milk".into(),
            item_type: 3,
            measurement: 4,
            container_size: 1,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(
        milk.expiration_at.unwrap().timestamp_subsec_nanos(),
        123_000_000
    );
    assert_eq!(catalogue.available_items.get(milk.id).await.unwrap(), milk);

    let later = expires + chrono::Duration::days(2);
    let updated = catalogue
        .available_items
        .update(AvailableItem {
            expiration_at: Some(later),
            ..milk.clone()
        })
        .await
        .unwrap();
    assert_eq!(
        catalogue.available_items.get(milk.id).await.unwrap(),
        updated
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_updates_at_same_version() {
    const WRITERS: i32 = 8;

    let catalogue = open_with(|config| {
        config.pool_size = 4;
        config.busy_timeout_ms = 5_000;
        config.query_timeout_ms = 10_000;
    });
    catalogue
        .item_types
        .insert(ItemType {
            name: "Vegetable".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    for name in ["Grams", "Kilograms"] {
        catalogue
            .measurements
            .insert(Measurement {
                name: name.into(),
                ..Default::default()
            })
            .await
            .unwrap();
    }
    let item = catalogue.known_items.insert(lettuce()).await.unwrap();
    assert_eq!(item.version, 1);

    let handles: Vec<_> = (0..WRITERS)
        .map(|i| {
            let repo = catalogue.known_items.clone();
            let record = KnownItem {
                container_size: 100 + i,
                ..item.clone()
            };
            tokio::spawn(async move { repo.update(record).await })
        })
        .collect();

    let mut winners = Vec::new();
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(record) => winners.push(record),
            Err(CatalogueError::EditConflict) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(conflicts, WRITERS - 1);

    let stored = catalogue.known_items.get(item.id).await.unwrap();
    assert_eq!(stored.version, 2);
    assert_eq!(stored, winners[0]);
}

#[tokio::test]
async fn test_recipe_round_trip() {
    let catalogue = seeded().await;
    let soup = catalogue.recipes.insert(recipe("Tomato Soup")).await.unwrap();
    let fetched = catalogue.recipes.get(soup.id).await.unwrap();
    assert_eq!(fetched.cooking_steps, vec!["Prepare", "Cook"]);
    assert_eq!(fetched, soup);
}

#[tokio::test]
async fn test_link_crud_with_composite_key() {
    let catalogue = seeded().await;
    let soup = catalogue.recipes.insert(recipe("Tomato Soup")).await.unwrap();
    let tomato = catalogue
        .ingredients
        .insert(ingredient("Tomato", &["fresh"]))
        .await
        .unwrap();
    let basil = catalogue
        .ingredients
        .insert(ingredient("Basil", &["herb"]))
        .await
        .unwrap();

    let link = catalogue
        .recipe_ingredients
        .insert(RecipeIngredient {
            recipe_id: soup.id,
            ingredient_id: tomato.id,
            amount: 400,
            measurement: 1,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(link.version, 1);

    let key = LinkKey::new(soup.id, tomato.id);
    assert_eq!(catalogue.recipe_ingredients.get(key).await.unwrap(), link);

    let moved = catalogue
        .recipe_ingredients
        .update_from(
            key,
            RecipeIngredient {
                ingredient_id: basil.id,
                amount: 10,
                ..link.clone()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.version, 2);
    assert!(matches!(
        catalogue.recipe_ingredients.get(key).await,
        Err(CatalogueError::NotFound)
    ));

    let new_key = LinkKey::new(soup.id, basil.id);
    let fetched = catalogue.recipe_ingredients.get(new_key).await.unwrap();
    assert_eq!(fetched.amount, 10);

    let err = catalogue
        .recipe_ingredients
        .update_from(key, link)
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogueError::EditConflict));

    let page = catalogue
        .recipe_ingredients
        .list(
            &RecipeIngredientFilter {
                amount: 10,
                ..Default::default()
            },
            &Filters::new(1, 20, "recipe_id"),
        )
        .await
        .unwrap();
    assert_eq!(page.records, vec![fetched.clone()]);

    let unsorted = catalogue
        .recipe_ingredients
        .list(&RecipeIngredientFilter::default(), &Filters::default())
        .await
        .unwrap();
    assert_eq!(unsorted.records, vec![fetched]);

    catalogue.recipe_ingredients.delete(new_key).await.unwrap();
    assert!(matches!(
        catalogue.recipe_ingredients.delete(new_key).await,
        Err(CatalogueError::NotFound)
    ));
}

#[tokio::test]
async fn test_link_requires_existing_recipe() {
    let catalogue = seeded().await;
    let tomato = catalogue
        .ingredients
        .insert(ingredient("Tomato", &[]))
        .await
        .unwrap();

    let err = catalogue
        .recipe_ingredients
        .insert(RecipeIngredient {
            recipe_id: 42,
            ingredient_id: tomato.id,
            amount: 1,
            measurement: 5,
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogueError::Storage(_)));
}

#[tokio::test]
async fn test_deleting_recipe_removes_links() {
    let catalogue = seeded().await;
    let soup = catalogue.recipes.insert(recipe("Leek Soup")).await.unwrap();
    let leek = catalogue
        .ingredients
        .insert(ingredient("Leek", &[]))
        .await
        .unwrap();
    let key = catalogue
        .recipe_ingredients
        .insert(RecipeIngredient {
            recipe_id: soup.id,
            ingredient_id: leek.id,
            amount: 2,
            measurement: 5,
            ..Default::default()
        })
        .await
        .unwrap()
        .key();

    catalogue.recipes.delete(soup.id).await.unwrap();
    assert!(matches!(
        catalogue.recipe_ingredients.get(key).await,
        Err(CatalogueError::NotFound)
    ));
}

const ENDLESS: &str =
    "WITH RECURSIVE counter(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM counter) \
     SELECT count(*) FROM counter";

#[tokio::test]
async fn test_deadline_interrupts_statement() {
    let catalogue = open_with(|config| {
        config.pool_size = 1;
        config.query_timeout_ms = 200;
    });
    let db = catalogue.database();

    let err = db
        .run(|conn| Ok(conn.query_row(ENDLESS, [], |row| row.get::<_, i64>(0))?))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogueError::Timeout(d) if d == Duration::from_millis(200)));

    let one: i64 = db
        .run(|conn| Ok(conn.query_row("SELECT 1", [], |row| row.get(0))?))
        .await
        .unwrap();
    assert_eq!(one, 1);
}

#[tokio::test]
async fn test_dropped_call_is_abandoned() {
    let catalogue = open_with(|config| {
        config.pool_size = 1;
        config.query_timeout_ms = 5_000;
    });
    let db = catalogue.database();

    let abandoned = tokio::time::timeout(
        Duration::from_millis(200),
        db.run(|conn| Ok(conn.query_row(ENDLESS, [], |row| row.get::<_, i64>(0))?)),
    )
    .await;
    assert!(abandoned.is_err());

    let started = std::time::Instant::now();
    let one: i64 = db
        .run(|conn| Ok(conn.query_row("SELECT 1", [], |row| row.get(0))?))
        .await
        .unwrap();
    assert_eq!(one, 1);
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn test_catalogue_reopens_existing_file() {
    let catalogue = seeded().await;
    let item = catalogue.known_items.insert(lettuce()).await.unwrap();

    let reopened = catalogue_core::Catalogue::open(&catalogue.config).unwrap();
    assert_eq!(reopened.known_items.get(item.id).await.unwrap(), item);
}
