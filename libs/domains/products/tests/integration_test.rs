//! Integration tests for Products domain
//!
//! These tests use real PostgreSQL via testcontainers to ensure:
//! - Generated SQL runs against the migrated schema
//! - Filters, ordering and pagination match the in-memory semantics
//! - Missing rows surface as `ProductError::NotFound`
//!
//! Run with `cargo test -- --ignored` (requires Docker).

use domain_products::*;
use rust_decimal::Decimal;
use std::time::Duration;
use test_utils::{assertions::*, TestDataBuilder, TestDatabase};

fn d(value: &str) -> Decimal {
    value.parse().unwrap()
}

fn input(name: &str, description: &str, price: &str, categories: &[&str]) -> CreateProduct {
    CreateProduct {
        name: name.to_string(),
        description: description.to_string(),
        price: d(price),
        categories: categories.iter().map(|c| c.to_string()).collect(),
    }
}

fn filter() -> ProductFilter {
    ProductFilter::default()
}

// ============================================================================
// Repository Tests
// ============================================================================

#[tokio::test]
#[ignore] // Requires Docker
async fn test_create_and_get_product() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.pool());
    let builder = TestDataBuilder::from_test_name("create_and_get");

    let created = repo
        .create(input(
            &builder.name("product", "desk"),
            "Solid oak writing desk",
            "250.00",
            &["furniture", "office"],
        ))
        .await
        .unwrap();

    assert!(created.id > 0);
    assert_eq!(created.price, d("250.00"));
    assert_eq!(created.categories, vec!["furniture", "office"]);
    assert_eq!(created.created_at, created.updated_at);

    let retrieved = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(retrieved, created);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_get_missing_product_is_not_found() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.pool());

    let result = repo.get_by_id(999).await;
    assert!(matches!(result, Err(ProductError::NotFound(999))));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_partial_update_keeps_other_fields() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.pool());

    let created = repo
        .create(input("Desk Lamp", "Adjustable LED lamp", "20.00", &["lighting"]))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;

    repo.update(
        created.id,
        UpdateProduct {
            price: Some(d("18.75")),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let updated = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(updated.price, d("18.75"));
    assert_eq!(updated.name, created.name);
    assert_eq!(updated.description, created.description);
    assert_eq!(updated.categories, created.categories);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_empty_update_only_touches_timestamp() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.pool());

    let created = repo
        .create(input("Notebook", "A5 dotted notebook", "3.50", &["stationery"]))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(20)).await;
    repo.update(created.id, UpdateProduct::default()).await.unwrap();

    let updated = repo.get_by_id(created.id).await.unwrap();
    assert_eq!(updated.name, created.name);
    assert!(updated.updated_at > created.updated_at);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_update_and_delete_missing_product() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.pool());

    let result = repo
        .update(
            7,
            UpdateProduct {
                name: Some("Ghost".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(ProductError::NotFound(7))));

    let result = repo.delete(7).await;
    assert!(matches!(result, Err(ProductError::NotFound(7))));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_delete_twice() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.pool());

    let created = repo
        .create(input("Floor Lamp", "Tall reading lamp", "10.00", &["lighting"]))
        .await
        .unwrap();

    repo.delete(created.id).await.unwrap();
    assert!(matches!(
        repo.delete(created.id).await,
        Err(ProductError::NotFound(_))
    ));
    assert!(matches!(
        repo.get_by_id(created.id).await,
        Err(ProductError::NotFound(_))
    ));
}

// ============================================================================
// Listing Tests
// ============================================================================

#[tokio::test]
#[ignore] // Requires Docker
async fn test_list_pagination_newest_first() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.pool());
    let builder = TestDataBuilder::from_test_name("list_pagination");

    for i in 1..=25 {
        repo.create(input(
            &builder.name("product", &i.to_string()),
            "Paginated product",
            "1.00",
            &["bulk"],
        ))
        .await
        .unwrap();
    }

    let (products, total) = repo.list(filter(), Pagination::new(2, 10)).await.unwrap();
    assert_eq!(total, 25);

    let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
    assert_eq!(ids, (6..=15).rev().collect::<Vec<_>>());

    let created: Vec<_> = products.iter().map(|p| p.created_at).collect();
    assert_sorted_desc(&created, "created_at");

    let (products, total) = repo.list(filter(), Pagination::new(4, 10)).await.unwrap();
    assert!(products.is_empty());
    assert_eq!(total, 25);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_list_price_bounds_are_inclusive() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.pool());

    for (name, price) in [("Cheap", "3.50"), ("Mid", "10.00"), ("Lamp", "20.00"), ("Desk", "250.00")] {
        repo.create(input(name, "Priced product", price, &["general"]))
            .await
            .unwrap();
    }

    let (products, total) = repo
        .list(
            ProductFilter {
                min_price: Some(d("10.00")),
                max_price: Some(d("20.00")),
                ..filter()
            },
            Pagination::default(),
        )
        .await
        .unwrap();

    assert_eq!(total, 2);
    let prices: Vec<_> = products.iter().map(|p| p.price).collect();
    assert_all_within(&prices, &d("10.00"), &d("20.00"), "price");
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_list_category_substring_is_case_insensitive() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.pool());
    let builder = TestDataBuilder::from_test_name("category_substring");
    let furniture = builder.category("Furniture");

    repo.create(input("Oak Desk", "Solid oak desk", "250.00", &[furniture.as_str(), "office"]))
        .await
        .unwrap();
    repo.create(input("Discount Pen", "Cheap pen", "1.00", &["50%_off"]))
        .await
        .unwrap();
    repo.create(input("Pen", "Regular pen", "2.00", &["500ff"]))
        .await
        .unwrap();

    let (products, total) = repo
        .list(
            ProductFilter {
                category: Some(furniture.to_uppercase()),
                ..filter()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(products[0].name, "Oak Desk");

    // LIKE metacharacters in the needle match literally
    let (products, total) = repo
        .list(
            ProductFilter {
                category: Some("%_".to_string()),
                ..filter()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(products[0].name, "Discount Pen");
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_list_full_text_search() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.pool());

    repo.create(input("Desk Lamp", "Adjustable LED lamp for desks", "20.00", &["lighting"]))
        .await
        .unwrap();
    repo.create(input("Oak Desk", "Solid oak writing desk", "250.00", &["furniture"]))
        .await
        .unwrap();
    repo.create(input("Notebook", "A5 dotted notebook", "3.50", &["stationery"]))
        .await
        .unwrap();

    let (products, total) = repo
        .list(
            ProductFilter {
                search: Some("lamps".to_string()),
                ..filter()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(total, 1);
    let lamp = assert_some(products.first(), "search should match the lamp");
    assert_eq!(lamp.name, "Desk Lamp");

    let (_, total) = repo
        .list(
            ProductFilter {
                search: Some("desk".to_string()),
                ..filter()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(total, 2);
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_reset_restarts_ids() {
    let db = TestDatabase::new().await;
    let repo = PgProductRepository::new(db.pool());

    repo.create(input("First", "First product", "1.00", &["a"]))
        .await
        .unwrap();
    db.reset().await;

    let created = repo
        .create(input("Second", "Second product", "1.00", &["a"]))
        .await
        .unwrap();
    assert_eq!(created.id, 1);
}
