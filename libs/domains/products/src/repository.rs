use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{ProductError, ProductResult};
use crate::models::{CreateProduct, Pagination, Product, ProductFilter, UpdateProduct};

/// Repository trait for Product persistence
///
/// Lookups and mutations of a missing id fail with `ProductError::NotFound`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a product and return it with its generated id and timestamps
    async fn create(&self, input: CreateProduct) -> ProductResult<Product>;

    /// Get a product by ID
    async fn get_by_id(&self, id: i64) -> ProductResult<Product>;

    /// One page of matching products, newest first, plus the total match count
    async fn list(
        &self,
        filter: ProductFilter,
        pagination: Pagination,
    ) -> ProductResult<(Vec<Product>, i64)>;

    /// Write the supplied fields and refresh `updated_at`
    async fn update(&self, id: i64, input: UpdateProduct) -> ProductResult<()>;

    /// Delete a product by ID
    async fn delete(&self, id: i64) -> ProductResult<()>;
}

#[derive(Debug, Default)]
struct Store {
    last_id: i64,
    products: BTreeMap<i64, Product>,
}

/// In-memory implementation of ProductRepository (for development/testing)
///
/// Search matches when every whitespace separated term occurs in the name,
/// or every term occurs in the description (case-insensitive). This is a
/// rough stand-in for PostgreSQL text search.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(product: &Product, filter: &ProductFilter) -> bool {
    if let Some(category) = &filter.category {
        let needle = category.to_lowercase();
        if !product
            .categories
            .iter()
            .any(|c| c.to_lowercase().contains(&needle))
        {
            return false;
        }
    }
    if let Some(min) = filter.min_price {
        if product.price < min {
            return false;
        }
    }
    if let Some(max) = filter.max_price {
        if product.price > max {
            return false;
        }
    }
    if let Some(search) = &filter.search {
        let terms: Vec<String> = search.split_whitespace().map(str::to_lowercase).collect();
        let contains_all = |text: &str| {
            let text = text.to_lowercase();
            terms.iter().all(|t| text.contains(t.as_str()))
        };
        if !contains_all(&product.name) && !contains_all(&product.description) {
            return false;
        }
    }
    true
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let mut store = self.store.write().await;

        store.last_id += 1;
        let now = Utc::now();
        let product = Product {
            id: store.last_id,
            name: input.name,
            description: input.description,
            price: input.price.round_dp(2),
            categories: input.categories,
            created_at: now,
            updated_at: now,
        };
        store.products.insert(product.id, product.clone());

        tracing::info!(product_id = product.id, "Created product");
        Ok(product)
    }

    async fn get_by_id(&self, id: i64) -> ProductResult<Product> {
        let store = self.store.read().await;
        store
            .products
            .get(&id)
            .cloned()
            .ok_or(ProductError::NotFound(id))
    }

    async fn list(
        &self,
        filter: ProductFilter,
        pagination: Pagination,
    ) -> ProductResult<(Vec<Product>, i64)> {
        let store = self.store.read().await;

        let mut result: Vec<Product> = store
            .products
            .values()
            .filter(|p| matches(p, &filter))
            .cloned()
            .collect();

        // Newest first, ties broken by id
        result.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = result.len() as i64;
        let page = result
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit as usize)
            .collect();

        Ok((page, total))
    }

    async fn update(&self, id: i64, input: UpdateProduct) -> ProductResult<()> {
        let mut store = self.store.write().await;
        let product = store
            .products
            .get_mut(&id)
            .ok_or(ProductError::NotFound(id))?;

        if let Some(name) = input.name {
            product.name = name;
        }
        if let Some(description) = input.description {
            product.description = description;
        }
        if let Some(price) = input.price {
            product.price = price.round_dp(2);
        }
        if let Some(categories) = input.categories {
            product.categories = categories;
        }
        product.updated_at = Utc::now();

        tracing::info!(product_id = id, "Updated product");
        Ok(())
    }

    async fn delete(&self, id: i64) -> ProductResult<()> {
        let mut store = self.store.write().await;

        if store.products.remove(&id).is_some() {
            tracing::info!(product_id = id, "Deleted product");
            Ok(())
        } else {
            Err(ProductError::NotFound(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn input(name: &str, price: &str, categories: &[&str]) -> CreateProduct {
        CreateProduct {
            name: name.to_string(),
            description: format!("{} description", name),
            price: price.parse().unwrap(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
        }
    }

    async fn seeded() -> InMemoryProductRepository {
        let repo = InMemoryProductRepository::new();
        repo.create(input("Oak Desk", "250.00", &["Furniture", "Office"]))
            .await
            .unwrap();
        repo.create(input("Desk Lamp", "20.00", &["Lighting", "Office"]))
            .await
            .unwrap();
        repo.create(input("Floor Lamp", "10.00", &["Lighting"]))
            .await
            .unwrap();
        repo.create(input("Notebook", "3.50", &["Stationery"]))
            .await
            .unwrap();
        repo
    }

    #[tokio::test]
    async fn test_create_and_get_product() {
        let repo = InMemoryProductRepository::new();

        let product = repo
            .create(input("Desk Lamp", "19.99", &["lighting"]))
            .await
            .unwrap();
        assert!(product.id > 0);
        assert_eq!(product.created_at, product.updated_at);

        let fetched = repo.get_by_id(product.id).await.unwrap();
        assert_eq!(fetched, product);
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let repo = InMemoryProductRepository::new();
        let a = repo.create(input("A", "1", &["x"])).await.unwrap();
        let b = repo.create(input("B", "1", &["x"])).await.unwrap();
        assert_eq!(b.id, a.id + 1);
    }

    #[tokio::test]
    async fn test_get_missing_product() {
        let repo = InMemoryProductRepository::new();
        let result = repo.get_by_id(404).await;
        assert!(matches!(result, Err(ProductError::NotFound(404))));
    }

    #[tokio::test]
    async fn test_list_newest_first_with_total() {
        let repo = seeded().await;

        let (products, total) = repo
            .list(ProductFilter::default(), Pagination::new(1, 2))
            .await
            .unwrap();

        assert_eq!(total, 4);
        let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Notebook", "Floor Lamp"]);

        let (products, total) = repo
            .list(ProductFilter::default(), Pagination::new(2, 2))
            .await
            .unwrap();
        assert_eq!(total, 4);
        let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Desk Lamp", "Oak Desk"]);
    }

    #[tokio::test]
    async fn test_list_page_past_end_is_empty() {
        let repo = seeded().await;
        let (products, total) = repo
            .list(ProductFilter::default(), Pagination::new(10, 10))
            .await
            .unwrap();
        assert!(products.is_empty());
        assert_eq!(total, 4);
    }

    #[tokio::test]
    async fn test_list_price_bounds_are_inclusive() {
        let repo = seeded().await;
        let filter = ProductFilter {
            min_price: Some(Decimal::new(10, 0)),
            max_price: Some(Decimal::new(20, 0)),
            ..Default::default()
        };

        let (products, total) = repo.list(filter, Pagination::default()).await.unwrap();
        assert_eq!(total, 2);
        assert!(products
            .iter()
            .all(|p| p.price >= Decimal::new(10, 0) && p.price <= Decimal::new(20, 0)));
    }

    #[tokio::test]
    async fn test_list_category_is_case_insensitive_substring() {
        let repo = seeded().await;
        let filter = ProductFilter {
            category: Some("LIGHT".to_string()),
            ..Default::default()
        };

        let (products, total) = repo.list(filter, Pagination::default()).await.unwrap();
        assert_eq!(total, 2);
        assert!(products.iter().all(|p| p.name.contains("Lamp")));
    }

    #[tokio::test]
    async fn test_list_filters_combine() {
        let repo = seeded().await;
        let filter = ProductFilter {
            category: Some("office".to_string()),
            search: Some("lamp".to_string()),
            ..Default::default()
        };

        let (products, total) = repo.list(filter, Pagination::default()).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(products[0].name, "Desk Lamp");
    }

    #[tokio::test]
    async fn test_update_only_supplied_fields() {
        let repo = InMemoryProductRepository::new();
        let product = repo
            .create(input("Desk Lamp", "19.99", &["lighting"]))
            .await
            .unwrap();

        repo.update(
            product.id,
            UpdateProduct {
                price: Some(Decimal::new(2499, 2)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let updated = repo.get_by_id(product.id).await.unwrap();
        assert_eq!(updated.price, Decimal::new(2499, 2));
        assert_eq!(updated.name, product.name);
        assert_eq!(updated.description, product.description);
        assert_eq!(updated.categories, product.categories);
        assert_eq!(updated.created_at, product.created_at);
        assert!(updated.updated_at >= product.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_product() {
        let repo = InMemoryProductRepository::new();
        let result = repo.update(9, UpdateProduct::default()).await;
        assert!(matches!(result, Err(ProductError::NotFound(9))));
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let repo = InMemoryProductRepository::new();
        let product = repo.create(input("A", "1", &["x"])).await.unwrap();

        repo.delete(product.id).await.unwrap();
        let second = repo.delete(product.id).await;
        assert!(matches!(second, Err(ProductError::NotFound(_))));
        assert!(repo.get_by_id(product.id).await.is_err());
    }
}
