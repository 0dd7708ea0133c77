use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    entity::{PRODUCT_COLUMNS, ProductRow},
    error::{ProductError, ProductResult},
    models::{CreateProduct, Pagination, Product, ProductFilter, UpdateProduct},
    repository::ProductRepository,
};

/// PostgreSQL implementation of ProductRepository backed by a sqlx pool
#[derive(Debug, Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    /// Escaped `%term%` pattern matched with ILIKE against each category
    Category(String),
    MinPrice(Decimal),
    MaxPrice(Decimal),
    Search(String),
}

/// Filter predicates rendered as a `WHERE` clause into any query builder.
///
/// The page query and the count query push the same predicates, so both
/// always agree on which rows match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPredicates {
    predicates: Vec<Predicate>,
}

impl ProductPredicates {
    pub fn from_filter(filter: &ProductFilter) -> Self {
        let mut predicates = Vec::new();

        if let Some(category) = &filter.category {
            predicates.push(Predicate::Category(like_pattern(category)));
        }
        if let Some(min) = filter.min_price {
            predicates.push(Predicate::MinPrice(min));
        }
        if let Some(max) = filter.max_price {
            predicates.push(Predicate::MaxPrice(max));
        }
        if let Some(search) = &filter.search {
            predicates.push(Predicate::Search(search.clone()));
        }

        Self { predicates }
    }

    /// Append ` WHERE p1 AND p2 ...`; nothing when there are no predicates
    pub fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        for (i, predicate) in self.predicates.iter().enumerate() {
            builder.push(if i == 0 { " WHERE " } else { " AND " });

            match predicate {
                Predicate::Category(pattern) => {
                    builder
                        .push("EXISTS (SELECT 1 FROM unnest(categories) AS category WHERE category ILIKE ")
                        .push_bind(pattern.clone())
                        .push(")");
                }
                Predicate::MinPrice(min) => {
                    builder.push("price >= ").push_bind(*min);
                }
                Predicate::MaxPrice(max) => {
                    builder.push("price <= ").push_bind(*max);
                }
                Predicate::Search(query) => {
                    builder
                        .push("(to_tsvector('english', name) @@ plainto_tsquery('english', ")
                        .push_bind(query.clone())
                        .push(") OR to_tsvector('english', description) @@ plainto_tsquery('english', ")
                        .push_bind(query.clone())
                        .push("))");
                }
            }
        }
    }
}

/// `%term%` with LIKE metacharacters escaped so they match literally
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn list_query(
    predicates: &ProductPredicates,
    pagination: Pagination,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {} FROM products", PRODUCT_COLUMNS));
    predicates.push_where(&mut builder);
    builder
        .push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(i64::from(pagination.limit))
        .push(" OFFSET ")
        .push_bind(pagination.offset());
    builder
}

fn count_query(predicates: &ProductPredicates) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM products");
    predicates.push_where(&mut builder);
    builder
}

fn update_query(id: i64, input: UpdateProduct) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new("UPDATE products SET ");
    let mut assignments = builder.separated(", ");

    if let Some(name) = input.name {
        assignments.push("name = ").push_bind_unseparated(name);
    }
    if let Some(description) = input.description {
        assignments
            .push("description = ")
            .push_bind_unseparated(description);
    }
    if let Some(price) = input.price {
        assignments.push("price = ").push_bind_unseparated(price);
    }
    if let Some(categories) = input.categories {
        assignments
            .push("categories = ")
            .push_bind_unseparated(categories);
    }
    assignments.push("updated_at = NOW()");

    builder.push(" WHERE id = ").push_bind(id);
    builder
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn create(&self, input: CreateProduct) -> ProductResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            "INSERT INTO products (name, description, price, categories) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, name, description, price, categories, created_at, updated_at",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(&input.categories)
        .fetch_one(&self.pool)
        .await
        .map_err(ProductError::database("creating product"))?;

        tracing::info!(product_id = row.id, "Created product");
        Ok(row.into())
    }

    async fn get_by_id(&self, id: i64) -> ProductResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(ProductError::database("getting product"))?;

        row.map(Product::from).ok_or(ProductError::NotFound(id))
    }

    async fn list(
        &self,
        filter: ProductFilter,
        pagination: Pagination,
    ) -> ProductResult<(Vec<Product>, i64)> {
        let predicates = ProductPredicates::from_filter(&filter);

        let mut page_query = list_query(&predicates, pagination);
        let rows = page_query
            .build_query_as::<ProductRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(ProductError::database("listing products"))?;

        let mut count = count_query(&predicates);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(ProductError::database("counting products"))?;

        tracing::debug!(
            returned = rows.len(),
            total,
            page = pagination.page,
            "Listed products"
        );
        Ok((rows.into_iter().map(Product::from).collect(), total))
    }

    async fn update(&self, id: i64, input: UpdateProduct) -> ProductResult<()> {
        let mut query = update_query(id, input);
        let result = query
            .build()
            .execute(&self.pool)
            .await
            .map_err(ProductError::database("updating product"))?;

        if result.rows_affected() == 0 {
            return Err(ProductError::NotFound(id));
        }

        tracing::info!(product_id = id, "Updated product");
        Ok(())
    }

    async fn delete(&self, id: i64) -> ProductResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(ProductError::database("deleting product"))?;

        if result.rows_affected() == 0 {
            return Err(ProductError::NotFound(id));
        }

        tracing::info!(product_id = id, "Deleted product");
        Ok(())
    }
}
