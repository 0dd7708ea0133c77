use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

use crate::models::Product;

/// Column list shared by every statement returning full rows
pub(crate) const PRODUCT_COLUMNS: &str =
    "id, name, description, price, categories, created_at, updated_at";

/// Row of the `products` table
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub categories: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            categories: row.categories,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
