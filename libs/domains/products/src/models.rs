use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Product entity as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Database-assigned identifier
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Non-negative price with two decimal places
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Category labels in insertion order
    pub categories: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new product
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 255), custom(function = "validate_text"))]
    pub name: String,
    #[validate(length(min = 1), custom(function = "validate_text"))]
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    #[validate(length(min = 1), custom(function = "validate_categories"))]
    pub categories: Vec<String>,
}

/// DTO for a partial update; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 255), custom(function = "validate_text"))]
    pub name: Option<String>,
    #[validate(length(min = 1), custom(function = "validate_text"))]
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[validate(custom(function = "validate_price"))]
    pub price: Option<Decimal>,
    #[validate(length(min = 1), custom(function = "validate_categories"))]
    pub categories: Option<Vec<String>>,
}

impl UpdateProduct {
    /// True when no field is supplied
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.categories.is_none()
    }
}

/// Filter predicates for listing products; all present predicates must hold
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// Case-insensitive substring matched against any category label
    pub category: Option<String>,
    /// Inclusive lower price bound
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound
    pub max_price: Option<Decimal>,
    /// Free-text search over name and description
    pub search: Option<String>,
}

impl ProductFilter {
    /// Drop blank text predicates so they behave as if absent
    pub fn normalized(self) -> Self {
        fn non_blank(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        Self {
            category: non_blank(self.category),
            search: non_blank(self.search),
            ..self
        }
    }
}

/// Page selection for list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Validate)]
pub struct Pagination {
    #[validate(range(min = 1))]
    pub page: u32,
    #[validate(range(min = 1, max = 100))]
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Number of rows to skip
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1).max(0) * i64::from(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

/// Query string accepted by `GET /products`
///
/// Empty values (`?search=`) are treated as absent.
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListProductsQuery {
    /// Category substring (case-insensitive); `category` is accepted as an alias
    #[serde(default, alias = "category", deserialize_with = "empty_string_as_none")]
    pub category_id: Option<String>,
    /// Inclusive lower price bound
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub max_price: Option<Decimal>,
    /// Full-text search over name and description
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub search: Option<String>,
    /// Page number, starting at 1 (default 1)
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    /// Page size, 1 to 100 (default 10)
    #[serde(default, deserialize_with = "empty_string_as_none")]
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
}

impl ListProductsQuery {
    /// Split into repository filter and pagination, applying defaults
    pub fn into_parts(self) -> (ProductFilter, Pagination) {
        let filter = ProductFilter {
            category: self.category_id,
            min_price: self.min_price,
            max_price: self.max_price,
            search: self.search,
        };
        let pagination = Pagination::new(
            self.page.unwrap_or(DEFAULT_PAGE),
            self.limit.unwrap_or(DEFAULT_LIMIT),
        );
        (filter.normalized(), pagination)
    }
}

/// One page of products plus the total number of matches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    /// Matching products ignoring pagination
    pub total_count: i64,
    pub page: u32,
    pub limit: u32,
}

/// Exclusive upper bound of a `NUMERIC(12,2)` price
fn price_limit() -> Decimal {
    Decimal::new(10_000_000_000, 0)
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::new("negative_price")
            .with_message("price must not be negative".into()));
    }
    if *price >= price_limit() {
        return Err(ValidationError::new("price_too_large")
            .with_message("price must be less than 10000000000".into()));
    }
    Ok(())
}

/// PostgreSQL text columns cannot store NUL
fn validate_text(value: &str) -> Result<(), ValidationError> {
    if value.contains('\0') {
        return Err(ValidationError::new("nul_character")
            .with_message("text must not contain NUL characters".into()));
    }
    Ok(())
}

fn validate_categories(categories: &[String]) -> Result<(), ValidationError> {
    if categories.iter().any(|c| c.trim().is_empty()) {
        return Err(ValidationError::new("blank_category")
            .with_message("category labels must not be empty".into()));
    }
    categories.iter().try_for_each(|c| validate_text(c))
}

fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}
