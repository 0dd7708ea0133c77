//! Product Service - validation in front of the repository

use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::ProductResult;
use crate::models::{
    CreateProduct, Pagination, Product, ProductFilter, ProductListResponse, UpdateProduct,
};
use crate::repository::ProductRepository;

/// Product service providing business logic operations
///
/// Every input is validated before the repository is called; invalid input
/// never reaches storage.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    /// Create a new ProductService with the given repository
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new product
    #[instrument(skip(self, input), fields(product_name = %input.name))]
    pub async fn create_product(&self, input: CreateProduct) -> ProductResult<Product> {
        input.validate()?;
        self.repository.create(input).await
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i64) -> ProductResult<Product> {
        self.repository.get_by_id(id).await
    }

    /// List one page of products matching the filter
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: ProductFilter,
        pagination: Pagination,
    ) -> ProductResult<ProductListResponse> {
        pagination.validate()?;

        let (products, total_count) = self
            .repository
            .list(filter.normalized(), pagination)
            .await?;

        Ok(ProductListResponse {
            products,
            total_count,
            page: pagination.page,
            limit: pagination.limit,
        })
    }

    /// Update the supplied fields of a product
    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: i64, input: UpdateProduct) -> ProductResult<()> {
        input.validate()?;
        self.repository.update(id, input).await
    }

    /// Delete a product
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i64) -> ProductResult<()> {
        self.repository.delete(id).await
    }
}
