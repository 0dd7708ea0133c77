//! OpenAPI documentation configuration

use utoipa::{Modify, OpenApi};

/// Combined OpenAPI documentation for Products API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Products API",
        version = "0.1.0",
        description = "Product catalog management API",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(crate::api::health::health_handler),
    modifiers(&ProductsDoc),
    tags(
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Product routes are mounted at the root, so their document is merged
/// rather than nested under a prefix.
struct ProductsDoc;

impl Modify for ProductsDoc {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.merge(domain_products::ApiDoc::openapi());
    }
}
