use super::shutdown::ShutdownCoordinator;
use crate::errors::handlers::not_found;
use crate::http::{create_cors_layer, security_headers};
use axum::{Router, middleware};
use core_config::server::ServerConfig;
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, warn};
use utoipa::OpenApi;

/// Creates a configured Axum router with common middleware and documentation.
///
/// This function sets up:
/// - OpenAPI documentation (Swagger UI, ReDoc, RapiDoc, Scalar) with the
///   document served at `/api-docs/openapi.json`
/// - The given routes, mounted at the root
/// - Request tracing, security headers and response compression
/// - CORS, only when `cors_allowed_origins` is non-empty
/// - A JSON 404 fallback
///
/// # Errors
/// Returns `InvalidInput` when a configured CORS origin is not a valid header value.
///
/// # Example
/// ```ignore
/// let api_routes = Router::new()
///     .merge(handlers::router(service))
///     .route("/health", get(health_handler).with_state(state));
///
/// let router = create_router::<ApiDoc>(api_routes, &config.server)?;
/// ```
pub fn create_router<T>(apis: Router, server_config: &ServerConfig) -> io::Result<Router>
where
    T: OpenApi + 'static,
{
    use utoipa_rapidoc::RapiDoc;
    use utoipa_redoc::{Redoc, Servable as RedocServable};
    use utoipa_scalar::{Scalar, Servable as ScalarServable};
    use utoipa_swagger_ui::SwaggerUi;

    let cors_layer = create_cors_layer(&server_config.cors_allowed_origins).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Invalid CORS_ALLOWED_ORIGIN value: {}", e),
        )
    })?;

    let mut router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(Redoc::with_url("/redoc", T::openapi()))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"))
        .merge(Scalar::with_url("/scalar", T::openapi()))
        .merge(apis)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers));

    if let Some(cors_layer) = cors_layer {
        info!(
            "CORS configured with allowed origins: {}",
            server_config.cors_allowed_origins.join(",")
        );
        router = router.layer(cors_layer);
    }

    // gzip, br, deflate, zstd based on Accept-Encoding
    Ok(router.layer(CompressionLayer::new()))
}

/// Production server with signal handling, bounded draining and cleanup.
///
/// Binds `server_config.address()`, serves until SIGINT/SIGTERM, lets
/// in-flight requests drain for `server_config.shutdown_timeout`, aborts
/// whatever is still running, then awaits `cleanup` (close pools etc.).
///
/// # Example
/// ```ignore
/// let cleanup = async move { database::postgres::close(&pool).await };
/// create_production_app(router, &config.server, cleanup).await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let coordinator = ShutdownCoordinator::default();
    let signal_coordinator = coordinator.clone();

    let result = serve_until(
        listener,
        router,
        coordinator,
        server_config.shutdown_timeout,
        async move { signal_coordinator.wait_for_signal().await },
    )
    .await;

    info!("Running cleanup tasks");
    cleanup.await;
    info!("Shutdown complete");

    result
}

/// Serves `router` on a spawned task until `trigger` completes.
///
/// Once triggered, the coordinator broadcasts shutdown so the server stops
/// accepting connections, and in-flight requests get `shutdown_timeout` to
/// finish before the server task is aborted. If the server task ends on its
/// own first, its result is returned immediately.
pub async fn serve_until<S>(
    listener: TcpListener,
    router: Router,
    coordinator: ShutdownCoordinator,
    shutdown_timeout: Duration,
    trigger: S,
) -> io::Result<()>
where
    S: Future<Output = ()>,
{
    let mut shutdown_rx = coordinator.subscribe();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await
    });

    tokio::select! {
        joined = &mut server => return flatten(joined),
        _ = trigger => {}
    }

    coordinator.shutdown();
    info!("Draining in-flight requests (timeout: {:?})", shutdown_timeout);

    match tokio::time::timeout(shutdown_timeout, &mut server).await {
        Ok(joined) => flatten(joined),
        Err(_) => {
            warn!(
                "Requests still in flight after {:?}, forcing shutdown",
                shutdown_timeout
            );
            server.abort();
            Ok(())
        }
    }
}

fn flatten(joined: Result<io::Result<()>, tokio::task::JoinError>) -> io::Result<()> {
    match joined {
        Ok(result) => result.inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        }),
        Err(e) => Err(io::Error::other(e)),
    }
}
