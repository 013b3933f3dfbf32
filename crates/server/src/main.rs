//! Rentora server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use rentora_api::{middleware::AppState, router as api_router};
use rentora_common::{Config, LocalStorage, StorageBackend};
use rentora_core::{
    AccountService, BookingService, DashboardService, ListingService, PropertyService,
    SessionStore, WishlistService,
};
use rentora_db::repositories::{
    BookingRepository, PhotoRepository, PropertyRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rentora=debug,tower_http=debug".into()),
        )
        .init();

    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load()?;

    // Connect to database and run migrations
    let db = rentora_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    rentora_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let property_repo = PropertyRepository::new(Arc::clone(&db));
    let photo_repo = PhotoRepository::new(Arc::clone(&db));
    let booking_repo = BookingRepository::new(Arc::clone(&db));

    let account_service = AccountService::new(user_repo.clone());

    // `rentora promote <email>` grants the admin role and exits
    let mut args = std::env::args().skip(1);
    if args.next().as_deref() == Some("promote") {
        let email = args
            .next()
            .ok_or("usage: rentora promote <email>")?;
        let user = account_service.promote_to_admin(&email).await?;
        info!(username = %user.username, "promoted to admin");
        return Ok(());
    }

    info!("Starting rentora server...");

    // Photo file storage
    let local_storage = LocalStorage::new(
        config.storage.upload_dir.clone(),
        config.storage.base_url.clone(),
    );
    local_storage.ensure_base_dir().await?;
    let storage: Arc<dyn StorageBackend> = Arc::new(local_storage);

    // Sessions and services
    let sessions = SessionStore::new();
    let listing_service = ListingService::new(property_repo.clone(), photo_repo.clone());
    let property_service = PropertyService::new(
        property_repo.clone(),
        photo_repo.clone(),
        Arc::clone(&storage),
    );
    let wishlist_service = WishlistService::new(sessions.clone(), property_repo.clone());
    let booking_service = BookingService::new(booking_repo, property_repo.clone());
    let dashboard_service = DashboardService::new(user_repo, property_repo);

    let state = AppState {
        account_service,
        listing_service,
        property_service,
        wishlist_service,
        booking_service,
        dashboard_service,
        sessions,
        storage,
        maps_api_key: config.maps.api_key.clone(),
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .nest_service("/files", ServeDir::new(&config.storage.upload_dir))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rentora_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
