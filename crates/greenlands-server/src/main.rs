use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use greenlands_api::auth::{self, AppState, AppStateInner};
use greenlands_api::middleware::require_auth;
use greenlands_api::notify::NoopNotifier;
use greenlands_api::{equipment, government, land, marketplace, messages, policy, subsidy};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "greenlands=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("GREENLANDS_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("GREENLANDS_DB_PATH").unwrap_or_else(|_| "greenlands.db".into());
    let host = std::env::var("GREENLANDS_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("GREENLANDS_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database
    let db = greenlands_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret,
        notifier: Arc::new(NoopNotifier),
    });

    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let protected_routes = Router::new()
        // Messaging
        .route("/messages", post(messages::send_message))
        .route("/messages", get(messages::list_messages))
        .route("/messages/threads", get(messages::list_threads))
        .route("/messages/thread/{thread_id}", get(messages::get_thread))
        .route("/messages/unread-count", get(messages::unread_count))
        .route("/messages/users", get(messages::messaging_users))
        // Land
        .route("/land", post(land::create_land))
        .route("/land", get(land::list_my_lands))
        .route("/land/{id}", get(land::get_land))
        .route("/land/{id}", put(land::update_land))
        .route("/land/{id}", delete(land::delete_land))
        .route("/land/{id}/crops", post(land::add_crop))
        .route("/land/{id}/water", post(land::add_water_usage))
        .route("/land/{id}/fertilizer", post(land::add_fertilizer_usage))
        .route("/land/{id}/report", get(land::land_report))
        // Equipment
        .route("/equipment", post(equipment::add_equipment))
        .route("/equipment", get(equipment::list_my_equipment))
        .route("/equipment/{id}", get(equipment::get_equipment))
        .route("/equipment/{id}", put(equipment::update_equipment))
        .route("/equipment/{id}", delete(equipment::delete_equipment))
        .route(
            "/equipment/{id}/maintenance",
            post(equipment::add_maintenance_record),
        )
        .route("/equipment/{id}/usage", put(equipment::update_usage_hours))
        // Subsidies
        .route("/subsidies", post(subsidy::apply_for_subsidy))
        .route("/subsidies", get(subsidy::list_my_subsidies))
        .route("/subsidies/admin/all", get(subsidy::list_all_subsidies))
        .route(
            "/subsidies/admin/{id}/status",
            put(subsidy::update_subsidy_status),
        )
        .route("/subsidies/{id}", get(subsidy::get_subsidy))
        .route("/subsidies/{id}", put(subsidy::update_subsidy))
        .route("/subsidies/{id}", delete(subsidy::delete_subsidy))
        // Policies
        .route("/policies", post(policy::create_policy))
        .route("/policies", get(policy::list_policies))
        .route("/policies/{id}", put(policy::update_policy))
        .route("/policies/{id}", delete(policy::delete_policy))
        .route("/policies/{id}/notify", post(policy::notify_policy))
        // Marketplace
        .route("/marketplace", post(marketplace::create_listing))
        .route("/marketplace", get(marketplace::list_listings))
        .route(
            "/marketplace/{id}/status",
            put(marketplace::update_listing_status),
        )
        .route("/marketplace/{id}", delete(marketplace::delete_listing))
        // Government
        .route("/government/analytics", get(government::analytics))
        .route("/government/farmers", get(government::list_farmers))
        .route("/government/lands", get(government::list_all_lands))
        .route("/government/subsidies", post(government::create_subsidy))
        .route("/government/subsidies/{id}", put(government::update_subsidy))
        .route("/government/departments", get(government::list_departments))
        .route("/government/departments", post(government::create_department))
        .route(
            "/government/departments/{id}",
            put(government::update_department),
        )
        .route(
            "/government/departments/{id}",
            delete(government::delete_department),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Greenlands server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
