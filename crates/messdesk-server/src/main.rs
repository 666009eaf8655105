use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use messdesk_api::auth::{self, AppState, AppStateInner};
use messdesk_api::middleware::require_auth;
use messdesk_api::{authority, complaints, files, issues};
use messdesk_core::storage::LocalFileStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "messdesk=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("MESSDESK_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("MESSDESK_DB_PATH").unwrap_or_else(|_| "messdesk.db".into());
    let upload_dir = std::env::var("MESSDESK_UPLOAD_DIR").unwrap_or_else(|_| "uploads".into());
    let host = std::env::var("MESSDESK_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("MESSDESK_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database and file store
    let db = messdesk_db::Database::open(&PathBuf::from(&db_path))?;
    let file_store = LocalFileStore::new(&upload_dir)?;

    let state: AppState = Arc::new(AppStateInner { db, files: file_store, jwt_secret });

    // Routes
    let public_routes = Router::new()
        .route("/auth/student/signup", post(auth::student_signup))
        .route("/auth/student/login", post(auth::student_login))
        .route("/auth/student/logout", post(auth::logout))
        .route("/auth/mr/signup", post(auth::mr_signup))
        .route("/auth/mr/login", post(auth::mr_login))
        .route("/auth/mr/logout", post(auth::logout))
        .route("/auth/higher/signup", post(auth::higher_signup))
        .route("/auth/higher/login", post(auth::higher_login))
        .route("/auth/higher/logout", post(auth::logout))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/mess/{mess}/complaints", post(complaints::create_complaint))
        .route("/complaints/{complaint_id}", put(complaints::update_complaint))
        .route("/complaints/{complaint_id}", delete(complaints::delete_complaint))
        .route("/issues", post(issues::create_issue))
        .route("/issues", get(issues::list_issues))
        .route("/issues/{issue_id}", get(issues::get_issue))
        .route("/issues/{issue_id}", put(issues::update_issue))
        .route("/issues/{issue_id}", delete(issues::delete_issue))
        .route("/issues/{issue_id}/upvote", patch(issues::upvote_issue))
        .route("/issues/{issue_id}/downvote", patch(issues::downvote_issue))
        .route("/uploads", post(files::upload_image))
        .route("/authority/mess/{mess}/complaints", get(authority::list_complaints))
        .route("/authority/mess/{mess}/complaints/daily", get(authority::daily_complaints))
        .route("/authority/mess/{mess}/complaints/weekly", get(authority::weekly_complaints))
        .route(
            "/authority/complaints/{complaint_id}/status",
            patch(authority::update_complaint_status),
        )
        .route("/authority/issues", get(issues::list_issues))
        .route("/authority/issues/{issue_id}", post(authority::set_issue_resolved))
        .route("/authority/issues/{issue_id}", delete(authority::admin_delete_issue))
        .layer(middleware::from_fn(require_auth))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Messdesk server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
