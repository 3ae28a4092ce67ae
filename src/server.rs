//! Router assembly, shared by the binary and the tests.

use crate::api::handlers::{
    change_password, create_client, create_message, create_project, delete_client,
    delete_project, get_settings, get_stats, health_check, list_clients, list_messages,
    list_projects, login, logout, public_projects, public_settings, reply_to_message,
    submit_contact, update_client, update_message, update_profile, update_project,
    update_settings, upload_file, verify, AppState,
};
use crate::api::{admin_page_guard, require_session};
use crate::auth::{Authenticator, PasswordHasher};
use crate::config::Config;
use crate::store::{ContentStore, CredentialStore};
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, patch, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Room for multipart framing and the other form fields on top of the file.
const UPLOAD_BODY_SLACK: usize = 1024 * 1024;

/// Wire config, credential store and content store into the shared state.
pub fn build_state(mut config: Config, credentials: Arc<dyn CredentialStore>) -> Arc<AppState> {
    let secret = config.ensure_jwt_secret();
    let auth = Authenticator::new(
        credentials,
        PasswordHasher::new(config.bcrypt_cost),
        secret.as_bytes(),
    );
    let content = ContentStore::new(&config.data_dir);
    Arc::new(AppState {
        config,
        auth,
        content,
    })
}

/// Build the full application router.
///
/// Routes:
///   /api/admin/auth/{login,logout,verify}  - open
///   /api/admin/*                           - session required
///   /api/contact, /api/projects, /api/settings - public
///   /admin/*                               - admin pages behind the page guard
///   /uploads/*, everything else            - static files
pub fn build_router(state: Arc<AppState>) -> Router {
    let config = &state.config;

    let admin_api = Router::new()
        .route("/projects", get(list_projects).post(create_project))
        .route("/projects/:id", put(update_project).delete(delete_project))
        .route("/clients", get(list_clients).post(create_client))
        .route("/clients/:id", put(update_client).delete(delete_client))
        .route("/messages", get(list_messages).post(create_message))
        .route("/messages/:id", patch(update_message))
        .route("/messages/:id/reply", post(reply_to_message))
        .route("/settings", get(get_settings).put(update_settings))
        .route("/stats", get(get_stats))
        .route("/upload", post(upload_file))
        .route("/password", put(change_password))
        .route("/profile", put(update_profile))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let auth_api = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/verify", get(verify));

    let public_api = Router::new()
        .route("/api/contact", post(submit_contact))
        .route("/api/projects", get(public_projects))
        .route("/api/settings", get(public_settings))
        .layer(CorsLayer::permissive());

    // Routed rather than nested so ServeDir sees the full `/admin/...` path
    // and its trailing-slash redirects stay inside the admin tree.
    let admin_files = ServeDir::new(&config.public_dir);
    let admin_pages = Router::new()
        .route_service("/admin", admin_files.clone())
        .route_service("/admin/", admin_files.clone())
        .route_service("/admin/*page", admin_files)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_page_guard,
        ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/admin", auth_api.merge(admin_api))
        .merge(public_api)
        .merge(admin_pages)
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .fallback_service(ServeDir::new(&config.public_dir))
        .layer(TraceLayer::new_for_http())
        // Let the upload handler report oversize files itself
        .layer(DefaultBodyLimit::max(
            config.max_upload_bytes + UPLOAD_BODY_SLACK,
        ))
        .with_state(state)
}
