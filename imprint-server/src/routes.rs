//! API routes

use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

/// Room for multipart framing around the photo itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

fn cors_layer(origins: Option<&str>) -> CorsLayer {
    // IMPRINT_CORS_ORIGINS can be comma-separated list of origins, or "*" for any
    match origins {
        Some("*") => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        Some(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed))
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => {
            // Default: allow localhost origins for development
            let allowed = [
                "http://localhost:3000",
                "http://localhost:5173",
                "http://127.0.0.1:3000",
                "http://127.0.0.1:5173",
            ]
            .into_iter()
            .map(HeaderValue::from_static);
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed))
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.cors_origins.as_deref());
    let photo_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD;
    let uploads = ServeDir::new(state.config.uploads_path());

    let publisher_routes = Router::new()
        .route(
            "/",
            get(handlers::list_publishers).post(handlers::create_publisher),
        )
        .route(
            "/:id",
            get(handlers::get_publisher)
                .put(handlers::update_publisher)
                .delete(handlers::delete_publisher),
        )
        .route(
            "/:id/photo",
            put(handlers::upload_publisher_photo).layer(DefaultBodyLimit::max(photo_limit)),
        )
        // Nested resources take the publisher id from the path
        .route(
            "/:id/books",
            get(handlers::list_publisher_books).post(handlers::create_book),
        )
        .route(
            "/:id/reviews",
            get(handlers::list_publisher_reviews).post(handlers::create_review),
        );

    let book_routes = Router::new()
        .route("/", get(handlers::list_books))
        .route(
            "/:id",
            get(handlers::get_book)
                .put(handlers::update_book)
                .delete(handlers::delete_book),
        );

    let review_routes = Router::new()
        .route("/", get(handlers::list_reviews))
        .route(
            "/:id",
            get(handlers::get_review)
                .put(handlers::update_review)
                .delete(handlers::delete_review),
        );

    let user_routes = Router::new()
        .route("/", get(handlers::list_users).post(handlers::create_user))
        .route(
            "/:id",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        );

    let auth_routes = Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/logout", get(handlers::logout))
        .route("/me", get(handlers::me))
        .route("/updatedetails", put(handlers::update_details))
        .route("/updatepassword", put(handlers::update_password))
        .route("/forgetpassword", post(handlers::forgot_password))
        .route("/forgotpassword", post(handlers::forgot_password))
        .route("/resetpassword/:resettoken", put(handlers::reset_password));

    let api_routes = Router::new()
        .nest("/publishers", publisher_routes)
        .nest("/books", book_routes)
        .nest("/reviews", review_routes)
        .nest("/users", user_routes)
        .nest("/auth", auth_routes);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(handlers::health_check))
        .nest_service("/uploads", uploads)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_FRAME_OPTIONS,
                    HeaderValue::from_static("DENY"),
                )),
        )
        .with_state(state)
}
