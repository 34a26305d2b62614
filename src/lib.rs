pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod products;
pub mod query;
pub mod users;
pub mod validation;

use axum::{
    extract::FromRef,
    response::Json,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use auth::{
    AuthError, AuthService, PasswordService, TokenService, UserStore,
};
use config::JwtConfig;
use products::ProductStore;
use users::UserService;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::signup_handler,
        auth::handlers::login_handler,
        auth::handlers::refresh_handler,
        auth::handlers::logout_handler,
        auth::handlers::change_password_handler,
        users::handlers::get_user_handler,
        users::handlers::update_user_handler,
        users::handlers::list_users_handler,
        products::handlers::get_product_handler,
        products::handlers::list_products_handler,
    ),
    components(schemas(
        auth::models::SignupRequest,
        auth::models::LoginRequest,
        auth::models::RefreshRequest,
        auth::models::ChangePasswordRequest,
        auth::models::AuthResponse,
        auth::models::MessageResponse,
        auth::models::UserResponse,
        auth::models::Role,
        auth::models::Gender,
        users::models::UpdateUserRequest,
        products::models::Product,
        query::UserPage,
        query::ProductPage,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Signup, login, token refresh and logout"),
        (name = "users", description = "User profile management"),
        (name = "products", description = "Product catalog lookup")
    ),
    info(
        title = "Storefront API",
        version = "0.1.0",
        description = "REST backend for user accounts and the product catalog"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers.
/// Built once at startup; nothing in it is mutated per request.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub users: UserService,
    pub tokens: Arc<TokenService>,
    pub products: Arc<dyn ProductStore>,
}

impl AppState {
    pub fn new(
        jwt: &JwtConfig,
        users: Arc<dyn UserStore>,
        products: Arc<dyn ProductStore>,
        passwords: PasswordService,
    ) -> Result<Self, AuthError> {
        let tokens = Arc::new(TokenService::from_config(jwt)?);
        let auth = Arc::new(AuthService::new(users.clone(), passwords, tokens.clone()));

        Ok(Self {
            auth,
            users: UserService::new(users),
            tokens,
            products,
        })
    }
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

async fn index() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": 200,
        "message": "Welcome to the storefront api",
    }))
}

/// Creates and configures the application router
pub fn create_router(state: AppState) -> Router {
    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(index))
        // Public auth routes
        .route("/api/users/signup", post(auth::signup_handler))
        .route("/api/users/login", post(auth::login_handler))
        .route("/api/users/refresh", post(auth::refresh_handler))
        // Bearer-protected routes
        .route("/api/users/logout", post(auth::logout_handler))
        .route("/api/users", get(users::list_users_handler))
        .route(
            "/api/users/:user_id",
            get(users::get_user_handler).put(users::update_user_handler),
        )
        .route(
            "/api/users/:user_id/password",
            put(auth::change_password_handler),
        )
        // Catalog
        .route("/api/products", get(products::list_products_handler))
        .route("/api/products/:product_id", get(products::get_product_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
