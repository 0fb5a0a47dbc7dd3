#![allow(dead_code)]

use actix_web::test;
use dotenv::dotenv;
use serde_json::json;
use sqlx::PgPool;
use tasktracker::auth::AuthResponse;

pub struct TestUser {
    pub id: i32,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (actix_web::http::header::HeaderName, String) {
        (
            actix_web::http::header::AUTHORIZATION,
            format!("Bearer {}", self.token),
        )
    }
}

/// Connects to `DATABASE_URL` and makes sure the schema exists.
pub async fn test_pool() -> PgPool {
    dotenv().ok();
    if std::env::var("JWT_SECRET").is_err() {
        std::env::set_var("JWT_SECRET", "integration_test_secret");
    }
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test DB");
    tasktracker::db::ensure_schema(&pool)
        .await
        .expect("Failed to create schema");
    pool
}

pub async fn cleanup_user(pool: &PgPool, email: &str) {
    let _ = sqlx::query("DELETE FROM users WHERE lower(email) = lower($1)")
        .bind(email)
        .execute(pool)
        .await;
}

pub async fn register_user(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    username: &str,
    password: &str,
) -> Result<TestUser, String> {
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(&json!({
            "username": username,
            "email": email,
            "password": password
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;

    if !status.is_success() {
        return Err(format!(
            "Failed to register user. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }
    let auth: AuthResponse = serde_json::from_slice(&body)
        .map_err(|e| format!("Failed to parse registration response: {}", e))?;

    Ok(TestUser {
        id: auth.user_id,
        token: auth.token,
    })
}

/// Full `/api` app (auth middleware included) over `$pool`, as `main` builds it.
macro_rules! test_app {
    ($pool:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($pool.clone()))
                .wrap(
                    actix_cors::Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header()
                        .max_age(3600),
                )
                .wrap(actix_web::middleware::Logger::default())
                .service(tasktracker::routes::health::health)
                .service(
                    actix_web::web::scope("/api")
                        .wrap(tasktracker::auth::AuthMiddleware)
                        .configure(tasktracker::routes::config),
                ),
        )
    };
}
