use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};

use tasktracker::auth::AuthMiddleware;
use tasktracker::config::Config;
use tasktracker::db;
use tasktracker::routes::{self, health};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(to_io_error)?;
    let pool = db::create_pool(&config).await.map_err(to_io_error)?;

    if config.reset_database {
        db::init_models(&pool).await.map_err(to_io_error)?;
    } else {
        db::ensure_schema(&pool).await.map_err(to_io_error)?;
    }

    log::info!("Starting tasktracker server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}

fn to_io_error(err: tasktracker::AppError) -> std::io::Error {
    log::error!("{}", err);
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}
