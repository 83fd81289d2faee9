use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tracing::info;
use tracing_actix_web::TracingLogger;

use league_backend::{build_service, configure_routes, load_config};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config();

    info!(backend = ?config.store_backend, "Starting golf league backend...");
    let league = web::Data::new(build_service(&config).await?);

    let bind = (config.bind_addr.clone(), config.port);
    info!(addr = %bind.0, port = bind.1, "Listening");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&config.cors_allowed_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![http::header::AUTHORIZATION, http::header::ACCEPT])
            .allowed_header(http::header::CONTENT_TYPE)
            .supports_credentials()
            .max_age(3600);

        let auth_secret = config.auth_secret.clone();
        App::new()
            .wrap(cors)
            .wrap(TracingLogger::default())
            .app_data(league.clone())
            .configure(move |cfg| configure_routes(cfg, &auth_secret))
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
