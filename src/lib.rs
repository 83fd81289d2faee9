pub mod bootstrap;
pub mod config;
pub mod dto;
pub mod entity;
pub mod error;
pub mod jwt;
pub mod league;
pub mod store;
pub mod test_support;

pub use bootstrap::{build_service, connect_and_migrate, init_tracing, load_config, load_dotenv};

use actix_web::{error::InternalError, web, HttpResponse, ResponseError};

use error::AppError;
use jwt::JwtAuth;
use league::handlers::{
    complete_tournament, create_course, create_player, create_team, create_tournament,
    delete_team, get_team, ingest_scores, league_overview, list_courses, list_scores,
    list_teams, list_tournaments, record_match_result, standings, update_team,
};

/// Configure all routes for the application
pub fn configure_routes(cfg: &mut web::ServiceConfig, auth_secret: &str) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .service(hello)
        .service(
            web::scope("/api")
                .wrap(JwtAuth::new(auth_secret))
                .service(list_teams)
                .service(create_team)
                .service(get_team)
                .service(update_team)
                .service(delete_team)
                .service(create_player)
                .service(list_courses)
                .service(create_course)
                .service(list_tournaments)
                .service(create_tournament)
                .service(complete_tournament)
                .service(record_match_result)
                .service(ingest_scores)
                .service(list_scores)
                .service(standings)
                .service(league_overview),
        );
}

/// Malformed bodies answer with the same error shape as every other failure
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let app_err = AppError::validation(err.to_string());
        let response: HttpResponse = app_err.error_response();
        InternalError::from_response(err, response).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let app_err = AppError::validation(err.to_string());
        let response: HttpResponse = app_err.error_response();
        InternalError::from_response(err, response).into()
    })
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        let app_err = AppError::validation(err.to_string());
        let response: HttpResponse = app_err.error_response();
        InternalError::from_response(err, response).into()
    })
}

#[actix_web::get("/")]
async fn hello() -> impl actix_web::Responder {
    "Hello, golf league!"
}
