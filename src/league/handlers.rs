use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::dto::league_requests::{
    CourseRequest, MatchResultRequest, PlayerRequest, ScoreSubmission, ScoresQuery,
    StandingsQuery, TeamRequest, TournamentQuery, TournamentRequest,
};
use crate::error::AppError;
use crate::jwt::require_caller;
use crate::league::LeagueService;

#[get("/teams")]
pub async fn list_teams(
    req: HttpRequest,
    league: web::Data<LeagueService>,
) -> Result<HttpResponse, AppError> {
    require_caller(&req)?;
    let teams = league.list_teams().await?;
    Ok(HttpResponse::Ok().json(teams))
}

#[post("/teams")]
pub async fn create_team(
    req: HttpRequest,
    league: web::Data<LeagueService>,
    body: web::Json<TeamRequest>,
) -> Result<HttpResponse, AppError> {
    let caller = require_caller(&req)?;
    let team = league.create_team(&caller, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(team))
}

#[get("/teams/{team_id}")]
pub async fn get_team(
    req: HttpRequest,
    league: web::Data<LeagueService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    require_caller(&req)?;
    let team = league.get_team(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(team))
}

#[put("/teams/{team_id}")]
pub async fn update_team(
    req: HttpRequest,
    league: web::Data<LeagueService>,
    path: web::Path<Uuid>,
    body: web::Json<TeamRequest>,
) -> Result<HttpResponse, AppError> {
    let caller = require_caller(&req)?;
    let team = league
        .update_team(&caller, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(team))
}

#[delete("/teams/{team_id}")]
pub async fn delete_team(
    req: HttpRequest,
    league: web::Data<LeagueService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let caller = require_caller(&req)?;
    league.delete_team(&caller, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/teams/{team_id}/players")]
pub async fn create_player(
    req: HttpRequest,
    league: web::Data<LeagueService>,
    path: web::Path<Uuid>,
    body: web::Json<PlayerRequest>,
) -> Result<HttpResponse, AppError> {
    let caller = require_caller(&req)?;
    let player = league
        .create_player(&caller, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(player))
}

#[get("/courses")]
pub async fn list_courses(
    req: HttpRequest,
    league: web::Data<LeagueService>,
) -> Result<HttpResponse, AppError> {
    require_caller(&req)?;
    let courses = league.list_courses().await?;
    Ok(HttpResponse::Ok().json(courses))
}

#[post("/courses")]
pub async fn create_course(
    req: HttpRequest,
    league: web::Data<LeagueService>,
    body: web::Json<CourseRequest>,
) -> Result<HttpResponse, AppError> {
    let caller = require_caller(&req)?;
    let course = league.create_course(&caller, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(course))
}

#[get("/tournaments")]
pub async fn list_tournaments(
    req: HttpRequest,
    league: web::Data<LeagueService>,
    query: web::Query<TournamentQuery>,
) -> Result<HttpResponse, AppError> {
    require_caller(&req)?;
    let tournaments = league.list_tournaments(query.filter).await?;
    Ok(HttpResponse::Ok().json(tournaments))
}

#[post("/tournaments")]
pub async fn create_tournament(
    req: HttpRequest,
    league: web::Data<LeagueService>,
    body: web::Json<TournamentRequest>,
) -> Result<HttpResponse, AppError> {
    let caller = require_caller(&req)?;
    let tournament = league.create_tournament(&caller, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(tournament))
}

#[post("/tournaments/{tournament_id}/complete")]
pub async fn complete_tournament(
    req: HttpRequest,
    league: web::Data<LeagueService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let caller = require_caller(&req)?;
    let tournament = league
        .complete_tournament(&caller, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(tournament))
}

#[post("/tournaments/{tournament_id}/matches")]
pub async fn record_match_result(
    req: HttpRequest,
    league: web::Data<LeagueService>,
    path: web::Path<Uuid>,
    body: web::Json<MatchResultRequest>,
) -> Result<HttpResponse, AppError> {
    let caller = require_caller(&req)?;
    let result = league
        .record_match_result(&caller, path.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(result))
}

#[post("/scores")]
pub async fn ingest_scores(
    req: HttpRequest,
    league: web::Data<LeagueService>,
    body: web::Json<ScoreSubmission>,
) -> Result<HttpResponse, AppError> {
    let caller = require_caller(&req)?;
    let scores = league.ingest_scores(&caller, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(scores))
}

#[get("/scores")]
pub async fn list_scores(
    req: HttpRequest,
    league: web::Data<LeagueService>,
    query: web::Query<ScoresQuery>,
) -> Result<HttpResponse, AppError> {
    require_caller(&req)?;
    let scores = league
        .list_scores(query.tournament_id, query.player_id)
        .await?;
    Ok(HttpResponse::Ok().json(scores))
}

#[get("/standings")]
pub async fn standings(
    req: HttpRequest,
    league: web::Data<LeagueService>,
    query: web::Query<StandingsQuery>,
) -> Result<HttpResponse, AppError> {
    let caller = require_caller(&req)?;
    let standings = league.standings(&caller, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(standings))
}

#[get("/overview")]
pub async fn league_overview(
    req: HttpRequest,
    league: web::Data<LeagueService>,
) -> Result<HttpResponse, AppError> {
    let caller = require_caller(&req)?;
    let overview = league.league_overview(&caller).await?;
    Ok(HttpResponse::Ok().json(overview))
}
