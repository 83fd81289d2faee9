use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::{Expr, LockType, OnConflict};
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbBackend, DbErr, EntityTrait, IsolationLevel, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionError, TransactionTrait,
};
use uuid::Uuid;

use crate::dto::league_requests::{
    CourseRequest, MatchResultRequest, PlayerRequest, TeamRequest, TournamentFilter,
    TournamentRequest,
};
use crate::dto::team_listing::{TeamDetail, TeamListing};
use crate::entity::{courses, match_results, players, scores, teams, tournaments};
use crate::error::AppError;
use crate::league::aggregation::LeagueSnapshot;
use crate::league::ingestion::{check_against_tournament, ScoreBatch};
use crate::store::LeagueStore;

/// Relational league store backed by SeaORM.
///
/// Multi-row writes run inside one transaction each; the rows they depend on
/// are read with row locks so concurrent writers cannot interleave.
#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Unwraps a transaction failure into the error the callback produced, or a
/// store error when beginning or committing failed.
fn transaction_error(operation: &'static str) -> impl FnOnce(TransactionError<AppError>) -> AppError {
    move |err| match err {
        TransactionError::Connection(source) => AppError::Store { operation, source },
        TransactionError::Transaction(err) => err,
    }
}

fn now() -> DateTime<FixedOffset> {
    Utc::now().into()
}

async fn delete_team_transaction(team_id: Uuid, txn: &DatabaseTransaction) -> Result<(), AppError> {
    teams::Entity::find_by_id(team_id)
        .lock(LockType::Update)
        .one(txn)
        .await
        .map_err(AppError::store("delete_team"))?
        .ok_or_else(|| AppError::not_found("team", team_id))?;

    let roster: Vec<Uuid> = players::Entity::find()
        .select_only()
        .column(players::Column::Id)
        .filter(players::Column::TeamId.eq(team_id))
        .into_tuple()
        .all(txn)
        .await
        .map_err(AppError::store("delete_team"))?;

    if !roster.is_empty() {
        scores::Entity::delete_many()
            .filter(scores::Column::PlayerId.is_in(roster))
            .exec(txn)
            .await
            .map_err(AppError::store("delete_team"))?;
    }

    players::Entity::delete_many()
        .filter(players::Column::TeamId.eq(team_id))
        .exec(txn)
        .await
        .map_err(AppError::store("delete_team"))?;

    // Opponents keep a consistent cumulative record once the results go
    let results = match_results::Entity::find()
        .filter(
            Condition::any()
                .add(match_results::Column::WinnerTeamId.eq(team_id))
                .add(match_results::Column::LoserTeamId.eq(team_id)),
        )
        .all(txn)
        .await
        .map_err(AppError::store("delete_team"))?;

    for result in &results {
        if result.winner_team_id == team_id {
            adjust_record(result.loser_team_id, 0, -1, txn).await?;
        } else {
            adjust_record(result.winner_team_id, -1, 0, txn).await?;
        }
    }

    match_results::Entity::delete_many()
        .filter(
            Condition::any()
                .add(match_results::Column::WinnerTeamId.eq(team_id))
                .add(match_results::Column::LoserTeamId.eq(team_id)),
        )
        .exec(txn)
        .await
        .map_err(AppError::store("delete_team"))?;

    teams::Entity::delete_by_id(team_id)
        .exec(txn)
        .await
        .map_err(AppError::store("delete_team"))?;

    Ok(())
}

async fn update_team_transaction(
    team_id: Uuid,
    team: TeamRequest,
    txn: &DatabaseTransaction,
) -> Result<teams::Model, AppError> {
    let existing = teams::Entity::find_by_id(team_id)
        .lock(LockType::Update)
        .one(txn)
        .await
        .map_err(AppError::store("update_team"))?
        .ok_or_else(|| AppError::not_found("team", team_id))?;

    let mut active: teams::ActiveModel = existing.into();
    active.name = Set(team.name);
    active.logo_url = Set(team.logo_url);
    active.update(txn).await.map_err(|err| match err {
        DbErr::RecordNotUpdated => AppError::not_found("team", team_id),
        other => AppError::Store {
            operation: "update_team",
            source: other,
        },
    })
}

async fn adjust_record(
    team_id: Uuid,
    wins: i32,
    losses: i32,
    txn: &DatabaseTransaction,
) -> Result<(), AppError> {
    teams::Entity::update_many()
        .col_expr(teams::Column::Wins, Expr::col(teams::Column::Wins).add(wins))
        .col_expr(
            teams::Column::Losses,
            Expr::col(teams::Column::Losses).add(losses),
        )
        .filter(teams::Column::Id.eq(team_id))
        .exec(txn)
        .await
        .map_err(AppError::store("adjust_team_record"))?;
    Ok(())
}

async fn complete_tournament_transaction(
    tournament_id: Uuid,
    txn: &DatabaseTransaction,
) -> Result<tournaments::Model, AppError> {
    let tournament = tournaments::Entity::find_by_id(tournament_id)
        .lock(LockType::Update)
        .one(txn)
        .await
        .map_err(AppError::store("complete_tournament"))?
        .ok_or_else(|| AppError::not_found("tournament", tournament_id))?;

    if tournament.completed {
        return Err(AppError::Conflict(format!(
            "tournament {tournament_id} is already completed"
        )));
    }

    let mut active: tournaments::ActiveModel = tournament.into();
    active.completed = Set(true);
    active.completed_at = Set(Some(now()));
    active
        .update(txn)
        .await
        .map_err(AppError::store("complete_tournament"))
}

async fn record_match_result_transaction(
    tournament_id: Uuid,
    result: MatchResultRequest,
    txn: &DatabaseTransaction,
) -> Result<match_results::Model, AppError> {
    tournaments::Entity::find_by_id(tournament_id)
        .one(txn)
        .await
        .map_err(AppError::store("record_match_result"))?
        .ok_or_else(|| AppError::not_found("tournament", tournament_id))?;

    for team_id in [result.winner_team_id, result.loser_team_id] {
        teams::Entity::find_by_id(team_id)
            .one(txn)
            .await
            .map_err(AppError::store("record_match_result"))?
            .ok_or_else(|| AppError::not_found("team", team_id))?;
    }

    let model = match_results::ActiveModel {
        id: Set(Uuid::new_v4()),
        tournament_id: Set(tournament_id),
        winner_team_id: Set(result.winner_team_id),
        loser_team_id: Set(result.loser_team_id),
        created_at: Set(now()),
    }
    .insert(txn)
    .await
    .map_err(AppError::store("record_match_result"))?;

    adjust_record(result.winner_team_id, 1, 0, txn).await?;
    adjust_record(result.loser_team_id, 0, 1, txn).await?;

    Ok(model)
}

async fn upsert_scores_transaction(
    batch: ScoreBatch,
    allow_completed: bool,
    txn: &DatabaseTransaction,
) -> Result<Vec<scores::Model>, AppError> {
    // A share lock keeps the tournament from completing mid-batch without
    // serializing batches for disjoint players
    let tournament = tournaments::Entity::find_by_id(batch.tournament_id())
        .lock(LockType::Share)
        .one(txn)
        .await
        .map_err(AppError::store("upsert_scores"))?
        .ok_or_else(|| AppError::not_found("tournament", batch.tournament_id()))?;

    players::Entity::find_by_id(batch.player_id())
        .one(txn)
        .await
        .map_err(AppError::store("upsert_scores"))?
        .ok_or_else(|| AppError::not_found("player", batch.player_id()))?;

    let course = courses::Entity::find_by_id(tournament.course_id)
        .one(txn)
        .await
        .map_err(AppError::store("upsert_scores"))?
        .ok_or_else(|| AppError::not_found("course", tournament.course_id))?;

    check_against_tournament(&batch, &tournament, &course, allow_completed)?;

    let updated_at = now();
    let rows = batch.holes().iter().map(|hole| scores::ActiveModel {
        tournament_id: Set(batch.tournament_id()),
        player_id: Set(batch.player_id()),
        hole_number: Set(hole.hole_number),
        strokes: Set(hole.strokes),
        updated_at: Set(updated_at),
    });

    scores::Entity::insert_many(rows)
        .on_conflict(
            OnConflict::columns([
                scores::Column::TournamentId,
                scores::Column::PlayerId,
                scores::Column::HoleNumber,
            ])
            .update_columns([scores::Column::Strokes, scores::Column::UpdatedAt])
            .to_owned(),
        )
        .exec_without_returning(txn)
        .await
        .map_err(AppError::store("upsert_scores"))?;

    scores::Entity::find()
        .filter(scores::Column::TournamentId.eq(batch.tournament_id()))
        .filter(scores::Column::PlayerId.eq(batch.player_id()))
        .filter(scores::Column::HoleNumber.is_in(batch.hole_numbers()))
        .order_by_asc(scores::Column::HoleNumber)
        .all(txn)
        .await
        .map_err(AppError::store("upsert_scores"))
}

async fn load_snapshot_transaction(txn: &DatabaseTransaction) -> Result<LeagueSnapshot, AppError> {
    let teams = teams::Entity::find()
        .order_by_asc(teams::Column::Id)
        .all(txn)
        .await
        .map_err(AppError::store("load_snapshot"))?;
    let players = players::Entity::find()
        .order_by_asc(players::Column::Id)
        .all(txn)
        .await
        .map_err(AppError::store("load_snapshot"))?;
    let courses = courses::Entity::find()
        .order_by_asc(courses::Column::Id)
        .all(txn)
        .await
        .map_err(AppError::store("load_snapshot"))?;
    let tournaments = tournaments::Entity::find()
        .order_by_asc(tournaments::Column::Id)
        .all(txn)
        .await
        .map_err(AppError::store("load_snapshot"))?;
    let scores = scores::Entity::find()
        .order_by_asc(scores::Column::TournamentId)
        .order_by_asc(scores::Column::PlayerId)
        .order_by_asc(scores::Column::HoleNumber)
        .all(txn)
        .await
        .map_err(AppError::store("load_snapshot"))?;
    let match_results = match_results::Entity::find()
        .order_by_asc(match_results::Column::Id)
        .all(txn)
        .await
        .map_err(AppError::store("load_snapshot"))?;

    Ok(LeagueSnapshot {
        teams,
        players,
        courses,
        tournaments,
        scores,
        match_results,
    })
}

#[async_trait]
impl LeagueStore for SeaOrmStore {
    async fn list_teams(&self) -> Result<Vec<TeamListing>, AppError> {
        let teams = teams::Entity::find()
            .order_by_asc(teams::Column::Name)
            .order_by_asc(teams::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::store("list_teams"))?;

        let memberships: Vec<Uuid> = players::Entity::find()
            .select_only()
            .column(players::Column::TeamId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(AppError::store("list_teams"))?;

        let mut roster_sizes: HashMap<Uuid, u64> = HashMap::new();
        for team_id in memberships {
            *roster_sizes.entry(team_id).or_insert(0) += 1;
        }

        Ok(teams
            .into_iter()
            .map(|team| TeamListing {
                player_count: roster_sizes.get(&team.id).copied().unwrap_or(0),
                team,
            })
            .collect())
    }

    async fn get_team(&self, team_id: Uuid) -> Result<TeamDetail, AppError> {
        let team = teams::Entity::find_by_id(team_id)
            .one(&self.db)
            .await
            .map_err(AppError::store("get_team"))?
            .ok_or_else(|| AppError::not_found("team", team_id))?;

        let players = players::Entity::find()
            .filter(players::Column::TeamId.eq(team_id))
            .order_by_asc(players::Column::Name)
            .order_by_asc(players::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::store("get_team"))?;

        Ok(TeamDetail { team, players })
    }

    async fn create_team(&self, team: TeamRequest) -> Result<teams::Model, AppError> {
        teams::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(team.name),
            logo_url: Set(team.logo_url),
            wins: Set(0),
            losses: Set(0),
            created_at: Set(now()),
        }
        .insert(&self.db)
        .await
        .map_err(AppError::store("create_team"))
    }

    async fn update_team(
        &self,
        team_id: Uuid,
        team: TeamRequest,
    ) -> Result<teams::Model, AppError> {
        self.db
            .transaction(|txn| Box::pin(update_team_transaction(team_id, team, txn)))
            .await
            .map_err(transaction_error("update_team"))
    }

    async fn delete_team(&self, team_id: Uuid) -> Result<(), AppError> {
        self.db
            .transaction(|txn| Box::pin(delete_team_transaction(team_id, txn)))
            .await
            .map_err(transaction_error("delete_team"))
    }

    async fn create_player(
        &self,
        team_id: Uuid,
        player: PlayerRequest,
    ) -> Result<players::Model, AppError> {
        teams::Entity::find_by_id(team_id)
            .one(&self.db)
            .await
            .map_err(AppError::store("create_player"))?
            .ok_or_else(|| AppError::not_found("team", team_id))?;

        players::ActiveModel {
            id: Set(Uuid::new_v4()),
            team_id: Set(team_id),
            name: Set(player.name),
            created_at: Set(now()),
        }
        .insert(&self.db)
        .await
        .map_err(AppError::store("create_player"))
    }

    async fn list_courses(&self) -> Result<Vec<courses::Model>, AppError> {
        courses::Entity::find()
            .order_by_asc(courses::Column::Name)
            .order_by_asc(courses::Column::Id)
            .all(&self.db)
            .await
            .map_err(AppError::store("list_courses"))
    }

    async fn create_course(&self, course: CourseRequest) -> Result<courses::Model, AppError> {
        courses::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(course.name),
            location: Set(course.location),
            par: Set(course.par),
            holes: Set(course.holes),
            difficulty: Set(course.difficulty),
        }
        .insert(&self.db)
        .await
        .map_err(AppError::store("create_course"))
    }

    async fn list_tournaments(
        &self,
        filter: TournamentFilter,
    ) -> Result<Vec<tournaments::Model>, AppError> {
        let query = match filter {
            TournamentFilter::All => tournaments::Entity::find()
                .order_by_asc(tournaments::Column::Date)
                .order_by_asc(tournaments::Column::Id),
            TournamentFilter::Upcoming => tournaments::Entity::find()
                .filter(tournaments::Column::Completed.eq(false))
                .order_by_asc(tournaments::Column::Date)
                .order_by_asc(tournaments::Column::Id),
            TournamentFilter::Past => tournaments::Entity::find()
                .filter(tournaments::Column::Completed.eq(true))
                .order_by_desc(tournaments::Column::Date)
                .order_by_desc(tournaments::Column::Id),
        };

        query
            .all(&self.db)
            .await
            .map_err(AppError::store("list_tournaments"))
    }

    async fn create_tournament(
        &self,
        tournament: TournamentRequest,
    ) -> Result<tournaments::Model, AppError> {
        courses::Entity::find_by_id(tournament.course_id)
            .one(&self.db)
            .await
            .map_err(AppError::store("create_tournament"))?
            .ok_or_else(|| AppError::not_found("course", tournament.course_id))?;

        tournaments::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(tournament.name),
            course_id: Set(tournament.course_id),
            date: Set(tournament.date),
            completed: Set(false),
            completed_at: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(AppError::store("create_tournament"))
    }

    async fn complete_tournament(
        &self,
        tournament_id: Uuid,
    ) -> Result<tournaments::Model, AppError> {
        self.db
            .transaction(|txn| Box::pin(complete_tournament_transaction(tournament_id, txn)))
            .await
            .map_err(transaction_error("complete_tournament"))
    }

    async fn record_match_result(
        &self,
        tournament_id: Uuid,
        result: MatchResultRequest,
    ) -> Result<match_results::Model, AppError> {
        self.db
            .transaction(|txn| {
                Box::pin(record_match_result_transaction(tournament_id, result, txn))
            })
            .await
            .map_err(transaction_error("record_match_result"))
    }

    async fn upsert_scores(
        &self,
        batch: &ScoreBatch,
        allow_completed: bool,
    ) -> Result<Vec<scores::Model>, AppError> {
        let batch = batch.clone();
        self.db
            .transaction(|txn| {
                Box::pin(upsert_scores_transaction(batch, allow_completed, txn))
            })
            .await
            .map_err(transaction_error("upsert_scores"))
    }

    async fn list_scores(
        &self,
        tournament_id: Uuid,
        player_id: Option<Uuid>,
    ) -> Result<Vec<scores::Model>, AppError> {
        tournaments::Entity::find_by_id(tournament_id)
            .one(&self.db)
            .await
            .map_err(AppError::store("list_scores"))?
            .ok_or_else(|| AppError::not_found("tournament", tournament_id))?;

        let mut query = scores::Entity::find()
            .filter(scores::Column::TournamentId.eq(tournament_id));
        if let Some(player_id) = player_id {
            query = query.filter(scores::Column::PlayerId.eq(player_id));
        }

        query
            .order_by_asc(scores::Column::PlayerId)
            .order_by_asc(scores::Column::HoleNumber)
            .all(&self.db)
            .await
            .map_err(AppError::store("list_scores"))
    }

    async fn load_snapshot(&self) -> Result<LeagueSnapshot, AppError> {
        // Postgres gets a single read-only repeatable-read view across all tables
        let snapshot = match self.db.get_database_backend() {
            DbBackend::Postgres => {
                self.db
                    .transaction_with_config(
                        |txn| Box::pin(load_snapshot_transaction(txn)),
                        Some(IsolationLevel::RepeatableRead),
                        Some(AccessMode::ReadOnly),
                    )
                    .await
            }
            _ => {
                self.db
                    .transaction(|txn| Box::pin(load_snapshot_transaction(txn)))
                    .await
            }
        };
        snapshot.map_err(transaction_error("load_snapshot"))
    }
}
