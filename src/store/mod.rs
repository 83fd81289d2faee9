//! League store
//!
//! The persistence seam of the service. `SeaOrmStore` talks to the relational
//! database; `MemoryStore` keeps everything in process and backs tests and
//! database-less local runs. Both serialize writes per store and hand out
//! consistent snapshots for aggregation.

pub mod memory;
pub mod sea_orm_store;

use async_trait::async_trait;
use uuid::Uuid;

use crate::dto::league_requests::{
    CourseRequest, MatchResultRequest, PlayerRequest, TeamRequest, TournamentFilter,
    TournamentRequest,
};
use crate::dto::team_listing::{TeamDetail, TeamListing};
use crate::entity::{courses, match_results, players, scores, teams, tournaments};
use crate::error::AppError;
use crate::league::aggregation::LeagueSnapshot;
use crate::league::ingestion::ScoreBatch;

pub use memory::MemoryStore;
pub use sea_orm_store::SeaOrmStore;

/// Request payloads reaching the store have already been validated and
/// normalized by the league service.
#[async_trait]
pub trait LeagueStore: Send + Sync {
    async fn list_teams(&self) -> Result<Vec<TeamListing>, AppError>;

    async fn get_team(&self, team_id: Uuid) -> Result<TeamDetail, AppError>;

    async fn create_team(&self, team: TeamRequest) -> Result<teams::Model, AppError>;

    async fn update_team(&self, team_id: Uuid, team: TeamRequest)
        -> Result<teams::Model, AppError>;

    /// Removes the team, its players, their scores and the team's match results
    async fn delete_team(&self, team_id: Uuid) -> Result<(), AppError>;

    async fn create_player(
        &self,
        team_id: Uuid,
        player: PlayerRequest,
    ) -> Result<players::Model, AppError>;

    async fn list_courses(&self) -> Result<Vec<courses::Model>, AppError>;

    async fn create_course(&self, course: CourseRequest) -> Result<courses::Model, AppError>;

    async fn list_tournaments(
        &self,
        filter: TournamentFilter,
    ) -> Result<Vec<tournaments::Model>, AppError>;

    async fn create_tournament(
        &self,
        tournament: TournamentRequest,
    ) -> Result<tournaments::Model, AppError>;

    /// Flips the completed flag; a second completion is a conflict
    async fn complete_tournament(&self, tournament_id: Uuid)
        -> Result<tournaments::Model, AppError>;

    /// Inserts the result and updates both teams' cumulative records atomically
    async fn record_match_result(
        &self,
        tournament_id: Uuid,
        result: MatchResultRequest,
    ) -> Result<match_results::Model, AppError>;

    /// Writes or replaces every hole of the batch in one atomic unit and
    /// returns the stored rows ordered by hole number
    async fn upsert_scores(
        &self,
        batch: &ScoreBatch,
        allow_completed: bool,
    ) -> Result<Vec<scores::Model>, AppError>;

    async fn list_scores(
        &self,
        tournament_id: Uuid,
        player_id: Option<Uuid>,
    ) -> Result<Vec<scores::Model>, AppError>;

    /// Reads every table aggregation needs from one consistent view
    async fn load_snapshot(&self) -> Result<LeagueSnapshot, AppError>;
}
